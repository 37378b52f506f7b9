use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub const DEFAULT_ICON: &str = "Images/shortcut.png";
pub const DEFAULT_PRIORITY: i64 = 100;

/// What a shortcut points at. Decides both the subtitle marker and how the
/// executor opens it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum ShortcutType {
    Folder,
    File,
    #[default]
    App,
    Url,
}

impl ShortcutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShortcutType::Folder => "folder",
            ShortcutType::File => "file",
            ShortcutType::App => "app",
            ShortcutType::Url => "url",
        }
    }
}

impl fmt::Display for ShortcutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// Anything the host or an older editor wrote that we don't recognise is
// launched as a command, so a single odd record can't poison the whole file.
impl From<String> for ShortcutType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "folder" => ShortcutType::Folder,
            "file" => ShortcutType::File,
            "url" => ShortcutType::Url,
            _ => ShortcutType::App,
        }
    }
}

impl Serialize for ShortcutType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ShortcutType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ShortcutType::from)
    }
}

/// One keyword-to-target mapping as persisted in `shortcuts.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "RawRecord")]
pub struct ShortcutRecord {
    pub keyword: String,
    #[serde(rename = "type")]
    pub kind: ShortcutType,
    pub path: String,
    pub category: String,
    pub priority: i64,
    pub icon: String,
    #[serde(rename = "openWith", skip_serializing_if = "Option::is_none")]
    pub open_with: Option<String>,
}

fn default_category() -> String { DEFAULT_CATEGORY.to_string() }
fn default_icon() -> String { DEFAULT_ICON.to_string() }

/// Fields exactly as found in the file. A value of the wrong JSON type
/// (`"priority": "120"`, `"icon": null`) is coerced or defaulted per field,
/// so it never costs the other records.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawRecord {
    keyword: Value,
    #[serde(rename = "type")]
    kind: Value,
    path: Value,
    category: Value,
    priority: Value,
    icon: Value,
    #[serde(rename = "openWith")]
    open_with: Value,
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn priority(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl From<RawRecord> for ShortcutRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            priority: priority(&raw.priority).unwrap_or(DEFAULT_PRIORITY),
            keyword: text(raw.keyword).unwrap_or_default(),
            kind: text(raw.kind).map(ShortcutType::from).unwrap_or_default(),
            path: text(raw.path).unwrap_or_default(),
            category: text(raw.category).unwrap_or_else(default_category),
            icon: text(raw.icon).unwrap_or_else(default_icon),
            open_with: match raw.open_with {
                Value::String(s) => Some(s),
                _ => None,
            },
        }
    }
}

impl ShortcutRecord {
    pub fn new(keyword: impl Into<String>, kind: ShortcutType, path: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            kind,
            path: path.into(),
            category: default_category(),
            priority: DEFAULT_PRIORITY,
            icon: default_icon(),
            open_with: None,
        }
    }

    /// The opening application, only for file shortcuts and only when set to
    /// something non-blank (the editor stores `""` for "none").
    pub fn open_with(&self) -> Option<&str> {
        if self.kind != ShortcutType::File {
            return None;
        }
        self.open_with
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn to_json(&self) -> String {
        // A record has no map keys or non-finite floats, serialization can't fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let rec: ShortcutRecord = serde_json::from_str(r#"{"keyword":"docs","path":"C:\\Docs"}"#).unwrap();
        assert_eq!(rec.kind, ShortcutType::App);
        assert_eq!(rec.category, "Uncategorized");
        assert_eq!(rec.priority, 100);
        assert_eq!(rec.icon, "Images/shortcut.png");
        assert_eq!(rec.open_with, None);
    }

    #[test]
    fn unknown_fields_are_ignored_and_not_written() {
        let rec: ShortcutRecord =
            serde_json::from_str(r#"{"keyword":"gh","type":"url","path":"https://github.com","color":"red"}"#).unwrap();
        assert_eq!(rec.kind, ShortcutType::Url);
        let out = serde_json::to_value(&rec).unwrap();
        assert!(out.get("color").is_none());
        assert!(out.get("openWith").is_none());
        assert_eq!(out["type"], "url");
    }

    #[test]
    fn unknown_type_falls_back_to_app() {
        let rec: ShortcutRecord = serde_json::from_str(r#"{"keyword":"x","type":"script"}"#).unwrap();
        assert_eq!(rec.kind, ShortcutType::App);
    }

    #[test]
    fn wrongly_typed_fields_fall_back_per_field() {
        let rec: ShortcutRecord = serde_json::from_str(
            r#"{"keyword":"x","type":null,"path":"/x","category":null,"priority":"120","icon":null,"openWith":5}"#,
        )
        .unwrap();
        assert_eq!(rec.kind, ShortcutType::App);
        assert_eq!(rec.category, "Uncategorized");
        assert_eq!(rec.priority, 120);
        assert_eq!(rec.icon, "Images/shortcut.png");
        assert_eq!(rec.open_with, None);

        let rec: ShortcutRecord = serde_json::from_str(r#"{"keyword":7,"priority":"high"}"#).unwrap();
        assert_eq!(rec.keyword, "7");
        assert_eq!(rec.priority, 100);

        let rec: ShortcutRecord = serde_json::from_str(r#"{"keyword":"y","priority":150.9}"#).unwrap();
        assert_eq!(rec.priority, 150);
    }

    #[test]
    fn open_with_only_applies_to_files() {
        let mut rec = ShortcutRecord::new("notes", ShortcutType::File, "/tmp/notes.txt");
        rec.open_with = Some("  ".to_string());
        assert_eq!(rec.open_with(), None);

        rec.open_with = Some("/usr/bin/gedit".to_string());
        assert_eq!(rec.open_with(), Some("/usr/bin/gedit"));

        rec.kind = ShortcutType::App;
        assert_eq!(rec.open_with(), None);
    }
}
