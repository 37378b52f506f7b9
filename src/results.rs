use std::path::{Path, PathBuf};
use serde::Serialize;
use serde_json::Value;

use crate::config::Settings;
use crate::model::{ShortcutRecord, ShortcutType};

pub const EXECUTE_SHORTCUT: &str = "execute_shortcut";
pub const OPEN_EDITOR: &str = "open_editor";
pub const COPY_TO_CLIPBOARD: &str = "copy_to_clipboard";
pub const DELETE_SHORTCUT: &str = "delete_shortcut";
pub const DO_NOTHING: &str = "do_nothing";

/// Named host callback plus its positional arguments.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Action {
    pub method: String,
    pub parameters: Vec<Value>,
}

impl Action {
    fn new(method: &str, parameters: Vec<Value>) -> Self {
        Self {
            method: method.to_string(),
            parameters,
        }
    }

    pub fn execute(record: &ShortcutRecord) -> Self {
        Self::new(EXECUTE_SHORTCUT, vec![Value::String(record.to_json())])
    }

    pub fn open_editor() -> Self {
        Self::new(OPEN_EDITOR, Vec::new())
    }

    pub fn open_editor_with(context: Value) -> Self {
        Self::new(OPEN_EDITOR, vec![context])
    }

    pub fn copy(text: &str) -> Self {
        Self::new(COPY_TO_CLIPBOARD, vec![Value::String(text.to_string())])
    }

    pub fn delete(keyword: &str) -> Self {
        Self::new(DELETE_SHORTCUT, vec![Value::String(keyword.to_string())])
    }

    pub fn nothing() -> Self {
        Self::new(DO_NOTHING, Vec::new())
    }
}

/// One row as the host renders it.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ResultItem {
    pub title: String,
    pub sub_title: String,
    pub ico_path: String,
    pub score: i64,
    #[serde(rename = "JsonRPCAction")]
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_data: Option<String>,
}

impl ResultItem {
    pub fn new(title: impl Into<String>, sub_title: impl Into<String>, ico_path: String, action: Action) -> Self {
        Self {
            title: title.into(),
            sub_title: sub_title.into(),
            ico_path,
            score: 0,
            action,
            context_data: None,
        }
    }

    pub fn with_score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }
}

/// Subtitle text for a record. The category prefix is only wanted in search
/// results; the grouped listing already shows it as a header.
pub fn subtitle(record: &ShortcutRecord, show_category: bool) -> String {
    let body = match record.kind {
        ShortcutType::Url => format!("🌐 {}", record.path),
        ShortcutType::Folder => format!("📁 {}", record.path),
        ShortcutType::File => match record.open_with() {
            Some(app) => format!("📄 {} (with {})", record.path, base_name(app)),
            None => format!("📄 {}", record.path),
        },
        ShortcutType::App => format!("🚀 {}", record.path),
    };

    if show_category {
        format!("[{}] {}", record.category, body)
    } else {
        body
    }
}

// Handles both separators: the file may have been written on Windows.
fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Turns records into host results, resolving icons against the plugin
/// install directory.
#[derive(Debug, Clone)]
pub struct ResultBuilder {
    plugin_dir: PathBuf,
    default_icon: String,
}

impl ResultBuilder {
    pub fn new(plugin_dir: impl Into<PathBuf>, default_icon: impl Into<String>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            default_icon: default_icon.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.plugin_dir, settings.config.display.default_icon.clone())
    }

    pub fn default_icon(&self) -> String {
        self.plugin_dir.join(&self.default_icon).to_string_lossy().into_owned()
    }

    /// Relative icons live under the plugin directory; anything that doesn't
    /// exist on disk falls back to the default icon.
    pub fn resolve_icon(&self, icon: &str) -> String {
        if icon.is_empty() {
            return self.default_icon();
        }
        let path = Path::new(icon);
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.plugin_dir.join(path)
        };
        if resolved.exists() {
            resolved.to_string_lossy().into_owned()
        } else {
            self.default_icon()
        }
    }

    pub fn category_icon(&self, category: &str) -> String {
        let lower = category.to_lowercase();
        let icon = if lower.contains("folder") {
            "Images/folder.png"
        } else if lower.contains("file") {
            "Images/file.png"
        } else if lower.contains("app") {
            "Images/app.png"
        } else {
            "Images/bookmark.png"
        };
        self.resolve_icon(icon)
    }

    pub fn record(&self, record: &ShortcutRecord, show_category: bool) -> ResultItem {
        ResultItem {
            title: record.keyword.clone(),
            sub_title: subtitle(record, show_category),
            ico_path: self.resolve_icon(&record.icon),
            score: record.priority,
            action: Action::execute(record),
            context_data: Some(record.to_json()),
        }
    }

    pub fn placeholder(&self, title: impl Into<String>, sub_title: impl Into<String>, action: Action) -> ResultItem {
        ResultItem::new(title, sub_title, self.default_icon(), action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn subtitles_by_type() {
        let mut rec = ShortcutRecord::new("gh", ShortcutType::Url, "https://github.com");
        rec.category = "Bookmarks".to_string();
        assert_eq!(subtitle(&rec, true), "[Bookmarks] 🌐 https://github.com");
        assert_eq!(subtitle(&rec, false), "🌐 https://github.com");

        rec.kind = ShortcutType::Folder;
        assert_eq!(subtitle(&rec, false), "📁 https://github.com");

        let mut file = ShortcutRecord::new("cv", ShortcutType::File, "C:\\cv.docx");
        assert_eq!(subtitle(&file, false), "📄 C:\\cv.docx");
        file.open_with = Some("C:\\Program Files\\Office\\WINWORD.EXE".to_string());
        assert_eq!(subtitle(&file, false), "📄 C:\\cv.docx (with WINWORD.EXE)");
        file.open_with = Some("/usr/bin/libreoffice".to_string());
        assert_eq!(subtitle(&file, false), "📄 C:\\cv.docx (with libreoffice)");

        let app = ShortcutRecord::new("term", ShortcutType::App, "alacritty");
        assert_eq!(subtitle(&app, true), "[Uncategorized] 🚀 alacritty");
    }

    #[test]
    fn icons_resolve_or_fall_back() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Images")).unwrap();
        fs::write(dir.path().join("Images/folder.png"), b"png").unwrap();
        let builder = ResultBuilder::new(dir.path(), "Images/shortcut.png");
        let fallback = dir.path().join("Images/shortcut.png").to_string_lossy().into_owned();

        assert_eq!(
            builder.resolve_icon("Images/folder.png"),
            dir.path().join("Images/folder.png").to_string_lossy()
        );
        assert_eq!(builder.resolve_icon("Images/missing.png"), fallback);
        assert_eq!(builder.resolve_icon(""), fallback);
        assert_eq!(builder.category_icon("My Folders"), dir.path().join("Images/folder.png").to_string_lossy());
        assert_eq!(builder.category_icon("Work"), fallback);
    }

    #[test]
    fn record_result_shape() {
        let builder = ResultBuilder::new("/nonexistent", "Images/shortcut.png");
        let mut rec = ShortcutRecord::new("gh", ShortcutType::Url, "https://github.com");
        rec.priority = 120;

        let item = builder.record(&rec, true);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["Title"], "gh");
        assert_eq!(value["Score"], 120);
        assert_eq!(value["JsonRPCAction"]["method"], "execute_shortcut");

        let param = value["JsonRPCAction"]["parameters"][0].as_str().unwrap();
        let back: ShortcutRecord = serde_json::from_str(param).unwrap();
        assert_eq!(back, rec);
        assert_eq!(value["ContextData"], value["JsonRPCAction"]["parameters"][0]);
    }

    #[test]
    fn placeholder_omits_context_data() {
        let builder = ResultBuilder::new("/nonexistent", "Images/shortcut.png");
        let value = serde_json::to_value(builder.placeholder("t", "s", Action::nothing())).unwrap();
        assert!(value.get("ContextData").is_none());
        assert_eq!(value["JsonRPCAction"]["parameters"], serde_json::json!([]));
    }
}
