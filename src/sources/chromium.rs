use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use log::{debug, error, info};
use serde_json::Value;

use crate::sources::{Bookmark, Source};

/// Roots that hold user bookmarks. Anything else in `roots` (sync metadata
/// and the like) is skipped.
const ROOTS: [&str; 3] = ["bookmark_bar", "other", "synced"];

/// A Chromium-family `Bookmarks` file (Chrome, Edge, Brave, Opera, Chromium).
#[derive(Debug, Clone)]
pub struct ChromiumSource {
    pub label: String,
    pub path: PathBuf,
}

impl ChromiumSource {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }

    /// Like `scan`, but a broken file is logged and reads as empty.
    pub fn scan_or_empty(&self) -> Vec<Bookmark> {
        match self.scan() {
            Ok(bookmarks) => bookmarks,
            Err(e) => {
                error!("Error parsing bookmarks: {:#}", e);
                Vec::new()
            }
        }
    }
}

impl Source for ChromiumSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn scan(&self) -> Result<Vec<Bookmark>> {
        debug!("Reading bookmarks from {:?}", self.path);
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let bookmarks = parse_bookmarks(&content)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        info!("{}: found {} bookmarks", self.label, bookmarks.len());
        Ok(bookmarks)
    }
}

pub fn parse_bookmarks(content: &str) -> Result<Vec<Bookmark>> {
    let data: Value = serde_json::from_str(content)?;
    let mut bookmarks = Vec::new();
    if let Some(roots) = data.get("roots") {
        for root in ROOTS {
            if let Some(node) = roots.get(root) {
                walk(node, "", &mut bookmarks);
            }
        }
    }
    Ok(bookmarks)
}

fn walk(node: &Value, folder: &str, out: &mut Vec<Bookmark>) {
    match node {
        Value::Object(map) => match map.get("type").and_then(Value::as_str) {
            Some("url") => out.push(Bookmark {
                name: text(node, "name"),
                url: text(node, "url"),
                folder: folder.to_string(),
            }),
            Some("folder") => {
                let name = text(node, "name");
                let path = if folder.is_empty() {
                    name
                } else {
                    format!("{}/{}", folder, name)
                };
                if let Some(children) = map.get("children") {
                    walk(children, &path, out);
                }
            }
            _ => {}
        },
        Value::Array(items) => {
            for item in items {
                walk(item, folder, out);
            }
        }
        _ => {}
    }
}

fn text(node: &Value, key: &str) -> String {
    node.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "checksum": "abc",
        "roots": {
            "bookmark_bar": {
                "type": "folder", "name": "Bookmarks bar",
                "children": [
                    { "type": "url", "name": "Rust", "url": "https://www.rust-lang.org" },
                    { "type": "folder", "name": "Dev", "children": [
                        { "type": "url", "name": "Docs.rs", "url": "https://docs.rs" },
                        { "type": "folder", "name": "Empty", "children": [] }
                    ]}
                ]
            },
            "other": {
                "type": "folder", "name": "Other bookmarks",
                "children": [ { "type": "url", "name": "", "url": "https://example.org" } ]
            },
            "synced": { "type": "folder", "name": "Mobile bookmarks", "children": [] },
            "workspaces": {
                "type": "folder", "name": "Hidden",
                "children": [ { "type": "url", "name": "skip", "url": "https://skip.example" } ]
            }
        },
        "version": 1
    }"#;

    #[test]
    fn walks_nested_folders() {
        let bookmarks = parse_bookmarks(SAMPLE).unwrap();
        assert_eq!(
            bookmarks,
            vec![
                Bookmark {
                    name: "Rust".into(),
                    url: "https://www.rust-lang.org".into(),
                    folder: "Bookmarks bar".into(),
                },
                Bookmark {
                    name: "Docs.rs".into(),
                    url: "https://docs.rs".into(),
                    folder: "Bookmarks bar/Dev".into(),
                },
                Bookmark {
                    name: "".into(),
                    url: "https://example.org".into(),
                    folder: "Other bookmarks".into(),
                },
            ]
        );
    }

    #[test]
    fn missing_roots_is_empty() {
        assert!(parse_bookmarks(r#"{"version": 1}"#).unwrap().is_empty());
    }

    #[test]
    fn broken_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Bookmarks");
        fs::write(&path, "{").unwrap();
        let source = ChromiumSource::new("Chrome", &path);
        assert!(source.scan().is_err());
        assert!(source.scan_or_empty().is_empty());

        let missing = ChromiumSource::new("Chrome", dir.path().join("nope"));
        assert!(missing.scan_or_empty().is_empty());
    }

    #[test]
    fn scans_file_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Bookmarks");
        fs::write(&path, SAMPLE).unwrap();
        let source = ChromiumSource::new("Brave", &path);
        assert_eq!(source.name(), "Brave");
        assert_eq!(source.scan().unwrap().len(), 3);
    }
}
