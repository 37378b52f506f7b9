use anyhow::Result;

use crate::model::{ShortcutRecord, ShortcutType};

pub mod browsers;
pub mod chromium;

pub const BOOKMARK_ICON: &str = "Images/bookmark.png";
pub const KEYWORD_MAX_LEN: usize = 30;

/// A bookmark flattened out of a browser's folder tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub name: String,
    pub url: String,
    /// Slash-separated folder path, empty at the root.
    pub folder: String,
}

pub trait Source {
    fn name(&self) -> &str;
    fn scan(&self) -> Result<Vec<Bookmark>>;
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub default_category: String,
    pub priority: i64,
    pub folder_as_category: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            default_category: "Bookmarks".to_string(),
            priority: 80,
            folder_as_category: true,
        }
    }
}

/// Keyword derived from a bookmark title: lowercase, spaces and slashes
/// become dashes, cut to 30 characters, then anything that isn't
/// alphanumeric or a dash is dropped.
pub fn slug_keyword(name: &str) -> String {
    name.to_lowercase()
        .replace([' ', '/'], "-")
        .chars()
        .take(KEYWORD_MAX_LEN)
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}

impl Bookmark {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.url } else { &self.name }
    }

    /// Keyword collisions are not resolved here, see `Editor::import`.
    pub fn to_record(&self, options: &ImportOptions) -> ShortcutRecord {
        let category = if options.folder_as_category && !self.folder.is_empty() {
            self.folder.replace('/', " > ")
        } else {
            options.default_category.clone()
        };

        let mut keyword = slug_keyword(self.display_name());
        if keyword.is_empty() {
            keyword = "bookmark".to_string();
        }

        let mut record = ShortcutRecord::new(keyword, ShortcutType::Url, self.url.clone());
        record.category = category;
        record.priority = options.priority;
        record.icon = BOOKMARK_ICON.to_string();
        record
    }
}

/// Bookmarks whose folder path contains `folder`, ignoring case, each with
/// its index in the unfiltered list so selections stay stable.
pub fn filter_by_folder(bookmarks: Vec<Bookmark>, folder: Option<&str>) -> Vec<(usize, Bookmark)> {
    let needle = folder.map(str::to_lowercase);
    bookmarks
        .into_iter()
        .enumerate()
        .filter(|(_, b)| match &needle {
            Some(needle) => b.folder.to_lowercase().contains(needle),
            None => true,
        })
        .collect()
}

/// The listed bookmarks chosen for import: every one with `all`, otherwise
/// those whose index is in `indices`. Indices that aren't listed are ignored.
pub fn select(listed: &[(usize, Bookmark)], all: bool, indices: &[usize]) -> Vec<Bookmark> {
    listed
        .iter()
        .filter(|(i, _)| all || indices.contains(i))
        .map(|(_, b)| b.clone())
        .collect()
}
