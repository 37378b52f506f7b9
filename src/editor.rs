//! Validated edits to the shortcut list: what the editor window does to the
//! store, without the window.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use log::info;
use thiserror::Error;

use crate::model::{DEFAULT_ICON, DEFAULT_PRIORITY, ShortcutRecord, ShortcutType};
use crate::sources::{Bookmark, ImportOptions};
use crate::store::{ShortcutStore, StoreError};

pub const MAX_PRIORITY: i64 = 200;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("keyword is required")]
    EmptyKeyword,
    #[error("keyword '{0}' already exists")]
    DuplicateKeyword(String),
    #[error("no shortcut named '{0}'")]
    UnknownKeyword(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Category offered for a new shortcut when the user leaves it blank.
pub fn suggested_category(kind: ShortcutType) -> &'static str {
    match kind {
        ShortcutType::Folder => "Folders",
        ShortcutType::File => "Files",
        ShortcutType::App => "Apps",
        ShortcutType::Url => "Bookmarks",
    }
}

/// The form contents for adding or editing a shortcut.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub keyword: String,
    pub kind: ShortcutType,
    pub path: String,
    pub category: String,
    pub priority: Option<i64>,
    pub icon: String,
    pub open_with: String,
}

impl Draft {
    pub fn from_record(record: &ShortcutRecord) -> Self {
        Self {
            keyword: record.keyword.clone(),
            kind: record.kind,
            path: record.path.clone(),
            category: record.category.clone(),
            priority: Some(record.priority),
            icon: record.icon.clone(),
            open_with: record.open_with.clone().unwrap_or_default(),
        }
    }

    fn into_record(self) -> Result<ShortcutRecord, EditError> {
        let keyword = self.keyword.trim().to_string();
        if keyword.is_empty() {
            return Err(EditError::EmptyKeyword);
        }

        let category = match self.category.trim() {
            "" => suggested_category(self.kind).to_string(),
            c => c.to_string(),
        };
        let icon = match self.icon.trim() {
            "" => DEFAULT_ICON.to_string(),
            i => i.to_string(),
        };
        let open_with = (self.kind == ShortcutType::File).then(|| self.open_with.trim().to_string());

        Ok(ShortcutRecord {
            keyword,
            kind: self.kind,
            path: self.path.trim().to_string(),
            category,
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY).clamp(0, MAX_PRIORITY),
            icon,
            open_with,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub renamed: usize,
}

/// First of `keyword`, `keyword-1`, `keyword-2`, ... not in `taken`.
pub fn unique_keyword(keyword: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(keyword) {
        return keyword.to_string();
    }
    (1..)
        .map(|n| format!("{}-{}", keyword, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| keyword.to_string())
}

pub struct Editor {
    store: ShortcutStore,
}

impl Editor {
    /// Opens the store, creating an empty file if there is none yet. A file
    /// that can't be read is an error, so no edit ever overwrites it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, EditError> {
        Ok(Self {
            store: ShortcutStore::load_or_create(path)?,
        })
    }

    /// Like `open` but never touches the disk, for previews.
    pub fn open_read_only(path: impl Into<PathBuf>) -> Result<Self, EditError> {
        Ok(Self {
            store: ShortcutStore::load(path)?,
        })
    }

    pub fn store(&self) -> &ShortcutStore {
        &self.store
    }

    pub fn records(&self) -> &[ShortcutRecord] {
        self.store.records()
    }

    fn position(&self, keyword: &str) -> Option<usize> {
        self.store.records().iter().position(|r| r.keyword == keyword)
    }

    pub fn add(&mut self, draft: Draft) -> Result<&ShortcutRecord, EditError> {
        let record = draft.into_record()?;
        if self.position(&record.keyword).is_some() {
            return Err(EditError::DuplicateKeyword(record.keyword));
        }

        info!("Adding shortcut '{}'", record.keyword);
        self.store.records_mut().push(record);
        self.store.save()?;
        let index = self.store.records().len() - 1;
        Ok(&self.store.records()[index])
    }

    /// Replaces the record named `keyword` in place.
    pub fn edit(&mut self, keyword: &str, draft: Draft) -> Result<&ShortcutRecord, EditError> {
        let index = self
            .position(keyword)
            .ok_or_else(|| EditError::UnknownKeyword(keyword.to_string()))?;
        let record = draft.into_record()?;
        let clash = self
            .store
            .records()
            .iter()
            .enumerate()
            .any(|(i, r)| i != index && r.keyword == record.keyword);
        if clash {
            return Err(EditError::DuplicateKeyword(record.keyword));
        }

        info!("Updating shortcut '{}'", keyword);
        self.store.records_mut()[index] = record;
        self.store.save()?;
        Ok(&self.store.records()[index])
    }

    pub fn remove(&mut self, keyword: &str) -> Result<bool, EditError> {
        self.store.delete(keyword).map_err(EditError::from)
    }

    /// The records an import of `bookmarks` would append, keywords already
    /// made unique against the store and against each other.
    pub fn preview_import(&self, bookmarks: &[Bookmark], options: &ImportOptions) -> (Vec<ShortcutRecord>, usize) {
        let mut taken: HashSet<String> = self.store.records().iter().map(|r| r.keyword.clone()).collect();
        let mut renamed = 0;

        let records = bookmarks
            .iter()
            .map(|bookmark| {
                let mut record = bookmark.to_record(options);
                let keyword = unique_keyword(&record.keyword, &taken);
                if keyword != record.keyword {
                    renamed += 1;
                    record.keyword = keyword;
                }
                taken.insert(record.keyword.clone());
                record
            })
            .collect();
        (records, renamed)
    }

    /// Converts the chosen bookmarks and appends them, renaming any keyword
    /// that is already taken (including by an earlier bookmark in the batch).
    pub fn import(&mut self, bookmarks: &[Bookmark], options: &ImportOptions) -> Result<ImportSummary, EditError> {
        let (records, renamed) = self.preview_import(bookmarks, options);
        let summary = ImportSummary {
            added: records.len(),
            renamed,
        };

        if summary.added > 0 {
            self.store.records_mut().extend(records);
            self.store.save()?;
            info!("Imported {} bookmark(s), {} renamed", summary.added, summary.renamed);
        }
        Ok(summary)
    }

    /// Points the editor at a new file. With `copy_existing` the current
    /// list is written there, otherwise whatever is at the new location is
    /// loaded (or created empty). Returns the path actually used.
    pub fn change_location(&mut self, path: &Path, copy_existing: bool) -> Result<PathBuf, EditError> {
        let path = with_json_extension(path);
        if copy_existing && !self.store.records().is_empty() {
            self.store.set_path(&path);
            self.store.save()?;
        } else {
            self.store = ShortcutStore::load_or_create(&path)?;
        }
        info!("Shortcuts will now be saved to {:?}", path);
        Ok(path)
    }
}

fn with_json_extension(path: &Path) -> PathBuf {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".json");
        PathBuf::from(name)
    }
}
