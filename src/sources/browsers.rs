use std::path::{Path, PathBuf};
use directories::BaseDirs;
use log::debug;
use walkdir::WalkDir;

use crate::sources::chromium::ChromiumSource;

const BOOKMARKS_FILE: &str = "Bookmarks";

/// Browser name and the directory its profiles live in.
fn browser_roots(base: &BaseDirs) -> Vec<(&'static str, PathBuf)> {
    #[cfg(windows)]
    {
        let local = base.data_local_dir();
        let roaming = base.data_dir();
        vec![
            ("Chrome", local.join("Google").join("Chrome").join("User Data")),
            ("Edge", local.join("Microsoft").join("Edge").join("User Data")),
            ("Opera", roaming.join("Opera Software").join("Opera Stable")),
            ("Brave", local.join("BraveSoftware").join("Brave-Browser").join("User Data")),
            ("Chromium", local.join("Chromium").join("User Data")),
        ]
    }
    #[cfg(target_os = "macos")]
    {
        let support = base.data_dir();
        vec![
            ("Chrome", support.join("Google").join("Chrome")),
            ("Edge", support.join("Microsoft Edge")),
            ("Opera", support.join("com.operasoftware.Opera")),
            ("Brave", support.join("BraveSoftware").join("Brave-Browser")),
            ("Chromium", support.join("Chromium")),
        ]
    }
    #[cfg(not(any(windows, target_os = "macos")))]
    {
        let config = base.config_dir();
        vec![
            ("Chrome", config.join("google-chrome")),
            ("Edge", config.join("microsoft-edge")),
            ("Opera", config.join("opera")),
            ("Brave", config.join("BraveSoftware").join("Brave-Browser")),
            ("Chromium", config.join("chromium")),
        ]
    }
}

/// Every profile under `root` that has a bookmarks file. The default profile
/// keeps the plain browser name, others get the profile directory appended.
pub fn profiles_in(browser: &str, root: &Path) -> Vec<ChromiumSource> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut found: Vec<ChromiumSource> = WalkDir::new(root)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == BOOKMARKS_FILE)
        .map(|entry| {
            let profile = entry
                .path()
                .parent()
                .filter(|dir| *dir != root)
                .and_then(|dir| dir.file_name())
                .map(|name| name.to_string_lossy().into_owned());
            let label = match profile.as_deref() {
                None | Some("Default") => browser.to_string(),
                Some(profile) => format!("{} ({})", browser, profile),
            };
            ChromiumSource::new(label, entry.into_path())
        })
        .collect();

    // Default profile first, then the rest by name.
    found.sort_by_key(|source| source.label != browser);
    debug!("{}: {} bookmark file(s) under {:?}", browser, found.len(), root);
    found
}

/// Installed browsers with a readable bookmarks file.
pub fn discover() -> Vec<ChromiumSource> {
    let Some(base) = BaseDirs::new() else {
        return Vec::new();
    };
    browser_roots(&base)
        .into_iter()
        .flat_map(|(browser, root)| profiles_in(browser, &root))
        .collect()
}

/// Picks a discovered source by label, case-insensitively.
pub fn find<'a>(sources: &'a [ChromiumSource], label: &str) -> Option<&'a ChromiumSource> {
    sources.iter().find(|s| s.label.eq_ignore_ascii_case(label))
}
