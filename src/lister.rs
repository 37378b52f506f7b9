//! Category-grouped browsing of the whole list.
//!
//! The host re-sorts whatever it receives by score. Every row here gets the
//! same score, and each title carries a run of zero-width spaces one longer
//! than the row before it (row `n`, 1-based and counting headers, has `n`),
//! which is what the host's tie handling keeps in sequence.

use std::collections::BTreeMap;
use log::debug;

use crate::model::ShortcutRecord;
use crate::results::{Action, ResultBuilder, ResultItem};

pub const PREFERRED_CATEGORIES: [&str; 3] = ["Folders", "Files", "Apps"];
pub const ORDERING_MARK: char = '\u{200B}';

/// Categories in display order with their members sorted by keyword.
pub fn group_by_category(records: &[ShortcutRecord]) -> Vec<(&str, Vec<&ShortcutRecord>)> {
    let mut groups: BTreeMap<&str, Vec<&ShortcutRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.category.as_str()).or_default().push(record);
    }
    for members in groups.values_mut() {
        members.sort_by(|a, b| a.keyword.cmp(&b.keyword));
    }

    let mut ordered = Vec::with_capacity(groups.len());
    for preferred in PREFERRED_CATEGORIES {
        if let Some((name, members)) = groups.remove_entry(preferred) {
            ordered.push((name, members));
        }
    }
    // BTreeMap iteration is already lexicographic.
    ordered.extend(groups);
    ordered
}

/// Strips the ordering marks again, for plain-text output.
pub fn visible_title(title: &str) -> &str {
    title.trim_start_matches(ORDERING_MARK)
}

pub struct Lister<'a> {
    builder: &'a ResultBuilder,
    score: i64,
}

impl<'a> Lister<'a> {
    pub fn new(builder: &'a ResultBuilder, score: i64) -> Self {
        Self { builder, score }
    }

    pub fn list(&self, filter: &str, records: &[ShortcutRecord]) -> Vec<ResultItem> {
        if records.is_empty() {
            return vec![self.builder.placeholder(
                "No shortcuts configured",
                "Open the Shortcuts Editor to add your first shortcut",
                Action::open_editor(),
            )];
        }

        let filter = filter.trim().to_lowercase();
        let groups: Vec<_> = group_by_category(records)
            .into_iter()
            .filter(|(name, _)| filter.is_empty() || name.to_lowercase().contains(&filter))
            .collect();

        if groups.is_empty() {
            return vec![self.builder.placeholder(
                format!("No categories match '{}'", filter),
                "Open the Shortcuts Editor to organise your shortcuts",
                Action::open_editor(),
            )];
        }

        let mut results = Vec::new();
        let mut marks = 0usize;
        let mut next_prefix = || {
            marks += 1;
            ORDERING_MARK.to_string().repeat(marks)
        };

        for (category, members) in groups {
            let header = self
                .builder
                .placeholder(
                    format!("{}═══ {} ═══", next_prefix(), category),
                    format!("{} shortcut(s) - Press Enter to open editor", members.len()),
                    Action::open_editor(),
                )
                .with_score(self.score);
            results.push(ResultItem {
                ico_path: self.builder.category_icon(category),
                ..header
            });

            for record in members {
                let mut item = self.builder.record(record, false);
                item.title = format!("{}{}", next_prefix(), item.title);
                item.score = self.score;
                results.push(item);
            }
        }

        debug!("listing {} rows (filter='{}')", results.len(), filter);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShortcutType;
    use crate::results::{EXECUTE_SHORTCUT, OPEN_EDITOR};

    fn rec(keyword: &str, category: &str) -> ShortcutRecord {
        let mut r = ShortcutRecord::new(keyword, ShortcutType::Folder, format!("/data/{}", keyword));
        r.category = category.to_string();
        r
    }

    fn store() -> Vec<ShortcutRecord> {
        vec![
            rec("zoom", "Apps"),
            rec("gh", "Bookmarks"),
            rec("proj", "Folders"),
            rec("dl", "Folders"),
            rec("cv", "Files"),
            rec("blog", "Work"),
            rec("ada", "Bookmarks"),
            rec("misc", "Archive"),
        ]
    }

    fn builder() -> ResultBuilder {
        ResultBuilder::new("/nonexistent", "Images/shortcut.png")
    }

    fn headers(results: &[ResultItem]) -> Vec<String> {
        results
            .iter()
            .filter(|r| r.action.method == OPEN_EDITOR)
            .map(|r| visible_title(&r.title).to_string())
            .collect()
    }

    #[test]
    fn preferred_categories_come_first() {
        let records = store();
        let names: Vec<_> = group_by_category(&records).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Folders", "Files", "Apps", "Archive", "Bookmarks", "Work"]);
    }

    #[test]
    fn missing_preferred_categories_are_skipped() {
        let records = vec![rec("b", "Zeta"), rec("a", "Files"), rec("c", "Alpha")];
        let names: Vec<_> = group_by_category(&records).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Files", "Alpha", "Zeta"]);
    }

    #[test]
    fn listing_layout() {
        let b = builder();
        let results = Lister::new(&b, 10000).list("", &store());
        assert_eq!(results.len(), 8 + 6);

        let titles: Vec<_> = results.iter().map(|r| visible_title(&r.title)).collect();
        assert_eq!(
            &titles[..5],
            &["═══ Folders ═══", "dl", "proj", "═══ Files ═══", "cv"]
        );
        assert_eq!(results[0].sub_title, "2 shortcut(s) - Press Enter to open editor");
        assert_eq!(results[1].sub_title, "📁 /data/dl");
        assert_eq!(results[1].action.method, EXECUTE_SHORTCUT);
        assert!(results.iter().all(|r| r.score == 10000));
    }

    #[test]
    fn ordering_marks_strictly_increase() {
        let b = builder();
        let results = Lister::new(&b, 10000).list("", &store());
        for (i, item) in results.iter().enumerate() {
            let marks = item.title.chars().take_while(|&c| c == ORDERING_MARK).count();
            assert_eq!(marks, i + 1);
        }
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let b = builder();
        let results = Lister::new(&b, 10000).list("  BOOK ", &store());
        assert_eq!(headers(&results), vec!["═══ Bookmarks ═══"]);
        let titles: Vec<_> = results.iter().skip(1).map(|r| visible_title(&r.title)).collect();
        assert_eq!(titles, vec!["ada", "gh"]);

        let results = Lister::new(&b, 10000).list("f", &store());
        assert_eq!(headers(&results), vec!["═══ Folders ═══", "═══ Files ═══"]);
    }

    #[test]
    fn empty_store_placeholder() {
        let b = builder();
        let results = Lister::new(&b, 10000).list("", &[]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "No shortcuts configured");
        assert_eq!(results[0].action.method, OPEN_EDITOR);
    }

    #[test]
    fn filter_without_match_placeholder() {
        let b = builder();
        let results = Lister::new(&b, 10000).list("nothing", &store());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "No categories match 'nothing'");
    }
}
