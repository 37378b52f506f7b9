use log::debug;

use crate::model::ShortcutRecord;
use crate::results::{Action, ResultBuilder, ResultItem};

/// Keyword lookup over the in-memory list: case-insensitive substring or
/// prefix, ranked by priority and then by keyword length.
pub struct KeywordMatcher<'a> {
    builder: &'a ResultBuilder,
    show_category: bool,
    action_keyword: &'a str,
}

impl<'a> KeywordMatcher<'a> {
    pub fn new(builder: &'a ResultBuilder, show_category: bool, action_keyword: &'a str) -> Self {
        Self {
            builder,
            show_category,
            action_keyword,
        }
    }

    /// `query` must already be lowercased.
    pub fn is_match(keyword: &str, query: &str) -> bool {
        let keyword = keyword.to_lowercase();
        keyword.contains(query) || keyword.starts_with(query)
    }

    /// `raw_query` is echoed back in the placeholder; matching uses its
    /// trimmed lowercase form.
    pub fn search(&self, raw_query: &str, records: &[ShortcutRecord]) -> Vec<ResultItem> {
        let query = raw_query.trim().to_lowercase();

        let mut results: Vec<ResultItem> = records
            .iter()
            .filter(|r| Self::is_match(&r.keyword, &query))
            .map(|r| self.builder.record(r, self.show_category))
            .collect();

        // Stable, so duplicate keywords keep store order.
        results.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.title.chars().count().cmp(&b.title.chars().count()))
        });

        debug!("query='{}' matched {} shortcuts", query, results.len());

        if results.is_empty() && !raw_query.is_empty() {
            results.push(self.builder.placeholder(
                format!("No shortcuts found for '{}'", raw_query),
                format!(
                    "Use '{} shortcutlist' to view all shortcuts or open the editor to add new ones",
                    self.action_keyword
                ),
                Action::nothing(),
            ));
        }

        results
    }
}
