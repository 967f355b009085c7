//! Renders upstream result groups into the single text block returned by
//! the search tool.
//!
//! ```text
//! Results for BBC:
//!
//! 🎧 STATION
//! 1. BBC Radio 1(Pop) - https://radioplay.app/radioplay/bbc1
//! ```

use crate::client::{Item, ResultGroup};

/// Prefix of every group header line
pub const GROUP_HEADER_PREFIX: &str = "🎧 ";

/// Formats result groups; holds the site base used for canonical links
#[derive(Debug, Clone)]
pub struct ResultFormatter {
    site_url: String,
}

impl ResultFormatter {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
        }
    }

    /// Sentence returned when the upstream has nothing for `query`
    pub fn no_results(query: &str) -> String {
        format!("No results found for {query}.")
    }

    /// Render all groups in upstream order. Never fails.
    pub fn format(&self, query: &str, groups: &[ResultGroup]) -> String {
        if groups.is_empty() {
            return Self::no_results(query);
        }

        let blocks: Vec<String> = groups.iter().map(|group| self.format_group(group)).collect();
        format!("Results for {query}:\n\n{}", blocks.join("\n\n"))
    }

    fn format_group(&self, group: &ResultGroup) -> String {
        let mut block = format!("{GROUP_HEADER_PREFIX}{}", group.kind.to_uppercase());
        for (index, item) in group.data.iter().enumerate() {
            block.push('\n');
            block.push_str(&self.format_item(index + 1, item));
        }
        block
    }

    fn format_item(&self, number: usize, item: &Item) -> String {
        format!(
            "{number}. {}({}) - {}",
            item.display_name().unwrap_or_default(),
            item.display_category().unwrap_or_default(),
            item.display_link(&self.site_url).unwrap_or_default(),
        )
    }
}
