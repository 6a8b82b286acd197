//! Tool Corpus Builder (§4.1). Takes already-fetched rows from each of the
//! three tool sources and normalizes them into the unified `Tool` table.
//! The fetch/crawl mechanics (two-phase A-Z crawl, JSON pagination, the
//! Markdown grammar) live in `risk-ingestion`; this module owns only the
//! normalization and dedup contract.

use crate::model::{Tool, ToolSource};
use crate::text::clean_text;
use std::collections::HashSet;

/// One fetched-but-unnormalized row from any of the three sources.
#[derive(Debug, Clone)]
pub struct RawToolRow {
    pub source: ToolSource,
    pub tool_id: String,
    pub name: String,
    pub headline: String,
    pub description: String,
    pub tags: Vec<String>,
    pub url: String,
}

/// Build `tool_text = clean(name + ". " + headline + ". " + description +
/// ". " + tags)` for one row, then dedup the full set by `(source, name,
/// tool_text)`. Rows with an empty name are dropped — `name non-empty` is
/// an invariant (§3).
pub fn build(rows: Vec<RawToolRow>) -> Vec<Tool> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        if row.name.trim().is_empty() {
            continue;
        }
        let joined_tags = row.tags.join(" ");
        let raw_text = format!(
            "{}. {}. {}. {}",
            row.name, row.headline, row.description, joined_tags
        );
        let tool = Tool {
            source: row.source,
            tool_id: row.tool_id,
            name: row.name,
            description: row.description,
            tags: row.tags,
            url: row.url,
            tool_text: clean_text(&raw_text),
        };
        let key = tool.dedup_key();
        if seen.insert(key) {
            out.push(tool);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_duplicate_rows_by_source_name_text() {
        let rows = vec![
            RawToolRow {
                source: ToolSource::A,
                tool_id: "1".into(),
                name: "Report Writer".into(),
                headline: "".into(),
                description: "drafts reports".into(),
                tags: vec![],
                url: "https://example.com/1".into(),
            },
            RawToolRow {
                source: ToolSource::A,
                tool_id: "2".into(),
                name: "Report Writer".into(),
                headline: "".into(),
                description: "drafts reports".into(),
                tags: vec![],
                url: "https://example.com/2".into(),
            },
        ];
        assert_eq!(build(rows).len(), 1);
    }

    #[test]
    fn drops_rows_with_empty_name() {
        let rows = vec![RawToolRow {
            source: ToolSource::B,
            tool_id: "1".into(),
            name: "  ".into(),
            headline: "".into(),
            description: "".into(),
            tags: vec![],
            url: "https://example.com".into(),
        }];
        assert!(build(rows).is_empty());
    }
}
