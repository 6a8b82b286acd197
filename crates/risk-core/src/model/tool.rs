use serde::{Deserialize, Serialize};

/// Which of the three tool-catalog sources a row came from (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolSource {
    /// Deep integration catalog (two-phase A-Z crawl).
    A,
    /// Paginated JSON API.
    B,
    /// Markdown server list.
    C,
}

impl std::fmt::Display for ToolSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolSource::A => write!(f, "A"),
            ToolSource::B => write!(f, "B"),
            ToolSource::C => write!(f, "C"),
        }
    }
}

/// A normalized row of the unified tool corpus.
///
/// `tool_text` is the cleaned concatenation `name + ". " + headline + ". "
/// + description + ". " + tags` used as the TF-IDF document for this tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub source: ToolSource,
    pub tool_id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub url: String,
    pub tool_text: String,
}

impl Tool {
    /// Dedup key per §4.1: (source, name, tool_text).
    pub fn dedup_key(&self) -> (ToolSource, String, String) {
        (self.source, self.name.clone(), self.tool_text.clone())
    }
}
