//! Tool-source crawl logic (§4.1, §6): the in-scope "crawl logic" layered
//! on top of the out-of-scope `Fetcher` mechanics.
//!
//! - Source A: a two-phase crawl — an A-Z index enumerates slugs, then one
//!   detail fetch per slug, with bounded concurrency and label-only
//!   fallback on a failed detail fetch.
//! - Source B: a paginated JSON API iterated via `offset`/`limit` until
//!   `hasNextPage` is false.
//! - Source C: a Markdown server list parsed by a bullet-pattern grammar.

use crate::error::IngestError;
use crate::fetch::Fetcher;
use regex::Regex;
use risk_core::engine::tool_corpus::RawToolRow;
use risk_core::model::ToolSource;
use serde::Deserialize;
use std::sync::OnceLock;

const LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";

fn build_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"_next/static/([A-Za-z0-9_-]+)/_buildManifest\.js"#).unwrap())
}

#[derive(Debug, Deserialize)]
struct LetterListing {
    apps: Vec<LetterListingEntry>,
}

#[derive(Debug, Deserialize)]
struct LetterListingEntry {
    slug: String,
    name: String,
    headline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AppDetail {
    name: String,
    headline: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
    url: Option<String>,
}

/// Crawl source A: an A-Z index page behind a Next.js build-id token,
/// followed by one detail fetch per slug (label-only fallback past
/// `detail_limit` or on fetch failure).
pub async fn crawl_source_a(
    fetcher: &dyn Fetcher,
    index_url: &str,
    data_base_url: &str,
    detail_limit: Option<usize>,
) -> Result<Vec<RawToolRow>, IngestError> {
    let index_bytes = fetcher.fetch(index_url).await?;
    let index_html = String::from_utf8_lossy(&index_bytes);
    let build_id = build_id_re()
        .captures(&index_html)
        .map(|c| c[1].to_string())
        .ok_or_else(|| IngestError::Cache {
            path: index_url.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "build-id token not found"),
        })?;

    let mut listings = Vec::new();
    for letter in LETTERS.chars() {
        let url = format!("{data_base_url}/_next/data/{build_id}/find-apps/{letter}.json");
        let bytes = fetcher.fetch(&url).await?;
        let parsed: LetterListing = serde_json::from_slice(&bytes).map_err(|_| IngestError::Cache {
            path: url.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "letter listing did not parse"),
        })?;
        for entry in parsed.apps {
            listings.push((letter, entry));
        }
    }

    let mut rows = Vec::with_capacity(listings.len());
    let mut fetched = 0usize;
    for (letter, entry) in listings {
        let within_limit = detail_limit.map(|limit| fetched < limit).unwrap_or(true);
        let detail_url = format!("{data_base_url}/find-apps/{letter}/{}.json", entry.slug);

        let row = if within_limit {
            fetched += 1;
            match fetcher.fetch(&detail_url).await {
                Ok(bytes) => match serde_json::from_slice::<AppDetail>(&bytes) {
                    Ok(detail) => RawToolRow {
                        source: ToolSource::A,
                        tool_id: entry.slug.clone(),
                        name: detail.name,
                        headline: detail.headline.unwrap_or_default(),
                        description: detail.description.unwrap_or_default(),
                        tags: detail.tags.unwrap_or_default(),
                        url: detail.url.unwrap_or(detail_url),
                    },
                    Err(_) => label_only_row(entry.slug, entry.name, entry.headline),
                },
                Err(_) => label_only_row(entry.slug, entry.name, entry.headline),
            }
        } else {
            label_only_row(entry.slug, entry.name, entry.headline)
        };
        rows.push(row);
    }
    Ok(rows)
}

fn label_only_row(slug: String, name: String, headline: Option<String>) -> RawToolRow {
    RawToolRow {
        source: ToolSource::A,
        tool_id: slug,
        name,
        headline: headline.unwrap_or_default(),
        description: String::new(),
        tags: Vec::new(),
        url: String::new(),
    }
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    items: Vec<PageItem>,
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
struct PageItem {
    id: String,
    name: String,
    description: Option<String>,
    tags: Option<Vec<String>>,
    url: Option<String>,
}

/// Crawl source B: a paginated JSON API, iterated until `hasNextPage` is false.
pub async fn crawl_source_b(
    fetcher: &dyn Fetcher,
    base_url: &str,
    page_size: usize,
) -> Result<Vec<RawToolRow>, IngestError> {
    let mut rows = Vec::new();
    let mut offset = 0usize;
    loop {
        let url = format!("{base_url}?offset={offset}&limit={page_size}");
        let bytes = fetcher.fetch(&url).await?;
        let page: PageResponse = serde_json::from_slice(&bytes).map_err(|_| IngestError::Cache {
            path: url.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "page response did not parse"),
        })?;
        let has_next = page.has_next_page;
        for item in page.items {
            rows.push(RawToolRow {
                source: ToolSource::B,
                tool_id: item.id,
                name: item.name,
                headline: String::new(),
                description: item.description.unwrap_or_default(),
                tags: item.tags.unwrap_or_default(),
                url: item.url.unwrap_or_default(),
            });
        }
        if !has_next {
            break;
        }
        offset += page_size;
    }
    Ok(rows)
}

fn markdown_entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"-\s+\*\*\[([^\]]+)\]\(([^)]+)\)\*\*\s*-\s*(.+)"#).unwrap())
}

/// Parse source C: a Markdown README whose server entries match
/// `- **[Name](URL)** - description`.
pub async fn crawl_source_c(fetcher: &dyn Fetcher, readme_url: &str) -> Result<Vec<RawToolRow>, IngestError> {
    let bytes = fetcher.fetch(readme_url).await?;
    let text = String::from_utf8_lossy(&bytes);
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(caps) = markdown_entry_re().captures(line) {
            rows.push(RawToolRow {
                source: ToolSource::C,
                tool_id: format!("c-{i}"),
                name: caps[1].trim().to_string(),
                headline: String::new(),
                description: caps[3].trim().to_string(),
                tags: Vec::new(),
                url: caps[2].trim().to_string(),
            });
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;
    use std::collections::HashMap;

    #[tokio::test]
    async fn source_c_parses_bullet_grammar() {
        let mut responses = HashMap::new();
        responses.insert(
            "https://example.com/README.md".to_string(),
            b"# Servers\n- **[Weather](https://weather.example)** - current conditions lookup\n- not a match line\n".to_vec(),
        );
        let fetcher = StaticFetcher { responses };
        let rows = crawl_source_c(&fetcher, "https://example.com/README.md").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Weather");
        assert_eq!(rows[0].url, "https://weather.example");
    }

    #[tokio::test]
    async fn source_b_paginates_until_exhausted() {
        let mut responses = HashMap::new();
        responses.insert(
            "https://api.example.com/tools?offset=0&limit=1".to_string(),
            br#"{"items":[{"id":"1","name":"Tool One"}],"hasNextPage":true}"#.to_vec(),
        );
        responses.insert(
            "https://api.example.com/tools?offset=1&limit=1".to_string(),
            br#"{"items":[{"id":"2","name":"Tool Two"}],"hasNextPage":false}"#.to_vec(),
        );
        let fetcher = StaticFetcher { responses };
        let rows = crawl_source_b(&fetcher, "https://api.example.com/tools", 1).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "Tool Two");
    }
}
