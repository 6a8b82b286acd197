//! Benchmark asset fetch and gold-prompt loading (§4.7, §4.9).

use crate::error::IngestError;
use crate::fetch::Fetcher;
use risk_core::engine::task_alignment::GoldPrompt;
use std::path::Path;

/// Fetch the compiled leaderboard asset blob. Parsing it into totals /
/// by-sector / by-occupation rows is `risk_core::engine::benchmark_parser`'s job.
pub async fn fetch_benchmark_blob(fetcher: &dyn Fetcher, url: &str) -> Result<String, IngestError> {
    let bytes = fetcher.fetch(url).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Load the gold-prompt table (`task_id`, `sector`, `occupation`, `prompt`).
pub fn load_gold_prompts(path: &Path) -> Result<Vec<GoldPrompt>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .from_path(path)
        .map_err(|source| IngestError::Tsv { path: path.display().to_string(), source })?;
    let headers = reader.headers().map_err(|source| IngestError::Tsv { path: path.display().to_string(), source })?.clone();
    for column in ["task_id", "sector", "occupation", "prompt"] {
        if !headers.iter().any(|h| h == column) {
            return Err(IngestError::Tsv {
                path: path.display().to_string(),
                source: csv::Error::from(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("missing required column {column}"),
                )),
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: GoldPromptRecord = record.map_err(|source| IngestError::Tsv { path: path.display().to_string(), source })?;
        if row.task_id.is_empty() || row.prompt.trim().is_empty() {
            continue;
        }
        rows.push(GoldPrompt {
            task_id: row.task_id,
            sector: row.sector,
            occupation: row.occupation,
            prompt: row.prompt,
        });
    }
    Ok(rows)
}

#[derive(serde::Deserialize)]
struct GoldPromptRecord {
    task_id: String,
    sector: String,
    occupation: String,
    prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;
    use std::collections::HashMap;
    use std::io::Write;

    #[tokio::test]
    async fn fetches_blob_as_utf8_string() {
        let mut responses = HashMap::new();
        responses.insert("https://example.com/bundle.js".to_string(), b"var totals = [];".to_vec());
        let fetcher = StaticFetcher { responses };
        let blob = fetch_benchmark_blob(&fetcher, "https://example.com/bundle.js").await.unwrap();
        assert!(blob.contains("totals"));
    }

    #[test]
    fn loads_gold_prompts_and_skips_blank_prompts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "task_id,sector,occupation,prompt").unwrap();
        writeln!(file, "t1,Healthcare,Registered Nurses,Draft a care plan").unwrap();
        writeln!(file, "t2,Healthcare,Registered Nurses,").unwrap();
        let rows = load_gold_prompts(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].task_id, "t1");
    }
}
