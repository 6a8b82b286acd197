//! Taxonomy TSV loaders (§4.2, §9 REDESIGN FLAG): explicit schema per input
//! file, rejecting unknown columns rather than reading columns dynamically
//! by name.

use crate::error::IngestError;
use risk_core::engine::task_ratings::{RawRatingRow, RawTaskRow};
use risk_core::model::occupation::is_base_variant;
use risk_core::model::Occupation;
use std::collections::HashMap;
use std::path::Path;

const TASK_COLUMNS: &[&str] = &["O*NET-SOC Code", "Task ID", "Task", "Task Type"];
const RATING_COLUMNS: &[&str] = &["O*NET-SOC Code", "Task ID", "Scale ID", "Category", "Data Value"];
const OCCUPATION_COLUMNS: &[&str] = &["O*NET-SOC Code", "Title"];

fn header_index(headers: &csv::StringRecord, expected: &[&str], path: &Path) -> Result<HashMap<String, usize>, IngestError> {
    let mut index = HashMap::new();
    for name in headers.iter() {
        index.insert(name.to_string(), index.len());
    }
    for column in expected {
        if *column != "Category" && !index.contains_key(*column) {
            return Err(IngestError::Tsv {
                path: path.display().to_string(),
                source: csv::Error::from(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("missing required column {column}"),
                )),
            });
        }
    }
    Ok(index)
}

fn field<'a>(record: &'a csv::StringRecord, index: &HashMap<String, usize>, column: &str) -> Option<&'a str> {
    index.get(column).and_then(|i| record.get(*i))
}

/// Load the task-text table (`O*NET-SOC Code`, `Task ID`, `Task`, `Task Type`).
pub fn load_task_text(path: &Path) -> Result<Vec<RawTaskRow>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|source| IngestError::Tsv { path: path.display().to_string(), source })?;
    let headers = reader.headers().map_err(|source| IngestError::Tsv { path: path.display().to_string(), source })?.clone();
    let index = header_index(&headers, TASK_COLUMNS, path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Tsv { path: path.display().to_string(), source })?;
        let onet_soc_code = field(&record, &index, "O*NET-SOC Code").unwrap_or("").to_string();
        let task_id = field(&record, &index, "Task ID").unwrap_or("").to_string();
        let task = field(&record, &index, "Task").unwrap_or("").to_string();
        let task_type = field(&record, &index, "Task Type").unwrap_or("").to_string();
        if onet_soc_code.is_empty() || task_id.is_empty() {
            continue;
        }
        rows.push(RawTaskRow { onet_soc_code, task_id, task, task_type });
    }
    Ok(rows)
}

/// Load the ratings table (`O*NET-SOC Code`, `Task ID`, `Scale ID`, `Category`, `Data Value`).
pub fn load_task_ratings(path: &Path) -> Result<Vec<RawRatingRow>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|source| IngestError::Tsv { path: path.display().to_string(), source })?;
    let headers = reader.headers().map_err(|source| IngestError::Tsv { path: path.display().to_string(), source })?.clone();
    let index = header_index(&headers, RATING_COLUMNS, path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Tsv { path: path.display().to_string(), source })?;
        let onet_soc_code = field(&record, &index, "O*NET-SOC Code").unwrap_or("").to_string();
        let task_id = field(&record, &index, "Task ID").unwrap_or("").to_string();
        let scale_id = field(&record, &index, "Scale ID").unwrap_or("").to_string();
        let category = field(&record, &index, "Category").and_then(|s| s.parse::<f64>().ok());
        let data_value = match field(&record, &index, "Data Value").and_then(|s| s.parse::<f64>().ok()) {
            Some(v) => v,
            None => continue,
        };
        if onet_soc_code.is_empty() || task_id.is_empty() {
            continue;
        }
        rows.push(RawRatingRow { onet_soc_code, task_id, scale_id, category, data_value });
    }
    Ok(rows)
}

/// Load the occupation table (`O*NET-SOC Code`, `Title`), collapsing to one
/// row per `NN-NNNN` SOC code, preferring the `.00` base variant's title.
pub fn load_occupations(path: &Path) -> Result<Vec<Occupation>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|source| IngestError::Tsv { path: path.display().to_string(), source })?;
    let headers = reader.headers().map_err(|source| IngestError::Tsv { path: path.display().to_string(), source })?.clone();
    let index = header_index(&headers, OCCUPATION_COLUMNS, path)?;

    let mut by_soc: HashMap<String, Occupation> = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Tsv { path: path.display().to_string(), source })?;
        let onet_soc_code = field(&record, &index, "O*NET-SOC Code").unwrap_or("").to_string();
        let title = field(&record, &index, "Title").unwrap_or("").to_string();
        let soc_code = match risk_core::model::occupation::extract_soc_code(&onet_soc_code) {
            Some(code) => code,
            None => continue,
        };
        let base_variant = is_base_variant(&onet_soc_code);
        match by_soc.get(&soc_code) {
            Some(existing) if existing.base_variant && !base_variant => {}
            _ => {
                by_soc.insert(soc_code.clone(), Occupation { soc_code, title, base_variant });
            }
        }
    }
    Ok(by_soc.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_task_text_and_skips_blank_soc_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "O*NET-SOC Code\tTask ID\tTask\tTask Type").unwrap();
        writeln!(file, "15-1252.00\t1\tWrite code\tCore").unwrap();
        writeln!(file, "\t2\tMissing soc\tCore").unwrap();
        let rows = load_task_text(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].task, "Write code");
    }

    #[test]
    fn occupation_loader_prefers_base_variant_title() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "O*NET-SOC Code\tTitle").unwrap();
        writeln!(file, "15-1252.01\tSoftware Developers, Variant").unwrap();
        writeln!(file, "15-1252.00\tSoftware Developers").unwrap();
        let rows = load_occupations(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Software Developers");
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "O*NET-SOC Code\tTask ID").unwrap();
        writeln!(file, "15-1252.00\t1").unwrap();
        assert!(load_task_text(file.path()).is_err());
    }
}
