//! Employment XLSX loaders (§4.5): industry-by-occupation and
//! national-occupation vintages, one workbook per year in `YEAR_RANGE`.
//!
//! Filter rules applied while reading: keep only `o_group == "detailed"`
//! rows, keep only `area == "99"` when an `area` column is present (the
//! national-occupation sheet has none), keep only rows whose NAICS field
//! matches `\d{6}`, parse `tot_emp` as a float, and drop non-positive
//! employment.

use crate::error::IngestError;
use calamine::{open_workbook_auto, Data, Reader};
use regex::Regex;
use risk_core::model::EmploymentRecord;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

fn naics6_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{6}$").unwrap())
}

struct ColumnIndex {
    map: HashMap<String, usize>,
}

impl ColumnIndex {
    fn from_header(header: &[Data]) -> Self {
        let mut map = HashMap::new();
        for (i, cell) in header.iter().enumerate() {
            map.insert(cell.to_string().trim().to_lowercase(), i);
        }
        Self { map }
    }

    fn get<'a>(&self, row: &'a [Data], column: &str) -> Option<&'a Data> {
        self.map.get(column).and_then(|i| row.get(*i))
    }

    fn text(&self, row: &[Data], column: &str) -> String {
        self.get(row, column).map(|c| c.to_string().trim().to_string()).unwrap_or_default()
    }

    fn number(&self, row: &[Data], column: &str) -> Option<f64> {
        self.get(row, column).and_then(|cell| match cell {
            Data::Float(f) => Some(*f),
            Data::Int(i) => Some(*i as f64),
            Data::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
            _ => None,
        })
    }
}

fn load_sheet(path: &Path, year: u32, national_only: bool) -> Result<Vec<EmploymentRecord>, IngestError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| IngestError::Xlsx {
        path: path.display().to_string(),
        source,
    })?;
    let sheet_name = workbook.sheet_names().first().cloned().ok_or_else(|| IngestError::Cache {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, "workbook has no sheets"),
    })?;
    let range = workbook.worksheet_range(&sheet_name).map_err(|source| IngestError::Xlsx {
        path: path.display().to_string(),
        source,
    })?;

    let mut rows_iter = range.rows();
    let header = match rows_iter.next() {
        Some(h) => h,
        None => return Ok(Vec::new()),
    };
    let index = ColumnIndex::from_header(header);

    let mut out = Vec::new();
    for row in rows_iter {
        let o_group = index.text(row, "o_group").to_lowercase();
        if o_group != "detailed" {
            continue;
        }
        if !national_only {
            if let Some(area) = index.get(row, "area") {
                if area.to_string().trim() != "99" {
                    continue;
                }
            }
        }

        let naics6 = if national_only { String::new() } else { index.text(row, "naics") };
        if !national_only && !naics6_re().is_match(&naics6) {
            continue;
        }

        let total_emp = match index.number(row, "tot_emp") {
            Some(v) if v > 0.0 => v,
            _ => continue,
        };

        let soc_code = index.text(row, "occ_code");
        if soc_code.is_empty() {
            continue;
        }

        out.push(EmploymentRecord {
            year,
            naics6,
            naics_title: index.text(row, "naics_title"),
            soc_code,
            occupation_title: index.text(row, "occ_title"),
            total_emp,
        });
    }
    Ok(out)
}

/// Load one year's industry-by-occupation workbook (`oesmYYin4/**/nat4d_MYYYY_dl.xlsx`).
pub fn load_industry_occupation(path: &Path, year: u32) -> Result<Vec<EmploymentRecord>, IngestError> {
    load_sheet(path, year, false)
}

/// Load one year's national-occupation workbook (`oesmYYnat/**/national_MYYYY_dl.xlsx`).
pub fn load_national_occupation(path: &Path, year: u32) -> Result<Vec<EmploymentRecord>, IngestError> {
    load_sheet(path, year, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naics6_regex_accepts_only_six_digits() {
        assert!(naics6_re().is_match("336111"));
        assert!(!naics6_re().is_match("33611"));
        assert!(!naics6_re().is_match("33611x"));
    }
}
