//! Benchmark Parser (§4.7): extracts per-model totals, per-model-per-sector,
//! and per-model-per-occupation win rates from the compiled leaderboard
//! asset blob. Each record shape is matched by a dedicated, versioned
//! anchor regex rather than a general-purpose JSON walk — a format change
//! in the asset should raise `SchemaMismatch`, not silently yield nothing
//! (§9 REDESIGN FLAG).

use crate::error::PipelineError;
use crate::model::{ByOccupationWinRate, BySectorWinRate, Model};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn totals_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"\{\s*"model"\s*:\s*"([^"]+)"\s*,\s*"win_rate"\s*:\s*(-?\.?\d[\d.]*)\s*,\s*"win_or_tie_rate"\s*:\s*(-?\.?\d[\d.]*)\s*\}"#,
        )
        .unwrap()
    })
}

fn by_sector_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"\{\s*"model"\s*:\s*"([^"]+)"\s*,\s*"sector"\s*:\s*"([^"]+)"\s*,\s*"win_rate"\s*:\s*(-?\.?\d[\d.]*)\s*,\s*"win_or_tie_rate"\s*:\s*(-?\.?\d[\d.]*)\s*\}"#,
        )
        .unwrap()
    })
}

fn by_occupation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"\{\s*"model"\s*:\s*"([^"]+)"\s*,\s*"sector"\s*:\s*"([^"]+)"\s*,\s*"occupation"\s*:\s*"([^"]+)"\s*,\s*"win_rate"\s*:\s*(-?\.?\d[\d.]*)\s*,\s*"win_or_tie_rate"\s*:\s*(-?\.?\d[\d.]*)\s*\}"#,
        )
        .unwrap()
    })
}

/// Normalize a JS-style float literal: `.45` -> `0.45`, `-.0` -> `0`.
pub fn normalize_js_float(raw: &str) -> f64 {
    let s = raw.trim();
    let normalized = if let Some(rest) = s.strip_prefix('-') {
        if let Some(digits) = rest.strip_prefix('.') {
            format!("-0.{digits}")
        } else {
            s.to_string()
        }
    } else if let Some(digits) = s.strip_prefix('.') {
        format!("0.{digits}")
    } else {
        s.to_string()
    };
    let value: f64 = normalized.parse().unwrap_or(f64::NAN);
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedBenchmark {
    pub totals: Vec<Model>,
    pub by_sector: Vec<BySectorWinRate>,
    pub by_occupation: Vec<ByOccupationWinRate>,
}

/// Parse the leaderboard asset. Fails with `SchemaMismatch` if the totals
/// anchor matches nothing at all — by-sector/by-occupation blocks are
/// optional (older snapshots may omit them).
pub fn parse(blob: &str) -> Result<ParsedBenchmark, PipelineError> {
    let mut totals = Vec::new();
    let mut seen_totals = HashSet::new();
    for caps in totals_re().captures_iter(blob) {
        let model_id = caps[1].to_string();
        if !seen_totals.insert(model_id.clone()) {
            continue;
        }
        totals.push(Model {
            model_id,
            win_rate: normalize_js_float(&caps[2]),
            win_or_tie_rate: normalize_js_float(&caps[3]),
        });
    }

    if totals.is_empty() {
        return Err(PipelineError::SchemaMismatch {
            source: "benchmark_asset".to_string(),
            detail: "no totals records matched the anchor pattern".to_string(),
        });
    }

    let mut by_sector = Vec::new();
    let mut seen_sector = HashSet::new();
    for caps in by_sector_re().captures_iter(blob) {
        let key = (caps[1].to_string(), caps[2].to_string());
        if !seen_sector.insert(key.clone()) {
            continue;
        }
        by_sector.push(BySectorWinRate {
            model_id: key.0,
            sector: key.1,
            win_rate: normalize_js_float(&caps[3]),
            win_or_tie_rate: normalize_js_float(&caps[4]),
        });
    }

    let mut by_occupation = Vec::new();
    let mut seen_occ = HashSet::new();
    for caps in by_occupation_re().captures_iter(blob) {
        let key = (caps[1].to_string(), caps[2].to_string(), caps[3].to_string());
        if !seen_occ.insert(key.clone()) {
            continue;
        }
        by_occupation.push(ByOccupationWinRate {
            model_id: key.0,
            sector: key.1,
            occupation: key.2,
            win_rate: normalize_js_float(&caps[4]),
            win_or_tie_rate: normalize_js_float(&caps[5]),
        });
    }

    Ok(ParsedBenchmark { totals, by_sector, by_occupation })
}

/// Drop the synthetic human baseline row (§4.7: "Rows where model == human
/// are removed from downstream risk computations").
pub fn drop_human(models: Vec<Model>) -> Vec<Model> {
    models.into_iter().filter(|m| m.model_id != "human").collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario S4.
    #[test]
    fn scenario_s4_float_parsing() {
        assert_eq!(normalize_js_float(".45"), 0.45);
        assert_eq!(normalize_js_float("-.0"), 0.0);
        assert_eq!(normalize_js_float("0.9"), 0.9);
    }

    #[test]
    fn parses_totals_by_sector_and_by_occupation_blocks() {
        let blob = r#"
            var data = [{"model":"gpt-4o","win_rate":.62,"win_or_tie_rate":.71},
                        {"model":"human","win_rate":0.50,"win_or_tie_rate":0.55}];
            var sectors = [{"model":"gpt-4o","sector":"51","win_rate":.70,"win_or_tie_rate":.80}];
            var occs = [{"model":"gpt-4o","sector":"51","occupation":"Software Developers","win_rate":.75,"win_or_tie_rate":.82}];
        "#;
        let parsed = parse(blob).unwrap();
        assert_eq!(parsed.totals.len(), 2);
        assert_eq!(parsed.by_sector.len(), 1);
        assert_eq!(parsed.by_occupation.len(), 1);
        assert_eq!(parsed.by_occupation[0].occupation, "Software Developers");

        let without_human = drop_human(parsed.totals);
        assert_eq!(without_human.len(), 1);
        assert_eq!(without_human[0].model_id, "gpt-4o");
    }

    #[test]
    fn missing_totals_is_schema_mismatch() {
        let err = parse("no records here").unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
    }
}
