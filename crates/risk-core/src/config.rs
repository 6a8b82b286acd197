//! Fixed/overridable run configuration — §6 "Recognized options" and
//! "Environment/config". No environment variables are read; every knob
//! here is set by the caller (in practice, `risk-cli`'s argument parser).

use std::path::PathBuf;

/// Inclusive year range over which employment/exposure vintages are loaded.
pub const YEAR_RANGE: std::ops::RangeInclusive<u32> = 2019..=2024;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Bypass HTTP/disk caches for the tool-catalog crawl.
    pub force_refresh: bool,
    /// Cap on tool-detail HTTP fetches; remaining tools fall back to label-only rows.
    pub detail_limit: Option<usize>,
    /// Number of taxonomy tasks aligned per gold-benchmark prompt.
    pub align_topk: usize,
    /// Number of anchor neighbors in the capability-transfer similarity matrix.
    pub sim_k_neighbors: usize,
    /// Fuzzy name-matching acceptance threshold.
    pub name_match_cutoff: f64,

    pub taxonomy_dir: PathBuf,
    pub employment_dir: PathBuf,
    pub benchmark_asset_path: PathBuf,
    pub gold_prompts_path: PathBuf,
    pub tool_cache_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            force_refresh: false,
            detail_limit: None,
            align_topk: 5,
            sim_k_neighbors: 5,
            name_match_cutoff: 0.82,
            taxonomy_dir: PathBuf::from("data/taxonomy"),
            employment_dir: PathBuf::from("data/employment"),
            benchmark_asset_path: PathBuf::from("data/benchmark/bundle.js"),
            gold_prompts_path: PathBuf::from("data/benchmark/gold_tasks.csv"),
            tool_cache_dir: PathBuf::from("data/tool_cache"),
        }
    }
}
