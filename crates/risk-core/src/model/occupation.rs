use serde::{Deserialize, Serialize};

/// A single occupation in the taxonomy, keyed by its SOC code (`NN-NNNN`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occupation {
    pub soc_code: String,
    pub title: String,
    /// True when the raw O*NET-SOC code ends in `.00` — the base variant
    /// whose title is preferred when multiple rows share a `soc_code`.
    pub base_variant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    Core,
    Supplemental,
}

/// A single rated task belonging to an occupation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub soc_code: String,
    pub task_id: String,
    pub text: String,
    /// Lowercased, markdown/URL-stripped, whitespace-collapsed form of `text`.
    pub text_clean: String,
    pub task_type: TaskType,
    /// Mean importance rating (IM), normalized to [0, 1]: `(mean - 1) / 4`.
    pub importance_norm: f64,
    /// Combined relevance/frequency prevalence in [0, 1].
    pub prevalence: f64,
    /// `max(importance_norm * prevalence, 0.01)`.
    pub task_weight: f64,
}

/// Extract the `NN-NNNN` SOC code prefix from a raw O*NET-SOC code
/// (e.g. `"15-1252.00"` -> `"15-1252"`).
pub fn extract_soc_code(onet_soc_code: &str) -> Option<String> {
    static PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let re = PATTERN.get_or_init(|| regex::Regex::new(r"^(\d{2}-\d{4})").unwrap());
    re.captures(onet_soc_code)
        .map(|c| c[1].to_string())
}

/// True when the raw O*NET-SOC code names the base (`.00`) variant.
pub fn is_base_variant(onet_soc_code: &str) -> bool {
    onet_soc_code.trim().ends_with(".00")
}
