use serde::{Deserialize, Serialize};

/// One model's overall benchmark result (the "totals" block of §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub model_id: String,
    pub win_rate: f64,
    pub win_or_tie_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BySectorWinRate {
    pub model_id: String,
    pub sector: String,
    pub win_rate: f64,
    pub win_or_tie_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByOccupationWinRate {
    pub model_id: String,
    pub sector: String,
    pub occupation: String,
    pub win_rate: f64,
    pub win_or_tie_rate: f64,
}

/// One row of the closed `MODEL_RELEASES` reference table (§9 REDESIGN FLAG).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRelease {
    pub model_id: &'static str,
    pub family: &'static str,
    pub release_date: chrono::NaiveDate,
    pub source_url: &'static str,
    pub assumption: &'static str,
}
