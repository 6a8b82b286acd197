use serde::{Deserialize, Serialize};

/// One row of the industry x occupation (or national-occupation) employment
/// table for a given year (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentRecord {
    pub year: u32,
    /// 6-digit NAICS code; empty for the national-occupation sheet.
    pub naics6: String,
    pub naics_title: String,
    pub soc_code: String,
    pub occupation_title: String,
    pub total_emp: f64,
}
