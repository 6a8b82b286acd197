//! Closed enum over NAICS sector codes (REDESIGN FLAG, `spec.md` §9):
//! `SECTOR_TITLE` is no longer a dictionary with free-form keys but a
//! match over a fixed, enumerable set of sectors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NaicsSector {
    Sector11,
    Sector21,
    Sector22,
    Sector23,
    Sector3133,
    Sector42,
    Sector4445,
    Sector4849,
    Sector51,
    Sector52,
    Sector53,
    Sector54,
    Sector55,
    Sector56,
    Sector61,
    Sector62,
    Sector71,
    Sector72,
    Sector81,
    Sector92,
    Sector99,
    /// Two-digit code outside the known set — retained verbatim.
    Other(String),
    /// Invalid/unparseable NAICS prefix.
    Unknown,
}

impl NaicsSector {
    pub fn code(&self) -> String {
        match self {
            NaicsSector::Sector11 => "11".into(),
            NaicsSector::Sector21 => "21".into(),
            NaicsSector::Sector22 => "22".into(),
            NaicsSector::Sector23 => "23".into(),
            NaicsSector::Sector3133 => "31-33".into(),
            NaicsSector::Sector42 => "42".into(),
            NaicsSector::Sector4445 => "44-45".into(),
            NaicsSector::Sector4849 => "48-49".into(),
            NaicsSector::Sector51 => "51".into(),
            NaicsSector::Sector52 => "52".into(),
            NaicsSector::Sector53 => "53".into(),
            NaicsSector::Sector54 => "54".into(),
            NaicsSector::Sector55 => "55".into(),
            NaicsSector::Sector56 => "56".into(),
            NaicsSector::Sector61 => "61".into(),
            NaicsSector::Sector62 => "62".into(),
            NaicsSector::Sector71 => "71".into(),
            NaicsSector::Sector72 => "72".into(),
            NaicsSector::Sector81 => "81".into(),
            NaicsSector::Sector92 => "92".into(),
            NaicsSector::Sector99 => "99".into(),
            NaicsSector::Other(c) => c.clone(),
            NaicsSector::Unknown => "NA".into(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NaicsSector::Sector11 => "Agriculture, Forestry, Fishing and Hunting",
            NaicsSector::Sector21 => "Mining, Quarrying, and Oil and Gas Extraction",
            NaicsSector::Sector22 => "Utilities",
            NaicsSector::Sector23 => "Construction",
            NaicsSector::Sector3133 => "Manufacturing",
            NaicsSector::Sector42 => "Wholesale Trade",
            NaicsSector::Sector4445 => "Retail Trade",
            NaicsSector::Sector4849 => "Transportation and Warehousing",
            NaicsSector::Sector51 => "Information",
            NaicsSector::Sector52 => "Finance and Insurance",
            NaicsSector::Sector53 => "Real Estate and Rental and Leasing",
            NaicsSector::Sector54 => "Professional, Scientific, and Technical Services",
            NaicsSector::Sector55 => "Management of Companies and Enterprises",
            NaicsSector::Sector56 => {
                "Administrative and Support and Waste Management and Remediation Services"
            }
            NaicsSector::Sector61 => "Educational Services",
            NaicsSector::Sector62 => "Health Care and Social Assistance",
            NaicsSector::Sector71 => "Arts, Entertainment, and Recreation",
            NaicsSector::Sector72 => "Accommodation and Food Services",
            NaicsSector::Sector81 => "Other Services (Except Public Administration)",
            NaicsSector::Sector92 => "Public Administration",
            NaicsSector::Sector99 => "Government and Special Designation Sectors",
            NaicsSector::Other(_) => "Unclassified Sector",
            NaicsSector::Unknown => "Unknown Sector",
        }
    }
}

/// Normalize a 6-digit NAICS industry code to its sector, applying the
/// three canonical merges ({31,32,33}, {44,45}, {48,49}) and retaining
/// unknown two-digit prefixes verbatim (§4.5, Scenario S2).
pub fn normalize_sector_code(naics6: &str) -> NaicsSector {
    let digits: String = naics6.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 2 {
        return NaicsSector::Unknown;
    }
    let prefix = &digits[0..2];
    match prefix {
        "11" => NaicsSector::Sector11,
        "21" => NaicsSector::Sector21,
        "22" => NaicsSector::Sector22,
        "23" => NaicsSector::Sector23,
        "31" | "32" | "33" => NaicsSector::Sector3133,
        "42" => NaicsSector::Sector42,
        "44" | "45" => NaicsSector::Sector4445,
        "48" | "49" => NaicsSector::Sector4849,
        "51" => NaicsSector::Sector51,
        "52" => NaicsSector::Sector52,
        "53" => NaicsSector::Sector53,
        "54" => NaicsSector::Sector54,
        "55" => NaicsSector::Sector55,
        "56" => NaicsSector::Sector56,
        "61" => NaicsSector::Sector61,
        "62" => NaicsSector::Sector62,
        "71" => NaicsSector::Sector71,
        "72" => NaicsSector::Sector72,
        "81" => NaicsSector::Sector81,
        "92" => NaicsSector::Sector92,
        "99" => NaicsSector::Sector99,
        other => NaicsSector::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario S2.
    #[test]
    fn scenario_s2_sector_grouping() {
        assert_eq!(normalize_sector_code("336111").code(), "31-33");
        assert_eq!(normalize_sector_code("441110").code(), "44-45");
        assert_eq!(normalize_sector_code("484121").code(), "48-49");
        let gov = normalize_sector_code("999999");
        assert_eq!(gov.code(), "99");
        assert_eq!(gov.title(), "Government and Special Designation Sectors");
    }

    #[test]
    fn unknown_prefix_retained() {
        assert_eq!(normalize_sector_code("000000").code(), "00");
    }

    #[test]
    fn invalid_code_is_unknown() {
        assert_eq!(normalize_sector_code(""), NaicsSector::Unknown);
    }
}
