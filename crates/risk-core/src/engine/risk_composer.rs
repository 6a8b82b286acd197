//! Risk Composer (§4.10): multiplies adjusted exposure by per-occupation
//! capability probability, then rolls up through employment to sector and
//! national risk.

use crate::engine::capability_transfer::OccupationWinProbability;
use crate::model::sector::normalize_sector_code;
use crate::model::{EmploymentRecord, NaicsSector};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct OccupationRisk {
    pub model_id: String,
    pub soc_code: String,
    pub e_adj: f64,
    pub p_occ: f64,
    pub risk_occ: f64,
}

#[derive(Debug, Clone)]
pub struct SectorRisk {
    pub model_id: String,
    pub sector: NaicsSector,
    pub total_emp: f64,
    pub exposure_emp: f64,
    pub affected_emp: f64,
    pub risk_sector: f64,
    pub effective_win: f64,
    pub emp_share: f64,
    pub contribution_to_national: f64,
}

#[derive(Debug, Clone)]
pub struct NationalRisk {
    pub model_id: String,
    pub risk_nat: f64,
    pub exposure_nat: f64,
}

pub fn occupation_risk(
    adjusted_exposure: &HashMap<String, f64>,
    win_probabilities: &[OccupationWinProbability],
) -> Vec<OccupationRisk> {
    win_probabilities
        .iter()
        .map(|p| {
            let e_adj = adjusted_exposure.get(&p.soc_code).copied().unwrap_or(0.0);
            OccupationRisk {
                model_id: p.model_id.clone(),
                soc_code: p.soc_code.clone(),
                e_adj,
                p_occ: p.p_occ,
                risk_occ: (e_adj * p.p_occ).clamp(0.0, 1.0),
            }
        })
        .collect()
}

/// Roll occupation risk up to sector and national risk for one model, using
/// the single latest-year industry×occupation employment table (the
/// original hardcodes one year per run, e.g.
/// `base.resolve_in4_file(2024)`; `employment` here may span several
/// vintages, so the caller's `year` selects which one this call rolls up).
pub fn aggregate(
    model_id: &str,
    occupation_risk_rows: &[OccupationRisk],
    employment: &[EmploymentRecord],
    year: u32,
) -> (Vec<SectorRisk>, NationalRisk) {
    let e_adj: HashMap<&str, f64> = occupation_risk_rows
        .iter()
        .filter(|r| r.model_id == model_id)
        .map(|r| (r.soc_code.as_str(), r.e_adj))
        .collect();
    let risk_occ: HashMap<&str, f64> = occupation_risk_rows
        .iter()
        .filter(|r| r.model_id == model_id)
        .map(|r| (r.soc_code.as_str(), r.risk_occ))
        .collect();

    struct Acc {
        total_emp: f64,
        exposure_emp: f64,
        affected_emp: f64,
    }
    let mut by_sector: HashMap<NaicsSector, Acc> = HashMap::new();
    for row in employment {
        if row.year != year || row.naics6.is_empty() || row.total_emp <= 0.0 {
            continue;
        }
        let sector = normalize_sector_code(&row.naics6);
        let e = e_adj.get(row.soc_code.as_str()).copied().unwrap_or(0.0);
        let r = risk_occ.get(row.soc_code.as_str()).copied().unwrap_or(0.0);
        let acc = by_sector.entry(sector).or_insert(Acc { total_emp: 0.0, exposure_emp: 0.0, affected_emp: 0.0 });
        acc.total_emp += row.total_emp;
        acc.exposure_emp += row.total_emp * e;
        acc.affected_emp += row.total_emp * r;
    }

    let national_total_emp: f64 = by_sector.values().map(|a| a.total_emp).sum();
    let national_affected_emp: f64 = by_sector.values().map(|a| a.affected_emp).sum();
    let national_exposure_emp: f64 = by_sector.values().map(|a| a.exposure_emp).sum();

    let mut sectors: Vec<SectorRisk> = by_sector
        .into_iter()
        .map(|(sector, acc)| {
            let risk_sector = if acc.total_emp > 0.0 { acc.affected_emp / acc.total_emp } else { 0.0 };
            let effective_win = if acc.exposure_emp > 0.0 { acc.affected_emp / acc.exposure_emp } else { 0.0 };
            let emp_share = if national_total_emp > 0.0 { acc.total_emp / national_total_emp } else { 0.0 };
            SectorRisk {
                model_id: model_id.to_string(),
                sector,
                total_emp: acc.total_emp,
                exposure_emp: acc.exposure_emp,
                affected_emp: acc.affected_emp,
                risk_sector,
                effective_win,
                emp_share,
                contribution_to_national: emp_share * risk_sector,
            }
        })
        .collect();
    sectors.sort_by(|a, b| a.sector.cmp(&b.sector));

    let national = NationalRisk {
        model_id: model_id.to_string(),
        risk_nat: if national_total_emp > 0.0 { national_affected_emp / national_total_emp } else { 0.0 },
        exposure_nat: if national_total_emp > 0.0 { national_exposure_emp / national_total_emp } else { 0.0 },
    };

    (sectors, national)
}

pub fn best_model(national: &[NationalRisk]) -> Option<&NationalRisk> {
    national.iter().max_by(|a, b| a.risk_nat.partial_cmp(&b.risk_nat).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Testable property 6: sector contributions sum to national risk.
    #[test]
    fn sector_contributions_sum_to_national_risk() {
        let mut e_adj = HashMap::new();
        e_adj.insert("15-1252".to_string(), 0.5);
        e_adj.insert("29-1141".to_string(), 0.2);
        let win_probs = vec![
            OccupationWinProbability { model_id: "m1".into(), soc_code: "15-1252".into(), p_occ: 0.6, method: "anchor" },
            OccupationWinProbability { model_id: "m1".into(), soc_code: "29-1141".into(), p_occ: 0.3, method: "transfer" },
        ];
        let occ_risk = occupation_risk(&e_adj, &win_probs);

        let employment = vec![
            EmploymentRecord { year: 2024, naics6: "541511".into(), naics_title: "Computer Systems Design".into(), soc_code: "15-1252".into(), occupation_title: "Software Developers".into(), total_emp: 1000.0 },
            EmploymentRecord { year: 2024, naics6: "621111".into(), naics_title: "Physicians' Offices".into(), soc_code: "29-1141".into(), occupation_title: "Registered Nurses".into(), total_emp: 2000.0 },
        ];

        let (sectors, national) = aggregate("m1", &occ_risk, &employment, 2024);
        let contribution_sum: f64 = sectors.iter().map(|s| s.contribution_to_national).sum();
        assert!((contribution_sum - national.risk_nat).abs() < 1e-9);
    }
}
