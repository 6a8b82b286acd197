//! Industry/Sector Aggregator (§4.6): employment-weighted roll-up of
//! occupation exposure into annual industry and sector series, plus growth
//! statistics over the resulting time series.

use crate::growth;
use crate::model::sector::normalize_sector_code;
use crate::model::{EmploymentRecord, NaicsSector};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct IndustryYear {
    pub year: u32,
    /// The employment table's industry code (6-digit NAICS).
    pub naics: String,
    pub naics_title: String,
    pub sector: NaicsSector,
    pub total_emp: f64,
    pub exposed_emp: f64,
    pub matched_emp: f64,
    pub industry_exposure: f64,
    pub match_rate: f64,
}

#[derive(Debug, Clone)]
pub struct SectorYear {
    pub year: u32,
    pub sector: NaicsSector,
    pub total_emp: f64,
    pub exposed_emp: f64,
    pub matched_emp: f64,
    pub industry_exposure: f64,
    pub match_rate: f64,
}

#[derive(Debug, Clone)]
pub struct GrowthRow {
    pub key: String,
    pub year0: u32,
    pub year1: u32,
    pub value0: f64,
    pub value1: f64,
    pub abs_change: f64,
    pub pct_change: f64,
    pub cagr: f64,
    pub yoy: f64,
}

/// Roll employment + occupation exposure up to (year, naics6) industry rows.
pub fn aggregate_industry(
    employment: &[EmploymentRecord],
    exposure: &HashMap<String, f64>,
) -> Vec<IndustryYear> {
    struct Acc {
        naics_title: String,
        total_emp: f64,
        exposed_emp: f64,
        matched_emp: f64,
    }

    let mut by_key: HashMap<(u32, String), Acc> = HashMap::new();
    for row in employment {
        if row.naics6.is_empty() || row.total_emp <= 0.0 {
            continue;
        }
        let e_occ = exposure.get(&row.soc_code).copied().unwrap_or(0.0);
        let key = (row.year, row.naics6.clone());
        let acc = by_key.entry(key).or_insert_with(|| Acc {
            naics_title: row.naics_title.clone(),
            total_emp: 0.0,
            exposed_emp: 0.0,
            matched_emp: 0.0,
        });
        acc.total_emp += row.total_emp;
        acc.exposed_emp += row.total_emp * e_occ;
        if exposure.contains_key(&row.soc_code) && e_occ > 0.0 {
            acc.matched_emp += row.total_emp;
        }
    }

    let mut out: Vec<IndustryYear> = by_key
        .into_iter()
        .map(|((year, naics), acc)| {
            let sector_code = normalize_sector_code(&naics);
            IndustryYear {
                year,
                industry_exposure: if acc.total_emp > 0.0 { acc.exposed_emp / acc.total_emp } else { 0.0 },
                match_rate: if acc.total_emp > 0.0 { acc.matched_emp / acc.total_emp } else { 0.0 },
                naics_title: acc.naics_title,
                sector: sector_code,
                total_emp: acc.total_emp,
                exposed_emp: acc.exposed_emp,
                matched_emp: acc.matched_emp,
                naics,
            }
        })
        .collect();

    out.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.naics.cmp(&b.naics)));
    out
}

/// Roll the national-occupation vintages (employment rows carrying no
/// NAICS code, i.e. `load_national_occupation`'s output) up into a single
/// national exposure series, independent of the industry-by-occupation
/// roll-up above — grounded in `read_year_national_occupation`'s own
/// groupby, which is a separate series from the industry/sector one.
pub fn aggregate_national(employment: &[EmploymentRecord], exposure: &HashMap<String, f64>) -> Vec<(u32, f64)> {
    let mut by_year: HashMap<u32, (f64, f64)> = HashMap::new();
    for row in employment {
        if !row.naics6.is_empty() || row.total_emp <= 0.0 {
            continue;
        }
        let e_occ = exposure.get(&row.soc_code).copied().unwrap_or(0.0);
        let entry = by_year.entry(row.year).or_insert((0.0, 0.0));
        entry.0 += row.total_emp * e_occ;
        entry.1 += row.total_emp;
    }
    let mut series: Vec<(u32, f64)> = by_year
        .into_iter()
        .map(|(year, (exposed, total))| (year, if total > 0.0 { exposed / total } else { 0.0 }))
        .collect();
    series.sort_by_key(|(y, _)| *y);
    series
}

pub fn aggregate_sector(industry: &[IndustryYear]) -> Vec<SectorYear> {
    struct Acc {
        total_emp: f64,
        exposed_emp: f64,
        matched_emp: f64,
    }
    let mut by_key: HashMap<(u32, NaicsSector), Acc> = HashMap::new();
    for row in industry {
        let acc = by_key.entry((row.year, row.sector.clone())).or_insert(Acc {
            total_emp: 0.0,
            exposed_emp: 0.0,
            matched_emp: 0.0,
        });
        acc.total_emp += row.total_emp;
        acc.exposed_emp += row.exposed_emp;
        acc.matched_emp += row.matched_emp;
    }
    let mut out: Vec<SectorYear> = by_key
        .into_iter()
        .map(|((year, sector), acc)| SectorYear {
            year,
            industry_exposure: if acc.total_emp > 0.0 { acc.exposed_emp / acc.total_emp } else { 0.0 },
            match_rate: if acc.total_emp > 0.0 { acc.matched_emp / acc.total_emp } else { 0.0 },
            sector,
            total_emp: acc.total_emp,
            exposed_emp: acc.exposed_emp,
            matched_emp: acc.matched_emp,
        })
        .collect();
    out.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.sector.cmp(&b.sector)));
    out
}

/// One full-period row (baseline `year0`/`value0` against the final
/// `year1`/`value1`: absolute change, percent change, CAGR) plus a
/// separate prior-year YoY figure taken from the last two years alone —
/// mirrors `add_growth()`'s `_chg_`/`_pct_`/`_cagr_` columns (computed
/// against `years[0]`/`years[-1]`) and its distinct `_yoy_` column
/// (computed against `years[-2]`/`years[-1]`). `series` must be sorted
/// ascending by year and have at least two points; the YoY figure is
/// `NaN` when fewer than two distinct years are available to difference.
pub fn compute_growth(key: &str, series: &[(u32, f64)]) -> Vec<GrowthRow> {
    if series.len() < 2 {
        return Vec::new();
    }
    let (year0, value0) = series[0];
    let (year1, value1) = series[series.len() - 1];
    let (prev_year, prev_value) = series[series.len() - 2];
    let yoy = if prev_year != year1 { growth::yoy(prev_value, value1) } else { f64::NAN };

    vec![GrowthRow {
        key: key.to_string(),
        year0,
        year1,
        value0,
        value1,
        abs_change: growth::abs_change(value0, value1),
        pct_change: growth::pct_change(value0, value1),
        cagr: growth::cagr(value0, value1, (year1 - year0) as f64),
        yoy,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_industry_rows_into_a_sector_total() {
        let employment = vec![
            EmploymentRecord {
                year: 2024,
                naics6: "336111".into(),
                naics_title: "Automobile Manufacturing".into(),
                soc_code: "51-2011".into(),
                occupation_title: "Aircraft Structure Assemblers".into(),
                total_emp: 1000.0,
            },
            EmploymentRecord {
                year: 2024,
                naics6: "336112".into(),
                naics_title: "Light Truck Manufacturing".into(),
                soc_code: "51-2011".into(),
                occupation_title: "Aircraft Structure Assemblers".into(),
                total_emp: 500.0,
            },
        ];
        let mut exposure = HashMap::new();
        exposure.insert("51-2011".to_string(), 0.4);

        let industry = aggregate_industry(&employment, &exposure);
        assert_eq!(industry.len(), 2);
        let sector = aggregate_sector(&industry);
        assert_eq!(sector.len(), 1);
        assert_eq!(sector[0].sector.code(), "31-33");
        assert!((sector[0].total_emp - 1500.0).abs() < 1e-9);
        assert!((sector[0].industry_exposure - 0.4).abs() < 1e-9);
    }

    #[test]
    fn growth_rows_carry_yoy_and_baseline_cagr() {
        let series = vec![(2019, 0.20), (2024, 0.25)];
        let rows = compute_growth("national", &series);
        assert_eq!(rows.len(), 1);
        assert!((rows[0].cagr - 0.04564).abs() < 1e-4);
    }

    #[test]
    fn compute_growth_emits_one_row_with_distinct_yoy_from_full_period_cagr() {
        let series = vec![(2019, 0.20), (2022, 0.22), (2023, 0.23), (2024, 0.30)];
        let rows = compute_growth("national", &series);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert!((row.abs_change - 0.10).abs() < 1e-9);
        assert!((row.pct_change - 0.5).abs() < 1e-9);
        // YoY (2023 -> 2024) differs from the full-period figures above.
        assert!((row.yoy - (0.30 / 0.23 - 1.0)).abs() < 1e-9);
        assert!((row.yoy - row.pct_change).abs() > 1e-6);
    }

    #[test]
    fn aggregate_national_groups_by_year_ignoring_industry_rows() {
        let employment = vec![
            EmploymentRecord {
                year: 2024,
                naics6: String::new(),
                naics_title: String::new(),
                soc_code: "15-1252".into(),
                occupation_title: "Software Developers".into(),
                total_emp: 1000.0,
            },
            EmploymentRecord {
                year: 2024,
                naics6: "541511".into(),
                naics_title: "Custom Computer Programming Services".into(),
                soc_code: "15-1252".into(),
                occupation_title: "Software Developers".into(),
                total_emp: 9999.0,
            },
        ];
        let mut exposure = HashMap::new();
        exposure.insert("15-1252".to_string(), 0.5);
        let series = aggregate_national(&employment, &exposure);
        assert_eq!(series, vec![(2024, 0.5)]);
    }
}
