//! Temporal Growth Engine (§4.11): fits monthly growth rates for exposure
//! and frontier capability, produces an anchored monthly risk series,
//! absolute/relative increments, a decomposition identity check, and
//! per-sector projections.

use crate::growth;
use crate::model::{ModelRelease, NaicsSector};
use chrono::NaiveDate;
use std::collections::HashMap;

/// The closed `MODEL_RELEASES` reference table (§9 REDESIGN FLAG): each
/// entry records the family, release date, citation, and the assumption
/// made when a vendor did not publish an exact date.
pub fn model_releases() -> Vec<ModelRelease> {
    let d = |y: i32, m: u32, day: u32| NaiveDate::from_ymd_opt(y, m, day).unwrap();
    vec![
        ModelRelease { model_id: "gpt-4o", family: "openai", release_date: d(2024, 5, 13), source_url: "https://openai.com/index/hello-gpt-4o/", assumption: "official announcement date" },
        ModelRelease { model_id: "o3-high", family: "openai", release_date: d(2025, 4, 16), source_url: "https://openai.com/index/introducing-o3-and-o4-mini/", assumption: "shared release date across reasoning-effort tiers" },
        ModelRelease { model_id: "o3-medium", family: "openai", release_date: d(2025, 4, 16), source_url: "https://openai.com/index/introducing-o3-and-o4-mini/", assumption: "shared release date across reasoning-effort tiers" },
        ModelRelease { model_id: "o3-low", family: "openai", release_date: d(2025, 4, 16), source_url: "https://openai.com/index/introducing-o3-and-o4-mini/", assumption: "shared release date across reasoning-effort tiers" },
        ModelRelease { model_id: "o4-mini-high", family: "openai", release_date: d(2025, 4, 16), source_url: "https://openai.com/index/introducing-o3-and-o4-mini/", assumption: "shared release date across reasoning-effort tiers" },
        ModelRelease { model_id: "gpt-5-high", family: "openai", release_date: d(2025, 8, 7), source_url: "https://openai.com/index/introducing-gpt-5/", assumption: "shared release date across reasoning-effort tiers" },
        ModelRelease { model_id: "gpt-5-medium", family: "openai", release_date: d(2025, 8, 7), source_url: "https://openai.com/index/introducing-gpt-5/", assumption: "shared release date across reasoning-effort tiers" },
        ModelRelease { model_id: "gpt-5-low", family: "openai", release_date: d(2025, 8, 7), source_url: "https://openai.com/index/introducing-gpt-5/", assumption: "shared release date across reasoning-effort tiers" },
        ModelRelease { model_id: "gpt-5r-high-engprompt", family: "openai", release_date: d(2025, 8, 7), source_url: "https://openai.com/index/introducing-gpt-5/", assumption: "same underlying model as gpt-5-high, alternate prompt template" },
        ModelRelease { model_id: "gpt-5p2-high", family: "openai", release_date: d(2025, 11, 13), source_url: "https://openai.com/index/gpt-5-2/", assumption: "official announcement date" },
        ModelRelease { model_id: "claude", family: "anthropic", release_date: d(2025, 8, 5), source_url: "https://www.anthropic.com/news/claude-opus-4-1", assumption: "Claude Opus 4.1 announcement date" },
        ModelRelease { model_id: "claude-sonnet-45", family: "anthropic", release_date: d(2025, 9, 29), source_url: "https://www.anthropic.com/news/claude-sonnet-4-5", assumption: "official announcement date" },
        ModelRelease { model_id: "claude-45", family: "anthropic", release_date: d(2025, 11, 24), source_url: "https://www.anthropic.com/news/claude-opus-4-5", assumption: "Claude Opus 4.5 announcement date" },
        ModelRelease { model_id: "gemini", family: "google", release_date: d(2025, 3, 25), source_url: "https://blog.google/technology/google-deepmind/gemini-model-thinking-updates-march-2025/", assumption: "Gemini 2.5 Pro preview date" },
        ModelRelease { model_id: "gemini-3", family: "google", release_date: d(2025, 11, 18), source_url: "https://blog.google/technology/ai/gemini-3/", assumption: "official announcement date" },
        ModelRelease { model_id: "grok", family: "xai", release_date: d(2025, 7, 9), source_url: "https://x.ai/news/grok-4", assumption: "Grok 4 announcement date" },
        ModelRelease { model_id: "grok-4-heavy", family: "xai", release_date: d(2025, 7, 9), source_url: "https://x.ai/news/grok-4", assumption: "shared release date with the base Grok 4 tier" },
    ]
}

#[derive(Debug, Clone, Copy)]
pub struct GrowthEstimate {
    pub monthly_cagr: f64,
    pub monthly_log_reg: f64,
    pub annualized_from_cagr: f64,
    pub annualized_from_log_reg: f64,
}

/// Fit both a CAGR and a log-linear OLS slope over a `(months_since_base,
/// value)` series (§4.11 step 1/2).
pub fn estimate_growth(series: &[(f64, f64)]) -> GrowthEstimate {
    if series.len() < 2 {
        return GrowthEstimate { monthly_cagr: f64::NAN, monthly_log_reg: f64::NAN, annualized_from_cagr: f64::NAN, annualized_from_log_reg: f64::NAN };
    }
    let (m0, v0) = series[0];
    let (m1, v1) = series[series.len() - 1];
    let months = m1 - m0;
    let monthly_cagr = if months > 0.0 { growth::cagr(v0, v1, months) } else { f64::NAN };

    let x: Vec<f64> = series.iter().map(|(m, _)| *m).collect();
    let y: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
    let (_, beta) = growth::log_linear_slope(&x, &y);
    let monthly_log_reg = beta.exp() - 1.0;

    GrowthEstimate {
        monthly_cagr,
        monthly_log_reg,
        annualized_from_cagr: (1.0 + monthly_cagr).powi(12) - 1.0,
        annualized_from_log_reg: (1.0 + monthly_log_reg).powi(12) - 1.0,
    }
}

/// Group release-dated win rates by date (max per date), then take the
/// cumulative maximum over time to produce the non-decreasing frontier
/// (§4.11 step 2, Scenario S5).
pub fn capability_frontier(releases: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    let mut by_date: std::collections::BTreeMap<NaiveDate, f64> = std::collections::BTreeMap::new();
    for &(date, rate) in releases {
        let entry = by_date.entry(date).or_insert(rate);
        if rate > *entry {
            *entry = rate;
        }
    }
    let mut running_max = f64::NEG_INFINITY;
    by_date
        .into_iter()
        .map(|(date, rate)| {
            running_max = running_max.max(rate);
            (date, running_max)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct MonthlyRiskPoint {
    pub month: NaiveDate,
    pub frontier_win_rate: f64,
    pub exposure_hat: f64,
    pub risk_raw: f64,
    pub risk_anchored: f64,
    pub delta_pp: f64,
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap()
}

pub(crate) fn months_between(base: NaiveDate, target: NaiveDate) -> f64 {
    let base = month_start(base);
    let target = month_start(target);
    ((target.year() - base.year()) * 12 + (target.month() as i32 - base.month() as i32)) as f64
}

use chrono::Datelike;

/// Build the monthly grid from the earliest to the latest release date,
/// carrying the last-known frontier value forward as a step function,
/// computing `risk_raw = exposure_hat * frontier`, then anchoring the
/// series so its last point equals `current_risk` (§4.11 step 3).
pub fn monthly_series(
    frontier: &[(NaiveDate, f64)],
    exposure_base_month: NaiveDate,
    exposure_alpha: f64,
    exposure_beta: f64,
    current_risk: f64,
) -> Vec<MonthlyRiskPoint> {
    if frontier.is_empty() {
        return Vec::new();
    }
    let min_month = month_start(frontier.first().unwrap().0);
    let max_month = month_start(frontier.last().unwrap().0);

    let mut months = Vec::new();
    let mut cursor = min_month;
    while cursor <= max_month {
        months.push(cursor);
        cursor = if cursor.month() == 12 {
            NaiveDate::from_ymd_opt(cursor.year() + 1, 1, 1).unwrap()
        } else {
            NaiveDate::from_ymd_opt(cursor.year(), cursor.month() + 1, 1).unwrap()
        };
    }

    let mut raw: Vec<(NaiveDate, f64, f64)> = Vec::with_capacity(months.len());
    let mut frontier_idx = 0;
    let mut carried = frontier[0].1;
    for &month in &months {
        while frontier_idx < frontier.len() && month_start(frontier[frontier_idx].0) <= month {
            carried = frontier[frontier_idx].1;
            frontier_idx += 1;
        }
        let m = months_between(exposure_base_month, month);
        let exposure_hat = (exposure_alpha + exposure_beta * m).exp();
        raw.push((month, carried, exposure_hat));
    }

    let last_risk_raw = raw.last().map(|(_, f, e)| f * e).unwrap_or(0.0);
    let scale = if last_risk_raw > 0.0 { current_risk / last_risk_raw } else { 1.0 };

    let mut points = Vec::with_capacity(raw.len());
    let mut prev_anchored: Option<f64> = None;
    for (month, frontier_rate, exposure_hat) in raw {
        let risk_raw = frontier_rate * exposure_hat;
        let risk_anchored = risk_raw * scale;
        let delta_pp = prev_anchored.map(|p| 100.0 * (risk_anchored - p)).unwrap_or(f64::NAN);
        points.push(MonthlyRiskPoint {
            month,
            frontier_win_rate: frontier_rate,
            exposure_hat,
            risk_raw,
            risk_anchored,
            delta_pp,
        });
        prev_anchored = Some(risk_anchored);
    }
    points
}

#[derive(Debug, Clone, Copy)]
pub struct AbsoluteGrowthEstimate {
    pub mean_pp_per_month: f64,
    pub median_pp_per_month: f64,
    pub ols_pp_per_month: f64,
    pub theil_sen_pp_per_month: f64,
}

/// Absolute monthly increment estimators on the anchored series (§4.11 step 4).
pub fn estimate_absolute_growth(points: &[MonthlyRiskPoint]) -> AbsoluteGrowthEstimate {
    let deltas: Vec<f64> = points.iter().filter_map(|p| (!p.delta_pp.is_nan()).then_some(p.delta_pp)).collect();
    let values: Vec<f64> = points.iter().map(|p| p.risk_anchored).collect();
    let x: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();

    AbsoluteGrowthEstimate {
        mean_pp_per_month: if deltas.is_empty() { f64::NAN } else { deltas.iter().sum::<f64>() / deltas.len() as f64 },
        median_pp_per_month: growth::median_diff(&values) * 100.0,
        ols_pp_per_month: growth::ols_slope(&x, &values) * 100.0,
        theil_sen_pp_per_month: growth::theil_sen_slope(&x, &values) * 100.0,
    }
}

/// `(1+g_exp)(1+g_cap) - 1` should approximate the combined monthly CAGR of
/// the anchored risk series (§4.11 step 5, Testable Property 10).
pub fn decomposition_identity(g_exp: f64, g_cap: f64, g_risk: f64) -> f64 {
    ((1.0 + g_exp) * (1.0 + g_cap) - 1.0) - g_risk
}

#[derive(Debug, Clone, Copy)]
pub struct SectorProjection {
    pub current_month_abs_increment_pp: f64,
    pub historical_avg_abs_increment_pp: f64,
}

/// Project a sector's current-month and historical-average absolute risk
/// increment from its own exposure growth combined with the global
/// capability growth rate (§4.11 step 6).
pub fn project_sector(current_sector_risk: f64, g_exposure_sector: f64, g_capability: f64, months_of_history: f64) -> SectorProjection {
    let g_risk_sector = (1.0 + g_exposure_sector) * (1.0 + g_capability) - 1.0;
    let current_month_abs_increment_pp = current_sector_risk * g_risk_sector * 100.0;
    let risk_at_start = current_sector_risk / (1.0 + g_risk_sector).powf(months_of_history);
    let historical_avg_abs_increment_pp = if months_of_history > 0.0 {
        (current_sector_risk - risk_at_start) / months_of_history * 100.0
    } else {
        f64::NAN
    };
    SectorProjection { current_month_abs_increment_pp, historical_avg_abs_increment_pp }
}

#[derive(Debug, Clone)]
pub struct SectorProjectionRow {
    pub model_id: String,
    pub sector: NaicsSector,
    pub current_month_abs_increment_pp: f64,
    pub historical_avg_abs_increment_pp: f64,
}

/// Apply `project_sector` across every sector one model's current risk
/// touches, pairing each sector's own exposure growth rate with the shared
/// capability growth rate (§4.11 step 6).
pub fn project_sectors(
    model_id: &str,
    sector_current_risk: &[(NaicsSector, f64)],
    sector_exposure_growth: &HashMap<NaicsSector, f64>,
    g_capability: f64,
    months_of_history: f64,
) -> Vec<SectorProjectionRow> {
    sector_current_risk
        .iter()
        .map(|&(sector, current_risk)| {
            let g_exposure = sector_exposure_growth.get(&sector).copied().unwrap_or(0.0);
            let projection = project_sector(current_risk, g_exposure, g_capability, months_of_history);
            SectorProjectionRow {
                model_id: model_id.to_string(),
                sector,
                current_month_abs_increment_pp: projection.current_month_abs_increment_pp,
                historical_avg_abs_increment_pp: projection.historical_avg_abs_increment_pp,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario S5.
    #[test]
    fn scenario_s5_frontier_monotonicity() {
        let releases = vec![
            (NaiveDate::from_ymd_opt(2024, 5, 13).unwrap(), 0.1),
            (NaiveDate::from_ymd_opt(2025, 4, 16).unwrap(), 0.05),
            (NaiveDate::from_ymd_opt(2025, 8, 7).unwrap(), 0.3),
        ];
        let frontier = capability_frontier(&releases);
        let values: Vec<f64> = frontier.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![0.1, 0.1, 0.3]);
        for w in values.windows(2) {
            assert!(w[1] >= w[0]);
        }
    }

    /// Scenario S6.
    #[test]
    fn scenario_s6_anchoring_matches_current_risk_exactly() {
        let frontier = vec![
            (NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), 0.1),
            (NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), 0.15),
        ];
        let points = monthly_series(&frontier, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), 0.0, 0.0, 0.2137);
        let last = points.last().unwrap();
        assert!((last.risk_anchored - 0.2137).abs() < 1e-12);
    }

    #[test]
    fn decomposition_identity_is_near_zero_for_consistent_rates() {
        let g_exp = 0.01;
        let g_cap = 0.02;
        let g_risk = (1.0 + g_exp) * (1.0 + g_cap) - 1.0;
        assert!(decomposition_identity(g_exp, g_cap, g_risk).abs() < 1e-12);
    }

    #[test]
    fn project_sectors_pairs_each_sector_with_its_own_exposure_growth() {
        let mut growth = HashMap::new();
        growth.insert(NaicsSector::Sector51, 0.01);
        growth.insert(NaicsSector::Sector62, 0.0);
        let current = vec![(NaicsSector::Sector51, 0.2), (NaicsSector::Sector62, 0.1)];
        let rows = project_sectors("m1", &current, &growth, 0.02, 12.0);
        assert_eq!(rows.len(), 2);
        let info = rows.iter().find(|r| r.sector == NaicsSector::Sector51).unwrap();
        let health = rows.iter().find(|r| r.sector == NaicsSector::Sector62).unwrap();
        assert!(info.current_month_abs_increment_pp > health.current_month_abs_increment_pp);
    }

    #[test]
    fn model_releases_table_has_a_date_for_every_declared_model() {
        let releases = model_releases();
        assert!(releases.len() >= 15);
        for r in &releases {
            assert!(!r.model_id.is_empty());
        }
    }
}
