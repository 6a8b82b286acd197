//! Top-level orchestrator (§9 REDESIGN FLAG: "monkeypatching-style
//! shared-by-import modules" replaced with explicit pipeline stages
//! composed here, each reusing the stage modules as stateless utilities).

use crate::config::PipelineConfig;
use crate::engine::{
    benchmark_parser, capability_transfer, industry_aggregator, occupation_exposure,
    risk_composer, task_alignment, task_ratings, task_tool_mapper, temporal_growth, tool_corpus,
};
use crate::error::PipelineError;
use crate::model::{EmploymentRecord, NaicsSector, Occupation};
use std::collections::HashMap;

pub struct PipelineInputs {
    pub raw_tools: Vec<tool_corpus::RawToolRow>,
    pub raw_task_rows: Vec<task_ratings::RawTaskRow>,
    pub raw_rating_rows: Vec<task_ratings::RawRatingRow>,
    pub occupations: Vec<Occupation>,
    pub employment: Vec<EmploymentRecord>,
    pub benchmark_blob: String,
    pub gold_prompts: Vec<task_alignment::GoldPrompt>,
}

pub struct PipelineOutput {
    pub occupation_exposure: Vec<occupation_exposure::OccupationExposure>,
    pub industry_years: Vec<industry_aggregator::IndustryYear>,
    pub sector_years: Vec<industry_aggregator::SectorYear>,
    pub national_exposure_growth: Vec<industry_aggregator::GrowthRow>,
    pub benchmark: benchmark_parser::ParsedBenchmark,
    pub name_mapping: Vec<capability_transfer::NameMappingRow>,
    pub task_alignment: Vec<task_alignment::TaskAlignmentRow>,
    pub occupation_win_probabilities: Vec<capability_transfer::OccupationWinProbability>,
    pub occupation_risk: Vec<risk_composer::OccupationRisk>,
    pub sector_risk: Vec<risk_composer::SectorRisk>,
    pub national_risk: Vec<risk_composer::NationalRisk>,
    pub monthly_risk_series: Vec<temporal_growth::MonthlyRiskPoint>,
    pub absolute_growth: temporal_growth::AbsoluteGrowthEstimate,
    pub decomposition_check: f64,
    pub sector_projections: Vec<temporal_growth::SectorProjectionRow>,
}

pub fn run(inputs: PipelineInputs, config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    let tools = tool_corpus::build(inputs.raw_tools);
    if tools.is_empty() {
        return Err(PipelineError::MissingInput("tool corpus".to_string()));
    }

    let tasks = task_ratings::build(&inputs.raw_task_rows, &inputs.raw_rating_rows);
    if tasks.is_empty() {
        return Err(PipelineError::MissingInput("task taxonomy".to_string()));
    }

    let lenient_scores = task_tool_mapper::map_lenient(&tasks, &tools);
    let strict_scores = task_tool_mapper::map_strict(&tasks, &tools);
    let task_scores = task_tool_mapper::combine(lenient_scores, &strict_scores);

    let occupation_exposure_rows = occupation_exposure::aggregate(&tasks, &task_scores, &inputs.occupations);
    let baseline_exposure: HashMap<String, f64> = occupation_exposure_rows
        .iter()
        .map(|r| (r.soc_code.clone(), r.exposure_lenient))
        .collect();

    let industry_years = industry_aggregator::aggregate_industry(&inputs.employment, &baseline_exposure);
    let sector_years = industry_aggregator::aggregate_sector(&industry_years);

    // Built from the national-occupation vintages, not the industry-by-
    // occupation sheet — mirrors `read_year_national_occupation` rolling
    // up into its own series independent of `industry_ts`/`sector_ts`.
    let national_series = industry_aggregator::aggregate_national(&inputs.employment, &baseline_exposure);
    let national_exposure_growth = industry_aggregator::compute_growth("national_exposure", &national_series);

    let benchmark = benchmark_parser::parse(&inputs.benchmark_blob)?;
    let totals = benchmark_parser::drop_human(benchmark.totals.clone());

    let taxonomy: Vec<(String, String)> = inputs
        .occupations
        .iter()
        .map(|o| (o.soc_code.clone(), o.title.clone()))
        .collect();
    let benchmark_occupations: Vec<String> = {
        let mut seen = std::collections::HashSet::new();
        benchmark
            .by_occupation
            .iter()
            .filter(|r| seen.insert(r.occupation.clone()))
            .map(|r| r.occupation.clone())
            .collect()
    };
    let name_mapping = capability_transfer::map_names(&benchmark_occupations, &taxonomy, config.name_match_cutoff);

    let occupation_corpus = capability_transfer::build_occupation_corpus(&inputs.occupations, &tasks);

    let mut occupation_win_probabilities = Vec::new();
    for model in &totals {
        occupation_win_probabilities.extend(capability_transfer::transfer_win_rates(
            &model.model_id,
            model.win_rate,
            &benchmark.by_occupation,
            &name_mapping,
            &occupation_corpus,
            config.sim_k_neighbors,
        ));
    }

    let lenient_score_by_key: HashMap<(String, String), f64> = task_scores
        .iter()
        .map(|s| ((s.soc_code.clone(), s.task_id.clone()), s.lenient_score))
        .collect();
    let aligned = task_alignment::align(
        &inputs.gold_prompts,
        &name_mapping,
        &tasks,
        &lenient_score_by_key,
        config.align_topk,
    );
    let adjusted_exposure = task_alignment::adjusted_exposure(&baseline_exposure, &aligned);

    let occupation_risk = risk_composer::occupation_risk(&adjusted_exposure, &occupation_win_probabilities);

    let latest_industry_year = inputs
        .employment
        .iter()
        .filter(|r| !r.naics6.is_empty())
        .map(|r| r.year)
        .max()
        .ok_or_else(|| PipelineError::MissingInput("industry employment".to_string()))?;

    let mut sector_risk = Vec::new();
    let mut national_risk = Vec::new();
    for model in &totals {
        let (sectors, national) =
            risk_composer::aggregate(&model.model_id, &occupation_risk, &inputs.employment, latest_industry_year);
        sector_risk.extend(sectors);
        national_risk.push(national);
    }

    let best = risk_composer::best_model(&national_risk)
        .ok_or_else(|| PipelineError::MissingInput("national risk (no models)".to_string()))?;

    let releases = temporal_growth::model_releases();
    let release_dates: HashMap<&str, chrono::NaiveDate> =
        releases.iter().map(|r| (r.model_id, r.release_date)).collect();
    let missing: Vec<String> = totals
        .iter()
        .filter(|m| !release_dates.contains_key(m.model_id.as_str()))
        .map(|m| m.model_id.clone())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::ModelReleaseMissing(missing));
    }

    let release_points: Vec<(chrono::NaiveDate, f64)> = totals
        .iter()
        .filter_map(|m| release_dates.get(m.model_id.as_str()).map(|d| (*d, m.win_rate)))
        .collect();
    let frontier = temporal_growth::capability_frontier(&release_points);

    let exposure_series_months: Vec<(f64, f64)> = {
        let base_year = national_series.first().map(|(y, _)| *y).unwrap_or(2019);
        national_series
            .iter()
            .map(|(year, value)| (12.0 * (*year as f64 - base_year as f64), *value))
            .collect()
    };
    let exposure_x: Vec<f64> = exposure_series_months.iter().map(|(m, _)| *m).collect();
    let exposure_y: Vec<f64> = exposure_series_months.iter().map(|(_, v)| *v).collect();
    let (exposure_alpha, exposure_beta) = crate::growth::log_linear_slope(&exposure_x, &exposure_y);
    let exposure_base_year = national_series.first().map(|(y, _)| *y).unwrap_or(2019);
    let exposure_base_month = chrono::NaiveDate::from_ymd_opt(exposure_base_year as i32, 1, 1).unwrap();

    let monthly_risk_series = temporal_growth::monthly_series(
        &frontier,
        exposure_base_month,
        exposure_alpha,
        exposure_beta,
        best.risk_nat,
    );

    let absolute_growth = temporal_growth::estimate_absolute_growth(&monthly_risk_series);

    // g_exp/g_cap/g_risk feed the decomposition identity check (Testable
    // Property 10): the exposure trend's own monthly rate, the frontier's
    // monthly log-linear rate, and the anchored risk series' monthly rate.
    let g_exp = exposure_beta.exp() - 1.0;
    let capability_series_months: Vec<(f64, f64)> =
        frontier.iter().map(|&(date, rate)| (temporal_growth::months_between(exposure_base_month, date), rate)).collect();
    let g_cap = temporal_growth::estimate_growth(&capability_series_months).monthly_log_reg;
    let risk_series_months: Vec<(f64, f64)> = monthly_risk_series
        .iter()
        .map(|p| (temporal_growth::months_between(exposure_base_month, p.month), p.risk_anchored))
        .collect();
    let g_risk = temporal_growth::estimate_growth(&risk_series_months).monthly_log_reg;
    let decomposition_check = temporal_growth::decomposition_identity(g_exp, g_cap, g_risk);

    let sector_exposure_growth: HashMap<NaicsSector, f64> = {
        let mut by_sector: HashMap<NaicsSector, Vec<(f64, f64)>> = HashMap::new();
        for row in &sector_years {
            let month = 12.0 * (row.year as f64 - exposure_base_year as f64);
            by_sector.entry(row.sector).or_default().push((month, row.industry_exposure));
        }
        by_sector
            .into_iter()
            .map(|(sector, series)| {
                let x: Vec<f64> = series.iter().map(|(m, _)| *m).collect();
                let y: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
                let (_, beta) = crate::growth::log_linear_slope(&x, &y);
                (sector, beta.exp() - 1.0)
            })
            .collect()
    };
    let months_of_history = monthly_risk_series.len().saturating_sub(1) as f64;
    let mut sector_projections = Vec::new();
    for model in &totals {
        let current: Vec<(NaicsSector, f64)> =
            sector_risk.iter().filter(|s| s.model_id == model.model_id).map(|s| (s.sector, s.risk_sector)).collect();
        sector_projections.extend(temporal_growth::project_sectors(
            &model.model_id,
            &current,
            &sector_exposure_growth,
            g_cap,
            months_of_history,
        ));
    }

    Ok(PipelineOutput {
        occupation_exposure: occupation_exposure_rows,
        industry_years,
        sector_years,
        national_exposure_growth,
        benchmark,
        name_mapping,
        task_alignment: aligned,
        occupation_win_probabilities,
        occupation_risk,
        sector_risk,
        national_risk,
        monthly_risk_series,
        absolute_growth,
        decomposition_check,
        sector_projections,
    })
}
