//! Output writers (§6, §7 "each table or report as a single file"). Every
//! table is written as one reproducible CSV with a stable row order; the
//! two summary documents are JSON.

use anyhow::{Context, Result};
use risk_core::PipelineOutput;
use std::path::Path;

/// `serde_json` rejects non-finite floats; render NaN/∞ as JSON `null`
/// rather than let `to_string_pretty` fail outright (§9 REDESIGN FLAG's NaN
/// boundary rule applied at the JSON-summary seam).
fn json_f64(v: f64) -> serde_json::Value {
    if v.is_finite() {
        serde_json::json!(v)
    } else {
        serde_json::Value::Null
    }
}

fn writer(dir: &Path, name: &str) -> Result<csv::Writer<std::fs::File>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating output dir {}", dir.display()))?;
    let path = dir.join(name);
    csv::Writer::from_path(&path).with_context(|| format!("opening {}", path.display()))
}

/// Write every intermediate CSV table and the two JSON summaries named in
/// §6, returning the output directory for the caller to print.
pub fn write_all(dir: &Path, output: &PipelineOutput) -> Result<()> {
    {
        let mut w = writer(dir, "occupation_exposure.csv")?;
        w.write_record(["soc_code", "title", "exposure_lenient", "exposure_strict"])?;
        let mut rows = output.occupation_exposure.clone();
        rows.sort_by(|a, b| a.soc_code.cmp(&b.soc_code));
        for r in &rows {
            w.write_record([
                r.soc_code.clone(),
                r.title.clone(),
                format!("{:.6}", r.exposure_lenient),
                r.exposure_strict.map(|v| format!("{v:.6}")).unwrap_or_default(),
            ])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "industry_years.csv")?;
        w.write_record([
            "year", "naics", "naics_title", "sector", "total_emp", "exposed_emp", "matched_emp",
            "industry_exposure", "match_rate",
        ])?;
        let mut rows = output.industry_years.clone();
        rows.sort_by(|a, b| (a.year, &a.naics).cmp(&(b.year, &b.naics)));
        for r in &rows {
            w.write_record([
                r.year.to_string(),
                r.naics.clone(),
                r.naics_title.clone(),
                r.sector.code(),
                format!("{:.2}", r.total_emp),
                format!("{:.4}", r.exposed_emp),
                format!("{:.2}", r.matched_emp),
                format!("{:.6}", r.industry_exposure),
                format!("{:.6}", r.match_rate),
            ])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "sector_years.csv")?;
        w.write_record([
            "year", "sector", "total_emp", "exposed_emp", "matched_emp", "industry_exposure", "match_rate",
        ])?;
        let mut rows = output.sector_years.clone();
        rows.sort_by(|a, b| (a.year, a.sector.code()).cmp(&(b.year, b.sector.code())));
        for r in &rows {
            w.write_record([
                r.year.to_string(),
                r.sector.code(),
                format!("{:.2}", r.total_emp),
                format!("{:.4}", r.exposed_emp),
                format!("{:.2}", r.matched_emp),
                format!("{:.6}", r.industry_exposure),
                format!("{:.6}", r.match_rate),
            ])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "national_exposure_growth.csv")?;
        w.write_record(["key", "year0", "year1", "value0", "value1", "abs_change", "pct_change", "cagr", "yoy"])?;
        let mut rows = output.national_exposure_growth.clone();
        rows.sort_by_key(|r| r.year1);
        for r in &rows {
            w.write_record([
                r.key.clone(),
                r.year0.to_string(),
                r.year1.to_string(),
                format!("{:.6}", r.value0),
                format!("{:.6}", r.value1),
                format!("{:.6}", r.abs_change),
                format!("{:.6}", r.pct_change),
                format!("{:.6}", r.cagr),
                format!("{:.6}", r.yoy),
            ])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "benchmark_totals.csv")?;
        w.write_record(["model_id", "win_rate", "win_or_tie_rate"])?;
        let mut rows = output.benchmark.totals.clone();
        rows.sort_by(|a, b| a.model_id.cmp(&b.model_id));
        for r in &rows {
            w.write_record([r.model_id.clone(), format!("{:.6}", r.win_rate), format!("{:.6}", r.win_or_tie_rate)])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "benchmark_by_sector.csv")?;
        w.write_record(["model_id", "sector", "win_rate", "win_or_tie_rate"])?;
        let mut rows = output.benchmark.by_sector.clone();
        rows.sort_by(|a, b| (a.model_id.clone(), a.sector.clone()).cmp(&(b.model_id.clone(), b.sector.clone())));
        for r in &rows {
            w.write_record([
                r.model_id.clone(),
                r.sector.clone(),
                format!("{:.6}", r.win_rate),
                format!("{:.6}", r.win_or_tie_rate),
            ])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "benchmark_by_occupation.csv")?;
        w.write_record(["model_id", "sector", "occupation", "win_rate", "win_or_tie_rate"])?;
        let mut rows = output.benchmark.by_occupation.clone();
        rows.sort_by(|a, b| {
            (a.model_id.clone(), a.sector.clone(), a.occupation.clone())
                .cmp(&(b.model_id.clone(), b.sector.clone(), b.occupation.clone()))
        });
        for r in &rows {
            w.write_record([
                r.model_id.clone(),
                r.sector.clone(),
                r.occupation.clone(),
                format!("{:.6}", r.win_rate),
                format!("{:.6}", r.win_or_tie_rate),
            ])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "name_mapping.csv")?;
        w.write_record(["benchmark_occupation", "soc_codes", "method", "similarity"])?;
        let mut rows = output.name_mapping.clone();
        rows.sort_by(|a, b| a.benchmark_occupation.cmp(&b.benchmark_occupation));
        for r in &rows {
            w.write_record([
                r.benchmark_occupation.clone(),
                r.soc_codes.join("|"),
                format!("{:?}", r.method),
                format!("{:.6}", r.similarity),
            ])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "task_alignment.csv")?;
        w.write_record(["soc_code", "aligned_exposure", "alignment_topk"])?;
        let mut rows = output.task_alignment.clone();
        rows.sort_by(|a, b| a.soc_code.cmp(&b.soc_code));
        for r in &rows {
            w.write_record([r.soc_code.clone(), format!("{:.6}", r.aligned_exposure), r.alignment_topk.to_string()])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "occupation_win_probabilities.csv")?;
        w.write_record(["model_id", "soc_code", "p_occ", "method"])?;
        let mut rows = output.occupation_win_probabilities.clone();
        rows.sort_by(|a, b| (a.model_id.clone(), a.soc_code.clone()).cmp(&(b.model_id.clone(), b.soc_code.clone())));
        for r in &rows {
            w.write_record([r.model_id.clone(), r.soc_code.clone(), format!("{:.6}", r.p_occ), r.method.to_string()])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "occupation_risk.csv")?;
        w.write_record(["model_id", "soc_code", "e_adj", "p_occ", "risk_occ"])?;
        let mut rows = output.occupation_risk.clone();
        rows.sort_by(|a, b| (a.model_id.clone(), a.soc_code.clone()).cmp(&(b.model_id.clone(), b.soc_code.clone())));
        for r in &rows {
            w.write_record([
                r.model_id.clone(),
                r.soc_code.clone(),
                format!("{:.6}", r.e_adj),
                format!("{:.6}", r.p_occ),
                format!("{:.6}", r.risk_occ),
            ])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "sector_risk.csv")?;
        w.write_record([
            "model_id", "sector", "total_emp", "exposure_emp", "affected_emp", "risk_sector", "effective_win",
            "emp_share", "contribution_to_national",
        ])?;
        let mut rows = output.sector_risk.clone();
        rows.sort_by(|a, b| (a.model_id.clone(), a.sector.code()).cmp(&(b.model_id.clone(), b.sector.code())));
        for r in &rows {
            w.write_record([
                r.model_id.clone(),
                r.sector.code(),
                format!("{:.2}", r.total_emp),
                format!("{:.4}", r.exposure_emp),
                format!("{:.4}", r.affected_emp),
                format!("{:.6}", r.risk_sector),
                format!("{:.6}", r.effective_win),
                format!("{:.6}", r.emp_share),
                format!("{:.6}", r.contribution_to_national),
            ])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "national_risk.csv")?;
        w.write_record(["model_id", "risk_nat", "exposure_nat"])?;
        let mut rows = output.national_risk.clone();
        rows.sort_by(|a, b| b.risk_nat.partial_cmp(&a.risk_nat).unwrap_or(std::cmp::Ordering::Equal));
        for r in &rows {
            w.write_record([r.model_id.clone(), format!("{:.6}", r.risk_nat), format!("{:.6}", r.exposure_nat)])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "monthly_risk_series.csv")?;
        w.write_record(["month", "exposure_hat", "frontier_win_rate", "risk_raw", "risk_anchored", "delta_pp"])?;
        for r in &output.monthly_risk_series {
            w.write_record([
                r.month.to_string(),
                format!("{:.6}", r.exposure_hat),
                format!("{:.6}", r.frontier_win_rate),
                format!("{:.6}", r.risk_raw),
                format!("{:.6}", r.risk_anchored),
                format!("{:.6}", r.delta_pp),
            ])?;
        }
        w.flush()?;
    }

    {
        let mut w = writer(dir, "sector_growth_projection.csv")?;
        w.write_record(["model_id", "sector", "current_month_abs_increment_pp", "historical_avg_abs_increment_pp"])?;
        let mut rows = output.sector_projections.clone();
        rows.sort_by(|a, b| (a.model_id.clone(), a.sector.code()).cmp(&(b.model_id.clone(), b.sector.code())));
        for r in &rows {
            w.write_record([
                r.model_id.clone(),
                r.sector.code(),
                format!("{:.6}", r.current_month_abs_increment_pp),
                format!("{:.6}", r.historical_avg_abs_increment_pp),
            ])?;
        }
        w.flush()?;
    }

    let best = risk_core::engine::risk_composer::best_model(&output.national_risk);
    let method_summary = serde_json::json!({
        "n_occupations": output.occupation_exposure.len(),
        "n_models": output.national_risk.len(),
        "best_model": best.map(|b| &b.model_id),
        "best_national_risk": best.map(|b| b.risk_nat),
    });
    std::fs::write(dir.join("method_summary.json"), serde_json::to_string_pretty(&method_summary)?)
        .with_context(|| "writing method_summary.json")?;

    let last = output.monthly_risk_series.last();
    let first = output.monthly_risk_series.first();
    let growth_summary = serde_json::json!({
        "n_months": output.monthly_risk_series.len(),
        "first_month": first.map(|p| p.month),
        "last_month": last.map(|p| p.month),
        "last_risk": last.map(|p| p.risk_anchored),
        "mean_pp_per_month": json_f64(output.absolute_growth.mean_pp_per_month),
        "median_pp_per_month": json_f64(output.absolute_growth.median_pp_per_month),
        "ols_pp_per_month": json_f64(output.absolute_growth.ols_pp_per_month),
        "theil_sen_pp_per_month": json_f64(output.absolute_growth.theil_sen_pp_per_month),
        "decomposition_check": json_f64(output.decomposition_check),
    });
    std::fs::write(dir.join("monthly_growth_summary.json"), serde_json::to_string_pretty(&growth_summary)?)
        .with_context(|| "writing monthly_growth_summary.json")?;

    Ok(())
}
