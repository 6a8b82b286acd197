//! Task Alignment Engine (§4.9): aligns gold-benchmark task prompts to
//! taxonomy tasks within each mapped occupation's SOC set, then inverts to
//! an adjusted occupation exposure vector.

use crate::engine::capability_transfer::NameMappingRow;
use crate::model::Task;
use crate::text::{clean_text, cosine_similarity, TfidfVectorizer};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct GoldPrompt {
    pub task_id: String,
    pub sector: String,
    pub occupation: String,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct TaskAlignmentRow {
    pub soc_code: String,
    /// `NaN` when the mapped SOC set had no candidate taxonomy tasks
    /// (§7 `EmptyPartition`).
    pub aligned_exposure: f64,
    pub alignment_topk: usize,
}

const TASK_WEIGHT_FLOOR: f64 = 1e-9;

fn prompt_level_exposure(
    prompt_text: &str,
    candidates: &[&Task],
    lenient_scores: &HashMap<(String, String), f64>,
    topk: usize,
) -> (f64, usize) {
    if candidates.is_empty() {
        return (f64::NAN, 0);
    }

    let docs: Vec<String> = candidates.iter().map(|t| t.text_clean.clone()).collect();
    let vectorizer = TfidfVectorizer::fit(&docs, 1, 200_000);
    let candidate_vecs = vectorizer.transform(&docs);
    let prompt_vec = vectorizer.transform_one(&clean_text(prompt_text));

    let mut sims: Vec<(usize, f64)> = candidate_vecs
        .iter()
        .enumerate()
        .map(|(i, v)| (i, cosine_similarity(&prompt_vec, v)))
        .collect();
    sims.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    sims.truncate(topk);
    let used_topk = sims.len();

    let weighted: Vec<(f64, f64)> = sims
        .iter()
        .map(|(i, sim)| {
            let task = candidates[*i];
            let key = (task.soc_code.clone(), task.task_id.clone());
            let score = lenient_scores.get(&key).copied().unwrap_or(0.0);
            let weight = sim * task.task_weight.max(TASK_WEIGHT_FLOOR);
            (weight, score)
        })
        .collect();

    let numerator: f64 = weighted.iter().map(|(w, s)| w * s).sum();
    let denom: f64 = weighted.iter().map(|(w, _)| w).sum();

    if numerator > 0.0 && denom > 0.0 {
        return (numerator / denom, used_topk);
    }

    // Fall back to priors alone: drop the task_weight factor, keep similarity.
    let prior_denom: f64 = sims.iter().map(|(_, s)| *s).sum();
    if prior_denom > 0.0 {
        let prior_numer: f64 = sims
            .iter()
            .map(|(i, sim)| {
                let task = candidates[*i];
                let key = (task.soc_code.clone(), task.task_id.clone());
                sim * lenient_scores.get(&key).copied().unwrap_or(0.0)
            })
            .sum();
        return (prior_numer / prior_denom, used_topk);
    }

    // Still zero: fall back to a uniform average over the top-k candidates.
    let uniform: f64 = sims
        .iter()
        .map(|(i, _)| {
            let task = candidates[*i];
            let key = (task.soc_code.clone(), task.task_id.clone());
            lenient_scores.get(&key).copied().unwrap_or(0.0)
        })
        .sum::<f64>()
        / used_topk.max(1) as f64;
    (uniform, used_topk)
}

/// Run the full alignment for every benchmark occupation, producing one
/// `TaskAlignmentRow` per covered SOC (averaged when multiple benchmark
/// occupations map to the same SOC).
pub fn align(
    prompts: &[GoldPrompt],
    name_mapping: &[NameMappingRow],
    tasks: &[Task],
    lenient_scores: &HashMap<(String, String), f64>,
    topk: usize,
) -> Vec<TaskAlignmentRow> {
    let mut tasks_by_soc: HashMap<&str, Vec<&Task>> = HashMap::new();
    for t in tasks {
        tasks_by_soc.entry(t.soc_code.as_str()).or_default().push(t);
    }

    let soc_set_by_occupation: HashMap<&str, &[String]> = name_mapping
        .iter()
        .map(|row| (row.benchmark_occupation.as_str(), row.soc_codes.as_slice()))
        .collect();

    let mut prompts_by_occupation: HashMap<&str, Vec<&GoldPrompt>> = HashMap::new();
    for p in prompts {
        prompts_by_occupation.entry(p.occupation.as_str()).or_default().push(p);
    }

    let mut occupation_level: HashMap<&str, f64> = HashMap::new();
    let mut occupation_topk: HashMap<&str, usize> = HashMap::new();

    for (occupation, occ_prompts) in &prompts_by_occupation {
        let soc_set = match soc_set_by_occupation.get(occupation) {
            Some(s) => *s,
            None => continue,
        };
        let candidates: Vec<&Task> = soc_set
            .iter()
            .flat_map(|soc| tasks_by_soc.get(soc.as_str()).cloned().unwrap_or_default())
            .collect();

        let mut prompt_values = Vec::with_capacity(occ_prompts.len());
        let mut prompt_topks = Vec::with_capacity(occ_prompts.len());
        for p in occ_prompts {
            let (value, used_topk) = prompt_level_exposure(&p.prompt, &candidates, lenient_scores, topk);
            prompt_values.push(value);
            prompt_topks.push(used_topk);
        }

        let valid: Vec<f64> = prompt_values.iter().copied().filter(|v| !v.is_nan()).collect();
        let mean = if valid.is_empty() {
            f64::NAN
        } else {
            valid.iter().sum::<f64>() / valid.len() as f64
        };
        occupation_level.insert(occupation, mean);
        occupation_topk.insert(occupation, prompt_topks.into_iter().max().unwrap_or(0));
    }

    // Distribute occupation-level values to covered SOCs, averaging when
    // more than one benchmark occupation maps to the same SOC.
    let mut soc_values: HashMap<String, Vec<f64>> = HashMap::new();
    let mut soc_topk: HashMap<String, usize> = HashMap::new();
    for row in name_mapping {
        let Some(&value) = occupation_level.get(row.benchmark_occupation.as_str()) else {
            continue;
        };
        let topk_used = occupation_topk.get(row.benchmark_occupation.as_str()).copied().unwrap_or(0);
        for soc in &row.soc_codes {
            soc_values.entry(soc.clone()).or_default().push(value);
            soc_topk.entry(soc.clone()).or_insert(topk_used);
        }
    }

    let mut out: Vec<TaskAlignmentRow> = soc_values
        .into_iter()
        .map(|(soc, values)| {
            let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
            let aligned_exposure = if valid.is_empty() {
                f64::NAN
            } else {
                valid.iter().sum::<f64>() / valid.len() as f64
            };
            let alignment_topk = if aligned_exposure.is_nan() { 0 } else { soc_topk.get(&soc).copied().unwrap_or(0) };
            TaskAlignmentRow { soc_code: soc, aligned_exposure, alignment_topk }
        })
        .collect();
    out.sort_by(|a, b| a.soc_code.cmp(&b.soc_code));
    out
}

/// Replace baseline exposure with the aligned value for every SOC that has
/// one; SOCs with no aligned row keep their baseline (§4.9 step 5).
pub fn adjusted_exposure(baseline: &HashMap<String, f64>, aligned: &[TaskAlignmentRow]) -> HashMap<String, f64> {
    let mut adjusted = baseline.clone();
    for row in aligned {
        if !row.aligned_exposure.is_nan() {
            adjusted.insert(row.soc_code.clone(), row.aligned_exposure);
        }
    }
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::occupation::TaskType;

    fn task(soc: &str, id: &str, text: &str) -> Task {
        Task {
            soc_code: soc.into(),
            task_id: id.into(),
            text: text.into(),
            text_clean: clean_text(text),
            task_type: TaskType::Core,
            importance_norm: 1.0,
            prevalence: 1.0,
            task_weight: 1.0,
        }
    }

    #[test]
    fn empty_candidate_set_yields_nan_with_zero_topk() {
        let prompts = vec![GoldPrompt {
            task_id: "g1".into(),
            sector: "51".into(),
            occupation: "Ghost Occupation".into(),
            prompt: "do something".into(),
        }];
        let mapping = vec![NameMappingRow {
            benchmark_occupation: "Ghost Occupation".into(),
            soc_codes: vec!["99-9999".into()],
            method: crate::fuzzy::MatchMethod::Unmatched,
            similarity: 0.0,
        }];
        let tasks = vec![task("15-1252", "T1", "write reports")];
        let lenient = HashMap::from([(("15-1252".to_string(), "T1".to_string()), 0.5)]);
        let rows = align(&prompts, &mapping, &tasks, &lenient, 5);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].aligned_exposure.is_nan());
        assert_eq!(rows[0].alignment_topk, 0);
    }

    #[test]
    fn aligned_exposure_replaces_baseline_when_present() {
        let mut baseline = HashMap::new();
        baseline.insert("15-1252".to_string(), 0.1);
        baseline.insert("29-1141".to_string(), 0.2);
        let aligned = vec![TaskAlignmentRow {
            soc_code: "15-1252".to_string(),
            aligned_exposure: 0.8,
            alignment_topk: 3,
        }];
        let adjusted = adjusted_exposure(&baseline, &aligned);
        assert_eq!(adjusted["15-1252"], 0.8);
        assert_eq!(adjusted["29-1141"], 0.2);
    }
}
