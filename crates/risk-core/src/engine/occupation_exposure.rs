//! Occupation Exposure Aggregator (§4.4): weighted mean of task
//! automatability over each occupation, for both the lenient and strict
//! score variants.

use crate::engine::task_tool_mapper::TaskAutomatability;
use crate::model::{Occupation, Task};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct OccupationExposure {
    pub soc_code: String,
    pub title: String,
    pub exposure_lenient: f64,
    /// `None` when no Core task for this occupation produced a strict score.
    pub exposure_strict: Option<f64>,
}

/// Resolve one title per `soc_code`, preferring the base (`.00`) variant
/// when multiple raw rows collapse onto the same code (§3, §4.4).
fn resolve_titles(occupations: &[Occupation]) -> HashMap<String, String> {
    let mut titles: HashMap<String, (String, bool)> = HashMap::new();
    for occ in occupations {
        let entry = titles.entry(occ.soc_code.clone()).or_insert_with(|| (occ.title.clone(), occ.base_variant));
        if occ.base_variant && !entry.1 {
            *entry = (occ.title.clone(), true);
        }
    }
    titles.into_iter().map(|(soc, (title, _))| (soc, title)).collect()
}

pub fn aggregate(
    tasks: &[Task],
    scores: &[TaskAutomatability],
    occupations: &[Occupation],
) -> Vec<OccupationExposure> {
    let titles = resolve_titles(occupations);

    let lenient_by_key: HashMap<(String, String), f64> = scores
        .iter()
        .map(|s| ((s.soc_code.clone(), s.task_id.clone()), s.lenient_score))
        .collect();
    let strict_by_key: HashMap<(String, String), f64> = scores
        .iter()
        .filter_map(|s| s.strict_score.map(|v| ((s.soc_code.clone(), s.task_id.clone()), v)))
        .collect();

    let mut lenient_numer: HashMap<String, f64> = HashMap::new();
    let mut lenient_denom: HashMap<String, f64> = HashMap::new();
    let mut strict_numer: HashMap<String, f64> = HashMap::new();
    let mut strict_denom: HashMap<String, f64> = HashMap::new();

    for task in tasks {
        let key = (task.soc_code.clone(), task.task_id.clone());
        let lenient_score = lenient_by_key.get(&key).copied().unwrap_or(0.0);
        *lenient_numer.entry(task.soc_code.clone()).or_insert(0.0) += task.task_weight * lenient_score;
        *lenient_denom.entry(task.soc_code.clone()).or_insert(0.0) += task.task_weight;

        if let Some(&strict_score) = strict_by_key.get(&key) {
            *strict_numer.entry(task.soc_code.clone()).or_insert(0.0) += task.task_weight * strict_score;
            *strict_denom.entry(task.soc_code.clone()).or_insert(0.0) += task.task_weight;
        }
    }

    let mut socs: Vec<String> = lenient_denom.keys().cloned().collect();
    socs.sort();

    socs.into_iter()
        .map(|soc| {
            let denom = lenient_denom.get(&soc).copied().unwrap_or(0.0);
            let exposure_lenient = if denom > 0.0 {
                lenient_numer.get(&soc).copied().unwrap_or(0.0) / denom
            } else {
                0.0
            };
            let exposure_strict = strict_denom.get(&soc).filter(|d| **d > 0.0).map(|d| {
                strict_numer.get(&soc).copied().unwrap_or(0.0) / d
            });
            OccupationExposure {
                title: titles.get(&soc).cloned().unwrap_or_default(),
                soc_code: soc,
                exposure_lenient: exposure_lenient.clamp(0.0, 1.0),
                exposure_strict: exposure_strict.map(|v| v.clamp(0.0, 1.0)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::occupation::TaskType;

    #[test]
    fn dominant_task_weight_drives_exposure_near_its_own_score() {
        let tasks = vec![
            Task {
                soc_code: "15-1252".into(),
                task_id: "T1".into(),
                text: "write reports".into(),
                text_clean: "write reports".into(),
                task_type: TaskType::Core,
                importance_norm: 1.0,
                prevalence: 1.0,
                task_weight: 1.0,
            },
            Task {
                soc_code: "15-1252".into(),
                task_id: "T2".into(),
                text: "operate heavy machinery".into(),
                text_clean: "operate heavy machinery".into(),
                task_type: TaskType::Core,
                importance_norm: 0.5,
                prevalence: 0.5,
                task_weight: 0.25,
            },
        ];
        let scores = vec![
            TaskAutomatability {
                soc_code: "15-1252".into(),
                task_id: "T1".into(),
                lenient_score: 0.9,
                lenient_top_tool: None,
                strict_score: None,
            },
            TaskAutomatability {
                soc_code: "15-1252".into(),
                task_id: "T2".into(),
                lenient_score: 0.1,
                lenient_top_tool: None,
                strict_score: None,
            },
        ];
        let occupations = vec![Occupation {
            soc_code: "15-1252".into(),
            title: "Software Developers".into(),
            base_variant: true,
        }];
        let out = aggregate(&tasks, &scores, &occupations);
        assert_eq!(out.len(), 1);
        assert!(out[0].exposure_lenient > 0.7);
        assert!(out[0].exposure_lenient <= 1.0);
    }
}
