//! Task Ratings Loader (§4.2). Consumes the three taxonomy tables (already
//! read and schema-checked by `risk-ingestion`) and derives per-task
//! importance, relevance, and frequency weights.

use crate::model::occupation::{extract_soc_code, TaskType};
use crate::model::Task;
use crate::text::clean_text;
use std::collections::HashMap;

/// One row of the task-text table: `O*NET-SOC Code`, `Task ID`, `Task`, `Task Type`.
#[derive(Debug, Clone)]
pub struct RawTaskRow {
    pub onet_soc_code: String,
    pub task_id: String,
    pub task: String,
    pub task_type: String,
}

/// One row of the ratings table: `Scale ID` in {IM, RT, FT}, `Category`, `Data Value`.
#[derive(Debug, Clone)]
pub struct RawRatingRow {
    pub onet_soc_code: String,
    pub task_id: String,
    pub scale_id: String,
    /// Present only for FT rows — the frequency-category ordinal (1..7).
    pub category: Option<f64>,
    pub data_value: f64,
}

#[derive(Default)]
struct Ratings {
    im_values: Vec<f64>,
    rt_values: Vec<f64>,
    ft_numer: f64,
    ft_denom: f64,
}

/// Build per-(soc, task_id) `Task` rows from the raw taxonomy tables.
pub fn build(task_rows: &[RawTaskRow], rating_rows: &[RawRatingRow]) -> Vec<Task> {
    let mut ratings: HashMap<(String, String), Ratings> = HashMap::new();
    for row in rating_rows {
        let key = (row.onet_soc_code.clone(), row.task_id.clone());
        let entry = ratings.entry(key).or_default();
        match row.scale_id.as_str() {
            "IM" => entry.im_values.push(row.data_value),
            "RT" => entry.rt_values.push(row.data_value),
            "FT" => {
                if let Some(category) = row.category {
                    entry.ft_numer += category * row.data_value;
                    entry.ft_denom += row.data_value;
                }
            }
            _ => {}
        }
    }

    let mut tasks: Vec<Task> = Vec::with_capacity(task_rows.len());
    let mut raw_importance: Vec<Option<f64>> = Vec::with_capacity(task_rows.len());

    for row in task_rows {
        let soc_code = match extract_soc_code(&row.onet_soc_code) {
            Some(s) => s,
            None => continue,
        };
        if row.task.trim().is_empty() {
            continue;
        }
        let task_type = match row.task_type.trim() {
            "Core" => TaskType::Core,
            _ => TaskType::Supplemental,
        };

        let key = (row.onet_soc_code.clone(), row.task_id.clone());
        let r = ratings.get(&key);

        let mean_im = r
            .filter(|r| !r.im_values.is_empty())
            .map(|r| r.im_values.iter().sum::<f64>() / r.im_values.len() as f64);
        let importance_norm_raw = mean_im.map(|m| ((m - 1.0) / 4.0).clamp(0.0, 1.0));
        raw_importance.push(importance_norm_raw);

        let rt_norm = r
            .filter(|r| !r.rt_values.is_empty())
            .map(|r| ((r.rt_values.iter().sum::<f64>() / r.rt_values.len() as f64) / 100.0).clamp(0.0, 1.0));
        let ft_norm = r.filter(|r| r.ft_denom > 0.0).map(|r| {
            let ft_expected = r.ft_numer / r.ft_denom;
            ((ft_expected - 1.0) / 6.0).clamp(0.0, 1.0)
        });

        let prevalence = match (rt_norm, ft_norm) {
            (Some(rt), Some(ft)) => 0.5 * rt + 0.5 * ft,
            (Some(rt), None) => rt,
            (None, Some(ft)) => ft,
            (None, None) => 0.5,
        };

        tasks.push(Task {
            soc_code,
            task_id: row.task_id.clone(),
            text: row.task.clone(),
            text_clean: clean_text(&row.task),
            task_type,
            importance_norm: importance_norm_raw.unwrap_or(f64::NAN),
            prevalence,
            task_weight: f64::NAN, // filled below once the population median is known
        });
    }

    let median_importance = median_of_present(&raw_importance);
    for (task, raw) in tasks.iter_mut().zip(raw_importance.iter()) {
        let importance_norm = raw.unwrap_or(median_importance);
        task.importance_norm = importance_norm;
        task.task_weight = (importance_norm * task.prevalence).max(0.01);
    }

    tasks
}

fn median_of_present(values: &[Option<f64>]) -> f64 {
    let mut present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    if present.is_empty() {
        return 0.5;
    }
    present.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = present.len();
    if n % 2 == 1 {
        present[n / 2]
    } else {
        (present[n / 2 - 1] + present[n / 2]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario S1's two tasks: T1 has a dominant weight over T2.
    #[test]
    fn scenario_s1_task_weights() {
        let task_rows = vec![
            RawTaskRow {
                onet_soc_code: "15-1252.00".into(),
                task_id: "T1".into(),
                task: "Write reports".into(),
                task_type: "Core".into(),
            },
            RawTaskRow {
                onet_soc_code: "15-1252.00".into(),
                task_id: "T2".into(),
                task: "Operate heavy machinery".into(),
                task_type: "Core".into(),
            },
        ];
        let rating_rows = vec![
            RawRatingRow { onet_soc_code: "15-1252.00".into(), task_id: "T1".into(), scale_id: "IM".into(), category: None, data_value: 5.0 },
            RawRatingRow { onet_soc_code: "15-1252.00".into(), task_id: "T1".into(), scale_id: "RT".into(), category: None, data_value: 100.0 },
            RawRatingRow { onet_soc_code: "15-1252.00".into(), task_id: "T1".into(), scale_id: "FT".into(), category: Some(7.0), data_value: 1.0 },
            RawRatingRow { onet_soc_code: "15-1252.00".into(), task_id: "T2".into(), scale_id: "IM".into(), category: None, data_value: 3.0 },
            RawRatingRow { onet_soc_code: "15-1252.00".into(), task_id: "T2".into(), scale_id: "RT".into(), category: None, data_value: 50.0 },
            RawRatingRow { onet_soc_code: "15-1252.00".into(), task_id: "T2".into(), scale_id: "FT".into(), category: Some(4.0), data_value: 1.0 },
        ];
        let tasks = build(&task_rows, &rating_rows);
        let t1 = tasks.iter().find(|t| t.task_id == "T1").unwrap();
        let t2 = tasks.iter().find(|t| t.task_id == "T2").unwrap();
        assert!(t1.task_weight > t2.task_weight);
        assert!(t1.task_weight >= 0.9);
        assert!((t2.task_weight - 0.25).abs() < 0.05);
    }

    #[test]
    fn weights_respect_floor_and_ceiling() {
        let task_rows = vec![RawTaskRow {
            onet_soc_code: "11-1011.00".into(),
            task_id: "T1".into(),
            task: "Do something".into(),
            task_type: "Supplemental".into(),
        }];
        let tasks = build(&task_rows, &[]);
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].task_weight >= 0.01 && tasks[0].task_weight <= 1.0);
    }
}
