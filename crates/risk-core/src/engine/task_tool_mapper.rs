//! Task-to-Tool Mapper (§4.3): lenient and strict task automatability
//! scores from TF-IDF cosine similarity between task text and tool text.

use crate::growth::percentile;
use crate::model::{Task, Tool, ToolSource};
use crate::text::{cosine_similarity_batch, SparseVec, TfidfVectorizer};

const BATCH_SIZE: usize = 400;

#[derive(Debug, Clone)]
pub struct TaskAutomatability {
    pub soc_code: String,
    pub task_id: String,
    pub lenient_score: f64,
    pub lenient_top_tool: Option<String>,
    pub strict_score: Option<f64>,
}

fn fit_vectorizer(tools: &[Tool], tasks: &[Task]) -> TfidfVectorizer {
    let docs: Vec<String> = tools
        .iter()
        .map(|t| t.tool_text.clone())
        .chain(tasks.iter().map(|t| t.text_clean.clone()))
        .collect();
    TfidfVectorizer::fit(&docs, 2, 200_000)
}

/// Lenient variant: max similarity to any tool, calibrated against the
/// P10/P90 spread of all tasks' best-match similarities, floored at 0.02.
pub fn map_lenient(tasks: &[Task], tools: &[Tool]) -> Vec<TaskAutomatability> {
    let vectorizer = fit_vectorizer(tools, tasks);
    let tool_vecs: Vec<SparseVec> = vectorizer.transform(
        &tools.iter().map(|t| t.tool_text.clone()).collect::<Vec<_>>(),
    );
    let task_texts: Vec<String> = tasks.iter().map(|t| t.text_clean.clone()).collect();
    let task_vecs = vectorizer.transform(&task_texts);

    let sims = cosine_similarity_batch(&task_vecs, &tool_vecs, BATCH_SIZE);

    let best: Vec<(f64, Option<usize>)> = sims
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0.0_f64, None), |(best_sim, best_idx), (i, &sim)| {
                    if sim > best_sim {
                        (sim, Some(i))
                    } else {
                        (best_sim, best_idx)
                    }
                })
        })
        .collect();

    let s1_values: Vec<f64> = best.iter().map(|(s, _)| *s).collect();
    let p10 = percentile(&s1_values, 10.0);
    let p90 = percentile(&s1_values, 90.0);
    let spread = p90 - p10;

    tasks
        .iter()
        .zip(best.iter())
        .map(|(task, (s1, tool_idx))| {
            let calibrated = if spread > 0.0 {
                ((s1 - p10) / spread).clamp(0.0, 1.0)
            } else {
                0.0
            };
            TaskAutomatability {
                soc_code: task.soc_code.clone(),
                task_id: task.task_id.clone(),
                lenient_score: calibrated.max(0.02),
                lenient_top_tool: tool_idx.map(|i| tools[i].tool_id.clone()),
                strict_score: None,
            }
        })
        .collect()
}

/// Strict variant: restricted to Core tasks, top-3 tool matches, scored by
/// similarity magnitude, corroboration among the top-3, and source diversity.
pub fn map_strict(
    tasks: &[Task],
    tools: &[Tool],
) -> std::collections::HashMap<(String, String), f64> {
    let core_tasks: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.task_type == crate::model::TaskType::Core)
        .collect();
    if core_tasks.is_empty() {
        return std::collections::HashMap::new();
    }

    let vectorizer = fit_vectorizer(tools, tasks);
    let tool_vecs: Vec<SparseVec> = vectorizer.transform(
        &tools.iter().map(|t| t.tool_text.clone()).collect::<Vec<_>>(),
    );
    let task_texts: Vec<String> = core_tasks.iter().map(|t| t.text_clean.clone()).collect();
    let task_vecs = vectorizer.transform(&task_texts);
    let sims = cosine_similarity_batch(&task_vecs, &tool_vecs, BATCH_SIZE);

    let mut top3_per_task: Vec<Vec<(f64, ToolSource)>> = Vec::with_capacity(sims.len());
    for row in &sims {
        let mut ranked: Vec<(f64, ToolSource)> = row
            .iter()
            .enumerate()
            .map(|(i, &s)| (s, tools[i].source))
            .collect();
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
        ranked.truncate(3);
        top3_per_task.push(ranked);
    }

    let sim_components: Vec<f64> = top3_per_task
        .iter()
        .map(|top3| top3.first().map(|(s, _)| *s).unwrap_or(0.0))
        .collect();
    let p80 = percentile(&sim_components, 80.0);
    let p95 = percentile(&sim_components, 95.0);
    let spread = p95 - p80;

    let mut out = std::collections::HashMap::new();
    for (task, top3) in core_tasks.iter().zip(top3_per_task.iter()) {
        let s1 = top3.first().map(|(s, _)| *s).unwrap_or(0.0);
        let sim_component = if spread > 0.0 {
            ((s1 - p80) / spread).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let corroboration = if s1.abs() < 1e-9 {
            0.0
        } else {
            let ratios: Vec<f64> = top3.iter().skip(1).map(|(s, _)| (s / s1).clamp(0.0, 1.0)).collect();
            if ratios.is_empty() {
                0.0
            } else {
                ratios.iter().sum::<f64>() / ratios.len() as f64
            }
        };

        let distinct_sources: std::collections::HashSet<ToolSource> =
            top3.iter().map(|(_, src)| *src).collect();
        let diversity = distinct_sources.len() as f64 / 3.0;

        let strict_auto = sim_component * (0.7 * corroboration + 0.3 * diversity);
        out.insert((task.soc_code.clone(), task.task_id.clone()), strict_auto);
    }
    out
}

/// Merge lenient and strict scores into one `TaskAutomatability` row per task.
pub fn combine(lenient: Vec<TaskAutomatability>, strict: &std::collections::HashMap<(String, String), f64>) -> Vec<TaskAutomatability> {
    lenient
        .into_iter()
        .map(|mut row| {
            let key = (row.soc_code.clone(), row.task_id.clone());
            row.strict_score = strict.get(&key).copied();
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Task, TaskType, Tool, ToolSource};

    fn task(soc: &str, id: &str, text: &str, ty: TaskType) -> Task {
        Task {
            soc_code: soc.into(),
            task_id: id.into(),
            text: text.into(),
            text_clean: crate::text::clean_text(text),
            task_type: ty,
            importance_norm: 1.0,
            prevalence: 1.0,
            task_weight: 1.0,
        }
    }

    fn tool(src: ToolSource, id: &str, text: &str) -> Tool {
        Tool {
            source: src,
            tool_id: id.into(),
            name: text.into(),
            description: text.into(),
            tags: vec![],
            url: "https://example.com".into(),
            tool_text: crate::text::clean_text(text),
        }
    }

    #[test]
    fn lenient_scores_are_floored_and_bounded() {
        let tasks = vec![
            task("15-1252", "T1", "write detailed quarterly reports", TaskType::Core),
            task("15-1252", "T2", "operate heavy forklift machinery", TaskType::Core),
        ];
        let tools = vec![
            tool(ToolSource::A, "1", "report writer drafts quarterly summaries"),
            tool(ToolSource::B, "2", "forklift control system"),
        ];
        let scores = map_lenient(&tasks, &tools);
        for s in &scores {
            assert!(s.lenient_score >= 0.02 && s.lenient_score <= 1.0);
        }
    }

    #[test]
    fn strict_scores_are_bounded_with_no_floor() {
        let tasks = vec![
            task("15-1252", "T1", "write detailed quarterly reports", TaskType::Core),
        ];
        let tools = vec![
            tool(ToolSource::A, "1", "report writer drafts quarterly summaries"),
            tool(ToolSource::B, "2", "unrelated forklift control system"),
            tool(ToolSource::C, "3", "another unrelated kitchen appliance"),
        ];
        let strict = map_strict(&tasks, &tools);
        for (_, score) in strict.iter() {
            assert!(*score >= 0.0 && *score <= 1.0);
        }
    }
}
