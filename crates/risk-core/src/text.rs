//! Text cleaning and TF-IDF vectorization shared by the Task-to-Tool Mapper
//! (§4.3), Capability Transfer Engine (§4.8), and Task Alignment Engine
//! (§4.9). All three stages fit a vectorizer over some corpus and compute
//! cosine similarity between queries and that corpus — this module is the
//! one place that logic lives.

use std::collections::HashMap;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "did", "do", "does", "doing", "don't", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Lowercase, strip non-alphanumeric characters, collapse whitespace.
/// Shared cleaning step for tool text (§4.1) and task/prompt text (§4.9).
pub fn clean_text(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_was_space = false;
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tokenize(doc: &str) -> Vec<String> {
    let words: Vec<&str> = doc
        .split_whitespace()
        .filter(|w| !STOPWORDS.contains(w))
        .collect();
    let mut tokens: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    for pair in words.windows(2) {
        tokens.push(format!("{} {}", pair[0], pair[1]));
    }
    tokens
}

/// A sparse, L2-normalized document vector: sorted `(term_id, weight)` pairs.
pub type SparseVec = Vec<(u32, f64)>;

/// Fitted TF-IDF vectorizer: unigrams + bigrams, English stopwords,
/// `min_df`, and a feature cap, matching §4.3's vectorizer configuration.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocab: HashMap<String, u32>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit on `docs`, keeping terms with document frequency >= `min_df`,
    /// capped to `max_features` terms (most frequent first, ties broken
    /// alphabetically for determinism).
    pub fn fit(docs: &[String], min_df: usize, max_features: usize) -> Self {
        let mut df: HashMap<String, usize> = HashMap::new();
        let mut total_tf: HashMap<String, usize> = HashMap::new();
        let tokenized: Vec<Vec<String>> = docs.iter().map(|d| tokenize(d)).collect();

        for tokens in &tokenized {
            let mut seen = std::collections::HashSet::new();
            for t in tokens {
                *total_tf.entry(t.clone()).or_insert(0) += 1;
                if seen.insert(t.clone()) {
                    *df.entry(t.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut terms: Vec<(String, usize, usize)> = df
            .into_iter()
            .filter(|(_, count)| *count >= min_df.max(1))
            .map(|(term, count)| (term.clone(), count, total_tf.get(&term).copied().unwrap_or(0)))
            .collect();
        terms.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(max_features);

        let n_docs = docs.len().max(1) as f64;
        let mut vocab = HashMap::with_capacity(terms.len());
        let mut idf = vec![0.0_f64; terms.len()];
        for (i, (term, doc_freq, _)) in terms.into_iter().enumerate() {
            vocab.insert(term, i as u32);
            // smooth idf, matching sklearn's default: ln((1+n)/(1+df)) + 1
            idf[i] = ((1.0 + n_docs) / (1.0 + doc_freq as f64)).ln() + 1.0;
        }

        Self { vocab, idf }
    }

    /// Project `docs` into this vectorizer's fixed term space, L2-normalized.
    pub fn transform(&self, docs: &[String]) -> Vec<SparseVec> {
        docs.iter().map(|d| self.transform_one(d)).collect()
    }

    pub fn transform_one(&self, doc: &str) -> SparseVec {
        let tokens = tokenize(doc);
        let mut counts: HashMap<u32, f64> = HashMap::new();
        for t in tokens {
            if let Some(&id) = self.vocab.get(&t) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }
        let mut weighted: Vec<(u32, f64)> = counts
            .into_iter()
            .map(|(id, tf)| (id, tf * self.idf[id as usize]))
            .collect();
        let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in weighted.iter_mut() {
                *w /= norm;
            }
        }
        weighted.sort_by_key(|(id, _)| *id);
        weighted
    }
}

/// Cosine similarity between two L2-normalized sparse vectors (a sorted
/// merge-join dot product, since both are unit vectors).
pub fn cosine_similarity(a: &SparseVec, b: &SparseVec) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot
}

/// Cosine similarity of every query against every corpus document,
/// processed in mini-batches of `batch_size` queries (§5 sizing) —
/// batching affects memory shape only, not the result.
pub fn cosine_similarity_batch(
    queries: &[SparseVec],
    corpus: &[SparseVec],
    batch_size: usize,
) -> Vec<Vec<f64>> {
    let mut out = Vec::with_capacity(queries.len());
    for chunk in queries.chunks(batch_size.max(1)) {
        for q in chunk {
            out.push(corpus.iter().map(|d| cosine_similarity(q, d)).collect());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_lowercases_and_collapses() {
        assert_eq!(clean_text("Report  Writer!!  v2.0"), "report writer v2 0");
    }

    #[test]
    fn identical_documents_have_similarity_one() {
        let docs = vec!["write reports for clients".to_string(), "operate heavy machinery".to_string()];
        let vec = TfidfVectorizer::fit(&docs, 1, 200_000);
        let t = vec.transform(&docs);
        assert!((cosine_similarity(&t[0], &t[0]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unrelated_documents_have_low_similarity() {
        let docs = vec![
            "write detailed quarterly reports".to_string(),
            "operate heavy forklift machinery".to_string(),
        ];
        let vec = TfidfVectorizer::fit(&docs, 1, 200_000);
        let t = vec.transform(&docs);
        assert!(cosine_similarity(&t[0], &t[1]) < 0.3);
    }
}
