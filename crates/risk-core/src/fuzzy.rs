//! Occupation name normalization and fuzzy matching for the Capability
//! Transfer Engine's name-mapping step (§4.8 step 1).

/// Normalize a benchmark or taxonomy occupation title: lowercase, `&` ->
/// "and", strip non-alphanumerics, collapse whitespace.
pub fn normalize_title(title: &str) -> String {
    let with_and = title.to_lowercase().replace('&', " and ");
    let mut out = String::with_capacity(with_and.len());
    let mut last_was_space = false;
    for ch in with_and.chars() {
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

/// Ratio-based similarity in [0, 1], matching Python's
/// `difflib.SequenceMatcher.ratio()` semantics closely enough for the
/// 0.82 cutoff used in practice: `strsim`'s normalized Levenshtein
/// similarity on the normalized titles.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let (na, nb) = (normalize_title(a), normalize_title(b));
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&na, &nb)
}

/// The mapping method recorded for each benchmark-to-taxonomy name match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    Exact,
    Fuzzy,
    ManualSplit,
    Unmatched,
}

/// Result of matching one benchmark occupation title against a slice of
/// taxonomy `(soc_code, title)` pairs.
#[derive(Debug, Clone)]
pub struct NameMatch {
    pub soc_code: Option<String>,
    pub occupation_title: Option<String>,
    pub method: MatchMethod,
    pub similarity: f64,
}

/// Best single-match result for `benchmark_title` against the taxonomy,
/// using exact match first, then fuzzy match above `cutoff`.
pub fn best_match(
    benchmark_title: &str,
    taxonomy: &[(String, String)],
    cutoff: f64,
) -> NameMatch {
    let norm_target = normalize_title(benchmark_title);

    if let Some((soc, title)) = taxonomy
        .iter()
        .find(|(_, title)| normalize_title(title) == norm_target)
    {
        return NameMatch {
            soc_code: Some(soc.clone()),
            occupation_title: Some(title.clone()),
            method: MatchMethod::Exact,
            similarity: 1.0,
        };
    }

    let best = taxonomy
        .iter()
        .map(|(soc, title)| (soc, title, name_similarity(benchmark_title, title)))
        .fold(None::<(&String, &String, f64)>, |acc, (soc, title, sim)| {
            match acc {
                Some((_, _, best_sim)) if best_sim >= sim => acc,
                _ => Some((soc, title, sim)),
            }
        });

    match best {
        Some((soc, title, sim)) if sim >= cutoff => NameMatch {
            soc_code: Some(soc.clone()),
            occupation_title: Some(title.clone()),
            method: MatchMethod::Fuzzy,
            similarity: sim,
        },
        _ => NameMatch {
            soc_code: None,
            occupation_title: None,
            method: MatchMethod::Unmatched,
            similarity: 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_ampersand_and_case() {
        assert_eq!(normalize_title("Cooks & Food Prep Workers"), "cooks and food prep workers");
    }

    #[test]
    fn exact_match_wins_over_fuzzy() {
        let taxonomy = vec![
            ("41-2011".to_string(), "Cashiers".to_string()),
            ("41-2012".to_string(), "Gambling Change Persons and Booth Cashiers".to_string()),
        ];
        let m = best_match("Cashiers", &taxonomy, 0.82);
        assert_eq!(m.method, MatchMethod::Exact);
        assert_eq!(m.soc_code.as_deref(), Some("41-2011"));
    }

    #[test]
    fn unmatched_below_cutoff() {
        let taxonomy = vec![("00-0000".to_string(), "Completely Different Title".to_string())];
        let m = best_match("Something Else Entirely", &taxonomy, 0.82);
        assert_eq!(m.method, MatchMethod::Unmatched);
        assert!(m.soc_code.is_none());
    }
}
