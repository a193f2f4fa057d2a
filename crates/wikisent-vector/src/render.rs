//! Render-time filtering and console formatting of search results.
//!
//! The index returns every top-k hit; hiding weak ones is a presentation
//! decision made here.

use std::fmt::Write;

use crate::index::Match;

/// Matches with `score >= threshold`, paired with their zero-based rank in
/// the unfiltered result.
pub fn usable_matches(matches: &[Match], threshold: f64) -> Vec<(usize, &Match)> {
    matches
        .iter()
        .enumerate()
        .filter(|(_, m)| m.score >= threshold)
        .collect()
}

/// Format a query's results for the console.
pub fn render_matches(query: &str, matches: &[Match], threshold: f64) -> String {
    let mut out = format!("Ta-Dah🔮, here's what we found for: {}\n", query);
    for (rank, m) in usable_matches(matches, threshold) {
        let _ = writeln!(out, "> {:>2}({:.2}). {}", rank, m.score, m.text.trim_end());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::RecordId;

    fn hit(id: u64, text: &str, score: f64) -> Match {
        Match {
            record_id: RecordId(id),
            text: text.to_string(),
            score,
        }
    }

    #[test]
    fn test_zero_threshold_keeps_only_exact_matches() {
        let matches = vec![hit(0, "a", 0.0), hit(1, "b", -0.01), hit(2, "c", -3.0)];
        let usable = usable_matches(&matches, 0.0);
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].0, 0);
    }

    #[test]
    fn test_filter_preserves_unfiltered_rank() {
        let matches = vec![hit(4, "a", -0.5), hit(2, "b", -1.5), hit(9, "c", -0.9)];
        let ranks: Vec<usize> = usable_matches(&matches, -1.0)
            .into_iter()
            .map(|(rank, _)| rank)
            .collect();
        assert_eq!(ranks, vec![0, 2]);
    }

    #[test]
    fn test_negative_infinity_keeps_everything() {
        let matches = vec![hit(0, "a", -1e30), hit(1, "b", -2e30)];
        assert_eq!(usable_matches(&matches, f64::NEG_INFINITY).len(), 2);
    }

    #[test]
    fn test_render_format() {
        let matches = vec![hit(0, "Paris is in France.\n", 0.0), hit(1, "Rome", -1.25)];
        let out = render_matches("Paris", &matches, -2.0);
        assert_eq!(
            out,
            "Ta-Dah🔮, here's what we found for: Paris\n\
             >  0(0.00). Paris is in France.\n\
             >  1(-1.25). Rome\n"
        );
    }

    #[test]
    fn test_render_with_nothing_usable() {
        let out = render_matches("q", &[hit(0, "a", -1.0)], 0.0);
        assert_eq!(out, "Ta-Dah🔮, here's what we found for: q\n");
    }
}
