//! Fuzzy string scoring for header search.

/// Minimum score for a fuzzy header match.
pub const FUZZY_THRESHOLD: u8 = 70;

/// Similarity score in `0..=100`; higher is closer.
pub trait FuzzyScorer {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// Normalized indel similarity: `2 * LCS / (len(a) + len(b))`, case-insensitive.
///
/// "Naem" vs "Name" shares a 3-char subsequence over 8 chars -> 75.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndelRatio;

impl FuzzyScorer for IndelRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        let a: Vec<char> = a.to_lowercase().chars().collect();
        let b: Vec<char> = b.to_lowercase().chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 100;
        }
        let lcs = lcs_len(&a, &b);
        // Rounded integer percentage
        ((200 * lcs + total / 2) / total) as u8
    }
}

/// Longest common subsequence length, two-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { prev[j + 1].max(cur[j]) };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transposition_scores_above_threshold() {
        let s = IndelRatio.score("Naem", "Name");
        assert_eq!(s, 75);
        assert!(s >= FUZZY_THRESHOLD);
    }

    #[test]
    fn test_unrelated_header_scores_low() {
        assert!(IndelRatio.score("Naem", "Quantity") < FUZZY_THRESHOLD);
    }

    #[test]
    fn test_case_insensitive_identity() {
        assert_eq!(IndelRatio.score("PRICE", "price"), 100);
        assert_eq!(IndelRatio.score("", ""), 100);
        assert_eq!(IndelRatio.score("abc", ""), 0);
    }
}
