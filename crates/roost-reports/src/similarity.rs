//! Fuzzy string matching for hold-reason bucketing.
//!
//! Ratcliff/Obershelp similarity: twice the number of matching characters
//! (found by recursively locating the longest common substring) over the
//! total length of both strings.

/// Similarity ratio in [0, 1].
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (ai, bi, len) = longest_common_substring(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..ai], &b[..bi]) + matching_chars(&a[ai + len..], &b[bi + len..])
}

/// Longest common substring as (start in a, start in b, length).
///
/// Ties resolve to the earliest occurrence in `a`, then in `b`.
fn longest_common_substring(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            if cur[j + 1] > best.2 {
                best = (i + 1 - cur[j + 1], j + 1 - cur[j + 1], cur[j + 1]);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_and_empty() {
        assert!(close(ratio("abc", "abc"), 1.0));
        assert!(close(ratio("", ""), 1.0));
        assert!(close(ratio("abc", ""), 0.0));
    }

    #[test]
    fn test_partial_overlap() {
        // matching chars: "bcd" -> 2*3/8
        assert!(close(ratio("abcd", "bcde"), 0.75));
    }

    #[test]
    fn test_disjoint() {
        assert!(close(ratio("aaaa", "bbbb"), 0.0));
    }

    #[test]
    fn test_hold_reason_variants_group() {
        let a = "memory usage exceeded request_memory (1024 MB)";
        let b = "memory usage exceeded request_memory (2048 MB)";
        assert!(ratio(a, b) > 0.9);

        let c = "Failed to transfer input files";
        assert!(ratio(a, c) < 0.6);
    }
}
