//! Edit distance and normalized similarity.

/// Levenshtein distance: minimum single-character insertions, deletions or
/// substitutions turning `a` into `b`. Counted in `char`s.
///
/// Uses one rolling row sized to the shorter input.
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    let mut row: Vec<usize> = (0..=short.len()).collect();
    for (i, lc) in long.iter().enumerate() {
        // row[0] before update is the diagonal for j == 0
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diagonal + usize::from(lc != sc);
            let deletion = above + 1;
            let insertion = row[j] + 1;
            row[j + 1] = substitution.min(deletion).min(insertion);
            diagonal = above;
        }
    }

    row[short.len()]
}

/// `1 - distance / max_len`, or `0.0` if either string is empty.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    1.0 - distance(a, b) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_basics() {
        assert_eq!(distance("", ""), 0);
        assert_eq!(distance("abc", ""), 3);
        assert_eq!(distance("", "abc"), 3);
        assert_eq!(distance("kitten", "sitting"), 3);
        assert_eq!(distance("flaw", "lawn"), 2);
        assert_eq!(distance("twosum", "twosum"), 0);
    }

    #[test]
    fn test_distance_symmetric() {
        let pairs = [
            ("inordertraversait", "inordertraversal"),
            ("kitten", "sitting"),
            ("searchinsert", "defsearchinsert"),
            ("a", "xyz"),
            ("", "abc"),
        ];
        for (a, b) in pairs {
            assert_eq!(distance(a, b), distance(b, a), "{a} / {b}");
        }
    }

    #[test]
    fn test_distance_counts_chars_not_bytes() {
        assert_eq!(distance("naïve", "naive"), 1);
    }

    #[test]
    fn test_distance_long_inputs_iterative() {
        let a = "a".repeat(5000);
        let b = "b".repeat(4000);
        assert_eq!(distance(&a, &b), 5000);
    }

    #[test]
    fn test_similarity_identity() {
        assert!((similarity("twosum", "twosum") - 1.0).abs() < 1e-9);
        assert!((similarity("x", "x") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_empty() {
        assert_eq!(similarity("twosum", ""), 0.0);
        assert_eq!(similarity("", "twosum"), 0.0);
        assert_eq!(similarity("", ""), 0.0);
    }

    #[test]
    fn test_similarity_normalized_by_longer() {
        // "it" -> "l": 2 edits over 17 chars
        let s = similarity("inordertraversait", "inordertraversal");
        assert!((s - (1.0 - 2.0 / 17.0)).abs() < 1e-9);
        // kitten/sitting: 3 edits over 7
        assert!((similarity("kitten", "sitting") - 4.0 / 7.0).abs() < 1e-9);
    }
}
