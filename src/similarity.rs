//! Edit distance used to tolerate typos in project names.

/// Returns the Levenshtein distance between `a` and `b`: the minimum number of
/// single character insertions, deletions or substitutions turning one into
/// the other.
///
/// Comparison is exact, so callers lower-case both operands first. Inputs are
/// short identifiers, so the full `(m + 1) x (n + 1)` table is kept.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    let mut table = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        table[0][j] = j;
    }

    for j in 1..=n {
        for i in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            table[i][j] = (table[i - 1][j] + 1)
                .min(table[i][j - 1] + 1)
                .min(table[i - 1][j - 1] + cost);
        }
    }

    table[m][n]
}
