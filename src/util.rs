//! Miscellaneous helpers used within the crate.

/// Computes a similarity ratio between two strings in `0.0..=1.0`,
/// based on the edit distance relative to the longer input.
///
/// Used to score "did you mean" suggestions for unknown endpoints; the
/// exact metric is not part of any public contract.
pub(crate) fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - (edit_distance(a, b) as f64) / (longest as f64)
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut previous = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let insert_or_delete = row[j].min(row[j + 1]) + 1;
            let substitute = previous + if ca == cb { 0 } else { 1 };
            previous = row[j + 1];
            row[j + 1] = insert_or_delete.min(substitute);
        }
    }
    row[b.len()]
}

/// Collapses runs of consecutive slashes into a single slash.
pub(crate) fn collapse_slashes(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_was_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !previous_was_slash {
                collapsed.push(c);
            }
            previous_was_slash = true;
        } else {
            previous_was_slash = false;
            collapsed.push(c);
        }
    }
    collapsed
}
