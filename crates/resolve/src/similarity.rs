//! Longest-matching-blocks similarity (Ratcliff/Obershelp).
//!
//! `2 * M / T` where `M` is the number of chars covered by recursively found
//! longest common blocks and `T` the combined length. Block search breaks
//! ties toward the earliest position in the first operand, then the second,
//! the same way difflib does.

/// Similarity in `[0, 1]`. Two empty strings score `1.0`.
///
/// Operands are put in a canonical order before the block search, so the
/// result is exactly symmetric even where tie-breaking would otherwise make
/// the two argument orders disagree.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    // prev[c] = length of the common suffix ending at (i - 1, blo + c - 1)
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);

    for i in alo..ahi {
        for j in blo..bhi {
            let c = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[c - 1] + 1;
                curr[c] = k;
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            } else {
                curr[c] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_k)
}
