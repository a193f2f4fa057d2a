//! Scoring and ranking helpers shared by the index and the encoders.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Negative squared Euclidean distance between two vectors.
///
/// Higher is better and an exact match scores `0.0`. Callers must pass
/// vectors of equal length; extra components of the longer one are ignored.
pub fn neg_squared_euclidean(a: &[f32], b: &[f32]) -> f64 {
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = (*x as f64) - (*y as f64);
            d * d
        })
        .sum();

    // 0.0 - 0.0 is +0.0, where -sum would give -0.0 for a self-match.
    0.0 - sum
}

/// Scale `v` in place to unit L2 norm. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// A scored row, ordered so that "greater" means "ranks earlier".
#[derive(Debug, Clone, Copy)]
struct Candidate {
    row: usize,
    score: f64,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.row.cmp(&self.row))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Select the `k` best `(row, score)` pairs.
///
/// Result is sorted by descending score; equal scores keep ascending row
/// order. Uses a bounded min-heap, so memory stays at `O(k)`.
pub fn top_k_by_score<I>(scores: I, k: usize) -> Vec<(usize, f64)>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Candidate>> = BinaryHeap::with_capacity(k);
    for (row, score) in scores {
        let candidate = Candidate { row, score };
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if let Some(Reverse(worst)) = heap.peek() {
            if candidate > *worst {
                heap.pop();
                heap.push(Reverse(candidate));
            }
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(c)| (c.row, c.score))
        .collect()
}
