use log::debug;
use rand::Rng;

use crate::approximation::{avg_squared_error, ApproximationKind};
use crate::error::{RegForestError, Result};
use crate::tools::random::k_distinct;
use crate::training_set::{OrthogonalSplit, TrainingSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCandidate {
    pub split: OrthogonalSplit,
    pub score: f64,
}

/// Outcome of a split search. `NoSplit` is a normal result: the node stays a leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitSearch {
    Found(SplitCandidate),
    NoSplit,
}

/// Fraction of the squared error explained by `split`, `0.0` when the subset
/// has nothing left to explain. An empty side is an invariant violation.
pub fn score(
    ts: &TrainingSet,
    subset: &[usize],
    split: &OrthogonalSplit,
    kind: ApproximationKind,
) -> Result<f64> {
    let (lower, upper) = ts.apply_split(split, subset);
    if lower.is_empty() || upper.is_empty() {
        let mut dim_values = ts.dim_values(subset, split.dim);
        dim_values.sort_by(f64::total_cmp);
        debug!(
            "Empty side for split ({}, {}) over values {:?}",
            split.dim, split.threshold, dim_values
        );
        return Err(RegForestError::EmptyPartition {
            dim: split.dim,
            threshold: split.threshold,
            lower: lower.len(),
            upper: upper.len(),
        });
    }

    let var_all = avg_squared_error(kind, ts, subset);
    if var_all == 0.0 {
        return Ok(0.0);
    }
    let var_lower = avg_squared_error(kind, ts, &lower);
    let var_upper = avg_squared_error(kind, ts, &upper);
    let weighted =
        (var_lower * lower.len() as f64 + var_upper * upper.len() as f64) / subset.len() as f64;

    Ok((var_all - weighted) / var_all)
}

/// Probes `k` random dimensions with one random threshold each and keeps the
/// best scoring one. Thresholds lie in `(s_min, s_max]` where `s_min` and
/// `s_max` are the `n_min`-th smallest and largest values, so both sides hold
/// at least `n_min` samples.
pub fn find_best_split<R: Rng + ?Sized>(
    ts: &TrainingSet,
    subset: &[usize],
    k: usize,
    n_min: usize,
    kind: ApproximationKind,
    rng: &mut R,
) -> Result<SplitSearch> {
    let n_min = n_min.max(1);
    if subset.len() < 2 * n_min {
        debug!(
            "Subset of {} samples cannot hold {} samples on each side",
            subset.len(),
            n_min
        );
        return Ok(SplitSearch::NoSplit);
    }

    let mut sorted = subset.to_vec();
    let k = k.min(ts.input_dim());
    let mut best: Option<SplitCandidate> = None;
    for dim in k_distinct(rng, k, ts.input_dim()) {
        ts.sort_subset(&mut sorted, dim);
        let s_val_min = ts.input(sorted[n_min - 1])[dim];
        let s_val_max = ts.input(sorted[sorted.len() - n_min])[dim];
        if s_val_min >= s_val_max {
            debug!(
                "Similar values for s_val_min and s_val_max in dimension {}: {}",
                dim, s_val_min
            );
            continue;
        }

        let u: f64 = rng.gen();
        // Convex combination: the extent s_val_max - s_val_min may overflow.
        let mut threshold = s_val_min * (1.0 - u) + s_val_max * u;
        if !(threshold > s_val_min && threshold <= s_val_max) {
            threshold = s_val_max;
        }
        let split = OrthogonalSplit::new(dim, threshold);
        let score = score(ts, &sorted, &split, kind)?;
        if best.map_or(true, |b| score > b.score) {
            best = Some(SplitCandidate { split, score });
        }
    }

    Ok(best.map_or(SplitSearch::NoSplit, SplitSearch::Found))
}
