use rand::{seq::index::sample, Rng};

/// `k` distinct indices in `[0, n)`, drawn without replacement.
pub fn k_distinct<R: Rng + ?Sized>(rng: &mut R, k: usize, n: usize) -> Vec<usize> {
    sample(rng, n, k).into_vec()
}

/// Uniform draw in `[min, max]` that tolerates `min == max` and extents
/// wider than `f64::MAX`.
#[inline]
pub fn uniform_in<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    let u = rng.gen::<f64>();
    (min * (1.0 - u) + max * u).max(min).min(max)
}
