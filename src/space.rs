use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::Rng;

use crate::error::{RegForestError, Result};
use crate::tools::random::uniform_in;
use crate::training_set::{OrthogonalSplit, TrainingSet};

/// Axis-aligned hyper-rectangle stored as a D x 2 matrix: column 0 holds the
/// minimum of each dimension, column 1 the maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct Space {
    limits: Array2<f64>,
}

impl Space {
    pub fn new(limits: Array2<f64>) -> Result<Self> {
        if limits.ncols() != 2 {
            return Err(RegForestError::config(format!(
                "Expecting 2 columns for a space, got {}",
                limits.ncols()
            )));
        }
        for (dim, row) in limits.axis_iter(Axis(0)).enumerate() {
            if row[0].is_nan() || row[1].is_nan() || row[1] < row[0] {
                return Err(RegForestError::config(format!(
                    "Space has a max inferior to min in dimension {}: [{}, {}]",
                    dim, row[0], row[1]
                )));
            }
        }
        Ok(Self { limits })
    }

    pub fn from_bounds(bounds: &[(f64, f64)]) -> Result<Self> {
        let mut limits = Array2::zeros((bounds.len(), 2));
        for (dim, &(min, max)) in bounds.iter().enumerate() {
            limits[[dim, 0]] = min;
            limits[[dim, 1]] = max;
        }
        Self::new(limits)
    }

    /// Smallest space containing every input of the training set.
    pub fn bounding(ts: &TrainingSet) -> Result<Self> {
        if ts.is_empty() {
            return Err(RegForestError::EmptyTrainingSet);
        }
        let bounds = (0..ts.input_dim())
            .map(|dim| {
                ts.dim_values(&ts.all_indices(), dim)
                    .into_iter()
                    .minmax_by(|a, b| a.total_cmp(b))
                    .into_option()
                    .unwrap_or((0.0, 0.0))
            })
            .collect_vec();
        Self::from_bounds(&bounds)
    }

    pub fn dim(&self) -> usize {
        self.limits.nrows()
    }

    #[inline]
    pub fn min(&self, dim: usize) -> f64 {
        self.limits[[dim, 0]]
    }

    #[inline]
    pub fn max(&self, dim: usize) -> f64 {
        self.limits[[dim, 1]]
    }

    /// Product of the extents; any zero-width dimension makes it 0.
    pub fn volume(&self) -> f64 {
        self.limits
            .axis_iter(Axis(0))
            .map(|row| row[1] - row[0])
            .product()
    }

    pub fn contains(&self, input: ArrayView1<f64>) -> bool {
        input.len() == self.dim()
            && input
                .iter()
                .enumerate()
                .all(|(dim, &v)| v >= self.min(dim) && v <= self.max(dim))
    }

    /// Part of the space below the split threshold.
    pub fn lower_half(&self, split: &OrthogonalSplit) -> Self {
        let mut limits = self.limits.clone();
        limits[[split.dim, 1]] = split.threshold;
        Self { limits }
    }

    /// Part of the space at or above the split threshold.
    pub fn upper_half(&self, split: &OrthogonalSplit) -> Self {
        let mut limits = self.limits.clone();
        limits[[split.dim, 0]] = split.threshold;
        Self { limits }
    }

    pub fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<Array1<f64>> {
        (0..count)
            .map(|_| {
                (0..self.dim())
                    .map(|dim| uniform_in(rng, self.min(dim), self.max(dim)))
                    .collect::<Array1<f64>>()
            })
            .collect()
    }
}

impl std::fmt::Display for Space {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self
            .limits
            .axis_iter(Axis(0))
            .map(|row| format!("[{}, {}]", row[0], row[1]))
            .join(" x ");
        write!(f, "{}", text)
    }
}
