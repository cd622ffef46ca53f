use crate::approximation::ApproximationKind;
use crate::error::{RegForestError, Result};
use crate::space::Space;

#[derive(Debug, Clone)]
pub struct ActiveTreeParams {
    /// Bounding space of the whole problem.
    pub space: Space,
    pub k: usize,
    pub n_min: usize,
    /// Leaves whose potential gain is below this value are never split.
    pub min_pot_gain: f64,
    pub max_leafs: usize,
    /// Requested samples per unit volume in every leaf.
    pub min_density: f64,
    pub n_trees: usize,
    pub approximation: ApproximationKind,
    /// Grow the trees of a forest from one accumulating training set instead
    /// of a fresh one per tree.
    pub share_samples: bool,
    pub seed: u64,
}

impl ActiveTreeParams {
    pub fn validate(&self, input_dim: usize) -> Result<()> {
        let dim = self.space.dim();
        if dim == 0 {
            return Err(RegForestError::config("space must have at least one dimension"));
        }
        if dim != input_dim {
            return Err(RegForestError::DimensionMismatch {
                expected: dim,
                got: input_dim,
            });
        }
        if !(0..dim).all(|d| self.space.min(d).is_finite() && self.space.max(d).is_finite()) {
            return Err(RegForestError::config(format!(
                "space must be bounded, got {}",
                self.space
            )));
        }
        if !self.space.volume().is_finite() {
            return Err(RegForestError::config(format!(
                "space volume overflows, got {}",
                self.space
            )));
        }
        if self.k == 0 || self.k > dim {
            return Err(RegForestError::config(format!(
                "k must be in [1, {}], got {}",
                dim, self.k
            )));
        }
        if self.n_min == 0 {
            return Err(RegForestError::config("n_min must be at least 1"));
        }
        if self.max_leafs == 0 {
            return Err(RegForestError::config("max_leafs must be at least 1"));
        }
        if self.n_trees == 0 {
            return Err(RegForestError::config("n_trees must be at least 1"));
        }
        if !self.min_density.is_finite() || self.min_density < 0.0 {
            return Err(RegForestError::config(format!(
                "min_density must be a non-negative number, got {}",
                self.min_density
            )));
        }
        if self.min_pot_gain.is_nan() {
            return Err(RegForestError::config("min_pot_gain must not be NaN"));
        }
        Ok(())
    }
}

// Builder for ActiveTreeParams
#[derive(Debug, Clone)]
pub struct ActiveTreeParamsBuilder {
    space: Space,
    k: usize,
    n_min: usize,
    min_pot_gain: f64,
    max_leafs: usize,
    min_density: f64,
    n_trees: usize,
    approximation: ApproximationKind,
    share_samples: bool,
    seed: u64,
}

impl ActiveTreeParamsBuilder {
    pub fn new(space: Space) -> Self {
        Self {
            space,
            k: 1,
            n_min: 1,
            min_pot_gain: 0.0,
            max_leafs: 1,
            min_density: 0.0,
            n_trees: 1,
            approximation: ApproximationKind::Constant,
            share_samples: false,
            seed: 42,
        }
    }

    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn n_min(mut self, n_min: usize) -> Self {
        self.n_min = n_min;
        self
    }

    pub fn min_pot_gain(mut self, min_pot_gain: f64) -> Self {
        self.min_pot_gain = min_pot_gain;
        self
    }

    pub fn max_leafs(mut self, max_leafs: usize) -> Self {
        self.max_leafs = max_leafs;
        self
    }

    pub fn min_density(mut self, min_density: f64) -> Self {
        self.min_density = min_density;
        self
    }

    pub fn n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn approximation(mut self, approximation: ApproximationKind) -> Self {
        self.approximation = approximation;
        self
    }

    pub fn share_samples(mut self, share_samples: bool) -> Self {
        self.share_samples = share_samples;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> ActiveTreeParams {
        ActiveTreeParams {
            space: self.space,
            k: self.k,
            n_min: self.n_min,
            min_pot_gain: self.min_pot_gain,
            max_leafs: self.max_leafs,
            min_density: self.min_density,
            n_trees: self.n_trees,
            approximation: self.approximation,
            share_samples: self.share_samples,
            seed: self.seed,
        }
    }
}
