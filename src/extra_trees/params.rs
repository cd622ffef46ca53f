use crate::approximation::ApproximationKind;
use crate::error::{RegForestError, Result};

#[derive(Debug, Clone)]
pub struct ExtraTreesParams {
    /// Number of dimensions probed per split.
    pub k: usize,
    /// Nodes with at most `n_min` samples become leaves, and every split keeps
    /// at least `n_min` samples on each side.
    pub n_min: usize,
    pub n_trees: usize,
    /// Nodes whose output variance is at or below this value become leaves.
    pub min_variance: f64,
    pub bootstrap: bool,
    pub approximation: ApproximationKind,
    pub seed: u64,
}

impl ExtraTreesParams {
    pub fn validate(&self, input_dim: usize) -> Result<()> {
        if self.k == 0 || self.k > input_dim {
            return Err(RegForestError::config(format!(
                "k must be in [1, {}], got {}",
                input_dim, self.k
            )));
        }
        if self.n_min == 0 {
            return Err(RegForestError::config("n_min must be at least 1"));
        }
        if self.n_trees == 0 {
            return Err(RegForestError::config("n_trees must be at least 1"));
        }
        if self.min_variance.is_nan() || self.min_variance < 0.0 {
            return Err(RegForestError::config(format!(
                "min_variance must be non-negative, got {}",
                self.min_variance
            )));
        }
        Ok(())
    }
}

// Builder for ExtraTreesParams
#[derive(Debug, Clone)]
pub struct ExtraTreesParamsBuilder {
    k: usize,
    n_min: usize,
    n_trees: usize,
    min_variance: f64,
    bootstrap: bool,
    approximation: ApproximationKind,
    seed: u64,
}

impl ExtraTreesParamsBuilder {
    pub fn new() -> Self {
        Self {
            k: 1,
            n_min: 1,
            n_trees: 1,
            min_variance: 0.0,
            bootstrap: false,
            approximation: ApproximationKind::Constant,
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

    pub fn n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn min_variance(mut self, min_variance: f64) -> Self {
        self.min_variance = min_variance;
        self
    }

    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn approximation(mut self, approximation: ApproximationKind) -> Self {
        self.approximation = approximation;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> ExtraTreesParams {
        ExtraTreesParams {
            k: self.k,
            n_min: self.n_min,
            n_trees: self.n_trees,
            min_variance: self.min_variance,
            bootstrap: self.bootstrap,
            approximation: self.approximation,
            seed: self.seed,
        }
    }
}

impl Default for ExtraTreesParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ExtraTreesParams {
    fn default() -> Self {
        ExtraTreesParamsBuilder::new().build()
    }
}
