pub mod active;
pub mod approximation;
pub mod error;
pub mod extra_trees;
pub mod forest;
pub mod io;
pub mod space;
pub mod split;
#[cfg(test)]
mod test_data;
pub mod tools;
pub mod training_set;
pub mod tree;

use ndarray::{Array1, ArrayView2};

pub use error::{RegForestError, Result};
pub use forest::RegressionForest;
pub use training_set::TrainingSet;
pub use tree::RegressionTree;

#[derive(Debug)]
pub struct FitResult {
    pub err: f64,
    pub residuals: Array1<f64>,
    pub y_hat: Array1<f64>,
}

impl FitResult {
    /// Mean squared error of `model` over every sample of `ts`.
    pub fn from_model<M: FittedModel>(model: &M, ts: &TrainingSet) -> Self {
        let all = ts.all_indices();
        let y = Array1::from(ts.values(&all));
        let y_hat = model.predict(ts.inputs(&all).view());
        let residuals = &y - &y_hat;
        let err = residuals.pow2().mean().unwrap_or(0.0);
        Self {
            err,
            residuals,
            y_hat,
        }
    }
}

pub trait FittedModel {
    fn predict(&self, x: ArrayView2<f64>) -> Array1<f64>;
}
