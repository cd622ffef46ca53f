//! Extremely randomized trees (Geurts et al., 2006) grown depth-first over a
//! fixed training set.
mod fitter;
pub mod params;

pub use fitter::{fit_forest, fit_tree};
pub use params::{ExtraTreesParams, ExtraTreesParamsBuilder};
