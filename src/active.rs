//! Best-first tree growth with active sampling: candidate splits of every leaf
//! wait in one priority queue ordered by estimated gain, and leaves draw new
//! samples from an [`Oracle`] until they reach the requested density.
mod fitter;
pub mod oracle;
pub mod params;

pub use fitter::{fit_forest, fit_tree, grow_tree, GrowthStats};
pub use oracle::Oracle;
pub use params::{ActiveTreeParams, ActiveTreeParamsBuilder};
