use log::{debug, error, info};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg(feature = "use-rayon")]
use rayon::prelude::*;

use crate::approximation::Approximation;
use crate::error::{RegForestError, Result};
use crate::forest::RegressionForest;
use crate::space::Space;
use crate::split::{find_best_split, SplitSearch};
use crate::tools::statistics;
use crate::training_set::{Subset, TrainingSet};
use crate::tree::{NodeId, RegressionTree};
use crate::FitResult;

use super::params::ExtraTreesParams;

/// Grows a single tree over the whole training set.
pub fn fit_tree<R: Rng + ?Sized>(
    ts: &TrainingSet,
    hyperparameters: &ExtraTreesParams,
    rng: &mut R,
) -> Result<(FitResult, RegressionTree)> {
    hyperparameters.validate(ts.input_dim())?;
    let tree = grow_tree(ts, hyperparameters, rng)?;
    let fit_result = FitResult::from_model(&tree, ts);
    Ok((fit_result, tree))
}

/// Grows `n_trees` independent trees. Each tree gets its own seed drawn from
/// `hyperparameters.seed`, so the result does not depend on the `use-rayon` feature.
pub fn fit_forest(
    ts: &TrainingSet,
    hyperparameters: &ExtraTreesParams,
) -> Result<(FitResult, RegressionForest)> {
    hyperparameters.validate(ts.input_dim())?;
    if ts.is_empty() {
        return Err(RegForestError::EmptyTrainingSet);
    }
    let mut rng = StdRng::seed_from_u64(hyperparameters.seed);

    // Pre-generate seeds for each tree
    let seeds: Vec<u64> = (0..hyperparameters.n_trees).map(|_| rng.gen()).collect();

    let grow_one = |seed: u64| -> Result<RegressionTree> {
        let mut tree_rng = StdRng::seed_from_u64(seed);
        if hyperparameters.bootstrap {
            let resampled = ts.bootstrap(&mut tree_rng);
            grow_tree(&resampled, hyperparameters, &mut tree_rng)
        } else {
            grow_tree(ts, hyperparameters, &mut tree_rng)
        }
    };

    #[cfg(not(feature = "use-rayon"))]
    let trees = seeds
        .iter()
        .map(|&seed| grow_one(seed))
        .collect::<Result<Vec<_>>>()?;

    #[cfg(feature = "use-rayon")]
    let trees = seeds
        .into_par_iter()
        .map(grow_one)
        .collect::<Result<Vec<_>>>()?;

    let forest = RegressionForest::new(trees);
    let fit_result = FitResult::from_model(&forest, ts);
    info!(
        "Extra trees: {} trees, {:.1} leaves on average, training error {:.6}",
        forest.len(),
        forest.trees().iter().map(|t| t.leaf_count()).sum::<usize>() as f64 / forest.len() as f64,
        fit_result.err
    );
    Ok((fit_result, forest))
}

fn grow_tree<R: Rng + ?Sized>(
    ts: &TrainingSet,
    hyperparameters: &ExtraTreesParams,
    rng: &mut R,
) -> Result<RegressionTree> {
    let space = Space::bounding(ts)?;
    let mut grower = ExtraTreeGrower {
        ts,
        hyperparameters,
        rng,
        tree: RegressionTree::new(Approximation::Constant(0.0)),
    };
    grower.grow(RegressionTree::ROOT, ts.all_indices(), &space)?;
    Ok(grower.tree)
}

struct ExtraTreeGrower<'a, R: Rng + ?Sized> {
    ts: &'a TrainingSet,
    hyperparameters: &'a ExtraTreesParams,
    rng: &'a mut R,
    tree: RegressionTree,
}

impl<R: Rng + ?Sized> ExtraTreeGrower<'_, R> {
    fn grow(&mut self, node: NodeId, subset: Subset, space: &Space) -> Result<()> {
        let ExtraTreesParams {
            k,
            n_min,
            min_variance,
            approximation,
            ..
        } = *self.hyperparameters;

        if subset.len() <= n_min
            || statistics::variance(&self.ts.values(&subset)) <= min_variance
        {
            return self.make_leaf(node, &subset);
        }

        let search = find_best_split(self.ts, &subset, k, n_min, approximation, &mut *self.rng);
        self.settle(node, subset, space, search)
    }

    /// Applies the outcome of a split search: recurse into both sides, or keep
    /// a leaf when no split is available or the split left a side empty.
    fn settle(
        &mut self,
        node: NodeId,
        subset: Subset,
        space: &Space,
        search: Result<SplitSearch>,
    ) -> Result<()> {
        let candidate = match search {
            Ok(SplitSearch::Found(candidate)) => candidate,
            Ok(SplitSearch::NoSplit) => {
                debug!(
                    "No possible split for {} samples in {}, keeping a leaf",
                    subset.len(),
                    space
                );
                return self.make_leaf(node, &subset);
            }
            Err(err @ RegForestError::EmptyPartition { .. }) => {
                error!("{} while splitting {}, keeping a leaf", err, space);
                return self.make_leaf(node, &subset);
            }
            Err(err) => return Err(err),
        };

        let (lower, upper) = self.ts.apply_split(&candidate.split, &subset);
        let (lower_id, upper_id) = self.tree.split_leaf(node, candidate.split)?;
        self.grow(lower_id, lower, &space.lower_half(&candidate.split))?;
        self.grow(upper_id, upper, &space.upper_half(&candidate.split))
    }

    fn make_leaf(&mut self, node: NodeId, subset: &[usize]) -> Result<()> {
        let approximation =
            Approximation::fit(self.hyperparameters.approximation, self.ts, subset);
        self.tree.set_approximation(node, approximation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approximation::ApproximationKind;
    use crate::extra_trees::params::ExtraTreesParamsBuilder;
    use crate::test_data::setup_data_hardcoded;
    use crate::FittedModel;
    use ndarray::array;

    fn linear_1d() -> TrainingSet {
        let x = array![[0.0], [2.5], [5.0], [7.5], [10.0]];
        let y = array![0.0, 1.0, 2.0, 3.0, 4.0];
        TrainingSet::from_arrays(x.view(), y.view()).unwrap()
    }

    #[test]
    fn test_linear_1d_splits_but_not_singletons() {
        let ts = linear_1d();
        let params = ExtraTreesParamsBuilder::new().k(1).n_min(1).build();
        let mut rng = StdRng::seed_from_u64(42);
        let (fit_result, tree) = fit_tree(&ts, &params, &mut rng).unwrap();

        assert!(tree.split_count() >= 1);
        // With n_min = 1 every sample ends up alone in its leaf.
        assert_eq!(tree.leaf_count(), ts.len());
        assert!(fit_result.err < 1e-12);
    }

    #[test]
    fn test_min_variance_stops_growth() {
        let ts = linear_1d();
        let params = ExtraTreesParamsBuilder::new().min_variance(100.0).build();
        let mut rng = StdRng::seed_from_u64(42);
        let (fit_result, tree) = fit_tree(&ts, &params, &mut rng).unwrap();
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.eval(array![3.0].view()), 2.0);
        assert!((fit_result.err - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_leaves_partition_samples() {
        let (x, y) = setup_data_hardcoded();
        let ts = TrainingSet::from_arrays(x.view(), y.view()).unwrap();
        let params = ExtraTreesParamsBuilder::new().k(2).n_min(3).build();
        let mut rng = StdRng::seed_from_u64(7);
        let (_, tree) = fit_tree(&ts, &params, &mut rng).unwrap();

        let mut counts = std::collections::HashMap::new();
        for i in 0..ts.len() {
            *counts.entry(tree.leaf_id(ts.input(i))).or_insert(0usize) += 1;
        }
        // Every leaf holds samples and every sample lands in exactly one leaf.
        assert_eq!(counts.len(), tree.leaf_count());
        assert_eq!(counts.values().sum::<usize>(), ts.len());
        assert!(counts.values().all(|&c| c >= 3));
    }

    #[test]
    fn test_linear_approximation() {
        let ts = linear_1d();
        let params = ExtraTreesParamsBuilder::new()
            .n_min(2)
            .approximation(ApproximationKind::Linear)
            .build();
        let mut rng = StdRng::seed_from_u64(42);
        let (fit_result, tree) = fit_tree(&ts, &params, &mut rng).unwrap();
        // Outputs lie on a line, so every leaf reproduces it.
        assert!(fit_result.err < 1e-12);
        assert!((tree.eval(array![6.0].view()) - 2.4).abs() < 1e-8);
    }

    #[test]
    fn test_forest_size_and_reproducibility() {
        let (x, y) = setup_data_hardcoded();
        let ts = TrainingSet::from_arrays(x.view(), y.view()).unwrap();
        let params = ExtraTreesParamsBuilder::new()
            .k(2)
            .n_min(2)
            .n_trees(7)
            .bootstrap(true)
            .seed(11)
            .build();
        let (fit_result, forest) = fit_forest(&ts, &params).unwrap();
        let (_, forest_again) = fit_forest(&ts, &params).unwrap();
        assert_eq!(forest.len(), 7);
        assert_eq!(forest.predict(x.view()), forest_again.predict(x.view()));

        let mean = y.mean().unwrap();
        let base_err = y.mapv(|v| (v - mean).powi(2)).mean().unwrap();
        assert!(fit_result.err < base_err);
    }

    #[test]
    fn test_extreme_finite_inputs() {
        let x = array![[-1e308], [0.0], [1e308]];
        let y = array![0.0, 1.0, 2.0];
        let ts = TrainingSet::from_arrays(x.view(), y.view()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let (fit_result, tree) = fit_tree(&ts, &ExtraTreesParams::default(), &mut rng).unwrap();
        assert_eq!(tree.leaf_count(), 3);
        assert!(fit_result.err < 1e-12);
        assert_eq!(tree.eval(array![1e308].view()), 2.0);
    }

    #[test]
    fn test_empty_partition_keeps_a_leaf() {
        let ts = linear_1d();
        let space = Space::bounding(&ts).unwrap();
        let params = ExtraTreesParams::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut grower = ExtraTreeGrower {
            ts: &ts,
            hyperparameters: &params,
            rng: &mut rng,
            tree: RegressionTree::new(Approximation::Constant(0.0)),
        };
        let empty = RegForestError::EmptyPartition {
            dim: 0,
            threshold: 20.0,
            lower: 5,
            upper: 0,
        };
        grower
            .settle(RegressionTree::ROOT, ts.all_indices(), &space, Err(empty))
            .unwrap();
        assert_eq!(grower.tree.leaf_count(), 1);
        assert_eq!(grower.tree.eval(array![1.0].view()), 2.0);

        // Anything else aborts the growth.
        let res = grower.settle(
            RegressionTree::ROOT,
            ts.all_indices(),
            &space,
            Err(RegForestError::EmptyTrainingSet),
        );
        assert!(matches!(res, Err(RegForestError::EmptyTrainingSet)));
    }

    #[test]
    fn test_invalid_params() {
        let ts = linear_1d();
        let params = ExtraTreesParamsBuilder::new().k(2).build();
        let mut rng = StdRng::seed_from_u64(42);
        assert!(matches!(
            fit_tree(&ts, &params, &mut rng),
            Err(RegForestError::Config { .. })
        ));
    }

    #[test]
    fn test_empty_training_set() {
        let ts = TrainingSet::new(1);
        let params = ExtraTreesParams::default();
        assert!(matches!(
            fit_forest(&ts, &params),
            Err(RegForestError::EmptyTrainingSet)
        ));
    }
}
