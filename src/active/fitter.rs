use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, error, info};
use ndarray::Array1;
use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg(feature = "use-rayon")]
use rayon::prelude::*;

use crate::approximation::Approximation;
use crate::error::{RegForestError, Result};
use crate::forest::RegressionForest;
use crate::space::Space;
use crate::split::{find_best_split, SplitSearch};
use crate::training_set::{OrthogonalSplit, Sample, Subset, TrainingSet};
use crate::tree::{NodeId, RegressionTree};

use super::oracle::Oracle;
use super::params::ActiveTreeParams;

/// Bookkeeping of one active growth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrowthStats {
    pub leaf_count: usize,
    pub split_count: usize,
    pub oracle_calls: usize,
    /// Splits abandoned because a side ended up empty.
    pub failed_splits: usize,
    /// Candidates still queued when the leaf budget was reached.
    pub pending_discarded: usize,
}

/// Candidate split of a leaf waiting in the queue.
#[derive(Debug)]
struct SplitEntry {
    node: NodeId,
    gain: f64,
    split: OrthogonalSplit,
    subset: Subset,
    space: Space,
}

impl Ord for SplitEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.gain
            .total_cmp(&other.gain)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for SplitEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SplitEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SplitEntry {}

/// Grows one tree on top of `ts`. Samples of `ts` lying inside the problem
/// space seed the root; new samples drawn from the oracle are appended to `ts`.
pub fn grow_tree<O, R>(
    ts: &mut TrainingSet,
    hyperparameters: &ActiveTreeParams,
    oracle: &O,
    rng: &mut R,
) -> Result<(GrowthStats, RegressionTree)>
where
    O: Oracle + ?Sized,
    R: Rng + ?Sized,
{
    hyperparameters.validate(ts.input_dim())?;
    let root_subset: Subset = (0..ts.len())
        .filter(|&i| hyperparameters.space.contains(ts.input(i)))
        .collect();

    let mut grower = ActiveTreeGrower {
        ts,
        hyperparameters,
        oracle,
        rng,
        tree: RegressionTree::new(Approximation::Constant(0.0)),
        pending: BinaryHeap::new(),
        stats: GrowthStats::default(),
    };
    grower.treat(RegressionTree::ROOT, root_subset, hyperparameters.space.clone())?;
    grower.expand()?;

    let ActiveTreeGrower { tree, mut stats, .. } = grower;
    stats.leaf_count = tree.leaf_count();
    stats.split_count = tree.split_count();
    info!(
        "Leaves: {}/{}, oracle calls: {}, discarded candidates: {}",
        stats.leaf_count, hyperparameters.max_leafs, stats.oracle_calls, stats.pending_discarded
    );
    Ok((stats, tree))
}

/// Grows one tree from scratch and returns the samples it drew.
pub fn fit_tree<O, R>(
    hyperparameters: &ActiveTreeParams,
    oracle: &O,
    rng: &mut R,
) -> Result<(GrowthStats, TrainingSet, RegressionTree)>
where
    O: Oracle + ?Sized,
    R: Rng + ?Sized,
{
    let mut ts = TrainingSet::new(hyperparameters.space.dim());
    let (stats, tree) = grow_tree(&mut ts, hyperparameters, oracle, rng)?;
    Ok((stats, ts, tree))
}

/// Grows `n_trees` trees. With `share_samples` the trees are grown one after
/// the other on a single accumulating training set, otherwise each tree starts
/// from an empty one and trees may be grown in parallel.
pub fn fit_forest<O>(
    hyperparameters: &ActiveTreeParams,
    oracle: &O,
) -> Result<(Vec<GrowthStats>, RegressionForest)>
where
    O: Oracle + ?Sized,
{
    hyperparameters.validate(hyperparameters.space.dim())?;
    let mut rng = StdRng::seed_from_u64(hyperparameters.seed);
    let seeds: Vec<u64> = (0..hyperparameters.n_trees).map(|_| rng.gen()).collect();

    let grown: Vec<(GrowthStats, RegressionTree)> = if hyperparameters.share_samples {
        let mut ts = TrainingSet::new(hyperparameters.space.dim());
        seeds
            .iter()
            .map(|&seed| {
                let mut tree_rng = StdRng::seed_from_u64(seed);
                grow_tree(&mut ts, hyperparameters, oracle, &mut tree_rng)
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        let grow_one = |seed: u64| -> Result<(GrowthStats, RegressionTree)> {
            let mut tree_rng = StdRng::seed_from_u64(seed);
            let (stats, _, tree) = fit_tree(hyperparameters, oracle, &mut tree_rng)?;
            Ok((stats, tree))
        };

        #[cfg(not(feature = "use-rayon"))]
        let grown = seeds
            .iter()
            .map(|&seed| grow_one(seed))
            .collect::<Result<Vec<_>>>()?;

        #[cfg(feature = "use-rayon")]
        let grown = seeds
            .into_par_iter()
            .map(grow_one)
            .collect::<Result<Vec<_>>>()?;

        grown
    };

    let (stats, trees): (Vec<GrowthStats>, Vec<RegressionTree>) = grown.into_iter().unzip();
    Ok((stats, RegressionForest::new(trees)))
}

struct ActiveTreeGrower<'a, O: ?Sized, R: ?Sized> {
    ts: &'a mut TrainingSet,
    hyperparameters: &'a ActiveTreeParams,
    oracle: &'a O,
    rng: &'a mut R,
    tree: RegressionTree,
    pending: BinaryHeap<SplitEntry>,
    stats: GrowthStats,
}

impl<O, R> ActiveTreeGrower<'_, O, R>
where
    O: Oracle + ?Sized,
    R: Rng + ?Sized,
{
    /// Commits the most promising pending split until the queue is empty or
    /// the leaf budget is reached.
    fn expand(&mut self) -> Result<()> {
        let mut nb_leafs = self.tree.leaf_count();
        while nb_leafs < self.hyperparameters.max_leafs {
            let Some(entry) = self.pending.pop() else {
                break;
            };
            if self.commit(entry)? {
                nb_leafs += 1;
            }
        }
        self.stats.pending_discarded = self.pending.len();
        self.pending.clear();
        Ok(())
    }

    /// Splits the entry's leaf and treats both children. Returns `false` and
    /// keeps the leaf when a side of the split holds no sample.
    fn commit(&mut self, entry: SplitEntry) -> Result<bool> {
        let (lower, upper) = self.ts.apply_split(&entry.split, &entry.subset);
        let lower_space = entry.space.lower_half(&entry.split);
        let upper_space = entry.space.upper_half(&entry.split);
        if lower.is_empty() || upper.is_empty() {
            error!(
                "Empty side when committing split ({}, {}) with gain {}: \
                 {} lower / {} upper samples, parent space {}, lower space {}, upper space {}",
                entry.split.dim,
                entry.split.threshold,
                entry.gain,
                lower.len(),
                upper.len(),
                entry.space,
                lower_space,
                upper_space
            );
            self.stats.failed_splits += 1;
            return Ok(false);
        }

        let (lower_id, upper_id) = self.tree.split_leaf(entry.node, entry.split)?;
        self.treat(lower_id, lower, lower_space)?;
        self.treat(upper_id, upper, upper_space)?;
        Ok(true)
    }

    /// Samples the leaf up to the requested density, fits its approximation
    /// and queues its best split when the leaf is worth refining.
    fn treat(&mut self, node: NodeId, mut subset: Subset, space: Space) -> Result<()> {
        let ActiveTreeParams {
            k,
            n_min,
            min_pot_gain,
            min_density,
            approximation,
            ..
        } = *self.hyperparameters;

        self.populate(&mut subset, &space, 2 * n_min, min_density)?;

        let approx = Approximation::fit(approximation, self.ts, &subset);
        let volume = space.volume();
        let pot_gain = approx.mean_squared_residual(self.ts, &subset) * volume;
        self.tree.set_approximation(node, approx)?;
        if pot_gain < min_pot_gain {
            return Ok(());
        }

        let search = find_best_split(self.ts, &subset, k, n_min, approximation, &mut *self.rng);
        self.queue(node, subset, space, search)
    }

    /// Queues a found split with its gain weighted by the leaf volume. Any
    /// other recoverable outcome leaves the node as a final leaf.
    fn queue(
        &mut self,
        node: NodeId,
        subset: Subset,
        space: Space,
        search: Result<SplitSearch>,
    ) -> Result<()> {
        match search {
            Ok(SplitSearch::Found(candidate)) => {
                self.pending.push(SplitEntry {
                    node,
                    gain: candidate.score * space.volume(),
                    split: candidate.split,
                    subset,
                    space,
                });
            }
            Ok(SplitSearch::NoSplit) => {
                debug!("No available splits for node {:?} in {}", node, space);
            }
            Err(err @ RegForestError::EmptyPartition { .. }) => {
                error!("{} for node {:?} in {}, keeping a leaf", err, node, space);
                self.stats.failed_splits += 1;
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }

    fn populate(
        &mut self,
        subset: &mut Subset,
        space: &Space,
        min_size: usize,
        min_density: f64,
    ) -> Result<()> {
        let by_density = (min_density * space.volume()).ceil() as usize;
        let wished = min_size.max(by_density).saturating_sub(subset.len());
        if wished == 0 {
            return Ok(());
        }
        let inputs = space.sample_uniform(&mut *self.rng, wished);
        let outputs = self.query(&inputs);
        self.stats.oracle_calls += wished;
        subset.reserve(wished);
        for (input, output) in inputs.into_iter().zip(outputs) {
            subset.push(self.ts.push(Sample::new(input, output))?);
        }
        Ok(())
    }

    #[cfg(not(feature = "use-rayon"))]
    fn query(&self, inputs: &[Array1<f64>]) -> Vec<f64> {
        inputs.iter().map(|i| self.oracle.eval(i.view())).collect()
    }

    #[cfg(feature = "use-rayon")]
    fn query(&self, inputs: &[Array1<f64>]) -> Vec<f64> {
        // Only the oracle crosses threads, the grower holds the rng.
        let oracle = self.oracle;
        inputs.par_iter().map(|i| oracle.eval(i.view())).collect()
    }
}
