use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::tree::RegressionTree;
use crate::FittedModel;

/// Ensemble of independently grown trees. Predictions are the mean of the members.
#[derive(Debug, Clone, Default)]
pub struct RegressionForest {
    trees: Vec<RegressionTree>,
}

impl RegressionForest {
    pub const fn new(trees: Vec<RegressionTree>) -> Self {
        Self { trees }
    }

    pub fn push(&mut self, tree: RegressionTree) {
        self.trees.push(tree);
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn eval(&self, input: ArrayView1<f64>) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.eval(input)).sum::<f64>() / self.trees.len() as f64
    }
}

impl FittedModel for RegressionForest {
    fn predict(&self, x: ArrayView2<f64>) -> Array1<f64> {
        let mut result = Array1::zeros(x.nrows());
        if self.trees.is_empty() {
            return result;
        }
        for tree in &self.trees {
            result += &tree.predict(x);
        }
        result / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approximation::Approximation;
    use crate::training_set::OrthogonalSplit;
    use ndarray::array;

    #[test]
    fn test_forest_averages_members() {
        let mut split_tree = RegressionTree::new(Approximation::Constant(0.0));
        let (_, upper) = split_tree
            .split_leaf(RegressionTree::ROOT, OrthogonalSplit::new(0, 0.0))
            .unwrap();
        split_tree
            .set_approximation(upper, Approximation::Constant(4.0))
            .unwrap();

        let mut forest = RegressionForest::default();
        forest.push(split_tree);
        forest.push(RegressionTree::new(Approximation::Constant(2.0)));
        assert_eq!(forest.len(), 2);

        let x = array![[-1.0], [1.0]];
        assert_eq!(forest.predict(x.view()), array![1.0, 3.0]);
        assert_eq!(forest.eval(array![1.0].view()), 3.0);
    }

    #[test]
    fn test_empty_forest_predicts_zero() {
        let forest = RegressionForest::default();
        assert!(forest.is_empty());
        assert_eq!(forest.predict(array![[1.0]].view()), array![0.0]);
    }
}
