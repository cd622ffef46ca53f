#[cfg(test)]
mod tests {
    use ndarray::{array, ArrayView1};
    use rand::{rngs::StdRng, SeedableRng};
    use regforest::{
        active::{fit_forest, fit_tree, grow_tree, ActiveTreeParamsBuilder, Oracle},
        approximation::ApproximationKind,
        space::Space,
        FittedModel, TrainingSet,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Oracle remembering how often it was queried.
    struct Counting<F> {
        f: F,
        calls: AtomicUsize,
    }

    impl<F: Fn(f64) -> f64 + Sync> Oracle for Counting<F> {
        fn eval(&self, input: ArrayView1<f64>) -> f64 {
            self.calls.fetch_add(1, Ordering::Relaxed);
            (self.f)(input[0])
        }
    }

    fn counting<F: Fn(f64) -> f64 + Sync>(f: F) -> Counting<F> {
        Counting {
            f,
            calls: AtomicUsize::new(0),
        }
    }

    fn saddle(x: ArrayView1<f64>) -> f64 {
        x[0] * x[0] - x[1] * x[1]
    }

    #[test]
    fn test_min_pot_gain_above_achievable_gain() {
        let space = Space::from_bounds(&[(0.0, 10.0)]).unwrap();
        let oracle = counting(|x| x);
        for max_leafs in [1, 10, 1000] {
            let params = ActiveTreeParamsBuilder::new(space.clone())
                .n_min(2)
                .min_density(5.0)
                // Residuals of x on [0, 10] are below 100, the volume is 10.
                .min_pot_gain(1000.0)
                .max_leafs(max_leafs)
                .build();
            let mut rng = StdRng::seed_from_u64(1);
            let (stats, ts, tree) = fit_tree(&params, &oracle, &mut rng).unwrap();
            assert_eq!(tree.leaf_count(), 1);
            assert_eq!(stats.split_count, 0);
            assert_eq!(ts.len(), 50);
        }
        assert_eq!(oracle.calls.load(Ordering::Relaxed), 150);
    }

    #[test]
    fn test_prepopulated_root_issues_no_oracle_calls() {
        let space = Space::from_bounds(&[(0.0, 10.0)]).unwrap();
        let x = array![[1.0], [3.0], [6.0], [9.0]];
        let y = x.column(0).to_owned();
        let mut ts = TrainingSet::from_arrays(x.view(), y.view()).unwrap();
        let oracle = counting(|x| x);
        let params = ActiveTreeParamsBuilder::new(space)
            .n_min(2)
            .min_density(0.0)
            .max_leafs(1)
            .build();
        let mut rng = StdRng::seed_from_u64(3);
        let (stats, tree) = grow_tree(&mut ts, &params, &oracle, &mut rng).unwrap();
        assert_eq!(oracle.calls.load(Ordering::Relaxed), 0);
        assert_eq!(stats.oracle_calls, 0);
        assert_eq!(tree.eval(array![5.0].view()), 4.75);
    }

    #[test]
    fn test_leaf_count_and_budget() {
        let space = Space::from_bounds(&[(-1.0, 1.0), (-1.0, 1.0)]).unwrap();
        for (seed, max_leafs) in [(0, 1), (1, 3), (2, 8), (3, 40)] {
            let params = ActiveTreeParamsBuilder::new(space.clone())
                .k(2)
                .n_min(3)
                .min_density(30.0)
                .max_leafs(max_leafs)
                .seed(seed)
                .build();
            let (stats, forest) = fit_forest(&params, &saddle).unwrap();
            assert_eq!(forest.len(), 1);
            let tree = &forest.trees()[0];
            assert!(tree.leaf_count() <= max_leafs);
            assert_eq!(tree.leaf_count(), stats[0].split_count + 1);
            assert_eq!(stats[0].failed_splits, 0);
        }
    }

    #[test]
    fn test_forest_approximates_oracle() {
        let space = Space::from_bounds(&[(-1.0, 1.0), (-1.0, 1.0)]).unwrap();
        let params = ActiveTreeParamsBuilder::new(space.clone())
            .k(2)
            .n_min(4)
            .min_density(100.0)
            .max_leafs(30)
            .n_trees(4)
            .approximation(ApproximationKind::Linear)
            .build();
        let (stats, forest) = fit_forest(&params, &saddle).unwrap();
        assert_eq!(forest.len(), 4);
        assert_eq!(stats.len(), 4);

        let mut rng = StdRng::seed_from_u64(99);
        let points = space.sample_uniform(&mut rng, 300);
        let err = points
            .iter()
            .map(|p| (forest.eval(p.view()) - saddle(p.view())).powi(2))
            .sum::<f64>()
            / points.len() as f64;
        // The saddle has a variance of 8/45 over the square.
        assert!(err < 0.05, "error {}", err);

        let x = array![[0.3, -0.2], [-0.9, 0.9]];
        assert_eq!(forest.predict(x.view()), forest.predict(x.view()));
    }
}
