use std::{env, time::Instant};

use log::info;
use ndarray::{s, Array1, ArrayView1};
use rand::{rngs::StdRng, SeedableRng};
use regforest::{
    active::{self, ActiveTreeParamsBuilder},
    approximation::ApproximationKind,
    extra_trees::{self, ExtraTreesParamsBuilder},
    space::Space,
    io::load_csv,
    training_set::Sample,
    FitResult, FittedModel, RegForestError, TrainingSet,
};

fn main() -> regforest::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first() {
        Some(path) => {
            let n_trees = match args.get(1) {
                Some(n) => n.parse::<usize>().map_err(|e| RegForestError::Parse {
                    message: format!("n_trees '{}': {}", n, e),
                })?,
                None => 50,
            };
            run_extra_trees(path, n_trees)
        }
        None => run_active_demo(),
    }
}

/// Fits a forest on the first half of the file and reports the error on the second half.
fn run_extra_trees(path: &str, n_trees: usize) -> regforest::Result<()> {
    let ts = load_csv(path)?;
    let n = ts.len();
    let all = ts.all_indices();
    let x = ts.inputs(&all);
    let y = Array1::from(ts.values(&all));
    info!("Fitting on {} samples, testing on {}", n / 2, n - n / 2);

    let x_train = x.slice(s![..n / 2, ..]);
    let y_train = y.slice(s![..n / 2]);
    let x_test = x.slice(s![n / 2.., ..]);
    let y_test = y.slice(s![n / 2..]);
    let train = TrainingSet::from_arrays(x_train, y_train)?;

    let params = ExtraTreesParamsBuilder::new()
        .k(ts.input_dim())
        .n_min(5)
        .n_trees(n_trees)
        .build();
    let start = Instant::now();
    let (fr, model) = extra_trees::fit_forest(&train, &params)?;
    info!("Time elapsed: {:?}", start.elapsed());

    let mean = y_test.mean().unwrap_or(0.0);
    let base_err = y_test.mapv(|v| (v - mean).powi(2)).mean().unwrap_or(0.0);
    let preds = model.predict(x_test);
    let test_err = (&y_test - &preds).pow2().mean().unwrap_or(0.0);
    println!(
        "Base error: {:?}, Training Error: {:?}, Test Error: {:?}",
        base_err, fr.err, test_err
    );
    Ok(())
}

fn ripple(x: ArrayView1<f64>) -> f64 {
    let r = (x[0] - 0.5).hypot(x[1] - 0.5);
    if r < 0.25 {
        (12.0 * r).cos()
    } else {
        0.0
    }
}

/// Learns a radial bump on the unit square by querying it.
fn run_active_demo() -> regforest::Result<()> {
    let space = Space::from_bounds(&[(0.0, 1.0), (0.0, 1.0)])?;
    let params = ActiveTreeParamsBuilder::new(space)
        .k(2)
        .n_min(4)
        .min_density(400.0)
        .max_leafs(200)
        .n_trees(10)
        .approximation(ApproximationKind::Linear)
        .build();

    let start = Instant::now();
    let (stats, forest) = active::fit_forest(&params, &ripple)?;
    info!("Time elapsed: {:?}", start.elapsed());
    for (i, s) in stats.iter().enumerate() {
        info!(
            "Tree {}: {} leaves, {} oracle calls, {} failed splits",
            i, s.leaf_count, s.oracle_calls, s.failed_splits
        );
    }

    let mut check = TrainingSet::new(2);
    let mut rng = StdRng::seed_from_u64(0);
    for input in params.space.sample_uniform(&mut rng, 2000) {
        let output = ripple(input.view());
        check.push(Sample::new(input, output))?;
    }
    let fr = FitResult::from_model(&forest, &check);
    println!("Test Error: {:?}", fr.err);
    Ok(())
}
