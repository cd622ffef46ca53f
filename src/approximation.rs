use std::{fmt, str::FromStr};

use ndarray::{Array1, ArrayView1};

use crate::error::RegForestError;
use crate::tools::statistics;
use crate::training_set::TrainingSet;

const SINGULAR_PIVOT: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApproximationKind {
    /// Piecewise constant: the mean of the leaf's outputs.
    #[default]
    Constant,
    /// Piecewise linear: least squares fit with an intercept.
    Linear,
}

impl FromStr for ApproximationKind {
    type Err = RegForestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "constant" | "pwc" => Ok(Self::Constant),
            "linear" | "pwl" => Ok(Self::Linear),
            other => Err(RegForestError::config(format!(
                "Unknown approximation kind '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ApproximationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant => write!(f, "PWC"),
            Self::Linear => write!(f, "PWL"),
        }
    }
}

/// Local model held by a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Approximation {
    Constant(f64),
    Linear {
        intercept: f64,
        coefficients: Array1<f64>,
    },
}

impl Approximation {
    /// Fits the requested kind over `subset`. A linear fit over a singular
    /// design (too few or collinear samples) degrades to the constant mean.
    pub fn fit(kind: ApproximationKind, ts: &TrainingSet, subset: &[usize]) -> Self {
        let values = ts.values(subset);
        match kind {
            ApproximationKind::Constant => Self::Constant(statistics::mean(&values)),
            ApproximationKind::Linear => fit_linear(ts, subset, &values)
                .unwrap_or_else(|| Self::Constant(statistics::mean(&values))),
        }
    }

    #[inline]
    pub fn eval(&self, input: ArrayView1<f64>) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Linear {
                intercept,
                coefficients,
            } => intercept + coefficients.dot(&input),
        }
    }

    pub fn kind(&self) -> ApproximationKind {
        match self {
            Self::Constant(_) => ApproximationKind::Constant,
            Self::Linear { .. } => ApproximationKind::Linear,
        }
    }

    /// Mean squared residual of this model over `subset`, `0.0` when empty.
    pub fn mean_squared_residual(&self, ts: &TrainingSet, subset: &[usize]) -> f64 {
        if subset.is_empty() {
            return 0.0;
        }
        subset
            .iter()
            .map(|&i| (ts.value(i) - self.eval(ts.input(i))).powi(2))
            .sum::<f64>()
            / subset.len() as f64
    }
}

/// Average squared error left by fitting `kind` over `subset`.
pub fn avg_squared_error(kind: ApproximationKind, ts: &TrainingSet, subset: &[usize]) -> f64 {
    match kind {
        ApproximationKind::Constant => statistics::variance(&ts.values(subset)),
        ApproximationKind::Linear => {
            Approximation::fit(kind, ts, subset).mean_squared_residual(ts, subset)
        }
    }
}

/// Normal equations on the design matrix `[1, x]`.
fn fit_linear(ts: &TrainingSet, subset: &[usize], values: &[f64]) -> Option<Approximation> {
    let p = ts.input_dim() + 1;
    if subset.len() < p {
        return None;
    }
    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];
    let mut row = vec![1.0; p];
    for (&idx, &label) in subset.iter().zip(values) {
        for (r, &v) in row[1..].iter_mut().zip(ts.input(idx).iter()) {
            *r = v;
        }
        for i in 0..p {
            for j in 0..p {
                xtx[i][j] += row[i] * row[j];
            }
            xty[i] += row[i] * label;
        }
    }

    let beta = solve_linear_system(&mut xtx, &mut xty)?;
    Some(Approximation::Linear {
        intercept: beta[0],
        coefficients: Array1::from(beta[1..].to_vec()),
    })
}

/// Gaussian elimination with partial pivoting, `None` when singular.
fn solve_linear_system(a: &mut [Vec<f64>], b: &mut [f64]) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let (max_row, max_val) = a
            .iter()
            .enumerate()
            .skip(col)
            .map(|(i, row)| (i, row[col].abs()))
            .max_by(|a, b| a.1.total_cmp(&b.1))?;
        if max_val < SINGULAR_PIVOT {
            return None;
        }
        if max_row != col {
            a.swap(col, max_row);
            b.swap(col, max_row);
        }

        let pivot_row = a[col].clone();
        let pivot_b = b[col];
        for row_idx in col + 1..n {
            let factor = a[row_idx][col] / pivot_row[col];
            for (a_elem, pivot_elem) in a[row_idx].iter_mut().zip(&pivot_row) {
                *a_elem -= factor * pivot_elem;
            }
            b[row_idx] -= factor * pivot_b;
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for (j, &xj) in x.iter().enumerate().skip(i + 1) {
            sum -= a[i][j] * xj;
        }
        x[i] = sum / a[i][i];
    }
    Some(x)
}
