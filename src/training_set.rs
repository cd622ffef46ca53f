use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;

use crate::error::{RegForestError, Result};

/// Ordered indices into a [`TrainingSet`], used instead of copying samples.
pub type Subset = Vec<usize>;

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    input: Array1<f64>,
    output: f64,
}

impl Sample {
    pub fn new(input: Array1<f64>, output: f64) -> Self {
        Self { input, output }
    }

    pub fn input(&self) -> ArrayView1<'_, f64> {
        self.input.view()
    }

    pub fn output(&self) -> f64 {
        self.output
    }
}

/// Axis-aligned hyperplane: samples with `input[dim] < threshold` go to the lower side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthogonalSplit {
    pub dim: usize,
    pub threshold: f64,
}

impl OrthogonalSplit {
    pub const fn new(dim: usize, threshold: f64) -> Self {
        Self { dim, threshold }
    }

    #[inline]
    pub fn is_lower(&self, input: ArrayView1<f64>) -> bool {
        input[self.dim] < self.threshold
    }
}

/// Append-only sample storage. Inputs are stored row-major in a single buffer.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    input_dim: usize,
    inputs: Vec<f64>,
    outputs: Vec<f64>,
}

impl TrainingSet {
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn from_arrays(x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(RegForestError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        let mut ts = Self::new(x.ncols());
        ts.inputs.reserve(x.len());
        for (idx, (row, &output)) in x.axis_iter(Axis(0)).zip(y.iter()).enumerate() {
            check_finite(idx, row, output)?;
            ts.inputs.extend(row.iter());
            ts.outputs.push(output);
        }
        Ok(ts)
    }

    pub fn push(&mut self, sample: Sample) -> Result<usize> {
        if sample.input.len() != self.input_dim {
            return Err(RegForestError::DimensionMismatch {
                expected: self.input_dim,
                got: sample.input.len(),
            });
        }
        check_finite(self.len(), sample.input(), sample.output)?;
        self.inputs.extend(sample.input.iter());
        self.outputs.push(sample.output);
        Ok(self.outputs.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn all_indices(&self) -> Subset {
        (0..self.len()).collect()
    }

    #[inline]
    pub fn input(&self, idx: usize) -> ArrayView1<'_, f64> {
        let start = idx * self.input_dim;
        ArrayView1::from(&self.inputs[start..start + self.input_dim])
    }

    #[inline]
    pub fn value(&self, idx: usize) -> f64 {
        self.outputs[idx]
    }

    pub fn sample(&self, idx: usize) -> Sample {
        Sample::new(self.input(idx).to_owned(), self.value(idx))
    }

    pub fn values(&self, subset: &[usize]) -> Vec<f64> {
        subset.iter().map(|&i| self.outputs[i]).collect()
    }

    pub fn inputs(&self, subset: &[usize]) -> Array2<f64> {
        let mut x = Array2::zeros((subset.len(), self.input_dim));
        for (mut row, &i) in x.axis_iter_mut(Axis(0)).zip(subset) {
            row.assign(&self.input(i));
        }
        x
    }

    /// Values of one input dimension over a subset, in subset order.
    pub fn dim_values(&self, subset: &[usize], dim: usize) -> Vec<f64> {
        subset.iter().map(|&i| self.input(i)[dim]).collect()
    }

    /// Sorts the subset in place by ascending value of `dim`.
    pub fn sort_subset(&self, subset: &mut [usize], dim: usize) {
        subset.sort_by(|&a, &b| self.input(a)[dim].total_cmp(&self.input(b)[dim]));
    }

    /// Splits a subset into (lower, upper), preserving the relative order of indices.
    pub fn apply_split(&self, split: &OrthogonalSplit, subset: &[usize]) -> (Subset, Subset) {
        subset
            .iter()
            .partition(|&&i| split.is_lower(self.input(i)))
    }

    /// Resample with replacement, same size as the original set.
    pub fn bootstrap<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let n = self.len();
        let mut ts = Self::new(self.input_dim);
        ts.inputs.reserve(self.inputs.len());
        ts.outputs.reserve(n);
        for _ in 0..n {
            let idx = rng.gen_range(0..n);
            ts.inputs.extend_from_slice(&self.inputs[idx * self.input_dim..(idx + 1) * self.input_dim]);
            ts.outputs.push(self.outputs[idx]);
        }
        ts
    }
}

fn check_finite(idx: usize, input: ArrayView1<f64>, output: f64) -> Result<()> {
    if input.iter().all(|v| v.is_finite()) && output.is_finite() {
        return Ok(());
    }
    Err(RegForestError::config(format!(
        "Sample {} is not finite: input {}, output {}",
        idx, input, output
    )))
}
