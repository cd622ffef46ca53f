use ndarray::ArrayView1;

/// Black-box function sampled by the active grower. It may be expensive and
/// is called once per requested sample, possibly from several threads.
pub trait Oracle: Sync {
    fn eval(&self, input: ArrayView1<f64>) -> f64;
}

impl<F> Oracle for F
where
    F: for<'a> Fn(ArrayView1<'a, f64>) -> f64 + Sync,
{
    #[inline]
    fn eval(&self, input: ArrayView1<f64>) -> f64 {
        self(input)
    }
}
