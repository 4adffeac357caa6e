//! Deterministic input generation from a logistic-map recurrence.

use tracing::instrument;

use super::Matrix;
use crate::error::Result;

/// Iterator over the logistic map `s ← s · (1 − s) · 4`.
///
/// The first item is the first iterate, not the seed itself. Seeds inside
/// `(0, 1)` stay in `[0, 1]`; other seeds are not rejected and produce
/// whatever the recurrence yields.
#[derive(Debug, Clone, Copy)]
pub struct LogisticMap {
    state: f32,
}

impl LogisticMap {
    pub fn new(seed: f32) -> Self {
        LogisticMap { state: seed }
    }
}

impl Iterator for LogisticMap {
    type Item = f32;

    #[inline(always)]
    fn next(&mut self) -> Option<f32> {
        self.state = self.state * (1.0 - self.state) * 4.0;
        Some(self.state)
    }
}

/// Generates the two `n × n` row-major inputs of a product.
///
/// A single recurrence stream alternates destinations: the next iterate goes
/// to `A[idx]`, the one after to `B[idx]`, for `idx` in linear order. The same
/// `seed` and `n` always produce the same matrices.
#[instrument(level = "debug")]
pub fn generate(seed: f32, n: usize) -> Result<(Matrix, Matrix)> {
    let mut a = Matrix::zeros(n)?;
    let mut b = Matrix::zeros(n)?;

    let mut stream = LogisticMap::new(seed);
    for (x, y) in a.as_mut_slice().iter_mut().zip(b.as_mut_slice().iter_mut()) {
        // LogisticMap never ends
        *x = stream.next().unwrap_or_default();
        *y = stream.next().unwrap_or_default();
    }

    Ok((a, b))
}
