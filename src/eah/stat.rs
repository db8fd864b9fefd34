//! Statistics over an [`Eah`] store
//!
//! - [`sum`]: number of attained cells across every run
//! - [`Histogram`]: element-wise sum of all attainment matrices
//! - [`distribution`]: histogram divided by the number of runs
//! - [`under_curve::volume`]: area under the empirical attainment
//!   distribution, weighted by bucket widths so that the result stays in
//!   `[0, 1]` whatever the scales

use serde::{Deserialize, Serialize};

use super::Eah;
use crate::{Error, Result};

/// Fold `op` over every cell of every stored matrix.
pub fn accumulate<T, F>(logger: &Eah, init: T, op: F) -> T
where
    F: Fn(T, bool) -> T,
{
    logger
        .data()
        .values()
        .flat_map(|mat| mat.iter_rows().flatten().copied())
        .fold(init, op)
}

/// Total number of attained cells in the store.
#[must_use]
pub fn sum(logger: &Eah) -> usize {
    accumulate(logger, 0, |acc, cell| acc + usize::from(cell))
}

/// Per-cell attainment counts, summed over every run of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    counts: Vec<Vec<usize>>,
    nb_attainments: usize,
}

impl Histogram {
    /// Sum every attainment matrix of `logger`.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyStore`] if no run was logged
    /// - [`Error::ShapeMismatch`] if matrices differ in shape
    pub fn of(logger: &Eah) -> Result<Self> {
        let mut matrices = logger.data().values();
        let first = matrices
            .next()
            .ok_or_else(|| Error::EmptyStore("EAH histogram".to_string()))?;
        let shape = first.shape();
        let mut counts = vec![vec![0usize; shape.1]; shape.0];
        let mut nb_attainments = 0;
        for mat in std::iter::once(first).chain(matrices) {
            if mat.shape() != shape {
                return Err(Error::ShapeMismatch {
                    expected: shape,
                    found: mat.shape(),
                });
            }
            for (agg, row) in counts.iter_mut().zip(mat.iter_rows()) {
                for (count, &cell) in agg.iter_mut().zip(row) {
                    *count += usize::from(cell);
                }
            }
            nb_attainments += 1;
        }
        Ok(Self {
            counts,
            nb_attainments,
        })
    }

    /// Counts, indexed `[error bucket][evaluation bucket]`.
    #[must_use]
    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Consume into the count matrix.
    #[must_use]
    pub fn into_counts(self) -> Vec<Vec<usize>> {
        self.counts
    }

    /// Number of matrices summed.
    #[must_use]
    pub const fn nb_attainments(&self) -> usize {
        self.nb_attainments
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Counts divided by the number of runs.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn distribution(&self) -> Vec<Vec<f64>> {
        let n = self.nb_attainments as f64;
        self.counts
            .iter()
            .map(|row| row.iter().map(|&c| c as f64 / n).collect())
            .collect()
    }
}

/// Element-wise sum of all attainment matrices.
///
/// # Errors
///
/// See [`Histogram::of`].
pub fn histogram(logger: &Eah) -> Result<Vec<Vec<usize>>> {
    Histogram::of(logger).map(Histogram::into_counts)
}

/// Empirical attainment probability of each cell.
///
/// # Errors
///
/// See [`Histogram::of`].
pub fn distribution(logger: &Eah) -> Result<Vec<Vec<f64>>> {
    Histogram::of(logger).map(|h| h.distribution())
}

/// Statistics integrating the attainment distribution over the domain.
pub mod under_curve {
    use super::Histogram;
    use crate::eah::Eah;
    use crate::Result;

    /// Fold `op` over the weighted cells of the attainment distribution.
    ///
    /// Each cell weighs `p * w_error * w_evals`: its attainment probability
    /// times the fraction of each domain its buckets cover.
    ///
    /// # Errors
    ///
    /// See [`Histogram::of`].
    #[allow(clippy::cast_precision_loss)]
    pub fn accumulate<F>(logger: &Eah, init: f64, op: F) -> Result<f64>
    where
        F: Fn(f64, f64) -> f64,
    {
        let histo = Histogram::of(logger)?;
        let range_error = logger.error_range();
        let range_evals = logger.eval_range();
        let n = histo.nb_attainments() as f64;

        let w_evals = (0..range_evals.size())
            .map(|j| Ok(range_evals.width(j)? / range_evals.length()))
            .collect::<Result<Vec<f64>>>()?;

        let mut res = init;
        for (i, row) in histo.counts().iter().enumerate() {
            let w_error = range_error.width(i)? / range_error.length();
            for (&count, &w_eval) in row.iter().zip(&w_evals) {
                let w_proba = count as f64 / n;
                res = op(res, w_proba * w_error * w_eval);
            }
        }
        Ok(res)
    }

    /// Volume under the attainment distribution, in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// See [`Histogram::of`].
    pub fn volume(logger: &Eah) -> Result<f64> {
        accumulate(logger, 0.0, |acc, w| acc + w)
    }
}
