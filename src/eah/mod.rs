//! Empirical Attainment Histogram (EAH) logger
//!
//! Each run gets a boolean [`AttainmentMatrix`] of shape
//! `(error buckets, evaluation buckets)`. A cell `(i, j)` becomes true once
//! the run reached an error in bucket `i` (or better) within the evaluations
//! of bucket `j` (or fewer). Cells never revert to false.
//!
//! ## Store layout
//!
//! ```text
//! (problem, dimension, instance, run) ──> AttainmentMatrix
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use attainment_db::eah::{self, Eah};
//! use attainment_db::{LogInfo, Logger, OptimizationType, ProblemMeta, Scale};
//!
//! # fn main() -> attainment_db::Result<()> {
//! let mut logger = Eah::with_scales(Scale::linear(0.0, 10.0, 10)?, Scale::linear(0.0, 100.0, 10)?);
//! let problem = ProblemMeta::new(1, 2, 1, OptimizationType::Minimization);
//!
//! logger.track_problem(&problem);
//! logger.log(&LogInfo::new(10, 4.0, 0.0));
//! logger.log(&LogInfo::new(50, 1.0, 0.0));
//!
//! let distribution = eah::stat::distribution(&logger)?;
//! assert!(distribution[9][9] > 0.0);
//! # Ok(())
//! # }
//! ```

pub mod colormap;
pub mod stat;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use colormap::colormap;

use crate::invariant::Invariants;
use crate::problem::{LogInfo, OptimizationType, ProblemMeta};
use crate::scale::Scale;
use crate::store::{count_distinct, RunCounter};
use crate::trigger::{Trigger, Triggers};
use crate::{Error, Logger, Result};

/// Direction in which a new attainment propagates along the error axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Larger error buckets are easier targets (errors, or minimization).
    Ascending,
    /// Smaller buckets are easier targets (maximization without optimum).
    Descending,
}

/// Boolean grid `(error buckets) x (evaluation buckets)`, all false at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttainmentMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl AttainmentMatrix {
    /// Create an all-false matrix.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// Number of error buckets.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of evaluation buckets.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Cell value, `None` outside the grid.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<bool> {
        (i < self.rows && j < self.cols).then(|| self.cells[i * self.cols + j])
    }

    /// Row `i` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[bool] {
        &self.cells[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterate over rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(self.cols.max(1)).take(self.rows)
    }

    /// Number of attained cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    fn set(&mut self, i: usize, j: usize) {
        self.cells[i * self.cols + j] = true;
    }

    /// Mark `(i_error, j_evals)` and every easier target as attained.
    ///
    /// Easier targets are later evaluation buckets (`j >= j_evals`) and worse
    /// error buckets (following `fill`). The fill walks rows away from
    /// `i_error` and stops at the first already-attained cell: by
    /// monotonicity, everything beyond it is attained already. The column
    /// bound only shrinks from row to row, which makes the fill a staircase
    /// and keeps repeated calls close to constant time.
    ///
    /// # Panics
    ///
    /// Panics if `(i_error, j_evals)` is outside the grid.
    pub fn fill_up(&mut self, i_error: usize, j_evals: usize, fill: Fill) {
        assert!(
            i_error < self.rows && j_evals < self.cols,
            "cell ({i_error}, {j_evals}) outside a {}x{} matrix",
            self.rows,
            self.cols
        );
        let rows: Box<dyn Iterator<Item = usize>> = match fill {
            Fill::Ascending => Box::new(i_error..self.rows),
            Fill::Descending => Box::new((0..=i_error).rev()),
        };
        let mut jbound = self.cols;
        for i in rows {
            if self[(i, j_evals.min(jbound - 1))] {
                break;
            }
            for j in j_evals..jbound {
                if self[(i, j)] {
                    jbound = j;
                    break;
                }
                self.set(i, j);
            }
        }
    }
}

impl Index<(usize, usize)> for AttainmentMatrix {
    type Output = bool;

    fn index(&self, (i, j): (usize, usize)) -> &bool {
        assert!(i < self.rows && j < self.cols, "cell ({i}, {j}) out of bounds");
        &self.cells[i * self.cols + j]
    }
}

impl fmt::Display for AttainmentMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            for &cell in row {
                write!(f, "{} ", u8::from(cell))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Store key of one run's attainment matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EahKey {
    /// Problem identifier.
    pub problem: i32,
    /// Number of variables.
    pub dimension: i32,
    /// Instance identifier.
    pub instance: i32,
    /// Run index within the instance.
    pub run: usize,
}

impl EahKey {
    /// Create a key.
    #[must_use]
    pub const fn new(problem: i32, dimension: i32, instance: i32, run: usize) -> Self {
        Self {
            problem,
            dimension,
            instance,
            run,
        }
    }

    const fn instance_key(&self) -> (i32, i32, i32) {
        (self.problem, self.dimension, self.instance)
    }
}

/// The run currently fed to the logger.
#[derive(Debug, Clone, Copy)]
struct Current {
    key: EahKey,
    optimization: OptimizationType,
    is_tracked: bool,
    has_opt: bool,
    opt: f64,
}

/// Empirical Attainment Histogram logger.
///
/// Records, per run, which `(error, evaluations)` targets were attained. The
/// error is `|optimum - y_best|` when the optimum is known, `y_best` itself
/// otherwise.
#[derive(Debug, Clone)]
pub struct Eah {
    range_error: Scale,
    range_evals: Scale,
    current: Option<Current>,
    data: BTreeMap<EahKey, AttainmentMatrix>,
    runs: RunCounter<(i32, i32, i32)>,
    triggers: Triggers,
    invariants: Invariants,
}

impl Eah {
    /// Logger with base-10 logarithmic scales on both axes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScale`] if either domain is empty or has no
    /// bucket.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(
        error_min: f64,
        error_max: f64,
        error_buckets: usize,
        evals_min: u64,
        evals_max: u64,
        evals_buckets: usize,
    ) -> Result<Self> {
        Ok(Self::with_scales(
            Scale::log10(error_min, error_max, error_buckets)?,
            Scale::log10(evals_min as f64, evals_max as f64, evals_buckets)?,
        ))
    }

    /// Logger with explicit error and evaluation scales.
    #[must_use]
    pub fn with_scales(range_error: Scale, range_evals: Scale) -> Self {
        Self {
            range_error,
            range_evals,
            current: None,
            data: BTreeMap::new(),
            runs: RunCounter::default(),
            triggers: Triggers::single(Trigger::on_improvement()),
            invariants: Invariants::default(),
        }
    }

    /// Replace the invariant policy.
    #[must_use]
    pub const fn with_invariants(mut self, invariants: Invariants) -> Self {
        self.invariants = invariants;
        self
    }

    /// Replace the triggers (on-improvement by default).
    #[must_use]
    pub fn with_triggers(mut self, triggers: Triggers) -> Self {
        self.triggers = triggers;
        self
    }

    /// The whole store.
    #[must_use]
    pub const fn data(&self) -> &BTreeMap<EahKey, AttainmentMatrix> {
        &self.data
    }

    /// Attainment matrix of one run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such run was logged.
    pub fn at(
        &self,
        problem: i32,
        dimension: i32,
        instance: i32,
        run: usize,
    ) -> Result<&AttainmentMatrix> {
        let key = EahKey::new(problem, dimension, instance, run);
        self.data
            .get(&key)
            .ok_or_else(|| Error::NotFound(format!("attainment matrix {key:?}")))
    }

    /// `(problems, dimensions, instances, runs)`.
    ///
    /// Each count is read from the first branch of its parent level, which
    /// is only meaningful for a rectangular store.
    #[must_use]
    pub fn size(&self) -> (usize, usize, usize, usize) {
        let Some(first) = self.data.keys().next().copied() else {
            return (0, 0, 0, 0);
        };
        let keys = || self.data.keys();
        (
            count_distinct(keys().map(|k| k.problem)),
            count_distinct(
                keys()
                    .filter(|k| k.problem == first.problem)
                    .map(|k| k.dimension),
            ),
            count_distinct(
                keys()
                    .filter(|k| k.problem == first.problem && k.dimension == first.dimension)
                    .map(|k| k.instance),
            ),
            keys()
                .filter(|k| k.instance_key() == first.instance_key())
                .count(),
        )
    }

    /// Scale of the error axis (matrix rows).
    #[must_use]
    pub const fn error_range(&self) -> &Scale {
        &self.range_error
    }

    /// Scale of the evaluations axis (matrix columns).
    #[must_use]
    pub const fn eval_range(&self) -> &Scale {
        &self.range_evals
    }

    /// Drop every stored matrix.
    pub fn clear(&mut self) {
        self.data.clear();
        self.runs.clear();
        if let Some(current) = self.current.as_mut() {
            current.is_tracked = false;
            current.key.run = 0;
        }
    }

    fn start_tracking(&mut self, current: &mut Current, info: &LogInfo) {
        current.is_tracked = true;
        current.has_opt = info.has_optimum();
        if current.has_opt {
            debug!(optimum = info.optimum, "problem has known optimum, EAH of the error");
            current.opt = info.optimum;
        } else {
            debug!("problem has no known optimum, absolute EAH");
        }
        self.data.insert(
            current.key,
            AttainmentMatrix::new(self.range_error.size(), self.range_evals.size()),
        );
        self.runs
            .record(current.key.instance_key(), current.key.run);
    }
}

impl Logger for Eah {
    fn attach_suite(&mut self, suite_name: &str) {
        debug!(suite = suite_name, "EAH attached to a new suite, clearing");
        self.clear();
    }

    fn attach_problem(&mut self, problem: &ProblemMeta) {
        let mut key = EahKey::new(problem.problem_id, problem.n_variables, problem.instance, 0);
        key.run = self.runs.next_run(&key.instance_key());
        debug!(?key, "EAH attached to problem");
        self.current = Some(Current {
            key,
            optimization: problem.optimization_type,
            is_tracked: false,
            has_opt: false,
            opt: f64::NAN,
        });
        self.triggers.reset();
    }

    #[allow(clippy::cast_precision_loss)]
    fn call(&mut self, info: &LogInfo) {
        let Some(mut current) = self.current else {
            warn!("EAH called without an attached problem, sample ignored");
            return;
        };
        if !current.is_tracked {
            self.start_tracking(&mut current, info);
            self.current = Some(current);
        }

        let err = if current.has_opt {
            (current.opt - info.y_best).abs()
        } else {
            info.y_best
        };
        let evals = info.evaluations as f64;
        let (Ok(i_error), Ok(j_evals)) = (self.range_error.index(err), self.range_evals.index(evals))
        else {
            warn!(
                error = err,
                error_min = self.range_error.min(),
                error_max = self.range_error.max(),
                evaluations = info.evaluations,
                evals_min = self.range_evals.min(),
                evals_max = self.range_evals.max(),
                "target out of domain, sample discarded"
            );
            return;
        };

        let fill = if current.has_opt || current.optimization == OptimizationType::Minimization {
            Fill::Ascending
        } else {
            Fill::Descending
        };
        if let Some(mat) = self.data.get_mut(&current.key) {
            mat.fill_up(i_error, j_evals, fill);
            self.invariants.check(mat[(i_error, j_evals)], || {
                format!("cell ({i_error}, {j_evals}) not attained after fill")
            });
        }
    }

    fn reset(&mut self) {
        self.triggers.reset();
    }

    fn triggers_mut(&mut self) -> &mut Triggers {
        &mut self.triggers
    }

    fn optimization_type(&self) -> OptimizationType {
        self.current
            .map(|c| c.optimization)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_problem() -> ProblemMeta {
        ProblemMeta::new(1, 10, 1, OptimizationType::Minimization)
    }

    fn linear_logger() -> Eah {
        Eah::with_scales(
            Scale::linear(0.0, 10.0, 10).unwrap(),
            Scale::linear(0.0, 100.0, 10).unwrap(),
        )
    }

    #[test]
    fn test_fill_up_ascending_quadrant() {
        let mut mat = AttainmentMatrix::new(4, 4);
        mat.fill_up(1, 2, Fill::Ascending);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(mat[(i, j)], i >= 1 && j >= 2, "cell ({i}, {j})");
            }
        }
    }

    #[test]
    fn test_fill_up_staircase() {
        let mut mat = AttainmentMatrix::new(4, 4);
        mat.fill_up(2, 1, Fill::Ascending);
        mat.fill_up(0, 3, Fill::Ascending);
        mat.fill_up(1, 2, Fill::Ascending);
        let expected = [
            [false, false, false, true],
            [false, false, true, true],
            [false, true, true, true],
            [false, true, true, true],
        ];
        for (i, row) in expected.iter().enumerate() {
            assert_eq!(mat.row(i), row);
        }
        assert_eq!(mat.count(), 9);
    }

    #[test]
    fn test_fill_up_descending_quadrant() {
        let mut mat = AttainmentMatrix::new(4, 3);
        mat.fill_up(2, 1, Fill::Descending);
        for i in 0..4 {
            for j in 0..3 {
                assert_eq!(mat[(i, j)], i <= 2 && j >= 1, "cell ({i}, {j})");
            }
        }
    }

    #[test]
    fn test_display_prints_bits() {
        let mut mat = AttainmentMatrix::new(2, 2);
        mat.fill_up(1, 1, Fill::Ascending);
        assert_eq!(mat.to_string(), "0 0 \n0 1 \n");
    }

    #[test]
    fn test_run_numbering_per_instance() {
        let mut logger = linear_logger();
        for _ in 0..3 {
            logger.track_problem(&min_problem());
            logger.log(&LogInfo::new(10, 5.0, 0.0));
        }
        let other = ProblemMeta::new(2, 10, 1, OptimizationType::Minimization);
        logger.track_problem(&other);
        logger.log(&LogInfo::new(10, 5.0, 0.0));

        assert!(logger.at(1, 10, 1, 2).is_ok());
        assert!(logger.at(2, 10, 1, 0).is_ok());
        assert!(logger.at(2, 10, 1, 1).is_err());
        assert_eq!(logger.size(), (2, 1, 1, 3));
    }

    #[test]
    fn test_attach_without_samples_reuses_run() {
        let mut logger = linear_logger();
        logger.track_problem(&min_problem());
        logger.track_problem(&min_problem());
        logger.log(&LogInfo::new(10, 5.0, 0.0));
        assert!(logger.at(1, 10, 1, 0).is_ok());
        assert_eq!(logger.data().len(), 1);
    }

    #[test]
    fn test_call_without_problem_is_ignored() {
        let mut logger = linear_logger();
        logger.call(&LogInfo::new(10, 5.0, 0.0));
        assert!(logger.data().is_empty());
        assert_eq!(logger.size(), (0, 0, 0, 0));
    }

    #[test]
    fn test_attach_suite_clears() {
        let mut logger = linear_logger();
        logger.track_problem(&min_problem());
        logger.log(&LogInfo::new(10, 5.0, 0.0));
        logger.attach_suite("BBOB");
        assert!(logger.data().is_empty());
    }
}
