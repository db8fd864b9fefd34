//! Empirical Attainment Function (EAF) logger
//!
//! Records, for every run, the front of `(quality, time)` points at which the
//! best-so-far quality strictly improved. "Time" is the number of
//! objective-function calls.
//!
//! ## Store layout
//!
//! ```text
//! (suite, problem, dimension, instance, run) ──> Front
//! ```
//!
//! Runs are numbered `0, 1, 2, ...` per `(suite, problem, dimension,
//! instance)`, in attachment order.
//!
//! ## Usage
//!
//! ```rust
//! use attainment_db::eaf::{self, Eaf};
//! use attainment_db::{LogInfo, Logger, OptimizationType, ProblemMeta};
//!
//! # fn main() -> attainment_db::Result<()> {
//! let mut logger = Eaf::new();
//! let problem = ProblemMeta::new(1, 2, 1, OptimizationType::Minimization);
//!
//! for run in [[(10, 5.0), (20, 1.0)], [(5, 3.0), (15, 0.5)]] {
//!     logger.track_problem(&problem);
//!     for (evaluations, y) in run {
//!         logger.log(&LogInfo::without_optimum(evaluations, y));
//!     }
//! }
//!
//! let levels = eaf::levels(OptimizationType::Minimization, &logger, vec![1, 2])?;
//! assert_eq!(levels[&2].last().map(|p| p.quality), Some(1.0));
//! # Ok(())
//! # }
//! ```
//!
//! References:
//! - Fonseca et al. (2011): On the Computation of the Empirical Attainment Function
//! - López-Ibáñez et al. (2010): Exploratory Analysis of Stochastic Local Search
//!   Algorithms in Biobjective Optimization

mod levels;
pub mod stat;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use levels::{levels, LevelFronts, Levels};

use crate::invariant::Invariants;
use crate::problem::{LogInfo, OptimizationType, ProblemMeta};
use crate::store::{count_distinct, RunCounter};
use crate::trigger::{Trigger, Triggers};
use crate::{Error, Logger, Result};

/// Suite name used until a suite is attached.
pub const DEFAULT_SUITE: &str = "None";

/// A point of the quality/time plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Objective function value.
    pub quality: f64,
    /// Number of objective-function calls.
    pub time: u64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(quality: f64, time: u64) -> Self {
        Self { quality, time }
    }
}

/// A point tagged with a run index.
///
/// In level fronts, `run` holds the number of runs attaining the point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunPoint {
    /// Objective function value.
    pub quality: f64,
    /// Number of objective-function calls.
    pub time: u64,
    /// Run index (or attaining-run count in level fronts).
    pub run: usize,
}

impl RunPoint {
    /// Create a run point.
    #[must_use]
    pub const fn new(quality: f64, time: u64, run: usize) -> Self {
        Self { quality, time, run }
    }

    /// The underlying point.
    #[must_use]
    pub const fn point(&self) -> Point {
        Point::new(self.quality, self.time)
    }
}

/// Points of one run, in the order they were logged.
pub type Front = Vec<RunPoint>;

/// Order by increasing time.
#[must_use]
pub fn ascending_time(a: &RunPoint, b: &RunPoint) -> Ordering {
    a.time.cmp(&b.time)
}

/// Order by decreasing time.
#[must_use]
pub fn descending_time(a: &RunPoint, b: &RunPoint) -> Ordering {
    b.time.cmp(&a.time)
}

/// Order by increasing quality.
#[must_use]
pub fn ascending_quality(a: &RunPoint, b: &RunPoint) -> Ordering {
    a.quality.total_cmp(&b.quality)
}

/// Order by decreasing quality.
#[must_use]
pub fn descending_quality(a: &RunPoint, b: &RunPoint) -> Ordering {
    b.quality.total_cmp(&a.quality)
}

/// Order from the worst to the best quality for the given direction.
#[must_use]
pub fn worst_quality_first(
    optimization: OptimizationType,
) -> fn(&RunPoint, &RunPoint) -> Ordering {
    match optimization {
        OptimizationType::Minimization => descending_quality,
        OptimizationType::Maximization => ascending_quality,
    }
}

/// Position in the store: which front ingestion currently appends to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cursor {
    /// Suite name.
    pub suite: String,
    /// Problem identifier.
    pub problem: i32,
    /// Number of variables.
    pub dimension: i32,
    /// Instance identifier.
    pub instance: i32,
    /// Run index within the instance.
    pub run: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(DEFAULT_SUITE, 0, 0, 0, 0)
    }
}

impl Cursor {
    /// Create a cursor.
    #[must_use]
    pub fn new(
        suite: impl Into<String>,
        problem: i32,
        dimension: i32,
        instance: i32,
        run: usize,
    ) -> Self {
        Self {
            suite: suite.into(),
            problem,
            dimension,
            instance,
            run,
        }
    }

    fn instance_key(&self) -> (String, i32, i32, i32) {
        (self.suite.clone(), self.problem, self.dimension, self.instance)
    }

    fn same_instance(&self, other: &Self) -> bool {
        self.suite == other.suite
            && self.problem == other.problem
            && self.dimension == other.dimension
            && self.instance == other.instance
    }
}

/// Empirical Attainment Function logger.
///
/// Only fed with strictly improving samples: it owns an on-improvement
/// trigger, and [`Logger::call`] checks the improvement under the invariant
/// policy.
#[derive(Debug, Clone)]
pub struct Eaf {
    data: BTreeMap<Cursor, Front>,
    current: Cursor,
    runs: RunCounter<(String, i32, i32, i32)>,
    optimization: OptimizationType,
    current_best: f64,
    attached: bool,
    triggers: Triggers,
    invariants: Invariants,
}

impl Default for Eaf {
    fn default() -> Self {
        Self::new()
    }
}

impl Eaf {
    /// Create an empty logger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            current: Cursor::default(),
            runs: RunCounter::default(),
            optimization: OptimizationType::default(),
            current_best: OptimizationType::default().worst(),
            attached: false,
            triggers: Triggers::single(Trigger::on_improvement()),
            invariants: Invariants::default(),
        }
    }

    /// Replace the invariant policy.
    #[must_use]
    pub fn with_invariants(mut self, invariants: Invariants) -> Self {
        self.invariants = invariants;
        self
    }

    /// The whole store.
    #[must_use]
    pub const fn data(&self) -> &BTreeMap<Cursor, Front> {
        &self.data
    }

    /// Front of one run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such run was logged.
    pub fn front(&self, cursor: &Cursor) -> Result<&Front> {
        self.data
            .get(cursor)
            .ok_or_else(|| Error::NotFound(format!("front {cursor:?}")))
    }

    /// Where ingestion currently appends.
    #[must_use]
    pub const fn current(&self) -> &Cursor {
        &self.current
    }

    /// Optimization direction of the last attached problem.
    #[must_use]
    pub const fn optimization(&self) -> OptimizationType {
        self.optimization
    }

    /// Whether a problem was ever attached.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// Total number of stored fronts.
    #[must_use]
    pub fn nb_runs(&self) -> usize {
        self.data.len()
    }

    /// Number of runs of every `(suite, problem, dimension, instance)`.
    pub fn runs_per_instance(&self) -> impl Iterator<Item = usize> + '_ {
        self.runs.counts()
    }

    /// `(problems, dimensions, instances, runs)` of the first suite.
    ///
    /// Each count is read from the first branch of its parent level, which
    /// is only meaningful for a rectangular store.
    #[must_use]
    pub fn size(&self) -> (usize, usize, usize, usize) {
        let Some(first) = self.data.keys().next() else {
            return (0, 0, 0, 0);
        };
        let suite = || self.data.keys().filter(|k| k.suite == first.suite);
        (
            count_distinct(suite().map(|k| k.problem)),
            count_distinct(
                suite()
                    .filter(|k| k.problem == first.problem)
                    .map(|k| k.dimension),
            ),
            count_distinct(
                suite()
                    .filter(|k| k.problem == first.problem && k.dimension == first.dimension)
                    .map(|k| k.instance),
            ),
            suite().filter(|k| k.same_instance(first)).count(),
        )
    }
}

impl Logger for Eaf {
    fn attach_suite(&mut self, suite_name: &str) {
        self.current.suite = suite_name.to_string();
    }

    fn attach_problem(&mut self, problem: &ProblemMeta) {
        self.current.problem = problem.problem_id;
        self.current.dimension = problem.n_variables;
        self.current.instance = problem.instance;
        self.current.run = self.runs.next_run(&self.current.instance_key());
        self.optimization = problem.optimization_type;
        self.current_best = problem.optimization_type.worst();
        self.attached = true;
        self.triggers.reset();
        debug!(
            suite = %self.current.suite,
            problem = self.current.problem,
            dimension = self.current.dimension,
            instance = self.current.instance,
            run = self.current.run,
            "EAF attached to problem"
        );
    }

    fn call(&mut self, info: &LogInfo) {
        if !self.attached {
            warn!("EAF called without an attached problem, sample ignored");
            return;
        }
        let (best, optimization) = (self.current_best, self.optimization);
        self.invariants.check(optimization.is_better(info.y_best, best), || {
            format!(
                "EAF sample {} does not improve on {best} ({optimization})",
                info.y_best
            )
        });
        self.current_best = info.y_best;

        let point = RunPoint::new(info.y_best, info.evaluations, self.current.run);
        if let Some(front) = self.data.get_mut(&self.current) {
            front.push(point);
        } else {
            self.runs
                .record(self.current.instance_key(), self.current.run);
            self.data.insert(self.current.clone(), vec![point]);
        }
    }

    fn reset(&mut self) {
        self.triggers.reset();
        self.current_best = self.optimization.worst();
    }

    fn triggers_mut(&mut self) -> &mut Triggers {
        &mut self.triggers
    }

    fn optimization_type(&self) -> OptimizationType {
        self.optimization
    }
}
