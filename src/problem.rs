//! Problem identity and per-call log information
//!
//! The objective-function machinery lives outside this crate; loggers only
//! see what is described here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of the optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OptimizationType {
    /// Lower objective values are better.
    #[default]
    Minimization,
    /// Higher objective values are better.
    Maximization,
}

impl OptimizationType {
    /// Whether `a` is strictly better than `b`.
    #[must_use]
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Self::Minimization => a < b,
            Self::Maximization => a > b,
        }
    }

    /// Whether `a` is better than or equal to `b`.
    #[must_use]
    pub fn is_better_or_eq(self, a: f64, b: f64) -> bool {
        self.is_better(a, b) || a == b
    }

    /// The worst possible objective value (the initial "best so far").
    #[must_use]
    pub const fn worst(self) -> f64 {
        match self {
            Self::Minimization => f64::INFINITY,
            Self::Maximization => f64::NEG_INFINITY,
        }
    }
}

impl fmt::Display for OptimizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimization => f.write_str("minimization"),
            Self::Maximization => f.write_str("maximization"),
        }
    }
}

/// Identity of the problem instance being optimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemMeta {
    /// Problem identifier within its suite.
    pub problem_id: i32,
    /// Number of decision variables.
    pub n_variables: i32,
    /// Instance identifier.
    pub instance: i32,
    /// Optimization direction.
    pub optimization_type: OptimizationType,
}

impl ProblemMeta {
    /// Create problem metadata.
    #[must_use]
    pub const fn new(
        problem_id: i32,
        n_variables: i32,
        instance: i32,
        optimization_type: OptimizationType,
    ) -> Self {
        Self {
            problem_id,
            n_variables,
            instance,
            optimization_type,
        }
    }
}

/// What a logger sees from one objective-function call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogInfo {
    /// Number of objective-function calls so far, this one included.
    pub evaluations: u64,
    /// Best (transformed) objective value found so far in the run.
    pub y_best: f64,
    /// Known optimum value, or an infinite / NaN sentinel when unknown.
    pub optimum: f64,
}

impl LogInfo {
    /// Log information for a problem with a known optimum.
    #[must_use]
    pub const fn new(evaluations: u64, y_best: f64, optimum: f64) -> Self {
        Self {
            evaluations,
            y_best,
            optimum,
        }
    }

    /// Log information for a problem whose optimum is unknown.
    #[must_use]
    pub const fn without_optimum(evaluations: u64, y_best: f64) -> Self {
        Self::new(evaluations, y_best, f64::INFINITY)
    }

    /// Whether the optimum is known (finite).
    #[must_use]
    pub fn has_optimum(&self) -> bool {
        self.optimum.is_finite()
    }
}
