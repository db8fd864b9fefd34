//! Triggers deciding whether a logger records a call
//!
//! Every logger owns its triggers: `OnImprovement` keeps the best value of
//! the current run, which must never leak into another logger.

use serde::{Deserialize, Serialize};

use crate::problem::{LogInfo, OptimizationType};

/// A single logging trigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Trigger {
    /// Fire on every call.
    Always,
    /// Fire when the best value strictly improves on the last recorded one.
    OnImprovement {
        /// Best value seen in the current run (`None` before the first call).
        best: Option<f64>,
    },
}

impl Trigger {
    /// A fresh on-improvement trigger.
    #[must_use]
    pub const fn on_improvement() -> Self {
        Self::OnImprovement { best: None }
    }

    /// Whether the call described by `info` should be logged.
    pub fn fire(&mut self, info: &LogInfo, optimization: OptimizationType) -> bool {
        match self {
            Self::Always => true,
            Self::OnImprovement { best } => {
                let reference = best.unwrap_or_else(|| optimization.worst());
                if optimization.is_better(info.y_best, reference) {
                    *best = Some(info.y_best);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Forget per-run state.
    pub fn reset(&mut self) {
        if let Self::OnImprovement { best } = self {
            *best = None;
        }
    }
}

/// A set of triggers; a call is logged if any of them fires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Triggers {
    triggers: Vec<Trigger>,
}

impl Triggers {
    /// Empty set: nothing fires.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            triggers: Vec::new(),
        }
    }

    /// Set holding one trigger.
    #[must_use]
    pub fn single(trigger: Trigger) -> Self {
        Self {
            triggers: vec![trigger],
        }
    }

    /// Add a trigger.
    pub fn insert(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    /// Number of triggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Evaluate every trigger (all of them update their state) and report
    /// whether at least one fired.
    pub fn fire(&mut self, info: &LogInfo, optimization: OptimizationType) -> bool {
        self.triggers
            .iter_mut()
            .fold(false, |fired, t| t.fire(info, optimization) || fired)
    }

    /// Reset every trigger.
    pub fn reset(&mut self) {
        self.triggers.iter_mut().for_each(Trigger::reset);
    }
}
