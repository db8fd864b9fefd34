//! Attainment level sets
//!
//! For a level `L`, the level set is the staircase of `(time, quality)`
//! points attained by at least `L` runs. All runs of the store are swept
//! together (two-dimensional EAF algorithm, Fonseca et al. 2011):
//!
//! 1. All front points are sorted twice: by ascending time, and from the
//!    worst to the best quality.
//! 2. Walking along time, runs reaching the current quality threshold are
//!    counted until `L` runs attain it.
//! 3. Walking along quality, thresholds are then tightened until fewer than
//!    `L` runs attain them; the last threshold is the level point at the
//!    current time.
//! 4. Both walks resume from where they stopped until the points run out.
//!
//! Points sharing the same time (or the same quality) are always consumed as
//! one group, so tied runs are never split across a level boundary.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::{debug, trace};

use super::{ascending_time, worst_quality_first, Eaf, Front, RunPoint};
use crate::invariant::Invariants;
use crate::problem::OptimizationType;
use crate::{Error, Result};

/// Level index → level front.
pub type LevelFronts = BTreeMap<usize, Front>;

/// Level-set extraction over an [`Eaf`] store.
#[derive(Debug, Clone)]
pub struct Levels {
    optimization: OptimizationType,
    levels: Vec<usize>,
    invariants: Invariants,
}

impl Levels {
    /// Extract every level `0..nb_runs`.
    #[must_use]
    pub fn new(optimization: OptimizationType) -> Self {
        Self::at(optimization, Vec::new())
    }

    /// Extract the given levels (every level if empty).
    #[must_use]
    pub fn at(optimization: OptimizationType, levels: Vec<usize>) -> Self {
        Self {
            optimization,
            levels,
            invariants: Invariants::default(),
        }
    }

    /// Replace the invariant policy.
    #[must_use]
    pub const fn with_invariants(mut self, invariants: Invariants) -> Self {
        self.invariants = invariants;
        self
    }

    /// Optimization direction.
    #[must_use]
    pub const fn optimization(&self) -> OptimizationType {
        self.optimization
    }

    /// Requested levels (empty means all).
    #[must_use]
    pub fn requested(&self) -> &[usize] {
        &self.levels
    }

    /// Level fronts of every run stored in `logger`.
    ///
    /// # Errors
    ///
    /// - [`Error::OptimizationMismatch`] if the logger tracks the other
    ///   direction
    /// - [`Error::EmptyStore`] if no run was logged
    /// - [`Error::EmptyLevel`] if a requested level exceeds what the runs
    ///   attain
    pub fn compute(&self, logger: &Eaf) -> Result<LevelFronts> {
        if logger.is_attached() && logger.optimization() != self.optimization {
            return Err(Error::OptimizationMismatch {
                expected: self.optimization.to_string(),
                found: logger.optimization().to_string(),
            });
        }
        let fronts: Vec<&Front> = logger.data().values().collect();
        self.compute_fronts(&fronts)
    }

    /// Level fronts of arbitrary run fronts; the slice index is the run.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyStore`] if `fronts` is empty
    /// - [`Error::InvalidInput`] if one front has no point
    /// - [`Error::EmptyLevel`] if a requested level is never attained
    pub fn compute_fronts<F: AsRef<[RunPoint]>>(&self, fronts: &[F]) -> Result<LevelFronts> {
        let nb_runs = fronts.len();
        debug!(nb_runs, "runs in the EAF logger");
        if nb_runs == 0 {
            return Err(Error::EmptyStore("EAF levels".to_string()));
        }

        let mut by_time = Vec::new();
        for (run, front) in fronts.iter().enumerate() {
            let front = front.as_ref();
            if front.is_empty() {
                return Err(Error::InvalidInput(format!("front of run {run} is empty")));
            }
            by_time.extend(front.iter().map(|p| RunPoint::new(p.quality, p.time, run)));
        }
        debug!(nb_points = by_time.len(), "front points in the EAF logger");

        let mut by_quality = by_time.clone();
        by_time.sort_by(ascending_time);
        by_quality.sort_by(worst_quality_first(self.optimization));

        let requested: BTreeSet<usize> = if self.levels.is_empty() {
            (0..nb_runs).collect()
        } else {
            self.levels.iter().copied().collect()
        };

        let sweep = Sweep {
            by_time: &by_time,
            by_quality: &by_quality,
            nb_runs,
            optimization: self.optimization,
        };

        #[cfg(feature = "rayon")]
        let computed: Vec<(usize, Front)> = requested
            .into_par_iter()
            .map(|level| (level, sweep.level_front(level)))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let computed: Vec<(usize, Front)> = requested
            .into_iter()
            .map(|level| (level, sweep.level_front(level)))
            .collect();

        let mut levels = LevelFronts::new();
        for (level, front) in computed {
            if front.is_empty() {
                return Err(Error::EmptyLevel(level));
            }
            self.invariants.check(front.iter().all(|p| p.run >= level), || {
                format!("level {level} has a point attained by fewer runs")
            });
            debug!(level, nb_points = front.len(), "level extracted");
            levels.insert(level, front);
        }
        debug!(nb_levels = levels.len(), "levels computed");
        Ok(levels)
    }
}

/// Level fronts of `logger` (every level if `levels` is empty).
///
/// # Errors
///
/// See [`Levels::compute`].
pub fn levels(
    optimization: OptimizationType,
    logger: &Eaf,
    levels: Vec<usize>,
) -> Result<LevelFronts> {
    Levels::at(optimization, levels).compute(logger)
}

/// Points of all runs, sorted both ways.
struct Sweep<'a> {
    by_time: &'a [RunPoint],
    by_quality: &'a [RunPoint],
    nb_runs: usize,
    optimization: OptimizationType,
}

impl Sweep<'_> {
    /// Staircase of the points attained by at least `level` runs.
    ///
    /// `attained[run]` counts the points of `run` at or before the current
    /// time whose quality is at least the current threshold; it may go
    /// negative while thresholds pass points not yet reached in time.
    fn level_front(&self, level: usize) -> Front {
        let (t, q) = (self.by_time, self.by_quality);
        let total = t.len();
        let mut it = 0;
        let mut iq = 0;
        let mut attained = vec![0i64; self.nb_runs];
        attained[t[0].run] += 1;
        let mut nb_attained = 1;
        let mut front = Front::new();

        loop {
            // Advance in time until the level is reached, with time ties.
            while it < total - 1 && (nb_attained < level || t[it].time == t[it + 1].time) {
                it += 1;
                if self.optimization.is_better_or_eq(t[it].quality, q[iq].quality) {
                    let run = t[it].run;
                    if attained[run] == 0 {
                        nb_attained += 1;
                    }
                    attained[run] += 1;
                }
            }

            if nb_attained >= level {
                // Tighten the quality threshold until the level is lost.
                let mut nb_attaining;
                loop {
                    nb_attaining = attained.iter().filter(|&&a| a >= 1).count();
                    loop {
                        if q[iq].time <= t[it].time {
                            let run = q[iq].run;
                            attained[run] -= 1;
                            if attained[run] == 0 {
                                nb_attained -= 1;
                            }
                        }
                        iq += 1;
                        if iq >= total || q[iq].quality != q[iq - 1].quality {
                            break;
                        }
                    }
                    if nb_attained < level || iq >= total {
                        break;
                    }
                }
                trace!(level, time = t[it].time, quality = q[iq - 1].quality, "level point");
                front.push(RunPoint::new(q[iq - 1].quality, t[it].time, nb_attaining));
            }

            if it >= total - 1 || iq >= total {
                break;
            }
        }
        front
    }
}
