//! # attainment-db: Empirical Attainment Loggers
//!
//! **Version**: 0.1.0
//!
//! attainment-db accumulates the progress of black-box optimization runs into
//! in-memory stores and derives attainment statistics from them:
//!
//! - [`eah::Eah`]: per-run boolean attainment matrices over discretized
//!   `(error, evaluations)` targets, with histograms, distributions and an
//!   under-curve volume
//! - [`eaf::Eaf`]: per-run fronts of improving `(quality, time)` points, with
//!   attainment level sets, surfaces and volumes
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: internal invariants crash development builds
//!   ([`Invariants`]); release builds trace and continue
//! - **Poka-Yoke**: scales are validated at construction, out-of-domain
//!   samples are discarded with a warning instead of corrupting a matrix
//! - **Genchi Genbutsu**: statistics are pure functions over the stores
//!
//! ## Example Usage
//!
//! ```rust
//! use attainment_db::eaf::{self, Eaf};
//! use attainment_db::{LogInfo, Logger, OptimizationType, ProblemMeta};
//!
//! let mut logger = Eaf::new();
//! let sphere = ProblemMeta::new(1, 2, 1, OptimizationType::Minimization);
//!
//! for run in 0..3 {
//!     logger.track_problem(&sphere);
//!     for evals in 1..=10u64 {
//!         // Triggers only forward improvements to the logger.
//!         let y = 100.0 / (evals + run) as f64;
//!         logger.log(&LogInfo::without_optimum(evals, y));
//!     }
//! }
//!
//! let levels = eaf::levels(OptimizationType::Minimization, &logger, vec![])?;
//! let volume = eaf::stat::volume(OptimizationType::Minimization, &levels)?;
//! assert!(volume > 0.0);
//! # Ok::<(), attainment_db::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod eaf;
pub mod eah;
pub mod error;
pub mod invariant;
pub mod logging;
pub mod problem;
pub mod scale;
mod store;
pub mod trigger;

pub use config::{EahConfig, ScaleConfig};
pub use error::{Error, Result};
pub use invariant::Invariants;
pub use problem::{LogInfo, OptimizationType, ProblemMeta};
pub use scale::{Scale, ScaleKind};
pub use trigger::{Trigger, Triggers};

/// A sink fed by an optimization run.
///
/// The caller attaches a problem before each run, then forwards every
/// evaluation through [`Logger::log`], which consults the logger's triggers
/// before calling [`Logger::call`].
pub trait Logger {
    /// A new suite of problems starts.
    fn attach_suite(&mut self, suite_name: &str);

    /// A new run on `problem` starts.
    fn attach_problem(&mut self, problem: &ProblemMeta);

    /// Record one sample, unconditionally.
    fn call(&mut self, info: &LogInfo);

    /// Forget per-run state (triggers, running best).
    fn reset(&mut self);

    /// Triggers gating [`Logger::log`].
    fn triggers_mut(&mut self) -> &mut Triggers;

    /// Direction of the attached problem.
    fn optimization_type(&self) -> OptimizationType;

    /// Record `info` if any trigger fires.
    fn log(&mut self, info: &LogInfo) {
        let optimization = self.optimization_type();
        if self.triggers_mut().fire(info, optimization) {
            self.call(info);
        }
    }

    /// Start a new run on `problem`.
    fn track_problem(&mut self, problem: &ProblemMeta) {
        self.reset();
        self.attach_problem(problem);
    }
}
