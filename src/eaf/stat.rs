//! Statistics over attainment level sets
//!
//! All statistics here integrate staircase areas up to a *nadir* point: a
//! reference strictly worse than every front point, on both the quality and
//! the time axis. It is either given, or computed on first use as the worst
//! coordinates across the levels, shifted further out by `shift_qual` in
//! quality and by one evaluation in time.
//!
//! - [`Surface`]: area dominated by each level front
//! - [`Volume`]: surfaces summed over levels, weighted by level spacing
//! - [`volume_normalized`]: volume of a whole [`Eaf`] store within known
//!   bounds, scaled to `[0, 1]`

use std::collections::BTreeMap;

use tracing::debug;

use super::{worst_quality_first, Eaf, LevelFronts, Levels, Point, RunPoint};
use crate::invariant::Invariants;
use crate::problem::OptimizationType;
use crate::{Error, Result};

/// Default quality shift of a computed nadir.
pub const DEFAULT_SHIFT_QUAL: f64 = 1e-6;

/// Worst coordinates of two points.
fn worst_of(optimization: OptimizationType, a: Point, b: Point) -> Point {
    let quality = match optimization {
        OptimizationType::Minimization => a.quality.max(b.quality),
        OptimizationType::Maximization => a.quality.min(b.quality),
    };
    Point::new(quality, a.time.max(b.time))
}

/// Worst quality and worst time of a front, `None` if it is empty.
#[must_use]
pub fn extremum(optimization: OptimizationType, front: &[RunPoint]) -> Option<Point> {
    front
        .iter()
        .map(RunPoint::point)
        .reduce(|a, b| worst_of(optimization, a, b))
}

/// Nadir reference point, given or lazily computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Nadir {
    optimization: OptimizationType,
    point: Option<Point>,
    shift_qual: f64,
}

impl Nadir {
    /// Nadir computed from the first levels it sees.
    #[must_use]
    pub const fn new(optimization: OptimizationType) -> Self {
        Self {
            optimization,
            point: None,
            shift_qual: DEFAULT_SHIFT_QUAL,
        }
    }

    /// Fixed nadir.
    #[must_use]
    pub const fn at(optimization: OptimizationType, point: Point) -> Self {
        Self {
            optimization,
            point: Some(point),
            shift_qual: DEFAULT_SHIFT_QUAL,
        }
    }

    /// Quality shift applied to a computed nadir.
    #[must_use]
    pub const fn with_shift(mut self, shift_qual: f64) -> Self {
        self.shift_qual = shift_qual;
        self
    }

    /// Optimization direction.
    #[must_use]
    pub const fn optimization(&self) -> OptimizationType {
        self.optimization
    }

    /// The nadir point, if given or already computed.
    #[must_use]
    pub const fn point(&self) -> Option<Point> {
        self.point
    }

    /// The nadir point, computing it from `levels` if unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStore`] if the nadir must be computed and
    /// `levels` holds no point.
    pub fn resolve(&mut self, levels: &LevelFronts) -> Result<Point> {
        if let Some(point) = self.point {
            return Ok(point);
        }
        let worst = levels
            .values()
            .filter_map(|front| extremum(self.optimization, front))
            .reduce(|a, b| worst_of(self.optimization, a, b))
            .ok_or_else(|| Error::EmptyStore("nadir of empty levels".to_string()))?;

        // Keep the shift representable at large magnitudes.
        let shift = self
            .shift_qual
            .max(worst.quality.abs() * f64::EPSILON * 4.0);
        let quality = match self.optimization {
            OptimizationType::Minimization => worst.quality + shift,
            OptimizationType::Maximization => worst.quality - shift,
        };
        let nadir = Point::new(quality, worst.time.saturating_add(1));
        debug!(quality = nadir.quality, time = nadir.time, "nadir computed");
        self.point = Some(nadir);
        Ok(nadir)
    }
}

/// Staircase area between `front` and `nadir`.
#[allow(clippy::cast_precision_loss)]
fn staircase_area(
    optimization: OptimizationType,
    nadir: Point,
    front: &[RunPoint],
    invariants: Invariants,
) -> f64 {
    let mut sorted = front.to_vec();
    sorted.sort_by(worst_quality_first(optimization));
    let mut previous = nadir.quality;
    let mut area = 0.0;
    for p in &sorted {
        let increment = (previous - p.quality).abs() * nadir.time.abs_diff(p.time) as f64;
        invariants.check(increment > 0.0, || {
            format!(
                "null surface increment at ({}, {}) for nadir ({}, {})",
                p.quality, p.time, nadir.quality, nadir.time
            )
        });
        area += increment;
        previous = p.quality;
    }
    area
}

/// Surfaces of attainment level fronts.
#[derive(Debug, Clone)]
pub struct Surface {
    nadir: Nadir,
    invariants: Invariants,
}

impl Surface {
    /// Surfaces up to a computed nadir.
    #[must_use]
    pub fn new(optimization: OptimizationType) -> Self {
        Self::from_nadir(Nadir::new(optimization))
    }

    /// Surfaces up to a fixed nadir.
    #[must_use]
    pub fn with_nadir(optimization: OptimizationType, nadir: Point) -> Self {
        Self::from_nadir(Nadir::at(optimization, nadir))
    }

    /// Surfaces up to `nadir`.
    #[must_use]
    pub fn from_nadir(nadir: Nadir) -> Self {
        Self {
            nadir,
            invariants: Invariants::default(),
        }
    }

    /// Replace the invariant policy.
    #[must_use]
    pub const fn with_invariants(mut self, invariants: Invariants) -> Self {
        self.invariants = invariants;
        self
    }

    /// The nadir in use.
    #[must_use]
    pub const fn nadir(&self) -> &Nadir {
        &self.nadir
    }

    /// Area dominated by a single front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if no nadir is set yet.
    pub fn surface(&self, front: &[RunPoint]) -> Result<f64> {
        let nadir = self
            .nadir
            .point()
            .ok_or_else(|| Error::InvalidInput("surface without a nadir point".to_string()))?;
        Ok(staircase_area(
            self.nadir.optimization(),
            nadir,
            front,
            self.invariants,
        ))
    }

    /// Area of every level front, by level.
    ///
    /// # Errors
    ///
    /// See [`Nadir::resolve`].
    pub fn compute(&mut self, levels: &LevelFronts) -> Result<BTreeMap<usize, f64>> {
        self.nadir.resolve(levels)?;
        levels
            .iter()
            .map(|(&level, front)| Ok((level, self.surface(front)?)))
            .collect()
    }
}

/// Volume under the empirical attainment function.
///
/// Each level surface weighs the gap to the previous requested level (the
/// first one counting from `-1`), so a sparse level subset still
/// approximates the whole volume.
#[derive(Debug, Clone)]
pub struct Volume {
    nadir: Nadir,
    invariants: Invariants,
}

impl Volume {
    /// Volume up to a computed nadir.
    #[must_use]
    pub fn new(optimization: OptimizationType) -> Self {
        Self::from_nadir(Nadir::new(optimization))
    }

    /// Volume up to a fixed nadir.
    #[must_use]
    pub fn with_nadir(optimization: OptimizationType, nadir: Point) -> Self {
        Self::from_nadir(Nadir::at(optimization, nadir))
    }

    /// Volume up to `nadir`.
    #[must_use]
    pub fn from_nadir(nadir: Nadir) -> Self {
        Self {
            nadir,
            invariants: Invariants::default(),
        }
    }

    /// Replace the invariant policy.
    #[must_use]
    pub const fn with_invariants(mut self, invariants: Invariants) -> Self {
        self.invariants = invariants;
        self
    }

    /// The nadir in use.
    #[must_use]
    pub const fn nadir(&self) -> &Nadir {
        &self.nadir
    }

    /// Weighted sum of the level surfaces.
    ///
    /// # Errors
    ///
    /// See [`Nadir::resolve`].
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(&mut self, levels: &LevelFronts) -> Result<f64> {
        let nadir = self.nadir.resolve(levels)?;
        let optimization = self.nadir.optimization();
        let mut volume = 0.0;
        let mut previous: Option<usize> = None;
        for (&level, front) in levels {
            let weight = previous.map_or(level + 1, |prev| level - prev);
            volume += staircase_area(optimization, nadir, front, self.invariants) * weight as f64;
            previous = Some(level);
        }
        Ok(volume)
    }
}

/// Surfaces of `levels` up to their computed nadir.
///
/// # Errors
///
/// See [`Nadir::resolve`].
pub fn surface(optimization: OptimizationType, levels: &LevelFronts) -> Result<BTreeMap<usize, f64>> {
    Surface::new(optimization).compute(levels)
}

/// Volume of `levels` up to their computed nadir.
///
/// # Errors
///
/// See [`Nadir::resolve`].
pub fn volume(optimization: OptimizationType, levels: &LevelFronts) -> Result<f64> {
    Volume::new(optimization).compute(levels)
}

/// Bounds of the quality/time domain a normalized volume is taken over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    /// Best reachable error.
    pub error_min: f64,
    /// Worst considered error.
    pub error_max: f64,
    /// First considered evaluation.
    pub evals_min: u64,
    /// Evaluation budget.
    pub evals_max: u64,
}

impl Domain {
    /// Create a domain.
    #[must_use]
    pub const fn new(error_min: f64, error_max: f64, evals_min: u64, evals_max: u64) -> Self {
        Self {
            error_min,
            error_max,
            evals_min,
            evals_max,
        }
    }

    /// Nadir of the domain: worst error at the full budget.
    #[must_use]
    pub const fn nadir(&self, optimization: OptimizationType) -> Point {
        let quality = match optimization {
            OptimizationType::Minimization => self.error_max,
            OptimizationType::Maximization => self.error_min,
        };
        Point::new(quality, self.evals_max)
    }

    /// `(error_max - error_min) * (evals_max - evals_min)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn area(&self) -> f64 {
        (self.error_max - self.error_min) * self.evals_max.saturating_sub(self.evals_min) as f64
    }
}

/// Volume of every run in `logger`, normalized by the domain area and the
/// number of runs.
///
/// Level points that do not strictly dominate the domain nadir enclose no
/// area and are left out. Without `nb_runs`, the run count of the first
/// `(suite, problem, dimension, instance)` group is used; all groups are
/// expected to share it.
///
/// # Errors
///
/// - [`Error::InvalidInput`] on an empty domain or zero runs
/// - any error of [`Levels::compute`]
#[allow(clippy::cast_precision_loss)]
pub fn volume_normalized(
    logger: &Eaf,
    optimization: OptimizationType,
    domain: Domain,
    nb_runs: Option<usize>,
    invariants: Invariants,
) -> Result<f64> {
    let area = domain.area();
    if !(area.is_finite() && area > 0.0) {
        return Err(Error::InvalidInput(format!(
            "empty normalization domain {domain:?}"
        )));
    }

    let nb_runs = match nb_runs {
        Some(n) => n,
        None => {
            let first = logger
                .data()
                .keys()
                .next()
                .ok_or_else(|| Error::EmptyStore("EAF volume".to_string()))?;
            let n = logger.data().keys().filter(|k| k.same_instance(first)).count();
            invariants.check(logger.runs_per_instance().all(|count| count == n), || {
                format!("instances do not all have {n} runs")
            });
            n
        }
    };
    if nb_runs == 0 {
        return Err(Error::InvalidInput("normalized volume over zero runs".to_string()));
    }

    let nadir = domain.nadir(optimization);
    let mut levels = Levels::new(optimization)
        .with_invariants(invariants)
        .compute(logger)?;
    for front in levels.values_mut() {
        front.retain(|p| optimization.is_better(p.quality, nadir.quality) && p.time < nadir.time);
    }

    let volume = Volume::with_nadir(optimization, nadir)
        .with_invariants(invariants)
        .compute(&levels)?;
    let normalized = volume / (nb_runs as f64 * area);
    debug!(volume, normalized, nb_runs, "normalized EAF volume");
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_levels() -> LevelFronts {
        let mut levels = LevelFronts::new();
        levels.insert(
            1,
            vec![RunPoint::new(3.0, 5, 2), RunPoint::new(0.5, 15, 1)],
        );
        levels.insert(
            2,
            vec![RunPoint::new(5.0, 10, 2), RunPoint::new(1.0, 20, 2)],
        );
        levels
    }

    #[test]
    fn test_extremum() {
        let front = [RunPoint::new(3.0, 5, 0), RunPoint::new(0.5, 15, 0)];
        assert_eq!(
            extremum(OptimizationType::Minimization, &front),
            Some(Point::new(3.0, 15))
        );
        assert_eq!(
            extremum(OptimizationType::Maximization, &front),
            Some(Point::new(0.5, 15))
        );
        assert_eq!(extremum(OptimizationType::Minimization, &[]), None);
    }

    #[test]
    fn test_computed_nadir_is_strictly_worse() {
        let mut nadir = Nadir::new(OptimizationType::Minimization);
        let point = nadir.resolve(&two_levels()).unwrap();
        assert!(point.quality > 5.0);
        assert!((point.quality - 5.0 - DEFAULT_SHIFT_QUAL).abs() < 1e-12);
        assert_eq!(point.time, 21);
        assert_eq!(nadir.point(), Some(point));
    }

    #[test]
    fn test_given_nadir_is_kept() {
        let mut nadir = Nadir::at(OptimizationType::Minimization, Point::new(10.0, 100));
        assert_eq!(nadir.resolve(&two_levels()).unwrap(), Point::new(10.0, 100));
    }

    #[test]
    fn test_surface_staircase() {
        let surface = Surface::with_nadir(OptimizationType::Minimization, Point::new(6.0, 30));
        let front = [RunPoint::new(1.0, 20, 0), RunPoint::new(5.0, 10, 0)];
        // (6 - 5) * (30 - 10) + (5 - 1) * (30 - 20)
        assert!((surface.surface(&front).unwrap() - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_surface_requires_nadir() {
        let surface = Surface::new(OptimizationType::Minimization);
        assert!(matches!(
            surface.surface(&[RunPoint::new(1.0, 1, 0)]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_surfaces_by_level() {
        let mut surface = Surface::with_nadir(OptimizationType::Minimization, Point::new(6.0, 30));
        let areas = surface.compute(&two_levels()).unwrap();
        // Level 1: (6 - 3) * 25 + (3 - 0.5) * 15
        assert!((areas[&1] - 112.5).abs() < 1e-12);
        assert!((areas[&2] - 60.0).abs() < 1e-12);
        assert!(areas[&1] > areas[&2]);
    }

    #[test]
    fn test_volume_weights_level_gaps() {
        let mut volume = Volume::with_nadir(OptimizationType::Minimization, Point::new(6.0, 30));
        // Level 1 weighs 2 (from -1), level 2 weighs 1.
        let v = volume.compute(&two_levels()).unwrap();
        assert!((v - (2.0 * 112.5 + 60.0)).abs() < 1e-12);
    }

    #[test]
    fn test_maximization_surface() {
        let surface = Surface::with_nadir(OptimizationType::Maximization, Point::new(-6.0, 30));
        let front = [RunPoint::new(-1.0, 20, 0), RunPoint::new(-5.0, 10, 0)];
        assert!((surface.surface(&front).unwrap() - 60.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "null surface increment")]
    fn test_point_on_nadir_is_caught() {
        let surface = Surface::with_nadir(OptimizationType::Minimization, Point::new(6.0, 30))
            .with_invariants(Invariants::Enforce);
        let _ = surface.surface(&[RunPoint::new(6.0, 10, 0)]);
    }

    #[test]
    fn test_domain() {
        let domain = Domain::new(0.0, 10.0, 0, 100);
        assert!((domain.area() - 1000.0).abs() < f64::EPSILON);
        assert_eq!(
            domain.nadir(OptimizationType::Minimization),
            Point::new(10.0, 100)
        );
        assert_eq!(
            domain.nadir(OptimizationType::Maximization),
            Point::new(0.0, 100)
        );
    }
}
