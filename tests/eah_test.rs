//! EAH logger integration tests

use attainment_db::eah::{self, stat, AttainmentMatrix, Eah};
use attainment_db::{
    EahConfig, Error, LogInfo, Logger, OptimizationType, ProblemMeta, Scale, Trigger, Triggers,
};

fn linear_logger(buckets: usize) -> Eah {
    Eah::with_scales(
        Scale::linear(0.0, 10.0, buckets).unwrap(),
        Scale::linear(0.0, 100.0, buckets).unwrap(),
    )
}

fn minimization(instance: i32) -> ProblemMeta {
    ProblemMeta::new(1, 2, instance, OptimizationType::Minimization)
}

/// Cells attained are exactly the quadrant below/right of each target.
fn assert_monotone(mat: &AttainmentMatrix) {
    for i in 0..mat.rows() {
        for j in 0..mat.cols() {
            if mat[(i, j)] {
                if i + 1 < mat.rows() {
                    assert!(mat[(i + 1, j)], "({}, {j}) not attained", i + 1);
                }
                if j + 1 < mat.cols() {
                    assert!(mat[(i, j + 1)], "({i}, {}) not attained", j + 1);
                }
            }
        }
    }
}

#[test]
fn test_error_to_optimum_is_bucketed() {
    let mut logger = linear_logger(10);
    logger.track_problem(&minimization(1));
    // |optimum - y| = |3 - 8| = 5 → error bucket 5, evaluations 42 → bucket 4.
    logger.log(&LogInfo::new(42, 8.0, 3.0));
    let mat = logger.at(1, 2, 1, 0).unwrap();
    assert!(mat[(5, 4)]);
    assert!(!mat[(4, 4)]);
    assert!(!mat[(5, 3)]);
    assert!(mat[(9, 9)]);
    assert_eq!(mat.count(), 5 * 6);
}

#[test]
fn test_improving_run_builds_staircase() {
    let mut logger = linear_logger(10);
    logger.track_problem(&minimization(1));
    for (evals, y) in [(5, 9.5), (20, 7.0), (55, 3.2), (90, 0.1)] {
        logger.log(&LogInfo::new(evals, y, 0.0));
    }
    let mat = logger.at(1, 2, 1, 0).unwrap();
    assert_monotone(mat);
    assert!(mat[(9, 0)]);
    assert!(mat[(7, 2)]);
    assert!(mat[(3, 5)]);
    assert!(mat[(0, 9)]);
    assert!(!mat[(6, 4)]);
}

#[test]
fn test_out_of_domain_samples_are_discarded() {
    let mut logger = linear_logger(5);
    logger.track_problem(&minimization(1));
    logger.log(&LogInfo::new(10, 5.0, 0.0));
    let before = logger.at(1, 2, 1, 0).unwrap().clone();

    // Error above the domain, then evaluations past the budget.
    logger.call(&LogInfo::new(10, 20.0, 0.0));
    logger.call(&LogInfo::new(500, 0.5, 0.0));
    assert_eq!(logger.at(1, 2, 1, 0).unwrap(), &before);

    // Ingestion continues afterwards.
    logger.log(&LogInfo::new(50, 1.0, 0.0));
    assert!(logger.at(1, 2, 1, 0).unwrap().count() > before.count());
}

#[test]
fn test_maximization_without_optimum_fills_downwards() {
    let mut logger = linear_logger(10);
    let problem = ProblemMeta::new(3, 2, 1, OptimizationType::Maximization);
    logger.track_problem(&problem);
    logger.log(&LogInfo::without_optimum(30, 6.5));
    let mat = logger.at(3, 2, 1, 0).unwrap();
    assert!(mat[(6, 3)]);
    assert!(mat[(0, 3)]);
    assert!(mat[(0, 9)]);
    assert!(!mat[(7, 3)]);
    assert!(!mat[(6, 2)]);
    assert_eq!(mat.count(), 7 * 7);
}

#[test]
fn test_always_trigger_logs_non_improving_calls() {
    let mut logger = linear_logger(10).with_triggers(Triggers::single(Trigger::Always));
    logger.track_problem(&minimization(1));
    logger.log(&LogInfo::new(10, 2.0, 0.0));
    logger.log(&LogInfo::new(20, 8.0, 0.0));
    let mat = logger.at(1, 2, 1, 0).unwrap();
    // The later, worse sample still attains its own (easier) quadrant.
    assert!(mat[(8, 2)]);
    assert!(mat[(2, 1)]);
}

#[test]
fn test_histogram_additivity_across_instances() {
    let mut logger = linear_logger(8);
    for instance in 1..=3 {
        for run in 0..4u64 {
            logger.track_problem(&minimization(instance));
            for evals in [1, 10, 40, 90] {
                let y = 9.0 / (1 + evals + run) as f64;
                logger.log(&LogInfo::new(evals, y, 0.0));
            }
        }
    }
    assert_eq!(logger.size(), (1, 1, 3, 4));
    let histo = stat::Histogram::of(&logger).unwrap();
    assert_eq!(histo.nb_attainments(), 12);
    assert_eq!(histo.total(), stat::sum(&logger));
    assert!(histo.counts().iter().flatten().all(|&c| c <= 12));
}

#[test]
fn test_under_curve_volume_is_bounded() {
    let mut logger = linear_logger(6);
    for run in 0..5u64 {
        logger.track_problem(&minimization(1));
        logger.log(&LogInfo::new(10 * run, 9.0 - run as f64, 0.0));
    }
    let volume = stat::under_curve::volume(&logger).unwrap();
    assert!((0.0..=1.0).contains(&volume), "volume = {volume}");

    let weights = stat::under_curve::accumulate(&logger, 0.0, |acc, w| acc.max(w)).unwrap();
    assert!(weights > 0.0 && weights <= volume);
}

#[test]
fn test_log_scale_under_curve_volume_is_bounded() {
    let mut logger = Eah::new(0.0, 1e3, 12, 0, 1_000, 12).unwrap();
    for run in 0..3u64 {
        logger.track_problem(&minimization(1));
        for evals in [1, 3, 30, 300, 1_000] {
            logger.log(&LogInfo::new(evals, 1e3 / (evals + run) as f64, 0.0));
        }
    }
    let volume = stat::under_curve::volume(&logger).unwrap();
    assert!(volume > 0.0 && volume <= 1.0);
}

#[test]
fn test_histogram_of_empty_logger() {
    let logger = EahConfig::default().build().unwrap();
    assert!(matches!(stat::histogram(&logger), Err(Error::EmptyStore(_))));
    assert!(matches!(
        logger.at(1, 1, 1, 0),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_colormap_of_distribution() {
    let mut logger = linear_logger(4);
    logger.track_problem(&minimization(1));
    logger.log(&LogInfo::new(30, 4.0, 0.0));
    let distribution = stat::distribution(&logger).unwrap();
    let out = eah::colormap(
        &distribution,
        Some((logger.error_range(), logger.eval_range())),
        true,
    );
    assert!(out.contains("Errors:"));
    assert!(out.contains("Evaluations:"));
    assert!(out.contains("[7.5 .. 10]"));
}
