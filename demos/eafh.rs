//! EAF vs EAH: comparing the empirical attainment loggers
//!
//! Runs a uniform random search on sphere functions and prints either the
//! normalized volume of the exact attainment function (EAF) or the volume
//! under its histogram approximation (EAH), for varying bucket settings.
//!
//! Run with:
//!   cargo run --example eafh -- <samples> <runs> EAF
//!   cargo run --example eafh -- <samples> <runs> EAH <buckets> <linear|log2|log10>
//!
//! Set `RUST_LOG=debug` to follow the loggers.

use anyhow::{bail, Context, Result};
use attainment_db::eaf::{self, Eaf};
use attainment_db::eah::{self, Eah};
use attainment_db::logging::init_tracing;
use attainment_db::{Invariants, LogInfo, Logger, OptimizationType, ProblemMeta, Scale, ScaleKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

const DIMENSION: i32 = 10;
const BOUND: f64 = 5.0;
const USAGE: &str = "Usage: eafh <samples> <runs> <EAF|EAH> [buckets scale]
\tscale (only for EAH) = 'log2', 'log10' or 'linear'
\tbuckets (only for EAH) = number of buckets";

/// Worst sphere value over the search box.
fn error_max() -> f64 {
    f64::from(DIMENSION) * BOUND * BOUND
}

/// Feed `runs` random-search runs of `samples` evaluations to `logger`.
fn run<L: Logger>(logger: &mut L, samples: u64, runs: usize) {
    let mut rng = StdRng::seed_from_u64(0);
    logger.attach_suite("sphere");
    let problem = ProblemMeta::new(1, DIMENSION, 1, OptimizationType::Minimization);
    for r in 0..runs {
        info!(run = r, "random search");
        logger.track_problem(&problem);
        let mut best = f64::INFINITY;
        for evals in 1..=samples {
            let y: f64 = (0..DIMENSION)
                .map(|_| rng.gen_range(-BOUND..BOUND).powi(2))
                .sum();
            best = best.min(y);
            logger.log(&LogInfo::new(evals, best, 0.0));
        }
    }
}

fn parse<T: std::str::FromStr>(arg: Option<&String>, name: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    arg.with_context(|| format!("missing <{name}>\n{USAGE}"))?
        .parse()
        .with_context(|| format!("invalid <{name}>"))
}

fn scale_kind(name: &str) -> Result<ScaleKind> {
    Ok(match name {
        "linear" => ScaleKind::Linear,
        "log2" => ScaleKind::Log2,
        "log10" => ScaleKind::Log10,
        other => bail!("`{other}` scale not supported\n{USAGE}"),
    })
}

#[allow(clippy::cast_precision_loss)]
fn main() -> Result<()> {
    init_tracing()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let samples: u64 = parse(args.first(), "samples")?;
    let runs: usize = parse(args.get(1), "runs")?;
    let kind = args.get(2).map_or("EAF", String::as_str);

    match kind {
        "EAF" => {
            if args.len() != 3 {
                bail!("EAF type takes 3 arguments\n{USAGE}");
            }
            info!(samples, runs, "EAF");
            let mut logger = Eaf::new();
            run(&mut logger, samples, runs);
            let domain = eaf::stat::Domain::new(0.0, error_max(), 0, samples);
            let volume = eaf::stat::volume_normalized(
                &logger,
                OptimizationType::Minimization,
                domain,
                Some(runs),
                Invariants::default(),
            )?;
            println!("{volume}");
        }
        "EAH" => {
            if args.len() != 5 {
                bail!("EAH type takes 5 arguments\n{USAGE}");
            }
            let buckets: usize = parse(args.get(3), "buckets")?;
            let scale = scale_kind(&args[4])?;
            info!(samples, runs, buckets, ?scale, "EAH");
            let mut logger = Eah::with_scales(
                Scale::new(scale, 0.0, error_max(), buckets)?,
                Scale::new(scale, 0.0, samples as f64, buckets)?,
            );
            run(&mut logger, samples, runs);
            println!("{}", eah::stat::under_curve::volume(&logger)?);
            if buckets <= 40 {
                let distribution = eah::stat::distribution(&logger)?;
                eprint!(
                    "{}",
                    eah::colormap(
                        &distribution,
                        Some((logger.error_range(), logger.eval_range())),
                        false
                    )
                );
            }
        }
        other => bail!("`{other}` type not supported\n{USAGE}"),
    }
    Ok(())
}
