/// Offline statistical check: draws many realisations per correlation model and
/// compares their sample covariance with the target matrix.
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use randfield_core::covariance::KernelConfig;
use randfield_core::distribution::ProbabilityDistribution;
use randfield_core::mesh::build_mesh;
use randfield_core::random_field::stats::{empirical_covariance, relative_frobenius_error};
use randfield_core::random_field::MatrixDecomposition;

#[derive(Parser, Debug)]
#[command(name = "randfield-test", about = "Empirical covariance convergence check")]
struct Args {
    /// Realisations per model.
    #[arg(short = 'n', long, default_value = "5000")]
    samples: usize,

    /// Maximum accepted relative Frobenius error.
    #[arg(short, long, default_value = "0.1")]
    tolerance: f64,

    /// Correlation length in millimetres.
    #[arg(long, default_value = "50")]
    lc: f64,

    /// Node spacing in metres.
    #[arg(long, default_value = "0.01")]
    spacing: f64,

    #[arg(long, default_value = "10")]
    nx: usize,

    #[arg(long, default_value = "5")]
    ny: usize,

    #[arg(long, default_value = "42")]
    seed: u64,

    /// Write the per-model report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Serialize)]
struct ModelReport {
    kernel: KernelConfig,
    n_nodes: usize,
    n_samples: usize,
    relative_frobenius_error: f64,
    clamped_eigenvalues: usize,
    passed: bool,
}

fn models(lc_mm: f64) -> [KernelConfig; 5] {
    [
        KernelConfig::Jcss { lc_mm, rho: 0.2 },
        KernelConfig::Exponential { lc_mm, sigma: 1.0 },
        KernelConfig::Gaussian { lc_mm, sigma: 1.0 },
        KernelConfig::Matern { lc_mm, sigma: 1.0, nu: 0.5 },
        KernelConfig::Matern { lc_mm, sigma: 1.0, nu: 2.5 },
    ]
}

fn check_model(kernel: KernelConfig, args: &Args) -> Result<ModelReport> {
    let points = build_mesh(args.spacing, args.nx, args.ny);
    let c = kernel.build()?.build_correlation_matrix(&points);
    let mut field =
        MatrixDecomposition::seeded(c.clone(), ProbabilityDistribution::default(), args.seed)?;
    let samples = field.generate_samples_normal(args.samples);
    let err = relative_frobenius_error(&empirical_covariance(&samples), &c);
    Ok(ModelReport {
        kernel,
        n_nodes: points.len(),
        n_samples: args.samples,
        relative_frobenius_error: err,
        clamped_eigenvalues: field.clamped_eigenvalues(),
        passed: err < args.tolerance,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    if args.samples < 2 {
        bail!("need at least 2 samples to estimate a covariance, got {}", args.samples);
    }

    eprintln!("{:<44} {:>6} {:>8} {:>10} {:>6}", "Model", "Nodes", "Samples", "RelFrobErr", "Pass");
    eprintln!("{}", "-".repeat(78));

    let mut reports = Vec::new();
    for kernel in models(args.lc) {
        let r = check_model(kernel, &args)
            .with_context(|| format!("model {kernel:?} failed to build"))?;
        eprintln!(
            "{:<44} {:>6} {:>8} {:>10.4} {:>6}",
            format!("{kernel:?}"),
            r.n_nodes,
            r.n_samples,
            r.relative_frobenius_error,
            if r.passed { "ok" } else { "FAIL" },
        );
        reports.push(r);
    }

    if let Some(path) = &args.report {
        fs::write(path, serde_json::to_string_pretty(&reports)?)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        eprintln!("  -> {}", path.display());
    }

    let failed = reports.iter().filter(|r| !r.passed).count();
    if failed > 0 {
        bail!("{failed} model(s) exceeded tolerance {}", args.tolerance);
    }
    Ok(())
}
