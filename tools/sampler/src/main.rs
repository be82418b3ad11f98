/// Random-field sampling tool: builds a mesh, correlation matrix and spectral
/// sampler from a JSON parameter file (or flags) and writes realisations as JSON.
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use randfield_core::covariance::KernelConfig;
use randfield_core::distribution::DistributionConfig;
use randfield_core::generator::{FieldGenerator, FieldParams, MeshParams};
use randfield_core::random_field::Truncation;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Kernel {
    Jcss,
    Exponential,
    Gaussian,
    Matern,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Marginal {
    Gaussian,
    LogNormal,
    Weibull,
}

#[derive(Parser, Debug)]
#[command(
    name = "sampler",
    about = "Generate spatially correlated random-field realisations as JSON"
)]
struct Args {
    /// FieldParams JSON file; when given, the model flags below are ignored
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Correlation model
    #[arg(long, value_enum, default_value = "exponential")]
    kernel: Kernel,

    /// Correlation length in millimetres
    #[arg(long, default_value = "50")]
    lc: f64,

    /// Marginal standard deviation used by the kernel (exponential, gaussian, matern)
    #[arg(long, default_value = "1")]
    kernel_sigma: f64,

    /// JCSS correlation floor
    #[arg(long, default_value = "0")]
    rho: f64,

    /// Matérn smoothness
    #[arg(long, default_value = "0.5")]
    nu: f64,

    /// Marginal distribution of the physical field
    #[arg(long, value_enum, default_value = "gaussian")]
    marginal: Marginal,

    /// Marginal mean
    #[arg(long, default_value = "0")]
    mean: f64,

    /// Marginal standard deviation
    #[arg(long, default_value = "1")]
    std: f64,

    /// Weibull shape (modulus)
    #[arg(long, default_value = "2")]
    shape: f64,

    /// Node spacing in metres
    #[arg(long, default_value = "0.005")]
    spacing: f64,

    #[arg(long, default_value = "20")]
    nx: usize,

    #[arg(long, default_value = "10")]
    ny: usize,

    /// Number of nodes along z (omit for a 2D mesh)
    #[arg(long)]
    nz: Option<usize>,

    /// Keep the fewest modes carrying this fraction of the variance
    #[arg(long)]
    energy: Option<f64>,

    /// Number of realisations (overrides the config file)
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// RNG seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Output JSON path (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

// ── Output schema ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SampleFile<'a> {
    params: &'a FieldParams,
    /// One entry per node, in mesh order.
    coordinates: Vec<Vec<f64>>,
    eigenvalues: Vec<f64>,
    n_terms: usize,
    explained_variance: f64,
    clamped_eigenvalues: usize,
    /// One entry per realisation; `samples[j][i]` is node i of realisation j.
    samples: Vec<Vec<f64>>,
}

// ── Params ───────────────────────────────────────────────────────────────────

fn params_from_flags(args: &Args) -> FieldParams {
    let kernel = match args.kernel {
        Kernel::Jcss => KernelConfig::Jcss { lc_mm: args.lc, rho: args.rho },
        Kernel::Exponential => KernelConfig::Exponential { lc_mm: args.lc, sigma: args.kernel_sigma },
        Kernel::Gaussian => KernelConfig::Gaussian { lc_mm: args.lc, sigma: args.kernel_sigma },
        Kernel::Matern => KernelConfig::Matern {
            lc_mm: args.lc,
            sigma: args.kernel_sigma,
            nu: args.nu,
        },
    };
    let distribution = match args.marginal {
        Marginal::Gaussian => DistributionConfig::Gaussian { mu: args.mean, sigma: args.std },
        Marginal::LogNormal => DistributionConfig::LogNormal {
            mean: args.mean,
            variance: args.std * args.std,
        },
        Marginal::Weibull => DistributionConfig::Weibull {
            mu: args.mean,
            sigma: args.std,
            shape: args.shape,
        },
    };
    FieldParams {
        mesh: MeshParams { spacing: args.spacing, n_x: args.nx, n_y: args.ny, n_z: args.nz },
        kernel,
        distribution,
        truncation: args.energy.map_or(Truncation::Full, Truncation::Energy),
        ..FieldParams::default()
    }
}

fn load_params(args: &Args) -> Result<FieldParams> {
    let mut params = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => params_from_flags(args),
    };
    if let Some(n) = args.samples {
        params.n_samples = n;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    Ok(params)
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let params = load_params(&args)?;

    eprintln!(
        "[sampler] {:?} / {:?}, seed {}",
        params.kernel, params.distribution, params.seed
    );
    let result = FieldGenerator::new()
        .generate(&params)
        .context("Field generation failed")?;
    eprintln!(
        "  → {} realisation(s), {} nodes, {}/{} modes ({:.2}% variance)",
        result.samples.ncols(),
        result.coordinates.len(),
        result.n_terms,
        result.eigenvalues.len(),
        100.0 * result.explained_variance,
    );
    if result.clamped_eigenvalues > 0 {
        eprintln!(
            "  [warn] {} significantly negative eigenvalue(s) clamped",
            result.clamped_eigenvalues
        );
    }

    let file = SampleFile {
        params: &params,
        coordinates: result.coordinates.iter().map(|p| p.to_vec()).collect(),
        eigenvalues: result.eigenvalues.iter().copied().collect(),
        n_terms: result.n_terms,
        explained_variance: result.explained_variance,
        clamped_eigenvalues: result.clamped_eigenvalues,
        samples: result.realisations(),
    };
    let json = serde_json::to_string_pretty(&file)?;

    match &args.output {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, json).with_context(|| format!("Cannot write {}", path.display()))?;
            eprintln!("  → {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
