use clap::Parser;
use kfold_engine::evaluate_detailed;
use kfold_types::EvalConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Score one configuration by k-fold cross-validated ridge regression.
///
/// Examples:
///   kfold-eval                                  # defaults
///   kfold-eval --config conf/config.json        # static settings from file
///   kfold-eval alpha=0.3 shuffle=true cv_seed=7 # key=value overrides
#[derive(Parser, Debug)]
#[command(name = "kfold-eval")]
#[command(version)]
#[command(about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "KFOLD_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Overrides applied on top of the file, e.g. alpha=0.5
    #[arg(value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Print the full report as JSON instead of the bare score
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EvalConfig::from_json_file(path)?,
        None => EvalConfig::default(),
    };
    config.apply_overrides(&cli.overrides)?;

    eprintln!("running with config: {}", serde_json::to_string(&config)?);

    let report = evaluate_detailed(&config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.score);
    }

    Ok(())
}
