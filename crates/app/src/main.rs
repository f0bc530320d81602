use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use voxcorpus_app::ImportPipeline;
use voxcorpus_foundation::config::PipelineConfig;

#[derive(Parser)]
#[command(name = "voxcorpus")]
#[command(version)]
#[command(about = "Materializes a remote speech corpus into train/dev/test manifests")]
struct Cli {
    /// Path to the source corpus CSV
    #[arg(short = 'f', long = "file")]
    manifest: PathBuf,

    /// Directory in which to materialize audio and manifests
    #[arg(short = 'd', long = "directory")]
    target: PathBuf,

    /// TOML file overriding pipeline tuning constants
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Shuffle seed for reproducible splits
    #[arg(long)]
    seed: Option<u64>,

    /// Worker count for the fetch and transcode stages (default: one per core)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// -v for info, -vv for debug
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::default(),
    };
    // CLI flags win over the config file.
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.jobs.is_some() {
        config.workers = cli.jobs;
    }

    let pipeline = ImportPipeline::new(config);
    let summary = pipeline.run(&cli.manifest, &cli.target).await?;
    println!("{summary}");
    Ok(())
}
