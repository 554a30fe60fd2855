//! hdrshot - HDR screenshot conversion CLI
//!
//! Normalizes AVIF, JPEG-XR, OpenEXR, Radiance and PNG screenshots into a
//! 16-bit BT.2020/PQ PNG with an SDR preview and a thumbnail.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "hdrshot")]
#[command(author, version, about = "HDR screenshot conversion")]
#[command(long_about = "
Converts HDR screenshots into a canonical 16-bit BT.2020/PQ PNG,
an 8-bit SDR preview and a thumbnail.

Examples:
  hdrshot convert shot.exr -o out/          # shot.png, shot.sdr.png, shot.thumb.png
  hdrshot convert *.hdr -o out/ --no-thumbnail --json
  hdrshot probe a.png b.avif c.jxr          # header-only HDR/SDR check
  hdrshot info out/shot.png --json
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert files to the canonical HDR output
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Header-only SDR rejection check
    #[command(visible_alias = "p")]
    Probe(ProbeArgs),

    /// Show container metadata and image statistics
    #[command(visible_alias = "i")]
    Info(InfoArgs),
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Input files
    #[arg(required = true)]
    pub input: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Skip the SDR preview
    #[arg(long)]
    pub no_sdr: bool,

    /// Skip the thumbnail
    #[arg(long)]
    pub no_thumbnail: bool,

    /// Longest thumbnail edge in pixels
    #[arg(long)]
    pub thumbnail_size: Option<u32>,

    /// Write AVIF instead of PNG (needs an AVIF codec)
    #[arg(long)]
    pub avif: bool,

    /// YAML options file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print a JSON report instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ProbeArgs {
    /// Input files
    #[arg(required = true)]
    pub input: Vec<PathBuf>,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Input file
    pub input: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Convert(args) => commands::convert::run(args, cli.verbose),
        Commands::Probe(args) => commands::probe::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
