//! `appcache-manifest`: generate an offline cache manifest for a directory.
//!
//! # Usage
//!
//! ```text
//! appcache-manifest ./dist                               # write ./dist/app.manifest
//! appcache-manifest ./dist -c manifest.yaml --hash       # config file plus overrides
//! appcache-manifest ./dist --exclude "**/*.map" --summary
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use appcache_manifest::config::DEFAULT_CONFIG_FILE;
use appcache_manifest::scan::scan_directory;
use appcache_manifest::{ManifestAssembler, ManifestOptions};
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
  name = "appcache-manifest",
  version,
  about = "Generate an AppCache manifest from a build output directory"
)]
struct Cli {
  /// Directory whose files are listed in the manifest.
  root: PathBuf,

  /// JSON or YAML options file (defaults to `appcache.config.json` in ROOT).
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Where to write the manifest (defaults to ROOT/<filename>).
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Artifact file name.
  #[arg(long)]
  filename: Option<String>,

  /// Exact path or glob to leave out; repeatable.
  #[arg(short, long)]
  exclude: Vec<String>,

  /// Literal entry always listed first; repeatable.
  #[arg(long)]
  include: Vec<String>,

  /// Literal CACHE entry; repeatable.
  #[arg(long)]
  cache: Vec<String>,

  /// NETWORK entry; repeatable.
  #[arg(long)]
  network: Vec<String>,

  /// `"<pattern> <fallback>"` pair; repeatable.
  #[arg(long)]
  fallback: Vec<String>,

  /// Emit `SETTINGS: prefer-online`.
  #[arg(long)]
  prefer_online: bool,

  /// Append a content hash of every listed file.
  #[arg(long)]
  hash: bool,

  /// Add a generation time comment.
  #[arg(long)]
  timestamp: bool,

  /// Add a revision comment.
  #[arg(long)]
  revision: Option<String>,

  /// String prepended to each discovered entry.
  #[arg(long)]
  prefix: Option<String>,

  /// String appended to each discovered entry.
  #[arg(long)]
  suffix: Option<String>,

  /// Print a JSON summary of the written manifest.
  #[arg(long)]
  summary: bool,

  /// Log level used when RUST_LOG is unset.
  #[arg(long, default_value = "info")]
  log_level: String,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  setup_tracing(&cli.log_level);

  let options = load_options(&cli)?;
  let output = cli
    .output
    .clone()
    .unwrap_or_else(|| cli.root.join(&options.filename));

  let config_path = cli
    .config
    .clone()
    .unwrap_or_else(|| cli.root.join(DEFAULT_CONFIG_FILE));
  let files = scan_directory(&cli.root, &[output.as_path(), config_path.as_path()])
    .with_context(|| format!("failed to scan {}", cli.root.display()))?;

  let mut assembler = ManifestAssembler::new(options).context("invalid manifest options")?;
  for file in &files {
    assembler
      .accept(file)
      .with_context(|| format!("failed to add {}", file.path.display()))?;
  }
  let artifact = assembler.finish().context("failed to assemble manifest")?;

  if !artifact.warnings.is_empty() {
    warn!(count = artifact.warnings.len(), "manifest written with warnings");
  }

  fs::write(&output, artifact.contents())
    .with_context(|| format!("failed to write {}", output.display()))?;
  info!(path = %output.display(), "manifest written");

  if cli.summary {
    println!("{}", serde_json::to_string_pretty(&artifact.summary())?);
  }

  Ok(())
}

/// Load the options file and apply command line overrides on top.
fn load_options(cli: &Cli) -> Result<ManifestOptions> {
  let mut options = match &cli.config {
    Some(path) => ManifestOptions::from_path(path),
    None => ManifestOptions::discover(&cli.root),
  }
  .context("failed to load config")?;

  if let Some(filename) = &cli.filename {
    options.filename = filename.clone();
  }
  options.exclude.extend(cli.exclude.iter().cloned());
  options.include.extend(cli.include.iter().cloned());
  options.cache.extend(cli.cache.iter().cloned());
  options.fallback.extend(cli.fallback.iter().cloned());
  if !cli.network.is_empty() {
    options.network = Some(cli.network.clone());
  }
  options.prefer_online |= cli.prefer_online;
  options.hash |= cli.hash;
  options.timestamp |= cli.timestamp;
  if let Some(revision) = &cli.revision {
    options.revision = Some(revision.clone());
  }
  if let Some(prefix) = &cli.prefix {
    options.prefix = prefix.clone();
  }
  if let Some(suffix) = &cli.suffix {
    options.suffix = suffix.clone();
  }

  Ok(options)
}

/// Initialize the `tracing` subscriber, preferring `RUST_LOG` when set.
fn setup_tracing(level: &str) {
  use tracing_subscriber::EnvFilter;

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
  tracing_subscriber::fmt().with_env_filter(filter).init();
}
