//! Error and diagnostic types surfaced while assembling a manifest.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions that abort a manifest run without emitting an artifact.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// A descriptor carried streamed content instead of a buffered body.
  #[error("streaming not supported: {}", path.display())]
  UnsupportedInputKind {
    /// Path of the offending descriptor.
    path: PathBuf,
  },
  /// The run already failed and cannot accept further input or finish.
  #[error("manifest run was aborted by an earlier error")]
  RunAborted,
  /// The run already emitted its document.
  #[error("manifest run has already finished")]
  AlreadyFinished,
  /// The content digest was already finalized.
  #[error("content digest has already been finalized")]
  DigestFinalized,
  /// An exclude pattern could not be compiled.
  #[error("invalid exclude pattern `{pattern}`")]
  InvalidPattern {
    /// Pattern as configured.
    pattern: String,
    /// Underlying regex compilation failure.
    #[source]
    source: regex::Error,
  },
}

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  #[error("failed to read {}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Failed to parse a JSON configuration file.
  #[error("failed to parse {}", path.display())]
  Json {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
  /// Failed to parse a YAML configuration file.
  #[error("failed to parse {}", path.display())]
  Yaml {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_yaml::Error,
  },
  /// The file extension does not map to a known format.
  #[error("unsupported configuration format: {}", path.display())]
  UnsupportedFormat {
    /// Path that caused the error.
    path: PathBuf,
  },
}

/// Recoverable issues reported alongside a finished manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestWarning {
  /// A fallback entry did not split into a pattern and a fallback path.
  #[error("invalid fallback entry `{entry}`: expected `<pattern> <fallback-path>`")]
  InvalidFallbackFormat {
    /// Entry as configured.
    entry: String,
  },
  /// A deprecated option was used.
  #[error("the `{option}` option is deprecated; {hint}")]
  DeprecatedOption {
    /// Option name as it appears in configuration.
    option: &'static str,
    /// Suggested replacement.
    hint: &'static str,
  },
}
