//! Data structures consumed and produced by a manifest run.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ManifestWarning;
use crate::manifest::ManifestDocument;

/// Body of a discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContents {
  /// Fully buffered file bytes.
  Buffered(Vec<u8>),
  /// Directory or otherwise empty marker; skipped silently.
  Null,
  /// Streamed content that cannot be consumed by the assembler.
  Stream,
}

/// A single file handed to the assembler by the upstream producer.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
  /// Path of the file as discovered.
  pub path: PathBuf,
  /// Base directory the relative path is measured from.
  pub base: PathBuf,
  /// File body.
  pub contents: FileContents,
}

impl FileDescriptor {
  /// Descriptor with buffered contents.
  pub fn buffered(
    path: impl Into<PathBuf>,
    base: impl Into<PathBuf>,
    contents: impl Into<Vec<u8>>,
  ) -> Self {
    Self {
      path: path.into(),
      base: base.into(),
      contents: FileContents::Buffered(contents.into()),
    }
  }

  /// Descriptor for a directory or other content-less entry.
  pub fn null(path: impl Into<PathBuf>, base: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      base: base.into(),
      contents: FileContents::Null,
    }
  }

  /// Descriptor whose contents arrive as a stream.
  pub fn stream(path: impl Into<PathBuf>, base: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      base: base.into(),
      contents: FileContents::Stream,
    }
  }

  /// Path relative to the descriptor's base, or the full path when it lies elsewhere.
  pub fn relative(&self) -> &Path {
    self.path.strip_prefix(&self.base).unwrap_or(self.path.as_path())
  }
}

/// The single artifact emitted by a finished run.
#[derive(Debug, Clone)]
pub struct ManifestArtifact {
  /// Target file name of the artifact.
  pub filename: String,
  /// Rendered manifest document.
  pub document: ManifestDocument,
  /// Non-fatal diagnostics raised while assembling the document.
  pub warnings: Vec<ManifestWarning>,
}

impl ManifestArtifact {
  /// Serialized UTF-8 manifest text.
  pub fn contents(&self) -> String {
    self.document.to_string()
  }

  /// Summary of the run suitable for machine-readable reporting.
  pub fn summary(&self) -> ManifestSummary {
    ManifestSummary {
      filename: self.filename.clone(),
      cache_entries: self.document.cache_entries().len(),
      hash: self.document.hash().map(str::to_string),
      warnings: self.warnings.iter().map(ToString::to_string).collect(),
    }
  }
}

/// Serializable overview of a written manifest.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSummary {
  /// Target file name of the artifact.
  pub filename: String,
  /// Number of lines in the CACHE section.
  pub cache_entries: usize,
  /// Content digest, when hashing was enabled.
  pub hash: Option<String>,
  /// Rendered warnings.
  pub warnings: Vec<String>,
}
