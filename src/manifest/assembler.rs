//! Push-driven orchestration of a single manifest run.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::ManifestOptions;
use crate::digest::ContentAccumulator;
use crate::error::{ManifestError, ManifestWarning};
use crate::manifest::sections::SectionBuilder;
use crate::models::{FileContents, FileDescriptor, ManifestArtifact};
use crate::paths::{PathNormalizer, literal_key};
use crate::patterns::PatternMatcher;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
  /// Accepting descriptors.
  Open,
  /// Input finished; sections are being rendered.
  Finalizing,
  /// Document emitted; no further input is accepted.
  Closed,
  /// A fatal input error aborted the run.
  Failed,
}

/// What happened to a descriptor passed to [`ManifestAssembler::accept`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
  /// Recorded under the contained relative path.
  Accepted(String),
  /// Matched an exclude pattern.
  Excluded(String),
  /// Directory or content-less marker.
  Skipped,
}

/// Consumes file descriptors one at a time and emits a single manifest artifact.
///
/// Every piece of mutable state (entry list, digest, warnings) is owned by the
/// assembler, so concurrent runs never share anything.
#[derive(Debug)]
pub struct ManifestAssembler {
  options: ManifestOptions,
  normalizer: PathNormalizer,
  matcher: PatternMatcher,
  includes: BTreeSet<String>,
  accepted: Vec<String>,
  digest: Option<ContentAccumulator>,
  captured_at: Option<DateTime<Utc>>,
  warnings: Vec<ManifestWarning>,
  state: AssemblerState,
}

impl ManifestAssembler {
  /// Compile the options into a fresh run.
  pub fn new(options: ManifestOptions) -> Result<Self, ManifestError> {
    let matcher = PatternMatcher::new(options.exclude.as_slice())?;
    let normalizer = PathNormalizer::from_options(&options);
    let includes = options.include.iter().map(|literal| literal_key(literal)).collect();

    let mut warnings = Vec::new();
    if options.base_path.is_some() {
      let warning = ManifestWarning::DeprecatedOption {
        option: "basePath",
        hint: "set each descriptor's base directory instead",
      };
      warn!("{warning}");
      warnings.push(warning);
    }

    Ok(Self {
      digest: options.hash.then(ContentAccumulator::new),
      captured_at: options.timestamp.then(Utc::now),
      options,
      normalizer,
      matcher,
      includes,
      accepted: Vec::new(),
      warnings,
      state: AssemblerState::Open,
    })
  }

  /// Pin the `# Time:` comment to a fixed instant.
  pub fn with_capture_time(mut self, captured_at: DateTime<Utc>) -> Self {
    if self.options.timestamp {
      self.captured_at = Some(captured_at);
    }
    self
  }

  /// Current lifecycle state.
  pub fn state(&self) -> AssemblerState {
    self.state
  }

  /// Relative paths accepted so far, in arrival order.
  pub fn accepted_paths(&self) -> &[String] {
    &self.accepted
  }

  /// Process the next descriptor from the producer.
  ///
  /// Streamed content aborts the run; directory markers are skipped silently.
  pub fn accept(&mut self, file: &FileDescriptor) -> Result<Disposition, ManifestError> {
    self.ensure_open()?;

    let bytes = match &file.contents {
      FileContents::Null => return Ok(Disposition::Skipped),
      FileContents::Stream => {
        self.state = AssemblerState::Failed;
        return Err(ManifestError::UnsupportedInputKind {
          path: file.path.clone(),
        });
      }
      FileContents::Buffered(bytes) => bytes,
    };

    let relative = self.normalizer.relative_path(file);
    if !self.includes.contains(&relative) && self.matcher.should_exclude(&relative) {
      debug!(path = %relative, "excluded from manifest");
      return Ok(Disposition::Excluded(relative));
    }

    if let Some(digest) = self.digest.as_mut() {
      digest.update(bytes)?;
    }
    debug!(path = %relative, "added to manifest");
    self.accepted.push(relative.clone());
    Ok(Disposition::Accepted(relative))
  }

  /// Signal end of input and render the manifest.
  pub fn finish(&mut self) -> Result<ManifestArtifact, ManifestError> {
    self.ensure_open()?;
    self.state = AssemblerState::Finalizing;

    let digest = match self.digest.as_mut() {
      Some(accumulator) => Some(accumulator.finalize()?),
      None => None,
    };

    let (document, fallback_warnings) = SectionBuilder::new(&self.options, &self.normalizer)
      .build(&self.accepted, self.captured_at, digest);

    let mut warnings = std::mem::take(&mut self.warnings);
    warnings.extend(fallback_warnings);

    self.state = AssemblerState::Closed;
    info!(
      filename = %self.options.filename,
      entries = document.cache_entries().len(),
      hashed = document.hash().is_some(),
      "manifest assembled"
    );

    Ok(ManifestArtifact {
      filename: self.options.filename.clone(),
      document,
      warnings,
    })
  }

  fn ensure_open(&self) -> Result<(), ManifestError> {
    match self.state {
      AssemblerState::Open => Ok(()),
      AssemblerState::Failed => Err(ManifestError::RunAborted),
      AssemblerState::Finalizing | AssemblerState::Closed => Err(ManifestError::AlreadyFinished),
    }
  }
}

/// Run a whole descriptor sequence through a fresh assembler.
pub fn assemble<'a, I>(
  options: ManifestOptions,
  files: I,
) -> Result<ManifestArtifact, ManifestError>
where
  I: IntoIterator<Item = &'a FileDescriptor>,
{
  let mut assembler = ManifestAssembler::new(options)?;
  for file in files {
    assembler.accept(file)?;
  }
  assembler.finish()
}
