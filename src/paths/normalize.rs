use std::path::Path;

use crate::config::ManifestOptions;
use crate::models::FileDescriptor;
use crate::paths::encode_uri;

/// Render a path with forward slashes regardless of the host separator.
pub fn to_slash(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}

/// Comparison key for a configured literal entry.
///
/// Literals are compared against discovered relative paths, so they receive the same
/// separator and leading-slash treatment those paths do.
pub fn literal_key(literal: &str) -> String {
  let slashed = literal.replace('\\', "/");
  let trimmed = slashed.trim_start_matches("./");
  trimmed.trim_start_matches('/').to_string()
}

/// Strip `base` from `path` segment by segment, both already slash-separated.
///
/// Empty and `.` segments are ignored; a rooted path only matches a rooted base.
fn strip_base(path: &str, base: &str) -> Option<String> {
  fn segments(value: &str) -> impl Iterator<Item = &str> {
    value
      .split('/')
      .filter(|segment| !segment.is_empty() && *segment != ".")
  }

  if path.starts_with('/') != base.starts_with('/') {
    return None;
  }

  let mut remaining = segments(path);
  for expected in segments(base) {
    if remaining.next() != Some(expected) {
      return None;
    }
  }
  Some(remaining.collect::<Vec<_>>().join("/"))
}

/// Canonicalises descriptors into relative paths and CACHE entries for one run.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
  base_path: Option<String>,
  prefix: String,
  suffix: String,
}

impl PathNormalizer {
  /// Build a normaliser from the run options.
  pub fn from_options(options: &ManifestOptions) -> Self {
    Self {
      base_path: options.base_path.as_ref().map(|base| base.replace('\\', "/")),
      prefix: options.prefix.clone(),
      suffix: options.suffix.clone(),
    }
  }

  /// Slash-separated path of the descriptor relative to its base.
  ///
  /// Separators are converted before the base is stripped, so backslash-separated
  /// paths behave the same on every host. With the deprecated `basePath` option the
  /// configured directory is stripped instead of the descriptor's own base, when the
  /// path lies beneath it.
  pub fn relative_path(&self, file: &FileDescriptor) -> String {
    let path = to_slash(&file.path);
    let relative = self
      .base_path
      .as_deref()
      .and_then(|base| strip_base(&path, base))
      .or_else(|| strip_base(&path, &to_slash(&file.base)))
      .unwrap_or(path);
    literal_key(&relative)
  }

  /// Encoded CACHE line for an accepted relative path.
  ///
  /// Prefix and suffix are joined by plain concatenation so user supplied separators
  /// are preserved as written.
  pub fn cache_entry(&self, relative: &str) -> String {
    encode_uri(&format!("{}{}{}", self.prefix, relative, self.suffix))
  }
}
