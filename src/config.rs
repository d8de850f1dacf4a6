//! Run configuration for a single manifest invocation.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Configuration file searched for when no explicit path is provided.
pub const DEFAULT_CONFIG_FILE: &str = "appcache.config.json";

/// Artifact name used when none is configured.
pub const DEFAULT_FILENAME: &str = "app.manifest";

const DEFAULT_NETWORK: &str = "*";

/// Options controlling how a manifest is assembled.
///
/// Options that accept either a single string or a list are normalised into ordered
/// lists while deserializing, so the rest of the crate only ever sees `Vec<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestOptions {
  /// Name of the generated artifact.
  pub filename: String,
  /// Exact or glob patterns; matching files are omitted from the CACHE section.
  #[serde(deserialize_with = "one_or_many")]
  pub exclude: Vec<String>,
  /// Literal entries always listed first in the CACHE section.
  #[serde(deserialize_with = "one_or_many")]
  pub include: Vec<String>,
  /// Literal entries appended to the CACHE section ahead of discovered files.
  #[serde(deserialize_with = "one_or_many")]
  pub cache: Vec<String>,
  /// NETWORK entries; `None` renders a single `*`.
  #[serde(deserialize_with = "optional_one_or_many")]
  pub network: Option<Vec<String>>,
  /// `"<url-pattern> <fallback-path>"` pairs for the FALLBACK section.
  #[serde(deserialize_with = "one_or_many")]
  pub fallback: Vec<String>,
  /// Emit `SETTINGS: prefer-online`.
  pub prefer_online: bool,
  /// Append a content digest of every accepted file.
  pub hash: bool,
  /// Emit the generation time as a comment.
  pub timestamp: bool,
  /// Emit a revision comment.
  #[serde(deserialize_with = "revision_string")]
  pub revision: Option<String>,
  /// String prepended to every discovered CACHE entry.
  pub prefix: String,
  /// String appended to every discovered CACHE entry.
  pub suffix: String,
  /// Deprecated: strip this prefix instead of the descriptor's own base.
  pub base_path: Option<String>,
}

impl Default for ManifestOptions {
  fn default() -> Self {
    Self {
      filename: DEFAULT_FILENAME.into(),
      exclude: Vec::new(),
      include: Vec::new(),
      cache: Vec::new(),
      network: None,
      fallback: Vec::new(),
      prefer_online: false,
      hash: false,
      timestamp: false,
      revision: None,
      prefix: String::new(),
      suffix: String::new(),
      base_path: None,
    }
  }
}

impl ManifestOptions {
  /// Load options from `appcache.config.json` inside `dir`.
  ///
  /// A missing file yields the defaults; a present but malformed file is an error.
  pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if !candidate.is_file() {
      return Ok(Self::default());
    }
    Self::from_path(&candidate)
  }

  /// Read options from a JSON or YAML file, chosen by extension.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
      Some("json") => serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
      }),
      Some("yaml" | "yml") => serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
      }),
      _ => Err(ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
      }),
    }
  }

  /// NETWORK entries with the `*` default applied.
  pub fn network_entries(&self) -> Vec<&str> {
    match &self.network {
      Some(entries) => entries.iter().map(String::as_str).collect(),
      None => vec![DEFAULT_NETWORK],
    }
  }
}

impl ManifestOptions {
  /// Set the artifact name.
  pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
    self.filename = filename.into();
    self
  }

  /// Replace the exclude patterns.
  pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.exclude = patterns.into_iter().map(Into::into).collect();
    self
  }

  /// Replace the include literals.
  pub fn with_include<I, S>(mut self, entries: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.include = entries.into_iter().map(Into::into).collect();
    self
  }

  /// Replace the explicit cache literals.
  pub fn with_cache<I, S>(mut self, entries: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.cache = entries.into_iter().map(Into::into).collect();
    self
  }

  /// Replace the NETWORK entries.
  pub fn with_network<I, S>(mut self, entries: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.network = Some(entries.into_iter().map(Into::into).collect());
    self
  }

  /// Replace the fallback pairs.
  pub fn with_fallback<I, S>(mut self, entries: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.fallback = entries.into_iter().map(Into::into).collect();
    self
  }

  /// Toggle the `prefer-online` setting.
  pub fn with_prefer_online(mut self, enabled: bool) -> Self {
    self.prefer_online = enabled;
    self
  }

  /// Toggle the content digest trailer.
  pub fn with_hash(mut self, enabled: bool) -> Self {
    self.hash = enabled;
    self
  }

  /// Toggle the generation time comment.
  pub fn with_timestamp(mut self, enabled: bool) -> Self {
    self.timestamp = enabled;
    self
  }

  /// Set the revision comment.
  pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
    self.revision = Some(revision.into());
    self
  }

  /// Set the CACHE entry prefix.
  pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.prefix = prefix.into();
    self
  }

  /// Set the CACHE entry suffix.
  pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
    self.suffix = suffix.into();
    self
  }

  /// Set the deprecated base path.
  pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
    self.base_path = Some(base_path.into());
    self
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
  One(String),
  Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
  fn from(value: OneOrMany) -> Self {
    match value {
      OneOrMany::One(value) => vec![value],
      OneOrMany::Many(values) => values,
    }
  }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(optional_one_or_many(deserializer)?.unwrap_or_default())
}

fn optional_one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<OneOrMany>::deserialize(deserializer)?.map(Vec::from))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RevisionValue {
  Text(String),
  Integer(i64),
  Float(f64),
}

fn revision_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(
    Option::<RevisionValue>::deserialize(deserializer)?.map(|value| match value {
      RevisionValue::Text(text) => text,
      RevisionValue::Integer(number) => number.to_string(),
      RevisionValue::Float(number) => number.to_string(),
    }),
  )
}
