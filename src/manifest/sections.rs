//! Rendering of the individual manifest sections.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::config::ManifestOptions;
use crate::error::ManifestWarning;
use crate::paths::{PathNormalizer, encode_uri, literal_key};

const HEADER: &str = "CACHE MANIFEST";
const PREFER_ONLINE: &str = "prefer-online";

/// One block of the manifest grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
  /// `CACHE MANIFEST` plus the optional time and revision comments.
  Header {
    /// Capture time rendered as `# Time:`.
    time: Option<String>,
    /// Revision rendered as `# Revision:`.
    revision: Option<String>,
  },
  /// Explicit and discovered entries to cache.
  Cache(Vec<String>),
  /// Network-only entries.
  Network(Vec<String>),
  /// `pattern fallback` pairs.
  Fallback(Vec<String>),
  /// Settings tokens.
  Settings(Vec<String>),
  /// Content digest trailer.
  Hash(String),
}

impl Section {
  fn write_lines(&self, out: &mut Vec<String>) {
    match self {
      Self::Header { time, revision } => {
        out.push(HEADER.to_string());
        if let Some(time) = time {
          out.push(format!("# Time: {time}"));
        }
        if let Some(revision) = revision {
          out.push(format!("# Revision: {revision}"));
        }
      }
      Self::Cache(entries) => labelled(out, "CACHE:", entries),
      Self::Network(entries) => labelled(out, "NETWORK:", entries),
      Self::Fallback(entries) => labelled(out, "FALLBACK:", entries),
      Self::Settings(entries) => labelled(out, "SETTINGS:", entries),
      Self::Hash(digest) => out.push(format!("# hash: {digest}")),
    }
  }
}

fn labelled(out: &mut Vec<String>, label: &str, entries: &[String]) {
  out.push(label.to_string());
  out.extend(entries.iter().cloned());
}

/// Finished manifest: an ordered list of sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDocument {
  sections: Vec<Section>,
}

impl ManifestDocument {
  /// Sections in rendering order.
  pub fn sections(&self) -> &[Section] {
    &self.sections
  }

  /// Lines of the CACHE section.
  pub fn cache_entries(&self) -> &[String] {
    self
      .sections
      .iter()
      .find_map(|section| match section {
        Section::Cache(entries) => Some(entries.as_slice()),
        _ => None,
      })
      .unwrap_or_default()
  }

  /// Digest from the hash trailer, when present.
  pub fn hash(&self) -> Option<&str> {
    self.sections.iter().find_map(|section| match section {
      Section::Hash(digest) => Some(digest.as_str()),
      _ => None,
    })
  }
}

impl fmt::Display for ManifestDocument {
  /// Blocks are separated by one blank line and the text ends with a newline.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let blocks: Vec<String> = self
      .sections
      .iter()
      .map(|section| {
        let mut lines = Vec::new();
        section.write_lines(&mut lines);
        lines.join("\n")
      })
      .collect();
    writeln!(f, "{}", blocks.join("\n\n"))
  }
}

/// Renders sections from a run's options and accumulated state.
pub struct SectionBuilder<'a> {
  options: &'a ManifestOptions,
  normalizer: &'a PathNormalizer,
  warnings: Vec<ManifestWarning>,
}

impl<'a> SectionBuilder<'a> {
  /// Create a builder for the provided options.
  pub fn new(options: &'a ManifestOptions, normalizer: &'a PathNormalizer) -> Self {
    Self {
      options,
      normalizer,
      warnings: Vec::new(),
    }
  }

  /// Render the full document and return it with any diagnostics raised on the way.
  pub fn build(
    mut self,
    accepted: &[String],
    captured_at: Option<DateTime<Utc>>,
    digest: Option<String>,
  ) -> (ManifestDocument, Vec<ManifestWarning>) {
    let mut sections = vec![
      self.header(captured_at),
      self.cache(accepted),
      self.network(),
    ];
    sections.extend(self.fallback());
    sections.extend(self.settings());
    sections.extend(digest.map(Section::Hash));

    (ManifestDocument { sections }, self.warnings)
  }

  fn header(&self, captured_at: Option<DateTime<Utc>>) -> Section {
    Section::Header {
      time: captured_at.map(|time| time.to_rfc3339()),
      revision: self
        .options
        .revision
        .clone()
        .filter(|revision| !revision.is_empty()),
    }
  }

  /// Include literals first, then cache literals, then discovered entries.
  ///
  /// Include literals are deduplicated against each other, and a discovered entry whose
  /// relative path equals an include literal is not listed a second time.
  fn cache(&self, accepted: &[String]) -> Section {
    let mut included = BTreeSet::new();
    let mut entries = Vec::new();

    for literal in &self.options.include {
      if included.insert(literal_key(literal)) {
        entries.push(encode_uri(&literal.replace('\\', "/")));
      }
    }

    entries.extend(
      self
        .options
        .cache
        .iter()
        .map(|literal| encode_uri(&literal.replace('\\', "/"))),
    );

    entries.extend(
      accepted
        .iter()
        .filter(|relative| !included.contains(relative.as_str()))
        .map(|relative| self.normalizer.cache_entry(relative)),
    );

    Section::Cache(entries)
  }

  fn network(&self) -> Section {
    Section::Network(
      self
        .options
        .network_entries()
        .into_iter()
        .map(encode_uri)
        .collect(),
    )
  }

  fn fallback(&mut self) -> Option<Section> {
    if self.options.fallback.is_empty() {
      return None;
    }

    let mut entries = Vec::new();
    for entry in &self.options.fallback {
      match entry.split_once(' ') {
        Some((pattern, target)) if !pattern.is_empty() && !target.is_empty() => {
          entries.push(format!("{} {}", encode_uri(pattern), encode_uri(target)));
        }
        _ => {
          warn!(entry = %entry, "skipping fallback entry without a pattern and fallback path");
          self.warnings.push(ManifestWarning::InvalidFallbackFormat {
            entry: entry.clone(),
          });
        }
      }
    }

    Some(Section::Fallback(entries))
  }

  fn settings(&self) -> Option<Section> {
    self
      .options
      .prefer_online
      .then(|| Section::Settings(vec![PREFER_ONLINE.to_string()]))
  }
}
