//! Exclusion filtering for normalised relative paths.

use regex::Regex;

use crate::error::ManifestError;

/// A single compiled exclude rule.
#[derive(Debug, Clone)]
enum ExcludeRule {
  /// Literal relative path, compared verbatim.
  Exact(String),
  /// Shell-style glob compiled into an anchored regex.
  Glob(Regex),
}

impl ExcludeRule {
  fn compile(pattern: &str) -> Result<Self, ManifestError> {
    if !has_glob_syntax(pattern) {
      return Ok(Self::Exact(pattern.to_string()));
    }

    Regex::new(&glob_to_regex(pattern))
      .map(Self::Glob)
      .map_err(|source| ManifestError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
      })
  }

  fn matches(&self, path: &str) -> bool {
    match self {
      Self::Exact(literal) => literal == path,
      Self::Glob(regex) => regex.is_match(path),
    }
  }
}

/// Ordered set of exclude rules compiled once per run.
///
/// A path is excluded when any rule matches it, so adding rules can only ever widen
/// the excluded set.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
  rules: Vec<ExcludeRule>,
}

impl PatternMatcher {
  /// Compile the configured exclude patterns.
  pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ManifestError> {
    let rules = patterns
      .iter()
      .map(|pattern| ExcludeRule::compile(&pattern.as_ref().replace('\\', "/")))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self { rules })
  }

  /// Returns `true` when the relative path matches any exclude rule.
  pub fn should_exclude(&self, relative_path: &str) -> bool {
    self.rules.iter().any(|rule| rule.matches(relative_path))
  }

  /// Number of compiled rules.
  pub fn len(&self) -> usize {
    self.rules.len()
  }

  /// Returns `true` when no rules are configured.
  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }
}

fn has_glob_syntax(pattern: &str) -> bool {
  pattern.contains(['*', '?'])
}

/// Translate a glob into an anchored regex.
///
/// `**` spans directory separators, `*` and `?` stay within one segment, and a
/// `**/` segment may also match nothing so `dir/**/x.js` covers `dir/x.js`.
fn glob_to_regex(pattern: &str) -> String {
  let mut regex = String::from("^");
  let mut chars = pattern.chars().peekable();

  while let Some(current) = chars.next() {
    match current {
      '*' if chars.peek() == Some(&'*') => {
        chars.next();
        if chars.peek() == Some(&'/') {
          chars.next();
          regex.push_str("(?:.*/)?");
        } else {
          regex.push_str(".*");
        }
      }
      '*' => regex.push_str("[^/]*"),
      '?' => regex.push_str("[^/]"),
      other => {
        let mut buffer = [0; 4];
        regex.push_str(&regex::escape(other.encode_utf8(&mut buffer)));
      }
    }
  }

  regex.push('$');
  regex
}
