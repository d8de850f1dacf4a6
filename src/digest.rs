//! Streaming content digest used for manifest change detection.

use sha2::{Digest, Sha256};

use crate::error::ManifestError;

/// SHA-256 state fed with the bytes of every accepted file, in arrival order.
///
/// One accumulator belongs to exactly one run; it is finalized at most once.
#[derive(Debug, Clone)]
pub struct ContentAccumulator {
  hasher: Option<Sha256>,
}

impl Default for ContentAccumulator {
  fn default() -> Self {
    Self::new()
  }
}

impl ContentAccumulator {
  /// Fresh accumulator for a new run.
  pub fn new() -> Self {
    Self {
      hasher: Some(Sha256::new()),
    }
  }

  /// Feed another accepted file's bytes.
  pub fn update(&mut self, bytes: &[u8]) -> Result<(), ManifestError> {
    let hasher = self.hasher.as_mut().ok_or(ManifestError::DigestFinalized)?;
    hasher.update(bytes);
    Ok(())
  }

  /// Consume the state and return the lowercase hex digest.
  pub fn finalize(&mut self) -> Result<String, ManifestError> {
    let hasher = self.hasher.take().ok_or(ManifestError::DigestFinalized)?;
    Ok(hex::encode(hasher.finalize()))
  }
}
