//! Helpers for turning discovered file paths into manifest entries.
//!
//! Canonicalisation (separators, base stripping, prefix/suffix) and URI encoding are
//! kept in separate submodules so each can be tested on its own.

mod encode;
mod normalize;

pub use encode::encode_uri;
pub use normalize::{PathNormalizer, literal_key, to_slash};
