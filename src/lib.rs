#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod digest;
pub mod error;
pub mod manifest;
pub mod models;
pub mod paths;
pub mod patterns;
pub mod scan;

pub use config::ManifestOptions;
pub use error::{ConfigError, ManifestError, ManifestWarning};
pub use manifest::{AssemblerState, Disposition, ManifestAssembler, ManifestDocument, assemble};
pub use models::{FileContents, FileDescriptor, ManifestArtifact};
