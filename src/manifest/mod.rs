//! Manifest assembly broken into section rendering and run orchestration.

mod assembler;
mod sections;

pub use assembler::{AssemblerState, Disposition, ManifestAssembler, assemble};
pub use sections::{ManifestDocument, Section, SectionBuilder};
