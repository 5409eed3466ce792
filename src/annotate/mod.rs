//! Annotation engine: classify, walk, wrap, unwrap

pub mod classify;
pub mod walker;
pub mod remover;
pub mod pipeline;

pub use classify::{NodeClassifier, OpaqueReason};
pub use pipeline::{AnnotationReport, Highlighter};
pub use remover::HighlightRemover;
pub use walker::{Annotator, WalkStats};

#[cfg(test)]
mod tests;
