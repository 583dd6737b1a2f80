//! Error types for turning a score request into a [`Score`](crate::model::Score).
//!
//! Packaging and I/O failures are reported through `anyhow` with context;
//! only input-shape problems get a dedicated type here.

use thiserror::Error;

/// Reasons a request cannot be normalized into a score.
///
/// Measure and note positions are 1-based, matching the `number` attribute
/// the builder emits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// The request contained no measures at all.
    #[error("score has no measures")]
    NoMeasures,

    /// A field required for this kind of note was absent.
    #[error("measure {measure}, note {note}: missing field `{field}`")]
    MissingField {
        measure: usize,
        note: usize,
        field: &'static str,
    },
}
