use thiserror::Error;

/// Errors that can be returned by tree construction and lookup.
#[derive(Error, Debug, PartialEq)]
pub enum RCFError {
    /// The dataset or the builder configuration is malformed.
    #[error("invalid input: {msg}")]
    InvalidInput { msg: &'static str },

    /// An active subset of at least two rows has zero range on every
    /// dimension, so no cut can separate it. Deduplication during
    /// preparation should make this unreachable.
    #[error("degenerate subset: {points} rows with zero range in every dimension")]
    DegenerateSubset { points: usize },

    /// A label that was never part of the original dataset.
    #[error("no leaf registered for label {label}")]
    LookupMiss { label: usize },
}
