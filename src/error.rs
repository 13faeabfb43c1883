//! Crate-wide error type
//!
//! Mirrors the teacher crate's `BlockError`: a flat `thiserror` enum covering
//! every fallible boundary. Nothing in the simulation core (graph, call
//! window, buffers, cache manager) actually returns this type — those layers
//! are designed to never fail (see SPEC_FULL.md §7). Only the outer trace
//! loading / CLI layer propagates it.

/// Errors surfaced at the trace-loading and CLI boundary.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Bad or missing CLI arguments.
    #[error("argument error: {0}")]
    Argument(String),

    /// The trace file itself could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
