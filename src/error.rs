//! Engine error taxonomy
//!
//! `Cancelled` is expected control flow (an operation superseded by a newer
//! one) and is logged at debug, never as an error. Data-source failures are
//! logged and surfaced as a sticky error flag for foreground fetches, or
//! log-only for background work. Invariant violations are recovered locally
//! with a safe default; they never cross the engine boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Superseded by a newer operation of the same kind.
    #[error("operation cancelled")]
    Cancelled,

    /// The fetch/persist collaborator failed.
    #[error("data source failure: {0}")]
    DataSource(#[from] anyhow::Error),

    /// A track id that is not part of the current view.
    #[error("unknown track id: {0}")]
    UnknownTrack(String),
}
