//! Model module - list state and data types
//!
//! This module contains the data structures the engine operates on.
//! It is organized into submodules by responsibility:
//!
//! - `track`: Core track types (row shape, sort orders)
//! - `index`: Authoritative id sequence and paging cursor
//! - `list_state`: UI-bound list state (window, flags, labels)
//! - `selection`: Lazy set-complement selection model
//! - `source`: Data-source boundary trait

mod index;
mod list_state;
mod selection;
pub(crate) mod source;
mod track;

// Re-export all public types for convenient access
pub use index::{ListIndex, PagingCursor};

pub use list_state::TrackListState;

pub use selection::{SelectionState, SelectionSummary};

pub use source::{TrackPage, TrackSource};

pub use track::{SortOrder, Track, TrackId};
