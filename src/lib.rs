//! Paged track-list engine for music-player list views
//!
//! Backs every list-of-tracks view (song lists, playlist contents) with:
//!
//! - a paged list controller that owns the authoritative id order, the
//!   materialized window and background prefetching;
//! - a lazy selection model where "select all N tracks" is O(1);
//! - fractional order-key assignment for drag reordering, with detection of
//!   exhausted floating-point precision;
//! - a persistence scheduler that writes single moves immediately and
//!   debounces full renormalizations.
//!
//! The backing store is pluggable through [`model::TrackSource`]; the UI
//! layer observes [`model::TrackListState`] and never mutates it directly.

pub mod controller;
pub mod logging;
pub mod model;

mod error;

pub use controller::{ListConfig, PagedListController, RefreshOutcome};
pub use error::EngineError;
pub use model::{
    PagingCursor, SelectionState, SelectionSummary, SortOrder, Track, TrackId, TrackListState,
    TrackPage, TrackSource,
};
