//! Authoritative id sequence and paging cursor for the current view
//!
//! Owned exclusively by the paged list controller behind a single
//! `RwLock` cell; background prefetch and count queries take read locks,
//! refresh / page processing / reorder edits take write locks. The lock is
//! never held across an await.

use std::collections::HashMap;

use super::track::{Track, TrackId};

/// Position of the paged fetch within the current view
#[derive(Clone, Copy, Debug, Default)]
pub struct PagingCursor {
    /// 1-based number of the most recently processed page.
    pub current_page: u32,
    pub has_next_page: bool,
    /// Total number of tracks in the view across all pages.
    pub total_count: usize,
}

/// Ordered id sequence for the current view plus known fractional positions
///
/// `ids` is the single source of truth for "play all", "select all" and
/// reorder-index math, independent of how many rows have been materialized.
/// `positions` accumulates the fractional sort keys of rows as their pages
/// arrive; a manual move needs its new neighbors' keys, and those neighbors
/// are materialized whenever the move came from a real drag gesture.
#[derive(Debug, Default)]
pub struct ListIndex {
    pub ids: Vec<TrackId>,
    pub positions: HashMap<TrackId, f64>,
    pub cursor: PagingCursor,
}

impl ListIndex {
    /// Replace the whole index for a fresh view generation.
    pub fn reset(&mut self, ids: Vec<TrackId>, cursor: PagingCursor) {
        self.ids = ids;
        self.positions.clear();
        self.cursor = cursor;
    }

    /// Record the fractional keys carried by a freshly fetched page.
    pub fn record_positions(&mut self, tracks: &[Track]) {
        for track in tracks {
            self.positions.insert(track.id.clone(), track.position);
        }
    }
}
