//! UI-bound list state: the materialized window, load flags and labels
//!
//! All mutation goes through the controller's dispatcher so observers only
//! ever see whole updates applied in post order. The UI layer polls this
//! state (or snapshots it per frame) exactly like any other model state.

use super::track::{Track, TrackId};

/// State behind every list-of-tracks view
#[derive(Clone, Debug, Default)]
pub struct TrackListState {
    /// Materialized window, always a subsequence of the full id order.
    pub tracks: Vec<Track>,
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub load_failed: bool,
    pub error_message: Option<String>,
    /// Total number of tracks in the view, including unmaterialized pages.
    pub total_count: usize,
    /// Display string for the total, e.g. "600 songs".
    pub total_label: String,
}

impl TrackListState {
    pub(crate) fn begin_refresh(&mut self) {
        self.is_loading = true;
        self.load_failed = false;
        self.error_message = None;
    }

    pub(crate) fn publish_first_page(&mut self, tracks: Vec<Track>, total_count: usize) {
        self.tracks = tracks;
        self.total_count = total_count;
        self.total_label = Self::format_total(total_count);
        self.is_loading = false;
    }

    /// Publish one explicitly requested page as the whole window.
    pub(crate) fn show_page(&mut self, tracks: Vec<Track>, total_count: usize) {
        self.tracks = tracks;
        self.total_count = total_count;
        self.total_label = Self::format_total(total_count);
        self.is_loading = false;
    }

    pub(crate) fn append_page(&mut self, mut tracks: Vec<Track>) {
        self.tracks.append(&mut tracks);
    }

    pub(crate) fn set_loading_more(&mut self, loading: bool) {
        self.is_loading_more = loading;
    }

    /// Sticky load error; the window keeps its last consistent content.
    pub(crate) fn fail_load(&mut self, message: String) {
        self.is_loading = false;
        self.is_loading_more = false;
        self.load_failed = true;
        self.error_message = Some(message);
    }

    /// Mirror a manual move into the window and stamp the new sort key.
    pub(crate) fn move_track(&mut self, track_id: &str, target_index: usize, new_position: f64) {
        if let Some(from) = self.tracks.iter().position(|t| t.id == track_id) {
            let mut track = self.tracks.remove(from);
            track.position = new_position;
            let target = target_index.min(self.tracks.len());
            self.tracks.insert(target, track);
        }
    }

    /// Stamp dense renormalized positions onto the materialized rows.
    pub(crate) fn apply_dense_positions(&mut self, order: &[TrackId]) {
        let index_of: std::collections::HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        for track in &mut self.tracks {
            if let Some(i) = index_of.get(track.id.as_str()) {
                track.position = (i + 1) as f64;
            }
        }
    }

    fn format_total(count: usize) -> String {
        if count == 1 {
            "1 song".to_string()
        } else {
            format!("{} songs", count)
        }
    }
}
