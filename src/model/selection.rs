//! Lazy selection model with set-complement "select all"
//!
//! "Select all N tracks" must not materialize or iterate N items: the
//! descriptor either lists the selected ids explicitly (partial mode) or
//! flags everything selected and lists only the exceptions (complement
//! mode). Switching between the two is O(1).

use std::collections::HashSet;

use super::track::TrackId;

#[derive(Clone, Debug)]
enum SelectionMode {
    /// Explicitly selected ids.
    Partial(HashSet<TrackId>),
    /// Everything selected except these ids.
    AllExcept(HashSet<TrackId>),
}

/// Selection descriptor for the current view
#[derive(Clone, Debug)]
pub struct SelectionState {
    mode: SelectionMode,
}

/// Display summary exposed to the UI layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionSummary {
    pub count: usize,
    pub is_single: bool,
    pub label: String,
}

impl SelectionState {
    pub fn new() -> Self {
        Self {
            mode: SelectionMode::Partial(HashSet::new()),
        }
    }

    /// O(1): flips to complement mode with no exceptions.
    pub fn select_all(&mut self) {
        self.mode = SelectionMode::AllExcept(HashSet::new());
    }

    /// O(1): flips back to an empty partial selection.
    pub fn deselect_all(&mut self) {
        self.mode = SelectionMode::Partial(HashSet::new());
    }

    pub fn toggle(&mut self, id: &str) {
        let set = match &mut self.mode {
            SelectionMode::Partial(selected) => selected,
            SelectionMode::AllExcept(excluded) => excluded,
        };
        if !set.remove(id) {
            set.insert(id.to_string());
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        match &self.mode {
            SelectionMode::Partial(selected) => selected.contains(id),
            SelectionMode::AllExcept(excluded) => !excluded.contains(id),
        }
    }

    /// Count against the known full-sequence length; never enumerates it.
    pub fn selected_count(&self, total_known: usize) -> usize {
        match &self.mode {
            SelectionMode::Partial(selected) => selected.len(),
            SelectionMode::AllExcept(excluded) => total_known.saturating_sub(excluded.len()),
        }
    }

    /// Resolve to concrete ids, preserving the order of `full_ids`.
    ///
    /// The only operation that is O(N) in the full sequence length; callers
    /// reach for it when building a playback queue or a bulk request, not
    /// for count display.
    pub fn selected_ids(&self, full_ids: &[TrackId]) -> Vec<TrackId> {
        match &self.mode {
            SelectionMode::Partial(selected) => full_ids
                .iter()
                .filter(|id| selected.contains(*id))
                .cloned()
                .collect(),
            SelectionMode::AllExcept(excluded) => full_ids
                .iter()
                .filter(|id| !excluded.contains(*id))
                .cloned()
                .collect(),
        }
    }

    pub fn summary(&self, total_known: usize) -> SelectionSummary {
        let count = self.selected_count(total_known);
        let label = match count {
            0 => String::new(),
            1 => "1 selected".to_string(),
            n => format!("{} selected", n),
        };
        SelectionSummary {
            count,
            is_single: count == 1,
            label,
        }
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}
