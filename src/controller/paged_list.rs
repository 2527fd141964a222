//! Paged list controller
//!
//! Owns the authoritative id sequence for the current view, the materialized
//! page window published to the UI, and background prefetching. Every view
//! refresh is one "generation": starting a new one cancels the previous
//! generation's token before any new state is written, and late completions
//! from a stale generation are discarded by checking their token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use super::dispatch::UiDispatcher;
use super::order_key::assign_order_key;
use super::reorder::ReorderScheduler;
use crate::error::EngineError;
use crate::model::{
    ListIndex, PagingCursor, SelectionState, SelectionSummary, SortOrder, TrackId, TrackListState,
    TrackSource,
};

/// Tunable timings and thresholds, preserved as configuration rather than
/// hard-wired semantics.
#[derive(Clone, Debug)]
pub struct ListConfig {
    pub page_size: usize,
    /// Pause between background page fetches, keeping the store and the UI
    /// responsive while a large view streams in.
    pub prefetch_delay: Duration,
    /// Quiet period before a renormalization batch write.
    pub renorm_quiet_period: Duration,
    /// Debounce applied to incremental search input.
    pub search_debounce: Duration,
    /// Half-gap below which a fractional midpoint stops being usable.
    pub min_order_gap: f64,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: 250,
            prefetch_delay: Duration::from_millis(250),
            renorm_quiet_period: Duration::from_secs(2),
            search_debounce: Duration::from_millis(300),
            min_order_gap: 1e-9,
        }
    }
}

/// How a refresh or explicit page load ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// First page published; remaining pages stream in the background.
    Completed,
    /// Another refresh is already in progress; this request was dropped.
    AlreadyRefreshing,
    /// Superseded by a newer generation before anything was published.
    Cancelled,
    /// The data source failed; the error is surfaced on the list state.
    Failed,
}

/// Query parameters of the current view generation
#[derive(Clone, Debug, Default)]
struct ListQuery {
    sort: SortOrder,
    filter: Option<String>,
}

/// Controller behind every paged list-of-tracks view
pub struct PagedListController {
    source: Arc<dyn TrackSource>,
    config: ListConfig,
    state: Arc<Mutex<TrackListState>>,
    ui: UiDispatcher,
    index: Arc<RwLock<ListIndex>>,
    selection: Mutex<SelectionState>,
    scheduler: ReorderScheduler,
    /// Reorderable collection currently shown, if any.
    active_collection: Arc<RwLock<Option<String>>>,
    /// Token of the current view generation.
    generation: Mutex<CancellationToken>,
    /// Token of the running background prefetch, if any.
    prefetch_token: Mutex<Option<CancellationToken>>,
    /// Token of the pending debounced search, if any.
    search_token: Mutex<Option<CancellationToken>>,
    query: Mutex<ListQuery>,
    refreshing: AtomicBool,
}

/// Selected row proximity to the window end that triggers a load-more hint.
const LOAD_MORE_THRESHOLD: usize = 10;

impl PagedListController {
    pub fn new(source: Arc<dyn TrackSource>, config: ListConfig) -> Arc<Self> {
        let state = Arc::new(Mutex::new(TrackListState::default()));
        let ui = UiDispatcher::spawn(state.clone());
        let index = Arc::new(RwLock::new(ListIndex::default()));
        let active_collection = Arc::new(RwLock::new(None));
        let scheduler = ReorderScheduler::new(
            source.clone(),
            index.clone(),
            active_collection.clone(),
            ui.clone(),
            config.renorm_quiet_period,
        );
        Arc::new(Self {
            source,
            config,
            state,
            ui,
            index,
            selection: Mutex::new(SelectionState::new()),
            scheduler,
            active_collection,
            generation: Mutex::new(CancellationToken::new()),
            prefetch_token: Mutex::new(None),
            search_token: Mutex::new(None),
            query: Mutex::new(ListQuery::default()),
            refreshing: AtomicBool::new(false),
        })
    }

    /// The UI-bound list state. Read freely; mutation happens only through
    /// the controller's dispatcher.
    pub fn state(&self) -> Arc<Mutex<TrackListState>> {
        self.state.clone()
    }

    // ========================================================================
    // Refresh & paging
    // ========================================================================

    /// Rebuild the view for the given sort and filter.
    ///
    /// Cancels the previous generation (including its prefetch), fetches the
    /// full id sequence and the first page concurrently, and publishes the
    /// first page before returning. Remaining pages stream in via background
    /// prefetch. A call while another refresh is in progress is a no-op.
    pub async fn refresh(&self, sort: SortOrder, filter: Option<String>) -> RefreshOutcome {
        if self.refreshing.swap(true, Ordering::SeqCst) {
            tracing::debug!("refresh already in progress, ignoring");
            return RefreshOutcome::AlreadyRefreshing;
        }
        let outcome = match self.refresh_inner(sort, filter).await {
            Ok(()) => RefreshOutcome::Completed,
            Err(EngineError::Cancelled) => {
                tracing::debug!("refresh superseded before first page was published");
                RefreshOutcome::Cancelled
            }
            Err(e) => {
                tracing::error!(error = %e, "refresh failed");
                RefreshOutcome::Failed
            }
        };
        self.refreshing.store(false, Ordering::SeqCst);
        outcome
    }

    async fn refresh_inner(
        &self,
        sort: SortOrder,
        filter: Option<String>,
    ) -> Result<(), EngineError> {
        let generation = self.begin_generation().await;
        *self.query.lock().await = ListQuery {
            sort,
            filter: filter.clone(),
        };
        // A refresh invalidates whatever the selection referred to.
        self.selection.lock().await.deselect_all();

        self.ui.post(&generation, |state| state.begin_refresh());

        let filter_ref = filter.as_deref();
        let (ids_result, page_result) = futures::join!(
            self.source.fetch_all_ids(sort, filter_ref),
            self.source
                .fetch_page(1, self.config.page_size, sort, filter_ref),
        );

        if generation.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let (ids, page) = match (ids_result, page_result) {
            (Ok(ids), Ok(page)) => (ids, page),
            (Err(e), _) | (_, Err(e)) => {
                let message = format_load_error(&e);
                self.ui.post(&generation, move |state| state.fail_load(message));
                self.ui.flush().await;
                return Err(EngineError::DataSource(e));
            }
        };

        let cursor = PagingCursor {
            current_page: page.page_number,
            has_next_page: page.has_next_page,
            total_count: page.total_count,
        };
        {
            let mut index = self.index.write().await;
            index.reset(ids, cursor);
            index.record_positions(&page.tracks);
        }

        tracing::debug!(
            total = page.total_count,
            first_page = page.tracks.len(),
            has_next = page.has_next_page,
            "publishing first page"
        );
        let tracks = page.tracks;
        let total_count = page.total_count;
        self.ui
            .post(&generation, move |state| state.publish_first_page(tracks, total_count));
        self.ui.flush().await;

        if cursor.has_next_page {
            self.spawn_prefetch(&generation, cursor.current_page + 1).await;
        }
        Ok(())
    }

    /// Fetch and publish one specific page, leaving the id sequence alone.
    ///
    /// For explicit pagination UIs; cancels any running background prefetch
    /// since the two windowing modes are mutually exclusive.
    pub async fn load_page(&self, page_number: u32) -> RefreshOutcome {
        if let Some(prefetch) = self.prefetch_token.lock().await.take() {
            prefetch.cancel();
        }
        let generation = self.generation.lock().await.clone();
        let query = self.query.lock().await.clone();

        self.ui.post(&generation, |state| state.begin_refresh());
        let fetched = self
            .source
            .fetch_page(
                page_number,
                self.config.page_size,
                query.sort,
                query.filter.as_deref(),
            )
            .await;

        match fetched {
            Ok(page) => {
                if generation.is_cancelled() {
                    return RefreshOutcome::Cancelled;
                }
                {
                    let mut index = self.index.write().await;
                    index.cursor.current_page = page.page_number;
                    index.cursor.has_next_page = page.has_next_page;
                    index.cursor.total_count = page.total_count;
                    index.record_positions(&page.tracks);
                }
                let tracks = page.tracks;
                let total_count = page.total_count;
                self.ui
                    .post(&generation, move |state| state.show_page(tracks, total_count));
                self.ui.flush().await;
                RefreshOutcome::Completed
            }
            Err(e) => {
                tracing::error!(error = %e, page_number, "page load failed");
                let message = format_load_error(&e);
                self.ui.post(&generation, move |state| state.fail_load(message));
                self.ui.flush().await;
                RefreshOutcome::Failed
            }
        }
    }

    /// Threshold hint for explicit-pagination callers: the next page to load
    /// once the selected row gets close to the end of the window.
    pub async fn should_load_next_page(&self, visible_index: usize) -> Option<u32> {
        let (loaded, loading_more) = {
            let state = self.state.lock().await;
            (state.tracks.len(), state.is_loading_more)
        };
        if loading_more {
            return None;
        }
        let cursor = self.index.read().await.cursor;
        if !cursor.has_next_page {
            return None;
        }
        (visible_index + LOAD_MORE_THRESHOLD >= loaded).then_some(cursor.current_page + 1)
    }

    /// Debounced re-query for incremental search input.
    ///
    /// Each keystroke supersedes the previous pending search; the refresh
    /// only fires once input has been quiet for the configured debounce.
    pub async fn search(self: Arc<Self>, query: String) {
        let token = CancellationToken::new();
        {
            let mut slot = self.search_token.lock().await;
            if let Some(previous) = slot.take() {
                previous.cancel();
            }
            *slot = Some(token.clone());
        }

        let controller = self;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(controller.config.search_debounce) => {}
            }
            let sort = controller.query.lock().await.sort;
            let filter = (!query.is_empty()).then_some(query);
            let _ = controller.refresh(sort, filter).await;
        });
    }

    /// Cancel the current generation and everything attached to it.
    pub async fn shutdown(&self) {
        self.generation.lock().await.cancel();
        if let Some(prefetch) = self.prefetch_token.lock().await.take() {
            prefetch.cancel();
        }
        if let Some(search) = self.search_token.lock().await.take() {
            search.cancel();
        }
    }

    // ========================================================================
    // Reorder
    // ========================================================================

    /// Which reorderable collection the view currently shows.
    pub async fn set_active_collection(&self, collection_id: Option<String>) {
        *self.active_collection.write().await = collection_id;
    }

    pub async fn active_collection(&self) -> Option<String> {
        self.active_collection.read().await.clone()
    }

    /// Move a track to `target_index` within the full id order.
    ///
    /// Updates the id sequence and the materialized window, persists the
    /// single move immediately, and schedules a debounced renormalization
    /// when the new neighbors' keys have collapsed too close together.
    pub async fn move_track(&self, track_id: &str, target_index: usize) -> Result<(), EngineError> {
        let Some(collection_id) = self.active_collection.read().await.clone() else {
            tracing::warn!(track_id, "move requested with no active collection");
            return Ok(());
        };

        let (key, target) = {
            let mut index = self.index.write().await;
            let Some(from) = index.ids.iter().position(|id| id == track_id) else {
                return Err(EngineError::UnknownTrack(track_id.to_string()));
            };
            let id = index.ids.remove(from);
            let target = target_index.min(index.ids.len());
            index.ids.insert(target, id);

            let prev_id = target.checked_sub(1).and_then(|i| index.ids.get(i));
            let next_id = index.ids.get(target + 1);
            let prev = prev_id.and_then(|id| index.positions.get(id).copied());
            let next = next_id.and_then(|id| index.positions.get(id).copied());
            if (prev_id.is_some() && prev.is_none()) || (next_id.is_some() && next.is_none()) {
                // A drag gesture always has materialized neighbors; getting
                // here means the caller moved against an unloaded region.
                tracing::warn!(track_id, target, "neighbor position unknown, treating as boundary");
            }

            let key = assign_order_key(prev, next, self.config.min_order_gap);
            index.positions.insert(track_id.to_string(), key.value);
            (key, target)
        };

        let generation = self.generation.lock().await.clone();
        let id = track_id.to_string();
        let value = key.value;
        self.ui
            .post(&generation, move |state| state.move_track(&id, target, value));

        self.scheduler.record_move(&collection_id, track_id, key.value);

        if key.needs_renormalization {
            tracing::info!(
                collection_id = %collection_id,
                track_id,
                "order precision exhausted, scheduling renormalization"
            );
            self.scheduler.schedule_renormalization(&collection_id).await;
        }
        Ok(())
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub async fn select_all(&self) {
        self.selection.lock().await.select_all();
    }

    pub async fn deselect_all(&self) {
        self.selection.lock().await.deselect_all();
    }

    pub async fn toggle_selected(&self, track_id: &str) {
        self.selection.lock().await.toggle(track_id);
    }

    pub async fn is_selected(&self, track_id: &str) -> bool {
        self.selection.lock().await.is_selected(track_id)
    }

    /// Count and label against the full sequence length, materialized or not.
    pub async fn selection_summary(&self) -> SelectionSummary {
        let total = self.index.read().await.ids.len();
        self.selection.lock().await.summary(total)
    }

    /// Resolve the selection to concrete ids in view order.
    pub async fn selected_track_ids(&self) -> Vec<TrackId> {
        let ids = { self.index.read().await.ids.clone() };
        self.selection.lock().await.selected_ids(&ids)
    }

    /// The complete ordered id sequence ("play all").
    pub async fn all_track_ids(&self) -> Vec<TrackId> {
        self.index.read().await.ids.clone()
    }

    pub async fn paging_cursor(&self) -> PagingCursor {
        self.index.read().await.cursor
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Start a new view generation.
    ///
    /// The old token is cancelled before the new one is swapped in, so a
    /// just-cancelled operation can never clobber the new generation's state.
    async fn begin_generation(&self) -> CancellationToken {
        let token = CancellationToken::new();
        {
            let mut current = self.generation.lock().await;
            current.cancel();
            *current = token.clone();
        }
        if let Some(prefetch) = self.prefetch_token.lock().await.take() {
            prefetch.cancel();
        }
        token
    }

    /// Launch the sequential background prefetch for the current generation.
    ///
    /// Detached: failures are logged and end the loop without touching the
    /// pages already displayed.
    async fn spawn_prefetch(&self, generation: &CancellationToken, start_page: u32) {
        let token = generation.child_token();
        *self.prefetch_token.lock().await = Some(token.clone());

        let source = self.source.clone();
        let ui = self.ui.clone();
        let index = self.index.clone();
        let page_size = self.config.page_size;
        let delay = self.config.prefetch_delay;
        let query = self.query.lock().await.clone();

        tokio::spawn(async move {
            tracing::debug!(start_page, "background prefetch started");
            ui.post(&token, |state| state.set_loading_more(true));

            let mut page_number = start_page;
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!(page_number, "background prefetch cancelled");
                        return;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }

                let page = match source
                    .fetch_page(page_number, page_size, query.sort, query.filter.as_deref())
                    .await
                {
                    Ok(page) => page,
                    Err(e) => {
                        tracing::warn!(error = %e, page_number, "background prefetch failed");
                        break;
                    }
                };
                // Discard a completion that lost the race with a newer
                // generation.
                if token.is_cancelled() {
                    return;
                }

                {
                    let mut index = index.write().await;
                    index.cursor.current_page = page.page_number;
                    index.cursor.has_next_page = page.has_next_page;
                    index.cursor.total_count = page.total_count;
                    index.record_positions(&page.tracks);
                }

                let has_next = page.has_next_page;
                let fetched = page.tracks.len();
                let tracks = page.tracks;
                ui.post(&token, move |state| state.append_page(tracks));
                tracing::debug!(page_number, fetched, has_next, "applied prefetched page");

                if !has_next {
                    break;
                }
                page_number += 1;
            }

            ui.post(&token, |state| state.set_loading_more(false));
            tracing::debug!("background prefetch finished");
        });
    }
}

/// Format store errors into user-facing load messages
fn format_load_error(error: &anyhow::Error) -> String {
    let error_str = error.to_string();
    if error_str.contains("timed out") || error_str.contains("timeout") {
        "The library is taking too long to respond. Try again.".to_string()
    } else if error_str.contains("locked") || error_str.contains("busy") {
        "The library is busy. Try again in a moment.".to_string()
    } else {
        format!("Could not load tracks: {}", error_str)
    }
}
