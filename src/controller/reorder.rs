//! Debounced persistence for manual reorder operations
//!
//! Two write paths with very different shapes: a single move persists
//! immediately (the common, low-latency case), while a full renormalization
//! is debounced behind a quiet period so a drag gesture producing several
//! intermediate positions collapses into one batch write. Both tolerate
//! being superseded, and neither lets a persistence failure escape; the
//! in-memory order stays correct regardless of what the store does.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use super::dispatch::UiDispatcher;
use crate::model::{ListIndex, TrackSource};

struct PendingRenormalization {
    collection_id: String,
    token: CancellationToken,
}

/// Schedules reorder persistence against the backing store
pub struct ReorderScheduler {
    source: Arc<dyn TrackSource>,
    index: Arc<RwLock<ListIndex>>,
    /// Collection currently shown in the view; a renormalization scheduled
    /// for a collection the user has since navigated away from is dropped.
    active_collection: Arc<RwLock<Option<String>>>,
    ui: UiDispatcher,
    /// Dispatcher generation for scheduler-originated posts; lives as long
    /// as the scheduler and is never cancelled.
    ui_generation: CancellationToken,
    /// At most one pending renormalization; a newer request replaces and
    /// cancels it.
    pending: Mutex<Option<PendingRenormalization>>,
    quiet_period: Duration,
}

impl ReorderScheduler {
    pub(crate) fn new(
        source: Arc<dyn TrackSource>,
        index: Arc<RwLock<ListIndex>>,
        active_collection: Arc<RwLock<Option<String>>>,
        ui: UiDispatcher,
        quiet_period: Duration,
    ) -> Self {
        Self {
            source,
            index,
            active_collection,
            ui,
            ui_generation: CancellationToken::new(),
            pending: Mutex::new(None),
            quiet_period,
        }
    }

    /// Persist one track's new order value immediately.
    ///
    /// Fire-and-forget for the caller; the spawned task awaits the store and
    /// logs failure, since the in-memory order is already correct.
    pub fn record_move(&self, collection_id: &str, track_id: &str, new_order: f64) {
        let source = self.source.clone();
        let collection_id = collection_id.to_string();
        let track_id = track_id.to_string();
        tokio::spawn(async move {
            match source
                .persist_single_move(&collection_id, &track_id, new_order)
                .await
            {
                Ok(true) => {
                    tracing::debug!(collection_id = %collection_id, track_id = %track_id, new_order, "persisted move");
                }
                Ok(false) => {
                    tracing::warn!(collection_id = %collection_id, track_id = %track_id, "store rejected move");
                }
                Err(e) => {
                    tracing::warn!(error = %e, collection_id = %collection_id, track_id = %track_id, "failed to persist move");
                }
            }
        });
    }

    /// Debounce a full renormalization of the given collection.
    ///
    /// Cancels any previously scheduled renormalization, waits the quiet
    /// period, then assigns dense integer positions to the current in-memory
    /// order and persists the whole sequence in one batch write.
    pub async fn schedule_renormalization(&self, collection_id: &str) {
        let token = CancellationToken::new();
        {
            let mut pending = self.pending.lock().await;
            if let Some(previous) = pending.take() {
                tracing::debug!(collection_id = %previous.collection_id, "superseding scheduled renormalization");
                previous.token.cancel();
            }
            *pending = Some(PendingRenormalization {
                collection_id: collection_id.to_string(),
                token: token.clone(),
            });
        }

        let source = self.source.clone();
        let index = self.index.clone();
        let active_collection = self.active_collection.clone();
        let ui = self.ui.clone();
        let ui_generation = self.ui_generation.clone();
        let quiet_period = self.quiet_period;
        let collection_id = collection_id.to_string();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(quiet_period) => {}
            }
            if token.is_cancelled() {
                return;
            }

            // The user may have navigated to a different collection during
            // the quiet period; renormalizing it now would corrupt an order
            // that no longer belongs to this view.
            let still_active =
                active_collection.read().await.as_deref() == Some(collection_id.as_str());
            if !still_active {
                tracing::debug!(collection_id = %collection_id, "skipping renormalization, collection no longer active");
                return;
            }

            let ordered_ids = { index.read().await.ids.clone() };
            if ordered_ids.is_empty() {
                return;
            }

            match source.persist_full_order(&collection_id, &ordered_ids).await {
                Ok(()) => {
                    tracing::info!(collection_id = %collection_id, count = ordered_ids.len(), "renormalized track order");
                    {
                        let mut index = index.write().await;
                        for (i, id) in ordered_ids.iter().enumerate() {
                            index.positions.insert(id.clone(), (i + 1) as f64);
                        }
                    }
                    ui.post(&ui_generation, move |state| {
                        state.apply_dense_positions(&ordered_ids);
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, collection_id = %collection_id, "failed to persist renormalized order");
                }
            }
        });
    }
}
