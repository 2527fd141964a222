//! Data-source boundary: paged fetch, id-only fetch and order persistence
//!
//! The engine never talks to storage directly. Everything it needs from the
//! backing store is captured by [`TrackSource`]; the store decides how pages
//! are queried and how persisted order is organized internally.

use anyhow::Result;
use async_trait::async_trait;

use super::track::{SortOrder, Track, TrackId};

/// One page of materialized tracks as returned by the store
#[derive(Clone, Debug)]
pub struct TrackPage {
    pub tracks: Vec<Track>,
    /// Total number of tracks matching the query, across all pages.
    pub total_count: usize,
    pub has_next_page: bool,
    /// 1-based page number this page was fetched as.
    pub page_number: u32,
}

/// Contract the engine requires from the backing store.
///
/// Fetch failures are surfaced as `Err`; `persist_single_move` additionally
/// returns `Ok(false)` when the store rejected the move without erroring
/// (e.g. the row disappeared underneath it).
#[async_trait]
pub trait TrackSource: Send + Sync {
    async fn fetch_page(
        &self,
        page_number: u32,
        page_size: usize,
        sort: SortOrder,
        filter: Option<&str>,
    ) -> Result<TrackPage>;

    /// The complete ordered id sequence for the query, independent of how
    /// many rows have been materialized.
    async fn fetch_all_ids(&self, sort: SortOrder, filter: Option<&str>) -> Result<Vec<TrackId>>;

    async fn persist_single_move(
        &self,
        collection_id: &str,
        track_id: &str,
        new_order: f64,
    ) -> Result<bool>;

    async fn persist_full_order(&self, collection_id: &str, ordered_ids: &[TrackId])
        -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory store used by the engine tests

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::{SortOrder, Track, TrackId, TrackPage, TrackSource};

    pub(crate) fn track(id: &str, name: &str, position: f64) -> Track {
        Track {
            id: id.to_string(),
            name: name.to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            duration_ms: 180_000,
            position,
        }
    }

    /// Fake store: rows live in a `Vec` whose order is the persisted order.
    pub(crate) struct MemoryStore {
        pub tracks: Mutex<Vec<Track>>,
        pub fail_fetches: AtomicBool,
        pub fail_persists: AtomicBool,
        /// Artificial latency applied to every fetch.
        pub fetch_delay: Duration,
        pub single_moves: Mutex<Vec<(String, String, f64)>>,
        pub full_orders: Mutex<Vec<(String, Vec<TrackId>)>>,
    }

    impl MemoryStore {
        pub(crate) fn new(tracks: Vec<Track>) -> Self {
            Self {
                tracks: Mutex::new(tracks),
                fail_fetches: AtomicBool::new(false),
                fail_persists: AtomicBool::new(false),
                fetch_delay: Duration::ZERO,
                single_moves: Mutex::new(Vec::new()),
                full_orders: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn with_delay(tracks: Vec<Track>, fetch_delay: Duration) -> Self {
            Self {
                fetch_delay,
                ..Self::new(tracks)
            }
        }

        /// Current persisted id order.
        pub(crate) async fn persisted_order(&self) -> Vec<TrackId> {
            self.tracks.lock().await.iter().map(|t| t.id.clone()).collect()
        }

        async fn query(&self, sort: SortOrder, filter: Option<&str>) -> Result<Vec<Track>> {
            if self.fail_fetches.load(Ordering::SeqCst) {
                return Err(anyhow!("store unavailable"));
            }
            if !self.fetch_delay.is_zero() {
                tokio::time::sleep(self.fetch_delay).await;
            }
            let mut rows: Vec<Track> = self
                .tracks
                .lock()
                .await
                .iter()
                .filter(|t| {
                    filter
                        .map(|f| t.name.to_lowercase().contains(&f.to_lowercase()))
                        .unwrap_or(true)
                })
                .cloned()
                .collect();
            match sort {
                SortOrder::Custom => {
                    rows.sort_by(|a, b| a.position.total_cmp(&b.position));
                }
                SortOrder::TitleAsc => rows.sort_by(|a, b| a.name.cmp(&b.name)),
                SortOrder::TitleDesc => rows.sort_by(|a, b| b.name.cmp(&a.name)),
                SortOrder::ArtistAsc => rows.sort_by(|a, b| a.artist.cmp(&b.artist)),
                SortOrder::ArtistDesc => rows.sort_by(|a, b| b.artist.cmp(&a.artist)),
                SortOrder::AlbumAsc => rows.sort_by(|a, b| a.album.cmp(&b.album)),
                SortOrder::DateAddedDesc => rows.reverse(),
            }
            Ok(rows)
        }
    }

    #[async_trait]
    impl TrackSource for MemoryStore {
        async fn fetch_page(
            &self,
            page_number: u32,
            page_size: usize,
            sort: SortOrder,
            filter: Option<&str>,
        ) -> Result<TrackPage> {
            let rows = self.query(sort, filter).await?;
            let total_count = rows.len();
            let start = (page_number.saturating_sub(1) as usize) * page_size;
            let end = (start + page_size).min(total_count);
            let tracks = if start < total_count {
                rows[start..end].to_vec()
            } else {
                Vec::new()
            };
            Ok(TrackPage {
                tracks,
                total_count,
                has_next_page: end < total_count,
                page_number,
            })
        }

        async fn fetch_all_ids(
            &self,
            sort: SortOrder,
            filter: Option<&str>,
        ) -> Result<Vec<TrackId>> {
            Ok(self.query(sort, filter).await?.into_iter().map(|t| t.id).collect())
        }

        async fn persist_single_move(
            &self,
            collection_id: &str,
            track_id: &str,
            new_order: f64,
        ) -> Result<bool> {
            if self.fail_persists.load(Ordering::SeqCst) {
                return Err(anyhow!("write failed"));
            }
            self.single_moves.lock().await.push((
                collection_id.to_string(),
                track_id.to_string(),
                new_order,
            ));
            let mut tracks = self.tracks.lock().await;
            match tracks.iter_mut().find(|t| t.id == track_id) {
                Some(track) => {
                    track.position = new_order;
                    tracks.sort_by(|a, b| a.position.total_cmp(&b.position));
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn persist_full_order(
            &self,
            collection_id: &str,
            ordered_ids: &[TrackId],
        ) -> Result<()> {
            if self.fail_persists.load(Ordering::SeqCst) {
                return Err(anyhow!("write failed"));
            }
            self.full_orders
                .lock()
                .await
                .push((collection_id.to_string(), ordered_ids.to_vec()));
            let mut tracks = self.tracks.lock().await;
            tracks.sort_by_key(|t| {
                ordered_ids
                    .iter()
                    .position(|id| *id == t.id)
                    .unwrap_or(usize::MAX)
            });
            for (i, track) in tracks.iter_mut().enumerate() {
                track.position = (i + 1) as f64;
            }
            Ok(())
        }
    }
}
