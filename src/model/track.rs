//! Core track types shared across the engine

/// Stable unique identifier of a track, opaque to the engine.
pub type TrackId = String;

/// A track row as materialized into a list view
#[derive(Clone, Debug)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: u32,
    /// Fractional sort key. Only meaningful for reorderable collections;
    /// mutated in place by manual moves.
    pub position: f64,
}

/// Sort order applied to a list view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Manual order, sorted by the fractional `position` key
    #[default]
    Custom,
    TitleAsc,
    TitleDesc,
    ArtistAsc,
    ArtistDesc,
    AlbumAsc,
    DateAddedDesc,
}
