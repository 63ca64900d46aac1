//! Track composition: ordered lanes, vertical stacking, region broadcast,
//! and the stale-fetch guard.

pub mod session;

use log::{debug, warn};
use thiserror::Error;

use crate::config::LayoutConfig;
use crate::track::{Track, TrackPayload};
use crate::viewport::Viewport;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("track not found: {0}")]
    TrackNotFound(String),
    #[error("duplicate track id: {0}")]
    DuplicateTrack(String),
    #[error(transparent)]
    Track(#[from] crate::track::TrackError),
}

/// Vertical placement of one visible track within the composed canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub track_id: String,
    pub offset: f64,
    pub height: f64,
}

/// Outcome of applying an asynchronously fetched payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// The viewport moved on while the fetch was in flight; the payload was
    /// discarded.
    Stale { tagged: u64, current: u64 },
}

/// Holds the ordered track list and computes the stacking geometry.
///
/// Tracks lay out independently: a region change is broadcast in
/// composition order and no track sees another's output.
pub struct TrackComposer {
    tracks: Vec<Track>,
    cfg: LayoutConfig,
}

impl TrackComposer {
    pub fn new(cfg: LayoutConfig) -> Self {
        Self {
            tracks: Vec::new(),
            cfg,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.cfg
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks in composition order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    fn index_of(&self, id: &str) -> Result<usize, ComposeError> {
        self.tracks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| {
                warn!("track not found: {id}");
                ComposeError::TrackNotFound(id.to_string())
            })
    }

    /// Register a track at the end of the composition.
    pub fn add_track(&mut self, track: Track) -> Result<(), ComposeError> {
        if self.track(&track.id).is_some() {
            return Err(ComposeError::DuplicateTrack(track.id.clone()));
        }
        debug!("add track {} ({})", track.id, track.kind());
        self.tracks.push(track);
        Ok(())
    }

    /// Remove a track, returning it to the caller.
    pub fn remove_track(&mut self, id: &str) -> Result<Track, ComposeError> {
        let index = self.index_of(id)?;
        Ok(self.tracks.remove(index))
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), ComposeError> {
        let index = self.index_of(id)?;
        self.tracks[index].set_visible(visible);
        Ok(())
    }

    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) -> Result<(), ComposeError> {
        let index = self.index_of(id)?;
        self.tracks[index].set_collapsed(collapsed);
        Ok(())
    }

    /// Move a track to a new position in the composition order. Ownership
    /// of the track's data never changes, only iteration order.
    pub fn reorder(&mut self, id: &str, new_index: usize) -> Result<(), ComposeError> {
        let index = self.index_of(id)?;
        let track = self.tracks.remove(index);
        let clamped = new_index.min(self.tracks.len());
        self.tracks.insert(clamped, track);
        Ok(())
    }

    /// Vertical offsets for every visible track: a running sum of the
    /// preceding visible tracks' effective heights plus the inter-track gap.
    pub fn placements(&self) -> Vec<Placement> {
        let mut placements = Vec::new();
        let mut offset = 0.0;
        for track in self.tracks.iter().filter(|t| t.visible()) {
            let height = track.effective_height(&self.cfg);
            placements.push(Placement {
                track_id: track.id.clone(),
                offset,
                height,
            });
            offset += height + self.cfg.track_gap_px;
        }
        placements
    }

    /// Total canvas height: visible content plus gaps, floored at the
    /// configured minimum.
    pub fn total_height(&self) -> f64 {
        let visible: Vec<&Track> = self.tracks.iter().filter(|t| t.visible()).collect();
        let content: f64 = visible
            .iter()
            .map(|t| t.effective_height(&self.cfg))
            .sum();
        let gaps = visible.len().saturating_sub(1) as f64 * self.cfg.track_gap_px;
        (content + gaps).max(self.cfg.min_canvas_height_px)
    }

    /// Broadcast a region change: lay out every visible track against the
    /// viewport, in composition order.
    pub fn layout_all(&mut self, viewport: &Viewport) {
        debug!(
            "layout pass: region {} generation {}",
            viewport.region, viewport.generation
        );
        for track in self.tracks.iter_mut().filter(|t| t.visible()) {
            track.layout(viewport, &self.cfg);
        }
    }

    /// Apply an asynchronously fetched payload, discarding it if the
    /// viewport has moved past the generation it was fetched for.
    pub fn apply_data(
        &mut self,
        id: &str,
        payload: TrackPayload,
        tagged_generation: u64,
        viewport: &Viewport,
    ) -> Result<FetchOutcome, ComposeError> {
        let index = self.index_of(id)?;
        if tagged_generation != viewport.generation {
            warn!(
                "discarding stale fetch for {id}: tagged {tagged_generation}, current {}",
                viewport.generation
            );
            return Ok(FetchOutcome::Stale {
                tagged: tagged_generation,
                current: viewport.generation,
            });
        }
        self.tracks[index].set_data(payload)?;
        Ok(FetchOutcome::Applied)
    }

    /// Record a fetch failure. The last rendered data stays visible; an
    /// explicit `clear_data` is the only way to blank the track.
    pub fn note_fetch_failure(&mut self, id: &str, error: &str) -> Result<(), ComposeError> {
        let index = self.index_of(id)?;
        warn!("fetch failed for {}: {error}; keeping last data", self.tracks[index].id);
        Ok(())
    }

    pub fn clear_data(&mut self, id: &str) -> Result<(), ComposeError> {
        let index = self.index_of(id)?;
        self.tracks[index].clear_data();
        Ok(())
    }
}
