//! Shareable session state: enough plain data to restore a view, none of
//! the feature payloads. Persistence itself belongs to the caller.

use serde::{Deserialize, Serialize};

use crate::region::GenomicRegion;

use super::TrackComposer;

/// Per-track flags and position within the composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSession {
    pub id: String,
    pub visible: bool,
    pub collapsed: bool,
    pub order: usize,
}

/// A serializable snapshot of the view: region plus track arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub tracks: Vec<TrackSession>,
}

impl SessionState {
    /// Capture the current arrangement alongside a region.
    pub fn capture(region: &GenomicRegion, composer: &TrackComposer) -> Self {
        Self {
            chromosome: region.chrom.clone(),
            start: region.start,
            end: region.end,
            tracks: composer
                .tracks()
                .enumerate()
                .map(|(order, t)| TrackSession {
                    id: t.id.clone(),
                    visible: t.visible(),
                    collapsed: t.collapsed(),
                    order,
                })
                .collect(),
        }
    }

    pub fn region(&self) -> Result<GenomicRegion, crate::region::RegionError> {
        GenomicRegion::new(self.chromosome.clone(), self.start, self.end)
    }
}

impl TrackComposer {
    /// Re-apply a captured arrangement. Entries naming unknown tracks are
    /// skipped; the caller restores the region through the viewport
    /// controller separately.
    pub fn restore_session(&mut self, state: &SessionState) {
        let mut ordered: Vec<&TrackSession> = state.tracks.iter().collect();
        ordered.sort_by_key(|t| t.order);

        for (position, entry) in ordered.iter().enumerate() {
            if self.track(&entry.id).is_none() {
                log::warn!("session names unknown track {}, skipping", entry.id);
                continue;
            }
            let _ = self.set_visible(&entry.id, entry.visible);
            let _ = self.set_collapsed(&entry.id, entry.collapsed);
            let _ = self.reorder(&entry.id, position);
        }
    }
}
