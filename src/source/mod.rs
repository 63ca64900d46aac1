//! JSON track documents: the bundled data source for the CLI.
//!
//! The core engine takes payloads as plain values; this module only exists
//! so the binary has something to load them from. The document carries an
//! optional genome override and default region alongside the track list.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::region::{Genome, GenomicRegion};
use crate::track::{Track, TrackPayload};

/// One track in a document: identity plus its typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(flatten)]
    pub payload: TrackPayload,
}

/// A complete track document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDocument {
    /// Chromosome lengths; GRCh38 primary chromosomes when omitted.
    #[serde(default)]
    pub genome: Option<HashMap<String, u64>>,
    /// Region to open on, `chr:start-end`.
    #[serde(default)]
    pub region: Option<String>,
    pub tracks: Vec<TrackEntry>,
}

impl TrackDocument {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read track file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse track file: {}", path.display()))
    }

    pub fn genome(&self) -> Genome {
        match &self.genome {
            Some(lengths) => Genome::new(lengths.clone()),
            None => Genome::grch38(),
        }
    }

    pub fn region(&self) -> Result<Option<GenomicRegion>> {
        self.region
            .as_deref()
            .map(|s| s.parse().context("invalid region in track file"))
            .transpose()
    }

    /// Instantiate tracks in document order, data attached.
    pub fn build_tracks(&self, cfg: &LayoutConfig) -> Vec<Track> {
        self.tracks
            .iter()
            .map(|entry| {
                let name = entry.name.clone().unwrap_or_else(|| entry.id.clone());
                let mut track =
                    Track::with_payload(entry.id.clone(), name, entry.payload.clone(), cfg);
                if let Some(height) = entry.height {
                    track.set_height(height);
                }
                track
            })
            .collect()
    }
}
