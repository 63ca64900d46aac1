//! Genomic viewport and multi-track visualization composition engine.
//!
//! The engine maps a linear genomic coordinate space onto a bounded pixel
//! surface, manages bounded pan/zoom, and composes heterogeneous feature
//! tracks (gene models, mutations, signal, annotations, aligned reads,
//! splice junctions) into one synchronized stack of draw-command lists.
//! Rendering, data fetching and pointer wiring are collaborators: a backend
//! consumes [`track::DrawCommand`] lists, a data source feeds
//! [`track::TrackPayload`] values, and an input layer forwards normalized
//! pointer events into [`viewport::ViewportController`] and
//! [`track::Track::hit_test`].
//!
//! The bundled binary wires all three against a JSON data source and a
//! terminal backend.

pub mod compose;
pub mod config;
pub mod layout;
pub mod region;
pub mod source;
pub mod track;
pub mod viewer;
pub mod viewport;

pub use compose::{ComposeError, FetchOutcome, TrackComposer};
pub use config::LayoutConfig;
pub use region::{Genome, GenomicRegion, RegionError};
pub use track::{Track, TrackKind, TrackPayload};
pub use viewport::{Viewport, ViewportController};
