//! Tracks: one horizontal lane per feature type, sharing a single layout
//! and stacking model.
//!
//! Concrete track types are a fixed set of tagged payload variants behind
//! one `Track` struct; layout dispatches by `match`, so adding a variant is
//! a compile-checked change rather than a subclassing exercise.

pub mod annotation;
pub mod draw;
pub mod feature;
pub mod gene;
pub mod junction;
pub mod mutation;
pub mod reads;
pub mod signal;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LayoutConfig;
use crate::viewport::Viewport;

pub use draw::{ColorClass, DrawCommand, HitBox, HitTarget, Primitive};
pub use feature::{
    AnnotationFeature, Consequence, Exon, GeneModel, Mutation, ReadAlignment, SignalBin,
    SpliceJunction, Strand,
};

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("payload kind {got} does not match track kind {expected}")]
    KindMismatch { expected: TrackKind, got: TrackKind },
}

/// The fixed set of track types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Gene,
    Mutation,
    Signal,
    Annotation,
    Reads,
    Junction,
}

impl TrackKind {
    /// Default track height, expressed in rows of the active config.
    pub fn default_height(&self, cfg: &LayoutConfig) -> f64 {
        let rows = match self {
            TrackKind::Gene => 5.0,
            TrackKind::Mutation => 3.0,
            TrackKind::Signal => 4.0,
            TrackKind::Annotation => 3.0,
            TrackKind::Reads => 12.0,
            TrackKind::Junction => 4.0,
        };
        rows * cfg.row_height_px
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackKind::Gene => "gene",
            TrackKind::Mutation => "mutation",
            TrackKind::Signal => "signal",
            TrackKind::Annotation => "annotation",
            TrackKind::Reads => "reads",
            TrackKind::Junction => "junction",
        };
        f.write_str(name)
    }
}

/// Typed feature payload of a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "features", rename_all = "snake_case")]
pub enum TrackPayload {
    Gene(Vec<GeneModel>),
    Mutation(Vec<Mutation>),
    Signal(Vec<SignalBin>),
    Annotation(Vec<AnnotationFeature>),
    Reads(Vec<ReadAlignment>),
    Junction(Vec<SpliceJunction>),
}

impl TrackPayload {
    pub fn kind(&self) -> TrackKind {
        match self {
            TrackPayload::Gene(_) => TrackKind::Gene,
            TrackPayload::Mutation(_) => TrackKind::Mutation,
            TrackPayload::Signal(_) => TrackKind::Signal,
            TrackPayload::Annotation(_) => TrackKind::Annotation,
            TrackPayload::Reads(_) => TrackKind::Reads,
            TrackPayload::Junction(_) => TrackKind::Junction,
        }
    }

    pub fn empty(kind: TrackKind) -> Self {
        match kind {
            TrackKind::Gene => TrackPayload::Gene(Vec::new()),
            TrackKind::Mutation => TrackPayload::Mutation(Vec::new()),
            TrackKind::Signal => TrackPayload::Signal(Vec::new()),
            TrackKind::Annotation => TrackPayload::Annotation(Vec::new()),
            TrackKind::Reads => TrackPayload::Reads(Vec::new()),
            TrackKind::Junction => TrackPayload::Junction(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TrackPayload::Gene(v) => v.len(),
            TrackPayload::Mutation(v) => v.len(),
            TrackPayload::Signal(v) => v.len(),
            TrackPayload::Annotation(v) => v.len(),
            TrackPayload::Reads(v) => v.len(),
            TrackPayload::Junction(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Track lifecycle: data arrives, then a layout pass renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Unloaded,
    DataLoaded,
    Rendered,
}

/// What kind of pointer interaction produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Hover,
    Click,
}

/// Notification delivered to registered callbacks on hover/click.
#[derive(Debug, Clone)]
pub struct TrackEvent {
    pub track_id: String,
    pub kind: EventKind,
    /// Ordered key/value tooltip fields for the hit feature.
    pub fields: Vec<(String, String)>,
}

type EventHandler = Box<dyn FnMut(&TrackEvent)>;

/// Output of one per-kind layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct LayoutOutput {
    pub commands: Vec<DrawCommand>,
    pub hits: Vec<HitBox>,
    /// Row assignment per payload index; `None` when off-screen or
    /// overflowed.
    pub rows: Vec<Option<usize>>,
    pub overflow: usize,
}

impl LayoutOutput {
    pub(crate) fn for_payload(n: usize) -> Self {
        Self {
            rows: vec![None; n],
            ..Self::default()
        }
    }
}

/// One horizontal lane of the browser.
pub struct Track {
    pub id: String,
    pub name: String,
    kind: TrackKind,
    height: f64,
    visible: bool,
    collapsed: bool,
    state: TrackState,
    payload: TrackPayload,
    layout_cache: LayoutOutput,
    cached_at: Option<(u64, f64)>,
    hover_handlers: Vec<EventHandler>,
    click_handlers: Vec<EventHandler>,
}

impl Track {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: TrackKind, height: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            height,
            visible: true,
            collapsed: false,
            state: TrackState::Unloaded,
            payload: TrackPayload::empty(kind),
            layout_cache: LayoutOutput::default(),
            cached_at: None,
            hover_handlers: Vec::new(),
            click_handlers: Vec::new(),
        }
    }

    /// Create a track with its data already attached, sized by kind.
    pub fn with_payload(
        id: impl Into<String>,
        name: impl Into<String>,
        payload: TrackPayload,
        cfg: &LayoutConfig,
    ) -> Self {
        let kind = payload.kind();
        let mut track = Self::new(id, name, kind, kind.default_height(cfg));
        track
            .set_data(payload)
            .expect("payload kind matches by construction");
        track
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn payload(&self) -> &TrackPayload {
        &self.payload
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Height this track occupies in the composition.
    pub fn effective_height(&self, cfg: &LayoutConfig) -> f64 {
        if self.collapsed {
            cfg.collapsed_height_px
        } else {
            self.height
        }
    }

    /// Count of intervals excluded by the row limit in the last layout.
    pub fn overflow(&self) -> usize {
        self.layout_cache.overflow
    }

    /// Row assigned to a payload index in the last layout.
    pub fn row_of(&self, feature: usize) -> Option<usize> {
        self.layout_cache.rows.get(feature).copied().flatten()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        if self.collapsed != collapsed {
            self.collapsed = collapsed;
            self.invalidate();
        }
    }

    pub fn set_height(&mut self, height: f64) {
        if self.height != height {
            self.height = height;
            self.invalidate();
        }
    }

    /// Replace the track's data. Transitions `Unloaded`/`Rendered` to
    /// `DataLoaded`; the next layout pass re-renders.
    pub fn set_data(&mut self, payload: TrackPayload) -> Result<(), TrackError> {
        if payload.kind() != self.kind {
            return Err(TrackError::KindMismatch {
                expected: self.kind,
                got: payload.kind(),
            });
        }
        self.payload = payload;
        self.state = TrackState::DataLoaded;
        self.invalidate();
        Ok(())
    }

    /// Drop the track's data back to `Unloaded`.
    pub fn clear_data(&mut self) {
        self.payload = TrackPayload::empty(self.kind);
        self.state = TrackState::Unloaded;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.cached_at = None;
        self.layout_cache = LayoutOutput::default();
    }

    /// Lay the track out against a viewport, producing the ordered draw
    /// command list.
    ///
    /// Idempotent: repeated calls with the same viewport generation and
    /// width return the cached commands unchanged. The pass touches nothing
    /// outside this track.
    pub fn layout(&mut self, viewport: &Viewport, cfg: &LayoutConfig) -> &[DrawCommand] {
        if self.state == TrackState::Unloaded {
            return &[];
        }
        let key = (viewport.generation, viewport.pixel_width);
        if self.state == TrackState::Rendered && self.cached_at == Some(key) {
            return &self.layout_cache.commands;
        }

        let height = self.effective_height(cfg);
        let collapsed = self.collapsed;
        self.layout_cache = match &self.payload {
            TrackPayload::Gene(genes) => {
                gene::layout_genes(genes, viewport, cfg, collapsed, height)
            }
            TrackPayload::Mutation(muts) => {
                mutation::layout_mutations(muts, viewport, cfg, collapsed, height)
            }
            TrackPayload::Signal(bins) => {
                signal::layout_signal(bins, viewport, cfg, collapsed, height)
            }
            TrackPayload::Annotation(anns) => {
                annotation::layout_annotations(anns, viewport, cfg, collapsed, height)
            }
            TrackPayload::Reads(reads) => {
                reads::layout_reads(reads, viewport, cfg, collapsed, height)
            }
            TrackPayload::Junction(junctions) => {
                junction::layout_junctions(junctions, viewport, cfg, collapsed, height)
            }
        };
        self.cached_at = Some(key);
        self.state = TrackState::Rendered;
        &self.layout_cache.commands
    }

    /// Commands from the last layout pass, without recomputing.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.layout_cache.commands
    }

    /// Look up the feature under a pixel, using the last layout's hit
    /// boxes. Coordinates are track-relative.
    pub fn hit_test(&self, px: f64, py: f64) -> Option<&HitTarget> {
        // Later hit boxes are drawn on top; search back to front.
        self.layout_cache
            .hits
            .iter()
            .rev()
            .find(|hb| hb.contains(px, py))
            .map(|hb| &hb.target)
    }

    /// Ordered key/value pairs describing a hit feature. Formatting is the
    /// caller's concern.
    pub fn tooltip_fields(&self, target: &HitTarget) -> Vec<(String, String)> {
        match (target, &self.payload) {
            (HitTarget::Feature(i), TrackPayload::Gene(genes)) => {
                let g = &genes[*i];
                vec![
                    ("gene".to_string(), g.name.clone()),
                    (
                        "location".to_string(),
                        format!("{}:{}-{}", g.chrom, g.start, g.end),
                    ),
                    ("strand".to_string(), g.strand.arrow().to_string()),
                    ("exons".to_string(), g.exons.len().to_string()),
                ]
            }
            (HitTarget::Feature(i), TrackPayload::Mutation(muts)) => {
                let m = &muts[*i];
                let mut fields = vec![
                    ("mutation".to_string(), m.id.clone()),
                    (
                        "position".to_string(),
                        format!("{}:{}", m.chrom, m.position),
                    ),
                    ("consequence".to_string(), m.consequence.label().to_string()),
                ];
                if let Some(af) = m.allele_fraction {
                    fields.push(("allele fraction".to_string(), format!("{af:.3}")));
                }
                fields
            }
            (HitTarget::Group(members), TrackPayload::Mutation(muts)) => {
                let mut fields = vec![(
                    "mutations".to_string(),
                    members.len().to_string(),
                )];
                let breakdown =
                    mutation::consequence_breakdown(members.iter().map(|&i| &muts[i]));
                for (consequence, count) in breakdown {
                    fields.push((consequence.label().to_string(), count.to_string()));
                }
                fields
            }
            (HitTarget::Feature(i), TrackPayload::Signal(bins)) => {
                let b = &bins[*i];
                vec![
                    ("interval".to_string(), format!("{}-{}", b.start, b.end)),
                    ("value".to_string(), format!("{:.3}", b.value)),
                ]
            }
            (HitTarget::Feature(i), TrackPayload::Annotation(anns)) => {
                let a = &anns[*i];
                vec![
                    ("annotation".to_string(), a.label.clone()),
                    ("category".to_string(), a.category.clone()),
                    (
                        "location".to_string(),
                        format!("{}:{}-{}", a.chrom, a.start, a.end),
                    ),
                ]
            }
            (HitTarget::Feature(i), TrackPayload::Reads(reads)) => {
                let r = &reads[*i];
                vec![
                    ("read".to_string(), r.name.clone()),
                    (
                        "location".to_string(),
                        format!("{}:{}-{}", r.chrom, r.start, r.end),
                    ),
                    ("mapq".to_string(), r.mapq.to_string()),
                    ("strand".to_string(), r.strand.arrow().to_string()),
                ]
            }
            (HitTarget::Feature(i), TrackPayload::Junction(junctions)) => {
                let j = &junctions[*i];
                vec![
                    (
                        "junction".to_string(),
                        format!("{}:{}-{}", j.chrom, j.start(), j.end()),
                    ),
                    ("reads".to_string(), j.read_count.to_string()),
                    ("strand".to_string(), j.strand.arrow().to_string()),
                ]
            }
            // A group target on a non-grouping payload has no fields.
            (HitTarget::Group(_), _) => Vec::new(),
        }
    }

    /// Register a callback invoked on hover notifications.
    pub fn on_hover(&mut self, handler: impl FnMut(&TrackEvent) + 'static) {
        self.hover_handlers.push(Box::new(handler));
    }

    /// Register a callback invoked on click notifications.
    pub fn on_click(&mut self, handler: impl FnMut(&TrackEvent) + 'static) {
        self.click_handlers.push(Box::new(handler));
    }

    /// Run a pointer notification through the registered callbacks.
    /// Returns the hit target, if any.
    pub fn notify(&mut self, kind: EventKind, px: f64, py: f64) -> Option<HitTarget> {
        let target = self.hit_test(px, py)?.clone();
        let event = TrackEvent {
            track_id: self.id.clone(),
            kind,
            fields: self.tooltip_fields(&target),
        };
        let handlers = match kind {
            EventKind::Hover => &mut self.hover_handlers,
            EventKind::Click => &mut self.click_handlers,
        };
        for handler in handlers.iter_mut() {
            handler(&event);
        }
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::GenomicRegion;
    use crate::track::feature::{Consequence, Strand};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn viewport() -> Viewport {
        Viewport {
            region: GenomicRegion::new("chr17", 0, 10_000).unwrap(),
            pixel_width: 1000.0,
            generation: 0,
        }
    }

    fn gene_payload() -> TrackPayload {
        TrackPayload::Gene(vec![GeneModel {
            name: "TP53".to_string(),
            chrom: "chr17".to_string(),
            start: 1_000,
            end: 5_000,
            strand: Strand::Reverse,
            exons: vec![],
        }])
    }

    #[test]
    fn test_lifecycle_transitions() {
        let cfg = LayoutConfig::default();
        let mut track = Track::new("genes", "Genes", TrackKind::Gene, 70.0);
        assert_eq!(track.state(), TrackState::Unloaded);

        // Layout before data is a no-op.
        assert!(track.layout(&viewport(), &cfg).is_empty());
        assert_eq!(track.state(), TrackState::Unloaded);

        track.set_data(gene_payload()).unwrap();
        assert_eq!(track.state(), TrackState::DataLoaded);

        track.layout(&viewport(), &cfg);
        assert_eq!(track.state(), TrackState::Rendered);

        // New data drops back to DataLoaded.
        track.set_data(gene_payload()).unwrap();
        assert_eq!(track.state(), TrackState::DataLoaded);
    }

    #[test]
    fn test_set_data_rejects_wrong_kind() {
        let mut track = Track::new("genes", "Genes", TrackKind::Gene, 70.0);
        let err = track
            .set_data(TrackPayload::Reads(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, TrackError::KindMismatch { .. }));
        assert_eq!(track.state(), TrackState::Unloaded);
    }

    #[test]
    fn test_layout_idempotent() {
        let cfg = LayoutConfig::default();
        let mut track = Track::with_payload("genes", "Genes", gene_payload(), &cfg);
        let vp = viewport();
        let first = track.layout(&vp, &cfg).to_vec();
        let second = track.layout(&vp, &cfg).to_vec();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_layout_recomputes_on_new_generation() {
        let cfg = LayoutConfig::default();
        let mut track = Track::with_payload("genes", "Genes", gene_payload(), &cfg);
        let vp0 = viewport();
        let x_before = track.layout(&vp0, &cfg)[0].x;

        let vp1 = Viewport {
            region: GenomicRegion::new("chr17", 500, 10_500).unwrap(),
            pixel_width: 1000.0,
            generation: 1,
        };
        let x_after = track.layout(&vp1, &cfg)[0].x;
        assert_ne!(x_before, x_after);
    }

    #[test]
    fn test_effective_height() {
        let cfg = LayoutConfig::default();
        let mut track = Track::new("genes", "Genes", TrackKind::Gene, 70.0);
        assert_eq!(track.effective_height(&cfg), 70.0);
        track.set_collapsed(true);
        assert_eq!(track.effective_height(&cfg), cfg.collapsed_height_px);
    }

    #[test]
    fn test_hit_test_and_tooltip() {
        let cfg = LayoutConfig::default();
        let mut track = Track::with_payload("genes", "Genes", gene_payload(), &cfg);
        let vp = viewport();
        track.layout(&vp, &cfg);

        // The gene spans pixels 100-500 in row 0.
        let target = track.hit_test(300.0, 5.0).cloned().unwrap();
        assert_eq!(target, HitTarget::Feature(0));

        let fields = track.tooltip_fields(&target);
        assert_eq!(fields[0], ("gene".to_string(), "TP53".to_string()));
        assert!(fields.iter().any(|(k, _)| k == "strand"));

        assert!(track.hit_test(900.0, 5.0).is_none());
    }

    #[test]
    fn test_mutation_group_tooltip() {
        let cfg = LayoutConfig::default();
        let payload = TrackPayload::Mutation(vec![
            Mutation {
                id: "a".to_string(),
                chrom: "chr17".to_string(),
                position: 1_000,
                consequence: Consequence::Missense,
                allele_fraction: None,
            },
            Mutation {
                id: "b".to_string(),
                chrom: "chr17".to_string(),
                position: 1_010,
                consequence: Consequence::Missense,
                allele_fraction: None,
            },
        ]);
        let mut track = Track::with_payload("muts", "Mutations", payload, &cfg);
        let vp = viewport();
        track.layout(&vp, &cfg);

        let target = track.hit_test(100.5, 10.0).cloned().unwrap();
        let fields = track.tooltip_fields(&target);
        assert_eq!(fields[0], ("mutations".to_string(), "2".to_string()));
        assert!(fields.contains(&("missense".to_string(), "2".to_string())));
    }

    #[test]
    fn test_callbacks_fire() {
        let cfg = LayoutConfig::default();
        let mut track = Track::with_payload("genes", "Genes", gene_payload(), &cfg);
        track.layout(&viewport(), &cfg);

        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        track.on_click(move |event| {
            sink.borrow_mut().push(event.fields[0].1.clone());
        });

        let hit = track.notify(EventKind::Click, 300.0, 5.0);
        assert!(hit.is_some());
        assert_eq!(seen.borrow().as_slice(), ["TP53".to_string()]);

        // A miss fires nothing.
        let miss = track.notify(EventKind::Click, 950.0, 5.0);
        assert!(miss.is_none());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_clear_data_unloads() {
        let cfg = LayoutConfig::default();
        let mut track = Track::with_payload("genes", "Genes", gene_payload(), &cfg);
        track.layout(&viewport(), &cfg);
        track.clear_data();
        assert_eq!(track.state(), TrackState::Unloaded);
        assert!(track.commands().is_empty());
    }

    #[test]
    fn test_payload_serde_tagging() {
        let json = serde_json::to_string(&gene_payload()).unwrap();
        assert!(json.contains("\"kind\":\"gene\""));
        let back: TrackPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), TrackKind::Gene);
    }
}
