//! Viewport ownership: the current genomic region, its affine mapping onto
//! the pixel surface, and bounded pan/zoom.

use log::debug;

use crate::config::LayoutConfig;
use crate::region::{Genome, GenomicRegion, RegionError};

/// Immutable snapshot of the mapping consumed by track layout passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub region: GenomicRegion,
    pub pixel_width: f64,
    /// Monotonically increasing token identifying the region this snapshot
    /// was taken from. Fetch results tagged with an older generation are
    /// stale and must be discarded.
    pub generation: u64,
}

impl Viewport {
    /// Pixels per base pair.
    pub fn scale(&self) -> f64 {
        self.pixel_width / self.region.span() as f64
    }

    /// Map a genomic position to a pixel x coordinate.
    pub fn position_to_pixel(&self, pos: f64) -> f64 {
        (pos - self.region.start as f64) * self.scale()
    }

    /// Map a pixel x coordinate back to a genomic position.
    pub fn pixel_to_position(&self, px: f64) -> f64 {
        self.region.start as f64 + px / self.scale()
    }
}

/// Transient zoom gesture state: `screen_px = scale * base_px + translate_x`
/// relative to the mapping captured at gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    pub scale: f64,
    pub translate_x: f64,
}

/// Whether a continuous gesture is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    /// Holds the region and width the gesture transform is relative to.
    Active { base: Viewport },
}

/// Owns the current region and the zoom/pan bounds; every region mutation
/// funnels through here so the generation counter stays authoritative.
#[derive(Debug)]
pub struct ViewportController {
    genome: Genome,
    region: GenomicRegion,
    pixel_width: f64,
    min_span_bp: u64,
    max_span_bp: u64,
    generation: u64,
    gesture: GestureState,
}

impl ViewportController {
    pub fn new(
        genome: Genome,
        region: GenomicRegion,
        pixel_width: f64,
        cfg: &LayoutConfig,
    ) -> Result<Self, RegionError> {
        genome.validate(&region)?;
        let mut controller = Self {
            genome,
            region: region.clone(),
            pixel_width: pixel_width.max(1.0),
            min_span_bp: cfg.min_span_bp,
            max_span_bp: cfg.max_span_bp,
            generation: 0,
            gesture: GestureState::Idle,
        };
        // Apply span clamping to the initial region as well.
        controller.region = controller.clamped(&region);
        Ok(controller)
    }

    pub fn region(&self) -> &GenomicRegion {
        &self.region
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn pixel_width(&self) -> f64 {
        self.pixel_width
    }

    /// Snapshot of the current mapping for layout passes.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            region: self.region.clone(),
            pixel_width: self.pixel_width,
            generation: self.generation,
        }
    }

    pub fn position_to_pixel(&self, pos: f64) -> f64 {
        self.viewport().position_to_pixel(pos)
    }

    pub fn pixel_to_position(&self, px: f64) -> f64 {
        self.viewport().pixel_to_position(px)
    }

    /// Adopt a requested region after validating it against the genome.
    ///
    /// Rejects with `InvalidRegion`-class errors when `start >= end` or the
    /// bounds fall outside the chromosome; the previous region is retained.
    /// A valid request has its span clamped to `[min_span_bp, max_span_bp]`
    /// around the requested center before being adopted.
    pub fn set_region(&mut self, region: GenomicRegion) -> Result<(), RegionError> {
        self.genome.validate(&region)?;
        let adopted = self.clamped(&region);
        self.adopt(adopted);
        Ok(())
    }

    /// Zoom by `factor` keeping the genomic position under `pixel_center`
    /// anchored to the same screen fraction. Factors above 1 zoom in.
    pub fn zoom_by(&mut self, factor: f64, pixel_center: f64) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        let anchor = self.pixel_to_position(pixel_center);
        let span = self.region.span() as f64;
        let new_span = self.clamp_span(&self.region.chrom, span / factor);
        let fraction = (pixel_center / self.pixel_width).clamp(0.0, 1.0);

        let start = anchor - fraction * new_span;
        let adopted = self.fit_to_chromosome(&self.region.chrom, start, new_span);
        self.adopt(adopted);
    }

    /// Factor-2 zoom about the viewport midpoint.
    pub fn zoom_in(&mut self) {
        self.zoom_by(2.0, self.pixel_width / 2.0);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(0.5, self.pixel_width / 2.0);
    }

    /// Shift the viewport by a pixel delta, converting through the current
    /// scale. Positive deltas move toward higher coordinates. The span is
    /// preserved; the shift clamps at both chromosome ends.
    pub fn pan_by(&mut self, delta_pixels: f64) {
        let scale = self.viewport().scale();
        if scale <= 0.0 {
            return;
        }
        let delta_bp = delta_pixels / scale;
        let span = self.region.span() as f64;
        let start = self.region.start as f64 + delta_bp;
        let adopted = self.fit_to_chromosome(&self.region.chrom, start, span);
        self.adopt(adopted);
    }

    /// Update the pixel surface width, keeping the region unchanged.
    pub fn resize(&mut self, pixel_width: f64) {
        self.pixel_width = pixel_width.max(1.0);
    }

    /// Enter the continuous-gesture state. Intermediate updates bypass span
    /// clamping until the gesture ends.
    pub fn begin_gesture(&mut self) {
        self.gesture = GestureState::Active {
            base: self.viewport(),
        };
    }

    pub fn gesture_active(&self) -> bool {
        matches!(self.gesture, GestureState::Active { .. })
    }

    /// Apply an intermediate gesture transform against the mapping captured
    /// at gesture start. No-op while idle.
    pub fn update_gesture(&mut self, state: ZoomState) {
        let base = match &self.gesture {
            GestureState::Active { base } => base.clone(),
            GestureState::Idle => return,
        };
        if state.scale <= 0.0 || !state.scale.is_finite() {
            return;
        }
        // Invert the gesture transform to find which base pixels are now on
        // screen, then map those through the base region.
        let left = (0.0 - state.translate_x) / state.scale;
        let right = (base.pixel_width - state.translate_x) / state.scale;
        let start = base.pixel_to_position(left);
        let end = base.pixel_to_position(right);

        let length = self.chromosome_length(&self.region.chrom) as f64;
        let start = start.clamp(0.0, length - 1.0);
        let end = end.clamp(start + 1.0, length);
        let adopted = GenomicRegion {
            chrom: self.region.chrom.clone(),
            start: start.round() as u64,
            end: (end.round() as u64).max(start.round() as u64 + 1),
        };
        self.adopt(adopted);
    }

    /// Leave the gesture state, re-validating and clamping the final region
    /// exactly as `set_region` would.
    pub fn end_gesture(&mut self) {
        self.gesture = GestureState::Idle;
        let clamped = self.clamped(&self.region.clone());
        if clamped != self.region {
            self.adopt(clamped);
        }
    }

    fn chromosome_length(&self, chrom: &str) -> u64 {
        // Adopted regions always name a known chromosome.
        self.genome.length(chrom).unwrap_or(u64::MAX)
    }

    fn clamp_span(&self, chrom: &str, span: f64) -> f64 {
        let max = self.max_span_bp.min(self.chromosome_length(chrom)) as f64;
        span.clamp(self.min_span_bp as f64, max)
    }

    /// Clamp a validated region's span to the configured bounds around its
    /// own center, then shift it inside the chromosome.
    fn clamped(&self, region: &GenomicRegion) -> GenomicRegion {
        let span = self.clamp_span(&region.chrom, region.span() as f64);
        let start = region.center() - span / 2.0;
        self.fit_to_chromosome(&region.chrom, start, span)
    }

    /// Build a region of the given span starting near `start`, shifted so it
    /// lies within `[0, chromosome_length]`.
    fn fit_to_chromosome(&self, chrom: &str, start: f64, span: f64) -> GenomicRegion {
        let length = self.chromosome_length(chrom) as f64;
        let span = span.min(length).max(1.0);
        let start = start.clamp(0.0, length - span);
        let start_bp = start.round() as u64;
        let span_bp = (span.round() as u64).max(1);
        GenomicRegion {
            chrom: chrom.to_string(),
            start: start_bp,
            end: (start_bp + span_bp).min(length.round() as u64),
        }
    }

    fn adopt(&mut self, region: GenomicRegion) {
        if region == self.region {
            return;
        }
        self.generation += 1;
        debug!(
            "viewport region {} -> {} (generation {})",
            self.region, region, self.generation
        );
        self.region = region;
    }
}
