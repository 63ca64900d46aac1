/// Tunable layout constants shared by every track and the composer.
///
/// The defaults carry the screen-pixel values the engine was tuned with;
/// `terminal()` rescales the vertical dimensions to character cells for the
/// bundled TUI backend, where one cell is one pixel in both axes.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Smallest span a viewport may zoom into, in base pairs.
    pub min_span_bp: u64,
    /// Largest span a viewport may zoom out to, in base pairs.
    pub max_span_bp: u64,
    /// Target number of major axis ticks.
    pub target_tick_count: usize,
    /// Minimum horizontal pixel gap between intervals sharing a pileup row.
    pub pack_gap_px: f64,
    /// Pixel distance under which point features merge into one glyph.
    pub group_gap_px: f64,
    /// Row limit per track before intervals overflow into the "+N more" badge.
    pub max_rows: usize,
    /// Height of one pileup row.
    pub row_height_px: f64,
    /// Height of a collapsed track.
    pub collapsed_height_px: f64,
    /// Vertical gap between stacked tracks.
    pub track_gap_px: f64,
    /// Lower bound on the composed canvas height.
    pub min_canvas_height_px: f64,
    /// Pixel width below which feature labels are suppressed.
    pub min_label_width_px: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_span_bp: 20,
            max_span_bp: 250_000_000,
            target_tick_count: 10,
            pack_gap_px: 2.0,
            group_gap_px: 8.0,
            max_rows: 40,
            row_height_px: 14.0,
            collapsed_height_px: 20.0,
            track_gap_px: 8.0,
            min_canvas_height_px: 200.0,
            min_label_width_px: 30.0,
        }
    }
}

impl LayoutConfig {
    /// Values tuned for a character-cell backend: one cell per row, no
    /// sub-cell gaps.
    pub fn terminal() -> Self {
        Self {
            pack_gap_px: 1.0,
            group_gap_px: 3.0,
            max_rows: 20,
            row_height_px: 1.0,
            collapsed_height_px: 1.0,
            track_gap_px: 1.0,
            min_canvas_height_px: 10.0,
            min_label_width_px: 8.0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds_sane() {
        let cfg = LayoutConfig::default();
        assert!(cfg.min_span_bp < cfg.max_span_bp);
        assert!(cfg.pack_gap_px >= 0.0);
        assert!(cfg.max_rows > 0);
    }

    #[test]
    fn test_terminal_profile_cell_sized() {
        let cfg = LayoutConfig::terminal();
        assert_eq!(cfg.row_height_px, 1.0);
        assert_eq!(cfg.collapsed_height_px, 1.0);
        assert_eq!(cfg.min_span_bp, LayoutConfig::default().min_span_bp);
    }
}
