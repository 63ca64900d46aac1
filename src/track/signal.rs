//! Continuous-signal layout: one bar per bin, scaled to the visible maximum.

use crate::config::LayoutConfig;
use crate::viewport::Viewport;

use super::draw::{ColorClass, DrawCommand, HitBox, HitTarget};
use super::feature::SignalBin;
use super::LayoutOutput;

pub(crate) fn layout_signal(
    bins: &[SignalBin],
    viewport: &Viewport,
    _cfg: &LayoutConfig,
    collapsed: bool,
    track_height: f64,
) -> LayoutOutput {
    let region = &viewport.region;
    let width = viewport.pixel_width;

    let visible: Vec<usize> = bins
        .iter()
        .enumerate()
        .filter(|(_, b)| region.overlaps(b.start, b.end))
        .map(|(i, _)| i)
        .collect();

    let mut out = LayoutOutput::for_payload(bins.len());

    // Baseline along the bottom edge.
    out.commands.push(DrawCommand::line(
        0.0,
        track_height - 1.0,
        width,
        ColorClass::Axis,
    ));

    if visible.is_empty() {
        return out;
    }

    let max_value = visible
        .iter()
        .map(|&i| bins[i].value)
        .fold(f64::NEG_INFINITY, f64::max)
        .max(f64::EPSILON);
    let usable = if collapsed {
        track_height
    } else {
        track_height - 1.0
    };

    for &i in &visible {
        let bin = &bins[i];
        let x0 = viewport.position_to_pixel(bin.start as f64).max(0.0);
        let x1 = viewport.position_to_pixel(bin.end as f64).min(width);
        if x1 <= x0 {
            continue;
        }
        let h = (bin.value.max(0.0) / max_value * usable).min(usable);
        if h <= 0.0 {
            continue;
        }
        out.commands.push(
            DrawCommand::rect(x0, track_height - h, x1 - x0, h, ColorClass::Signal)
                .with_feature(i),
        );
        out.hits.push(HitBox {
            x0,
            y0: 0.0,
            x1,
            y1: track_height,
            target: HitTarget::Feature(i),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::GenomicRegion;
    use crate::track::draw::Primitive;

    fn viewport() -> Viewport {
        Viewport {
            region: GenomicRegion::new("chr17", 0, 1_000).unwrap(),
            pixel_width: 1000.0,
            generation: 0,
        }
    }

    fn bins(values: &[f64]) -> Vec<SignalBin> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| SignalBin {
                start: i as u64 * 100,
                end: (i as u64 + 1) * 100,
                value,
            })
            .collect()
    }

    #[test]
    fn test_bars_scaled_to_max() {
        let out = layout_signal(
            &bins(&[1.0, 2.0, 4.0]),
            &viewport(),
            &LayoutConfig::default(),
            false,
            41.0,
        );
        let bars: Vec<_> = out
            .commands
            .iter()
            .filter(|c| c.primitive == Primitive::Rect)
            .collect();
        assert_eq!(bars.len(), 3);
        // Tallest bar fills the usable height; the others scale linearly.
        assert!((bars[2].height - 40.0).abs() < 1e-9);
        assert!((bars[0].height - 10.0).abs() < 1e-9);
        assert!((bars[1].height - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_and_negative_values_emit_no_bar() {
        let out = layout_signal(
            &bins(&[0.0, -3.0, 5.0]),
            &viewport(),
            &LayoutConfig::default(),
            false,
            41.0,
        );
        let bars = out
            .commands
            .iter()
            .filter(|c| c.primitive == Primitive::Rect)
            .count();
        assert_eq!(bars, 1);
    }

    #[test]
    fn test_offscreen_bins_skipped() {
        let all = vec![SignalBin {
            start: 5_000,
            end: 5_100,
            value: 1.0,
        }];
        let out = layout_signal(&all, &viewport(), &LayoutConfig::default(), false, 40.0);
        assert!(out.hits.is_empty());
    }

    #[test]
    fn test_baseline_always_present() {
        let out = layout_signal(&[], &viewport(), &LayoutConfig::default(), false, 40.0);
        assert_eq!(out.commands.len(), 1);
        assert_eq!(out.commands[0].primitive, Primitive::Line);
    }

    #[test]
    fn test_bars_anchored_to_bottom() {
        let out = layout_signal(
            &bins(&[2.0, 4.0]),
            &viewport(),
            &LayoutConfig::default(),
            false,
            40.0,
        );
        for bar in out.commands.iter().filter(|c| c.primitive == Primitive::Rect) {
            assert!((bar.y + bar.height - 40.0).abs() < 1e-9);
        }
    }
}
