//! Splice-junction layout: arcs between donor and acceptor, with depth and
//! label scaled by supporting read count.

use crate::config::LayoutConfig;
use crate::viewport::Viewport;

use super::draw::{ColorClass, DrawCommand, HitBox, HitTarget, Primitive};
use super::feature::SpliceJunction;
use super::LayoutOutput;

/// Arc depth for a junction: deeper for more supporting reads, capped to
/// the track.
fn arc_depth(read_count: u32, track_height: f64) -> f64 {
    let base = track_height * 0.3;
    let scaled = base + (f64::from(read_count) + 1.0).log2() * track_height * 0.1;
    scaled.min(track_height - 1.0)
}

pub(crate) fn layout_junctions(
    junctions: &[SpliceJunction],
    viewport: &Viewport,
    cfg: &LayoutConfig,
    collapsed: bool,
    track_height: f64,
) -> LayoutOutput {
    let region = &viewport.region;
    let width = viewport.pixel_width;

    let mut visible: Vec<(usize, f64, f64)> = junctions
        .iter()
        .enumerate()
        .filter(|(_, j)| j.chrom == region.chrom && region.overlaps(j.start(), j.end()))
        .map(|(i, j)| {
            (
                i,
                viewport.position_to_pixel(j.start() as f64),
                viewport.position_to_pixel(j.end() as f64),
            )
        })
        .collect();
    visible.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let mut out = LayoutOutput::for_payload(junctions.len());

    for &(idx, x0, x1) in &visible {
        let junction = &junctions[idx];
        let cx0 = x0.max(0.0);
        let cx1 = x1.min(width);
        if cx1 <= cx0 {
            continue;
        }
        let depth = if collapsed {
            track_height - 1.0
        } else {
            arc_depth(junction.read_count, track_height)
        };

        out.rows[idx] = Some(0);
        out.commands.push(DrawCommand {
            primitive: Primitive::Arc,
            x: cx0,
            y: 0.0,
            width: cx1 - cx0,
            height: depth,
            color: ColorClass::Junction,
            feature: Some(idx),
        });

        if !collapsed && cx1 - cx0 >= cfg.min_label_width_px {
            out.commands.push(
                DrawCommand::text(
                    junction.read_count.to_string(),
                    (cx0 + cx1) / 2.0,
                    depth,
                    ColorClass::LabelText,
                )
                .with_feature(idx),
            );
        }

        // Hit strip along the arc apex.
        out.hits.push(HitBox {
            x0: cx0,
            y0: (depth - 2.0).max(0.0),
            x1: cx1,
            y1: depth + 2.0,
            target: HitTarget::Feature(idx),
        });
    }

    out
}
