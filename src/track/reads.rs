//! Aligned-read pileup layout: the densest track, packed under a hard row
//! limit with an overflow badge.

use crate::config::LayoutConfig;
use crate::layout::{pack_intervals, PixelInterval};
use crate::viewport::Viewport;

use super::draw::{ColorClass, DrawCommand, HitBox, HitTarget};
use super::feature::{ReadAlignment, Strand};
use super::LayoutOutput;

/// Reads mapped below this quality render in the low-confidence color.
const LOW_MAPQ: u8 = 10;

fn read_color(read: &ReadAlignment) -> ColorClass {
    if read.mapq < LOW_MAPQ {
        ColorClass::LowMapq
    } else {
        match read.strand {
            Strand::Reverse => ColorClass::Reverse,
            _ => ColorClass::Forward,
        }
    }
}

pub(crate) fn layout_reads(
    reads: &[ReadAlignment],
    viewport: &Viewport,
    cfg: &LayoutConfig,
    collapsed: bool,
    track_height: f64,
) -> LayoutOutput {
    let region = &viewport.region;
    let width = viewport.pixel_width;

    let mut visible: Vec<(usize, f64, f64)> = reads
        .iter()
        .enumerate()
        .filter(|(_, r)| r.chrom == region.chrom && region.overlaps(r.start, r.end))
        .map(|(i, r)| {
            (
                i,
                viewport.position_to_pixel(r.start as f64),
                viewport.position_to_pixel(r.end as f64),
            )
        })
        .collect();
    visible.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let intervals: Vec<PixelInterval> = visible
        .iter()
        .map(|&(id, x0, x1)| PixelInterval::new(id, x0, x1))
        .collect();
    let row_limit = if collapsed {
        1
    } else {
        let fit = (track_height / cfg.row_height_px).floor().max(1.0) as usize;
        fit.min(cfg.max_rows)
    };
    let packing = pack_intervals(&intervals, cfg.pack_gap_px, Some(row_limit));

    let mut out = LayoutOutput::for_payload(reads.len());

    for (slot, &(idx, x0, x1)) in visible.iter().enumerate() {
        let row = match packing.rows[slot] {
            Some(r) => r,
            None => continue,
        };
        out.rows[idx] = Some(row);

        let y = row as f64 * cfg.row_height_px;
        let cx0 = x0.max(0.0);
        let cx1 = x1.min(width);

        out.commands.push(
            DrawCommand::rect(
                cx0,
                y,
                (cx1 - cx0).max(1.0),
                cfg.row_height_px,
                read_color(&reads[idx]),
            )
            .with_feature(idx),
        );
        out.hits.push(HitBox {
            x0: cx0,
            y0: y,
            x1: cx1.max(cx0 + 1.0),
            y1: y + cfg.row_height_px,
            target: HitTarget::Feature(idx),
        });
    }

    out.overflow = packing.overflow;
    if packing.overflow > 0 {
        out.commands.push(DrawCommand::text(
            format!("+{} more", packing.overflow),
            (width - 60.0).max(0.0),
            0.0,
            ColorClass::Overflow,
        ));
    }

    out
}
