//! Generic interval-annotation layout: packed labeled boxes, colored by a
//! stable per-category palette slot.

use crate::config::LayoutConfig;
use crate::layout::{pack_intervals, PixelInterval};
use crate::viewport::Viewport;

use super::draw::{ColorClass, DrawCommand, HitBox, HitTarget};
use super::feature::AnnotationFeature;
use super::LayoutOutput;

const PALETTE_SLOTS: u8 = 8;

/// Stable palette slot for a category name: identical strings always map to
/// the same slot, independent of load order.
pub(crate) fn category_slot(category: &str) -> u8 {
    let sum: u32 = category.bytes().map(u32::from).sum();
    (sum % PALETTE_SLOTS as u32) as u8
}

pub(crate) fn layout_annotations(
    annotations: &[AnnotationFeature],
    viewport: &Viewport,
    cfg: &LayoutConfig,
    collapsed: bool,
    track_height: f64,
) -> LayoutOutput {
    let region = &viewport.region;
    let width = viewport.pixel_width;

    let mut visible: Vec<(usize, f64, f64)> = annotations
        .iter()
        .enumerate()
        .filter(|(_, a)| a.chrom == region.chrom && region.overlaps(a.start, a.end))
        .map(|(i, a)| {
            (
                i,
                viewport.position_to_pixel(a.start as f64),
                viewport.position_to_pixel(a.end as f64),
            )
        })
        .collect();
    visible.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let packing = if collapsed {
        None
    } else {
        let intervals: Vec<PixelInterval> = visible
            .iter()
            .map(|&(id, x0, x1)| PixelInterval::new(id, x0, x1))
            .collect();
        let max_rows = (track_height / cfg.row_height_px).floor().max(1.0) as usize;
        Some(pack_intervals(
            &intervals,
            cfg.pack_gap_px,
            Some(max_rows.min(cfg.max_rows)),
        ))
    };

    let mut out = LayoutOutput::for_payload(annotations.len());

    for (slot, &(idx, x0, x1)) in visible.iter().enumerate() {
        let row = match &packing {
            Some(p) => match p.rows[slot] {
                Some(r) => r,
                None => continue,
            },
            None => 0,
        };
        out.rows[idx] = Some(row);

        let ann = &annotations[idx];
        let y = row as f64 * cfg.row_height_px;
        let cx0 = x0.max(0.0);
        let cx1 = x1.min(width);

        out.commands.push(
            DrawCommand::rect(
                cx0,
                y,
                (cx1 - cx0).max(1.0),
                cfg.row_height_px,
                ColorClass::Category(category_slot(&ann.category)),
            )
            .with_feature(idx),
        );

        if !collapsed && cx1 - cx0 >= cfg.min_label_width_px {
            out.commands.push(
                DrawCommand::text(ann.label.clone(), cx0, y, ColorClass::LabelText)
                    .with_feature(idx),
            );
        }

        out.hits.push(HitBox {
            x0: cx0,
            y0: y,
            x1: cx1.max(cx0 + 1.0),
            y1: y + cfg.row_height_px,
            target: HitTarget::Feature(idx),
        });
    }

    if let Some(p) = packing {
        out.overflow = p.overflow;
        if p.overflow > 0 {
            out.commands.push(DrawCommand::text(
                format!("+{} more", p.overflow),
                (width - 60.0).max(0.0),
                0.0,
                ColorClass::Overflow,
            ));
        }
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
            region: GenomicRegion::new("chr17", 0, 10_000).unwrap(),
            pixel_width: 1000.0,
            generation: 0,
        }
    }

    fn annotation(label: &str, start: u64, end: u64, category: &str) -> AnnotationFeature {
        AnnotationFeature {
            label: label.to_string(),
            chrom: "chr17".to_string(),
            start,
            end,
            category: category.to_string(),
        }
    }

    #[test]
    fn test_category_slot_stable() {
        assert_eq!(category_slot("enhancer"), category_slot("enhancer"));
        assert!(category_slot("enhancer") < PALETTE_SLOTS);
    }

    #[test]
    fn test_same_category_same_color() {
        let anns = vec![
            annotation("e1", 0, 1_000, "enhancer"),
            annotation("e2", 5_000, 6_000, "enhancer"),
        ];
        let out = layout_annotations(&anns, &viewport(), &LayoutConfig::default(), false, 42.0);
        let rects: Vec<_> = out
            .commands
            .iter()
            .filter(|c| c.primitive == Primitive::Rect)
            .collect();
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].color, rects[1].color);
    }

    #[test]
    fn test_overlapping_annotations_stack() {
        let anns = vec![
            annotation("a", 0, 6_000, "cpg"),
            annotation("b", 4_000, 9_000, "cpg"),
        ];
        let out = layout_annotations(&anns, &viewport(), &LayoutConfig::default(), false, 42.0);
        assert_eq!(out.rows[0], Some(0));
        assert_eq!(out.rows[1], Some(1));
    }

    #[test]
    fn test_collapsed_flattens_rows() {
        let anns = vec![
            annotation("a", 0, 6_000, "cpg"),
            annotation("b", 4_000, 9_000, "cpg"),
        ];
        let out = layout_annotations(&anns, &viewport(), &LayoutConfig::default(), true, 20.0);
        assert_eq!(out.rows[0], Some(0));
        assert_eq!(out.rows[1], Some(0));
    }

    #[test]
    fn test_narrow_annotation_keeps_minimum_width() {
        let anns = vec![annotation("dot", 100, 101, "site")];
        let out = layout_annotations(&anns, &viewport(), &LayoutConfig::default(), false, 42.0);
        let rect = out
            .commands
            .iter()
            .find(|c| c.primitive == Primitive::Rect)
            .unwrap();
        assert!(rect.width >= 1.0);
    }
}
