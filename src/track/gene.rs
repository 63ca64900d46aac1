//! Gene-model layout: packed rows of exon blocks joined by an intron spine,
//! with strand chevrons and a name label when there is room.

use crate::config::LayoutConfig;
use crate::layout::{pack_intervals, PixelInterval};
use crate::viewport::Viewport;

use super::draw::{ColorClass, DrawCommand, HitBox, HitTarget, Primitive};
use super::feature::GeneModel;
use super::LayoutOutput;

/// Pixel cadence of strand chevrons along the intron spine.
const CHEVRON_SPACING_PX: f64 = 40.0;

pub(crate) fn layout_genes(
    genes: &[GeneModel],
    viewport: &Viewport,
    cfg: &LayoutConfig,
    collapsed: bool,
    track_height: f64,
) -> LayoutOutput {
    let region = &viewport.region;
    let width = viewport.pixel_width;

    // Visible genes in pixel space, sorted by start; ties keep payload order.
    let mut visible: Vec<(usize, f64, f64)> = genes
        .iter()
        .enumerate()
        .filter(|(_, g)| g.chrom == region.chrom && region.overlaps(g.start, g.end))
        .map(|(i, g)| {
            (
                i,
                viewport.position_to_pixel(g.start as f64),
                viewport.position_to_pixel(g.end as f64),
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

    let mut out = LayoutOutput::for_payload(genes.len());

    for (slot, &(idx, x0, x1)) in visible.iter().enumerate() {
        let row = match &packing {
            Some(p) => match p.rows[slot] {
                Some(r) => r,
                None => continue, // overflowed; counted below
            },
            None => 0,
        };
        out.rows[idx] = Some(row);

        let gene = &genes[idx];
        let y = row as f64 * cfg.row_height_px;
        let mid = y + cfg.row_height_px / 2.0;
        let cx0 = x0.max(0.0);
        let cx1 = x1.min(width);

        // Intron spine across the whole visible span.
        out.commands
            .push(DrawCommand::line(cx0, mid, cx1 - cx0, ColorClass::Intron).with_feature(idx));

        // Exon blocks, clipped to the viewport.
        for exon in &gene.exons {
            if !region.overlaps(exon.start, exon.end) {
                continue;
            }
            let ex0 = viewport.position_to_pixel(exon.start as f64).max(0.0);
            let ex1 = viewport.position_to_pixel(exon.end as f64).min(width);
            if ex1 <= ex0 {
                continue;
            }
            out.commands.push(
                DrawCommand::rect(ex0, y, ex1 - ex0, cfg.row_height_px, ColorClass::Exon)
                    .with_feature(idx),
            );
        }

        if !collapsed {
            let mut cx = cx0 + CHEVRON_SPACING_PX / 2.0;
            while cx < cx1 {
                out.commands.push(DrawCommand {
                    primitive: Primitive::Chevron(gene.strand),
                    x: cx,
                    y: mid,
                    width: 1.0,
                    height: 1.0,
                    color: ColorClass::Intron,
                    feature: Some(idx),
                });
                cx += CHEVRON_SPACING_PX;
            }

            if cx1 - cx0 >= cfg.min_label_width_px {
                out.commands.push(
                    DrawCommand::text(gene.name.clone(), cx0, y, ColorClass::LabelText)
                        .with_feature(idx),
                );
            }
        }

        out.hits.push(HitBox {
            x0: cx0,
            y0: y,
            x1: cx1,
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
    use crate::track::feature::{Exon, Strand};

    fn viewport() -> Viewport {
        Viewport {
            region: GenomicRegion::new("chr17", 0, 10_000).unwrap(),
            pixel_width: 1000.0,
            generation: 0,
        }
    }

    fn gene(name: &str, start: u64, end: u64) -> GeneModel {
        GeneModel {
            name: name.to_string(),
            chrom: "chr17".to_string(),
            start,
            end,
            strand: Strand::Forward,
            exons: vec![
                Exon {
                    start,
                    end: start + (end - start) / 4,
                },
                Exon {
                    start: end - (end - start) / 4,
                    end,
                },
            ],
        }
    }

    #[test]
    fn test_disjoint_genes_share_row() {
        let genes = vec![gene("A", 0, 2_000), gene("B", 5_000, 7_000)];
        let out = layout_genes(&genes, &viewport(), &LayoutConfig::default(), false, 140.0);
        assert_eq!(out.rows[0], Some(0));
        assert_eq!(out.rows[1], Some(0));
    }

    #[test]
    fn test_overlapping_genes_stack() {
        let genes = vec![gene("A", 0, 6_000), gene("B", 4_000, 9_000)];
        let out = layout_genes(&genes, &viewport(), &LayoutConfig::default(), false, 140.0);
        assert_eq!(out.rows[0], Some(0));
        assert_eq!(out.rows[1], Some(1));
    }

    #[test]
    fn test_offscreen_gene_skipped() {
        let genes = vec![gene("A", 20_000, 30_000)];
        let out = layout_genes(&genes, &viewport(), &LayoutConfig::default(), false, 140.0);
        assert_eq!(out.rows[0], None);
        assert!(out.commands.is_empty());
        assert!(out.hits.is_empty());
    }

    #[test]
    fn test_collapsed_single_row() {
        let genes = vec![gene("A", 0, 6_000), gene("B", 4_000, 9_000)];
        let out = layout_genes(&genes, &viewport(), &LayoutConfig::default(), true, 20.0);
        assert_eq!(out.rows[0], Some(0));
        assert_eq!(out.rows[1], Some(0));
        // No labels or chevrons in collapsed mode.
        assert!(!out
            .commands
            .iter()
            .any(|c| matches!(c.primitive, Primitive::Text(_) | Primitive::Chevron(_))));
    }

    #[test]
    fn test_exons_clipped_to_viewport() {
        let genes = vec![gene("A", 0, 10_000)];
        let out = layout_genes(&genes, &viewport(), &LayoutConfig::default(), false, 140.0);
        for cmd in &out.commands {
            if cmd.primitive == Primitive::Rect {
                assert!(cmd.x >= 0.0);
                assert!(cmd.x + cmd.width <= 1000.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_label_suppressed_when_narrow() {
        // 40 bp is 4 px on this viewport, below the 30 px label minimum.
        let genes = vec![gene("TINY", 100, 140)];
        let out = layout_genes(&genes, &viewport(), &LayoutConfig::default(), false, 140.0);
        assert!(!out
            .commands
            .iter()
            .any(|c| matches!(c.primitive, Primitive::Text(_))));
    }

    #[test]
    fn test_overflow_reported() {
        // Many mutually overlapping genes with room for only two rows.
        let genes: Vec<GeneModel> = (0..6).map(|i| gene(&format!("G{i}"), 0, 9_000)).collect();
        let mut cfg = LayoutConfig::default();
        cfg.max_rows = 2;
        let out = layout_genes(&genes, &viewport(), &cfg, false, 140.0);
        assert_eq!(out.overflow, 4);
        assert!(out
            .commands
            .iter()
            .any(|c| matches!(&c.primitive, Primitive::Text(t) if t == "+4 more")));
    }

    #[test]
    fn test_hit_boxes_carry_feature_indices() {
        let genes = vec![gene("A", 0, 2_000), gene("B", 5_000, 7_000)];
        let out = layout_genes(&genes, &viewport(), &LayoutConfig::default(), false, 140.0);
        assert_eq!(out.hits.len(), 2);
        assert_eq!(out.hits[0].target, HitTarget::Feature(0));
        assert_eq!(out.hits[1].target, HitTarget::Feature(1));
    }

    #[test]
    fn test_deterministic() {
        let genes = vec![gene("A", 0, 6_000), gene("B", 4_000, 9_000)];
        let a = layout_genes(&genes, &viewport(), &LayoutConfig::default(), false, 140.0);
        let b = layout_genes(&genes, &viewport(), &LayoutConfig::default(), false, 140.0);
        assert_eq!(a.commands, b.commands);
        assert_eq!(a.rows, b.rows);
    }
}
