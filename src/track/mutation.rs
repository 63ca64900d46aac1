//! Point-mutation layout: lollipop glyphs, with pixel-adjacent mutations
//! merged into one aggregate glyph carrying a count.

use crate::config::LayoutConfig;
use crate::layout::group_features;
use crate::viewport::Viewport;

use super::draw::{ColorClass, DrawCommand, HitBox, HitTarget, Primitive};
use super::feature::{Consequence, Mutation};
use super::LayoutOutput;

fn consequence_color(c: Consequence) -> ColorClass {
    match c {
        Consequence::Missense => ColorClass::Missense,
        Consequence::Nonsense => ColorClass::Nonsense,
        Consequence::Synonymous => ColorClass::Synonymous,
        Consequence::Frameshift => ColorClass::Frameshift,
        Consequence::Splice => ColorClass::Splice,
        Consequence::Other => ColorClass::OtherConsequence,
    }
}

/// Per-category counts for an aggregate glyph's breakdown.
pub(crate) fn consequence_breakdown<'a>(
    mutations: impl Iterator<Item = &'a Mutation>,
) -> Vec<(Consequence, usize)> {
    let mut counts = [0usize; Consequence::ALL.len()];
    for m in mutations {
        let slot = Consequence::ALL
            .iter()
            .position(|c| *c == m.consequence)
            .unwrap_or(Consequence::ALL.len() - 1);
        counts[slot] += 1;
    }
    Consequence::ALL
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(c, n)| (*c, n))
        .collect()
}

pub(crate) fn layout_mutations(
    mutations: &[Mutation],
    viewport: &Viewport,
    cfg: &LayoutConfig,
    collapsed: bool,
    track_height: f64,
) -> LayoutOutput {
    let region = &viewport.region;
    let width = viewport.pixel_width;

    // Visible mutations projected to pixel centers, sorted for grouping.
    let mut visible: Vec<(usize, f64)> = mutations
        .iter()
        .enumerate()
        .filter(|(_, m)| m.chrom == region.chrom && region.contains(m.position))
        .map(|(i, m)| (i, viewport.position_to_pixel(m.position as f64 + 0.5)))
        .collect();
    visible.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let positions: Vec<f64> = visible.iter().map(|&(_, px)| px).collect();
    let groups = group_features(&positions, cfg.group_gap_px);

    let mut out = LayoutOutput::for_payload(mutations.len());

    let head_y = if collapsed {
        track_height / 2.0
    } else {
        track_height * 0.3
    };
    let marker = (cfg.row_height_px * 0.6).max(1.0);

    for group in &groups {
        let cx = group.center_px();
        if cx < 0.0 || cx > width {
            continue;
        }

        if group.is_aggregate() {
            let members: Vec<usize> = group.members.iter().map(|&s| visible[s].0).collect();
            if !collapsed {
                out.commands.push(DrawCommand::rect(
                    cx,
                    head_y,
                    1.0,
                    track_height - head_y,
                    ColorClass::Aggregate,
                ));
            }
            out.commands.push(DrawCommand {
                primitive: Primitive::Marker,
                x: cx,
                y: head_y,
                width: marker * 1.5,
                height: marker * 1.5,
                color: ColorClass::Aggregate,
                feature: None,
            });
            out.commands.push(DrawCommand::text(
                group.len().to_string(),
                cx + marker,
                head_y,
                ColorClass::LabelText,
            ));
            out.hits.push(HitBox {
                x0: group.start_px - marker,
                y0: 0.0,
                x1: group.end_px + marker,
                y1: track_height,
                target: HitTarget::Group(members),
            });
        } else {
            let idx = visible[group.members[0]].0;
            let color = consequence_color(mutations[idx].consequence);
            out.rows[idx] = Some(0);
            if !collapsed {
                // Stem drawn as a 1px-wide rect down to the baseline.
                out.commands.push(
                    DrawCommand::rect(cx, head_y, 1.0, track_height - head_y, color)
                        .with_feature(idx),
                );
            }
            out.commands.push(DrawCommand {
                primitive: Primitive::Marker,
                x: cx,
                y: head_y,
                width: marker,
                height: marker,
                color,
                feature: Some(idx),
            });
            out.hits.push(HitBox {
                x0: cx - marker,
                y0: 0.0,
                x1: cx + marker,
                y1: track_height,
                target: HitTarget::Feature(idx),
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::GenomicRegion;

    fn viewport() -> Viewport {
        Viewport {
            region: GenomicRegion::new("chr17", 0, 10_000).unwrap(),
            pixel_width: 1000.0,
            generation: 0,
        }
    }

    fn mutation(id: &str, position: u64, consequence: Consequence) -> Mutation {
        Mutation {
            id: id.to_string(),
            chrom: "chr17".to_string(),
            position,
            consequence,
            allele_fraction: None,
        }
    }

    #[test]
    fn test_spread_mutations_individual() {
        // 1000 and 5000 bp apart: 100 and 500 px, far beyond the 8 px gap.
        let muts = vec![
            mutation("a", 1_000, Consequence::Missense),
            mutation("b", 5_000, Consequence::Nonsense),
        ];
        let out = layout_mutations(&muts, &viewport(), &LayoutConfig::default(), false, 40.0);
        let markers: Vec<_> = out
            .commands
            .iter()
            .filter(|c| c.primitive == Primitive::Marker)
            .collect();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].color, ColorClass::Missense);
        assert_eq!(markers[1].color, ColorClass::Nonsense);
    }

    #[test]
    fn test_adjacent_mutations_aggregate() {
        // 10 bp apart is 1 px here, well under the 8 px grouping gap.
        let muts = vec![
            mutation("a", 1_000, Consequence::Missense),
            mutation("b", 1_010, Consequence::Nonsense),
            mutation("c", 1_020, Consequence::Missense),
        ];
        let out = layout_mutations(&muts, &viewport(), &LayoutConfig::default(), false, 40.0);
        let markers: Vec<_> = out
            .commands
            .iter()
            .filter(|c| c.primitive == Primitive::Marker)
            .collect();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].color, ColorClass::Aggregate);
        // Count label rides along.
        assert!(out
            .commands
            .iter()
            .any(|c| matches!(&c.primitive, Primitive::Text(t) if t == "3")));
        // The hit target lists all members.
        assert_eq!(out.hits.len(), 1);
        match &out.hits[0].target {
            HitTarget::Group(members) => assert_eq!(members.len(), 3),
            other => panic!("expected group target, got {other:?}"),
        }
    }

    #[test]
    fn test_offscreen_mutation_skipped() {
        let muts = vec![mutation("a", 50_000, Consequence::Other)];
        let out = layout_mutations(&muts, &viewport(), &LayoutConfig::default(), false, 40.0);
        assert!(out.commands.is_empty());
        assert!(out.hits.is_empty());
    }

    #[test]
    fn test_collapsed_has_no_stems() {
        let muts = vec![mutation("a", 1_000, Consequence::Splice)];
        let out = layout_mutations(&muts, &viewport(), &LayoutConfig::default(), true, 20.0);
        assert!(out
            .commands
            .iter()
            .all(|c| c.primitive != Primitive::Rect));
    }

    #[test]
    fn test_breakdown_counts() {
        let muts = vec![
            mutation("a", 1_000, Consequence::Missense),
            mutation("b", 1_010, Consequence::Missense),
            mutation("c", 1_020, Consequence::Frameshift),
        ];
        let breakdown = consequence_breakdown(muts.iter());
        assert_eq!(
            breakdown,
            vec![(Consequence::Missense, 2), (Consequence::Frameshift, 1)]
        );
    }

    #[test]
    fn test_deterministic() {
        let muts = vec![
            mutation("a", 1_000, Consequence::Missense),
            mutation("b", 1_005, Consequence::Nonsense),
            mutation("c", 9_000, Consequence::Splice),
        ];
        let a = layout_mutations(&muts, &viewport(), &LayoutConfig::default(), false, 40.0);
        let b = layout_mutations(&muts, &viewport(), &LayoutConfig::default(), false, 40.0);
        assert_eq!(a.commands, b.commands);
    }
}
