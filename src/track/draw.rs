//! The rendering-backend interface: an ordered list of positioned draw
//! commands, regenerated on every layout pass. The engine owns no rendering
//! technology; a backend walks the list and draws.

use serde::{Deserialize, Serialize};

use super::feature::Strand;

/// Primitive kinds a backend must know how to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    /// Filled rectangle (exon block, read body, signal bar).
    Rect,
    /// Thin horizontal line (intron spine, lollipop stem uses height).
    Line,
    /// Point glyph (lollipop head, aggregate marker).
    Marker,
    /// Curved connector spanning `[x, x+width]`, bowing down to `height`.
    Arc,
    /// Text anchored at `(x, y)`.
    Text(String),
    /// Strand direction chevron.
    Chevron(Strand),
}

/// Semantic color reference resolved by the backend's palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorClass {
    Exon,
    Intron,
    Forward,
    Reverse,
    LowMapq,
    Missense,
    Nonsense,
    Synonymous,
    Frameshift,
    Splice,
    OtherConsequence,
    Signal,
    Junction,
    Aggregate,
    Overflow,
    LabelText,
    Axis,
    /// Rotating palette slot for annotation categories.
    Category(u8),
}

/// One draw command. Coordinates are in pixels; `y` is relative to the top
/// of the emitting track (the composer supplies each track's vertical
/// offset separately).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawCommand {
    pub primitive: Primitive,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: ColorClass,
    /// Index of the originating feature within the track payload, when the
    /// command corresponds to exactly one feature.
    pub feature: Option<usize>,
}

impl DrawCommand {
    pub fn rect(x: f64, y: f64, width: f64, height: f64, color: ColorClass) -> Self {
        Self {
            primitive: Primitive::Rect,
            x,
            y,
            width,
            height,
            color,
            feature: None,
        }
    }

    pub fn line(x: f64, y: f64, width: f64, color: ColorClass) -> Self {
        Self {
            primitive: Primitive::Line,
            x,
            y,
            width,
            height: 1.0,
            color,
            feature: None,
        }
    }

    pub fn text(content: impl Into<String>, x: f64, y: f64, color: ColorClass) -> Self {
        Self {
            primitive: Primitive::Text(content.into()),
            x,
            y,
            width: 0.0,
            height: 1.0,
            color,
            feature: None,
        }
    }

    pub fn with_feature(mut self, index: usize) -> Self {
        self.feature = Some(index);
        self
    }
}

/// Rectangular hit region recorded during layout for pointer lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct HitBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub target: HitTarget,
}

impl HitBox {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x0 && px <= self.x1 && py >= self.y0 && py <= self.y1
    }
}

/// What a hit box resolves to: a single feature or an aggregated glyph.
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    /// Index into the track payload's feature vector.
    Feature(usize),
    /// Member indices of an aggregate glyph, plus the overall count.
    Group(Vec<usize>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hitbox_contains() {
        let hb = HitBox {
            x0: 10.0,
            y0: 0.0,
            x1: 20.0,
            y1: 5.0,
            target: HitTarget::Feature(0),
        };
        assert!(hb.contains(10.0, 0.0));
        assert!(hb.contains(20.0, 5.0));
        assert!(hb.contains(15.0, 2.5));
        assert!(!hb.contains(9.9, 2.0));
        assert!(!hb.contains(15.0, 5.1));
    }

    #[test]
    fn test_command_builders() {
        let cmd = DrawCommand::rect(1.0, 2.0, 3.0, 4.0, ColorClass::Exon).with_feature(7);
        assert_eq!(cmd.primitive, Primitive::Rect);
        assert_eq!(cmd.feature, Some(7));

        let line = DrawCommand::line(0.0, 1.0, 10.0, ColorClass::Intron);
        assert_eq!(line.height, 1.0);

        let text = DrawCommand::text("TP53", 5.0, 0.0, ColorClass::LabelText);
        assert_eq!(text.primitive, Primitive::Text("TP53".to_string()));
    }

    #[test]
    fn test_draw_command_serializes() {
        let cmd = DrawCommand::rect(0.0, 0.0, 5.0, 2.0, ColorClass::Category(3));
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"rect\""));
        let back: DrawCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }
}
