//! "Nice" axis ticks for the coordinate ruler.
//!
//! Intervals come from the {1, 2, 5} x 10^k family; minor ticks subdivide
//! each major interval into fifths.

use super::controller::Viewport;

/// One axis tick. Minor ticks carry no label.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: u64,
    pub pixel: f64,
    pub label: Option<String>,
    pub major: bool,
}

/// Choose the major and minor tick intervals for a span and target count.
///
/// With `raw = span / target` and `magnitude = 10^floor(log10(raw))`, a
/// ratio above 5 picks `5 * magnitude`, above 2 picks `2 * magnitude`, and
/// anything else keeps the bare magnitude.
pub fn nice_interval(span: f64, target: usize) -> (u64, u64) {
    let target = target.max(1);
    let raw = (span / target as f64).max(1.0);
    let magnitude = 10f64.powf(raw.log10().floor());
    let ratio = raw / magnitude;

    let interval = if ratio > 5.0 {
        5.0 * magnitude
    } else if ratio > 2.0 {
        2.0 * magnitude
    } else {
        magnitude
    };

    let interval = interval.max(1.0) as u64;
    (interval, interval / 5)
}

/// Format a genomic position with a k/M suffix chosen by the position's own
/// magnitude.
pub fn format_position(pos: u64) -> String {
    if pos >= 1_000_000 {
        let scaled = pos as f64 / 1_000_000.0;
        format!("{}M", trim_decimal(scaled, 3))
    } else if pos >= 1_000 {
        let scaled = pos as f64 / 1_000.0;
        format!("{}k", trim_decimal(scaled, 2))
    } else {
        pos.to_string()
    }
}

fn trim_decimal(value: f64, places: usize) -> String {
    let s = format!("{value:.places$}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Generate major and minor ticks for the viewport's region, sorted by
/// position.
pub fn generate_ticks(viewport: &Viewport, target: usize) -> Vec<Tick> {
    let region = &viewport.region;
    let (interval, minor) = nice_interval(region.span() as f64, target);

    let mut ticks = Vec::new();

    let first_major = region.start.div_ceil(interval) * interval;
    let mut pos = first_major;
    while pos <= region.end {
        ticks.push(Tick {
            position: pos,
            pixel: viewport.position_to_pixel(pos as f64),
            label: Some(format_position(pos)),
            major: true,
        });
        pos += interval;
    }

    if minor > 0 {
        let first_minor = region.start.div_ceil(minor) * minor;
        let mut pos = first_minor;
        while pos <= region.end {
            if pos % interval != 0 {
                ticks.push(Tick {
                    position: pos,
                    pixel: viewport.position_to_pixel(pos as f64),
                    label: None,
                    major: false,
                });
            }
            pos += minor;
        }
    }

    ticks.sort_by_key(|t| t.position);
    ticks
}
