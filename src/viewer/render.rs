//! Terminal rendering backend: consumes the engine's draw-command lists and
//! paints them into the ratatui buffer. One terminal cell is one pixel of
//! the engine's pixel space in both axes (the app runs the terminal layout
//! profile).

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::compose::TrackComposer;
use crate::track::draw::{ColorClass, DrawCommand, Primitive};
use crate::viewport::ticks::format_position;
use crate::viewport::{generate_ticks, Viewport};

/// Width of the track-name gutter on the left, in cells.
pub const GUTTER_WIDTH: u16 = 16;

/// Map a semantic color class onto the terminal palette.
pub fn class_color(class: ColorClass) -> Color {
    match class {
        ColorClass::Exon => Color::Blue,
        ColorClass::Intron => Color::DarkGray,
        ColorClass::Forward => Color::Cyan,
        ColorClass::Reverse => Color::Magenta,
        ColorClass::LowMapq => Color::DarkGray,
        ColorClass::Missense => Color::Red,
        ColorClass::Nonsense => Color::Magenta,
        ColorClass::Synonymous => Color::Green,
        ColorClass::Frameshift => Color::Yellow,
        ColorClass::Splice => Color::Cyan,
        ColorClass::OtherConsequence => Color::White,
        ColorClass::Signal => Color::Green,
        ColorClass::Junction => Color::Yellow,
        ColorClass::Aggregate => Color::White,
        ColorClass::Overflow => Color::Yellow,
        ColorClass::LabelText => Color::Gray,
        ColorClass::Axis => Color::DarkGray,
        ColorClass::Category(slot) => {
            const PALETTE: [Color; 8] = [
                Color::Blue,
                Color::Green,
                Color::Yellow,
                Color::Magenta,
                Color::Cyan,
                Color::Red,
                Color::LightBlue,
                Color::LightGreen,
            ];
            PALETTE[slot as usize % PALETTE.len()]
        }
    }
}

/// Render the coordinate ruler for a viewport as a single line.
pub fn render_ruler(viewport: &Viewport, target_ticks: usize) -> Line<'static> {
    let width = viewport.pixel_width.max(1.0) as usize;
    let mut cells = vec![' '; width];

    let ticks = generate_ticks(viewport, target_ticks);
    for tick in &ticks {
        let col = tick.pixel.round() as usize;
        if col >= width {
            continue;
        }
        cells[col] = if tick.major { '|' } else { '·' };
    }
    // Labels overwrite the filler to the right of each major tick.
    for tick in ticks.iter().filter(|t| t.major) {
        if let Some(label) = &tick.label {
            let col = tick.pixel.round() as usize + 1;
            for (i, ch) in label.chars().enumerate() {
                if col + i < width {
                    cells[col + i] = ch;
                }
            }
        }
    }

    Line::from(Span::styled(
        cells.into_iter().collect::<String>(),
        Style::default().fg(Color::DarkGray),
    ))
}

/// Paint one track's command list at a cell origin, clipped to `area`.
pub fn draw_commands(
    buf: &mut Buffer,
    area: Rect,
    origin_x: u16,
    origin_y: u16,
    commands: &[DrawCommand],
) {
    let right = area.x + area.width;
    let bottom = area.y + area.height;

    let cell = |x: f64, y: f64| -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let cx = origin_x.checked_add(x.round() as u16)?;
        let cy = origin_y.checked_add(y.round() as u16)?;
        (cx < right && cy < bottom && cy >= area.y).then_some((cx, cy))
    };

    for cmd in commands {
        let style = Style::default().fg(class_color(cmd.color));
        match &cmd.primitive {
            Primitive::Rect => {
                let rows = (cmd.height.round() as u16).max(1);
                let cols = (cmd.width.round() as u16).max(1);
                for dy in 0..rows {
                    for dx in 0..cols {
                        if let Some((cx, cy)) =
                            cell(cmd.x + f64::from(dx), cmd.y + f64::from(dy))
                        {
                            buf.set_string(cx, cy, "█", style);
                        }
                    }
                }
            }
            Primitive::Line => {
                let cols = (cmd.width.round() as u16).max(1);
                for dx in 0..cols {
                    if let Some((cx, cy)) = cell(cmd.x + f64::from(dx), cmd.y) {
                        buf.set_string(cx, cy, "─", style);
                    }
                }
            }
            Primitive::Marker => {
                if let Some((cx, cy)) = cell(cmd.x, cmd.y) {
                    buf.set_string(cx, cy, "●", style.add_modifier(Modifier::BOLD));
                }
            }
            Primitive::Arc => {
                // Bracket-shaped approximation: verticals at the anchors,
                // a horizontal run at the arc's depth.
                let depth = cmd.height.round().max(1.0);
                let cols = (cmd.width.round() as u16).max(2);
                for dy in 0..depth as u16 {
                    if let Some((cx, cy)) = cell(cmd.x, f64::from(dy)) {
                        buf.set_string(cx, cy, "│", style);
                    }
                    if let Some((cx, cy)) = cell(cmd.x + cmd.width, f64::from(dy)) {
                        buf.set_string(cx, cy, "│", style);
                    }
                }
                for dx in 0..cols {
                    if let Some((cx, cy)) = cell(cmd.x + f64::from(dx), depth) {
                        let glyph = if dx == 0 {
                            "╰"
                        } else if dx == cols - 1 {
                            "╯"
                        } else {
                            "─"
                        };
                        buf.set_string(cx, cy, glyph, style);
                    }
                }
            }
            Primitive::Text(text) => {
                if let Some((cx, cy)) = cell(cmd.x, cmd.y) {
                    let room = right.saturating_sub(cx) as usize;
                    let clipped: String = text.chars().take(room).collect();
                    buf.set_string(cx, cy, clipped, style);
                }
            }
            Primitive::Chevron(strand) => {
                if let Some((cx, cy)) = cell(cmd.x, cmd.y) {
                    buf.set_string(cx, cy, strand.arrow().to_string(), style);
                }
            }
        }
    }
}

/// The full composed view: ruler, gutter labels, stacked track lanes.
pub struct ComposedView<'a> {
    pub composer: &'a TrackComposer,
    pub viewport: &'a Viewport,
    pub selected: Option<&'a str>,
}

impl Widget for ComposedView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(
                " {} ({} bp) ",
                self.viewport.region,
                format_position(self.viewport.region.span())
            ))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width <= GUTTER_WIDTH + 2 || inner.height < 2 {
            return;
        }
        let lane_x = inner.x + GUTTER_WIDTH;

        // Ruler across the top.
        let ruler = render_ruler(self.viewport, self.composer.config().target_tick_count);
        buf.set_string(
            inner.x,
            inner.y,
            "position",
            Style::default().fg(Color::DarkGray),
        );
        buf.set_line(lane_x, inner.y, &ruler, inner.width - GUTTER_WIDTH);

        let lanes_top = inner.y + 1;
        for placement in self.composer.placements() {
            let Some(track) = self.composer.track(&placement.track_id) else {
                continue;
            };
            let lane_y = i32::from(lanes_top) + placement.offset.round() as i32;
            if lane_y < 0 || lane_y >= i32::from(inner.y + inner.height) {
                continue;
            }
            let lane_y = lane_y as u16;

            // Gutter: selection marker, name, collapse/overflow markers.
            let marker = if self.selected == Some(placement.track_id.as_str()) {
                ">"
            } else {
                " "
            };
            let flags = match (track.collapsed(), track.overflow()) {
                (true, _) => " [+]".to_string(),
                (false, 0) => String::new(),
                (false, n) => format!(" +{n}"),
            };
            let label: String = format!("{marker}{}{flags}", track.name)
                .chars()
                .take(GUTTER_WIDTH as usize - 1)
                .collect();
            buf.set_string(
                inner.x,
                lane_y,
                label,
                Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
            );

            draw_commands(buf, inner, lane_x, lane_y, track.commands());
        }
    }
}

/// One-line status bar summarising the view and the key bindings.
pub fn render_status_bar(
    viewport: &Viewport,
    track_count: usize,
    hover: Option<&[(String, String)]>,
) -> Paragraph<'static> {
    let mut parts = vec![
        Span::styled(
            format!(" {} ", viewport.region),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
        Span::styled(
            format!(" tracks: {track_count} "),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
        Span::styled(
            format!(" gen: {} ", viewport.generation),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
    ];

    if let Some(fields) = hover {
        let text = fields
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("  ");
        parts.push(Span::styled(
            format!(" {text} "),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    } else {
        parts.push(Span::styled(
            " [q]uit [←→]pan [+-]zoom [↑↓]select [v]isible [c]ollapse [[]]move [s]ession ",
            Style::default().fg(Color::Yellow).bg(Color::DarkGray),
        ));
    }

    Paragraph::new(Line::from(parts))
}
