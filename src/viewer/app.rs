use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Terminal;

use crate::compose::session::SessionState;
use crate::compose::TrackComposer;
use crate::config::LayoutConfig;
use crate::region::{Genome, GenomicRegion};
use crate::track::{EventKind, Track};
use crate::viewer::render::{render_status_bar, ComposedView, GUTTER_WIDTH};
use crate::viewport::ViewportController;

/// Pan step as a fraction of the viewport width.
const PAN_STEP: f64 = 0.1;
const PAN_STEP_FAST: f64 = 0.5;

/// Application state for the interactive TUI viewer.
pub struct App {
    pub controller: ViewportController,
    pub composer: TrackComposer,
    /// Index into composition order of the selected track.
    pub selected: usize,
    /// Tooltip fields of the last clicked feature, shown in the status bar.
    pub inspect: Option<Vec<(String, String)>>,
    /// Where to save/restore the session snapshot, if anywhere.
    pub session_path: Option<PathBuf>,
    pub should_quit: bool,
    /// Area the composed view was last drawn into, for mouse mapping.
    view_area: Rect,
}

impl App {
    /// Build an app over preloaded tracks. Applies a saved session from
    /// `session_path` when one exists.
    pub fn new(
        genome: Genome,
        region: GenomicRegion,
        tracks: Vec<Track>,
        cfg: LayoutConfig,
        session_path: Option<PathBuf>,
    ) -> Result<Self> {
        let controller = ViewportController::new(genome, region, 1000.0, &cfg)?;
        let mut composer = TrackComposer::new(cfg);
        for track in tracks {
            composer.add_track(track)?;
        }

        let mut app = Self {
            controller,
            composer,
            selected: 0,
            inspect: None,
            session_path,
            should_quit: false,
            view_area: Rect::default(),
        };
        app.restore_session_if_present()?;
        app.relayout();
        Ok(app)
    }

    fn restore_session_if_present(&mut self) -> Result<()> {
        let Some(path) = self.session_path.clone() else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read session: {}", path.display()))?;
        let state: SessionState = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse session: {}", path.display()))?;
        self.composer.restore_session(&state);
        if let Ok(region) = state.region() {
            if let Err(err) = self.controller.set_region(region) {
                log::warn!("session region rejected: {err}");
            }
        }
        Ok(())
    }

    /// Save the current region and track arrangement.
    pub fn save_session(&self) -> Result<()> {
        let Some(path) = &self.session_path else {
            return Ok(());
        };
        let state = SessionState::capture(self.controller.region(), &self.composer);
        let json = serde_json::to_string_pretty(&state)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write session: {}", path.display()))?;
        Ok(())
    }

    /// Re-run every visible track's layout against the current viewport.
    pub fn relayout(&mut self) {
        let viewport = self.controller.viewport();
        self.composer.layout_all(&viewport);
    }

    fn selected_track_id(&self) -> Option<String> {
        self.composer
            .tracks()
            .nth(self.selected)
            .map(|t| t.id.clone())
    }

    /// Handle a key press. Region mutations trigger a relayout.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        let width = self.controller.pixel_width();
        let step = if modifiers.contains(KeyModifiers::SHIFT) {
            PAN_STEP_FAST
        } else {
            PAN_STEP
        };

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Left => {
                self.controller.pan_by(-width * step);
                self.relayout();
            }
            KeyCode::Right => {
                self.controller.pan_by(width * step);
                self.relayout();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.controller.zoom_in();
                self.relayout();
            }
            KeyCode::Char('-') => {
                self.controller.zoom_out();
                self.relayout();
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected + 1 < self.composer.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('v') => {
                if let Some(id) = self.selected_track_id() {
                    let visible = self
                        .composer
                        .track(&id)
                        .map(|t| t.visible())
                        .unwrap_or(false);
                    self.composer.set_visible(&id, !visible)?;
                    self.relayout();
                }
            }
            KeyCode::Char('c') => {
                if let Some(id) = self.selected_track_id() {
                    let collapsed = self
                        .composer
                        .track(&id)
                        .map(|t| t.collapsed())
                        .unwrap_or(false);
                    self.composer.set_collapsed(&id, !collapsed)?;
                    self.relayout();
                }
            }
            KeyCode::Char('[') => {
                if let Some(id) = self.selected_track_id() {
                    let to = self.selected.saturating_sub(1);
                    self.composer.reorder(&id, to)?;
                    self.selected = to;
                }
            }
            KeyCode::Char(']') => {
                if let Some(id) = self.selected_track_id() {
                    let to = (self.selected + 1).min(self.composer.len() - 1);
                    self.composer.reorder(&id, to)?;
                    self.selected = to;
                }
            }
            KeyCode::Char('s') => {
                self.save_session()?;
            }
            _ => {
                // Any other key clears the inspection readout.
                self.inspect = None;
            }
        }
        Ok(())
    }

    /// Map a terminal cell onto a track and run the click notification
    /// through it.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let MouseEventKind::Down(MouseButton::Left) = mouse.kind else {
            return;
        };
        // Inside the bordered view, past the gutter.
        let inner_x = self.view_area.x + 1 + GUTTER_WIDTH;
        let lanes_top = self.view_area.y + 2; // border + ruler
        if mouse.column < inner_x || mouse.row < lanes_top {
            self.inspect = None;
            return;
        }
        let px = f64::from(mouse.column - inner_x);
        let row = f64::from(mouse.row - lanes_top);

        let hit = self.composer.placements().into_iter().find(|p| {
            row >= p.offset && row < p.offset + p.height
        });
        let Some(placement) = hit else {
            self.inspect = None;
            return;
        };
        let py = row - placement.offset;

        self.inspect = self
            .composer
            .track_mut(&placement.track_id)
            .and_then(|track| {
                let target = track.notify(EventKind::Click, px, py)?;
                Some(track.tooltip_fields(&target))
            });
    }

    /// Run the TUI event loop.
    pub fn run_tui(&mut self) -> Result<()> {
        enable_raw_mode()?;
        io::stdout().execute(EnterAlternateScreen)?;
        io::stdout().execute(EnableMouseCapture)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        while !self.should_quit {
            terminal.draw(|frame| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(5), Constraint::Length(1)])
                    .split(frame.area());

                self.view_area = chunks[0];
                let lane_width = f64::from(
                    chunks[0]
                        .width
                        .saturating_sub(GUTTER_WIDTH + 2)
                        .max(1),
                );
                if (lane_width - self.controller.pixel_width()).abs() > 0.5 {
                    self.controller.resize(lane_width);
                    self.relayout();
                }

                let viewport = self.controller.viewport();
                let selected = self
                    .composer
                    .tracks()
                    .nth(self.selected)
                    .map(|t| t.id.clone());

                frame.render_widget(
                    ComposedView {
                        composer: &self.composer,
                        viewport: &viewport,
                        selected: selected.as_deref(),
                    },
                    chunks[0],
                );
                frame.render_widget(
                    render_status_bar(
                        &viewport,
                        self.composer.len(),
                        self.inspect.as_deref(),
                    ),
                    chunks[1],
                );
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) => {
                        if key.kind == KeyEventKind::Press {
                            self.handle_key(key.code, key.modifiers)?;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(_, _) => self.relayout(),
                    _ => {}
                }
            }
        }

        io::stdout().execute(DisableMouseCapture)?;
        disable_raw_mode()?;
        io::stdout().execute(LeaveAlternateScreen)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::feature::Strand;
    use crate::track::{GeneModel, TrackPayload};

    fn make_test_app() -> App {
        let cfg = LayoutConfig::terminal();
        let region = GenomicRegion::new("chr17", 7_668_402, 7_687_550).unwrap();
        let payload = TrackPayload::Gene(vec![GeneModel {
            name: "TP53".to_string(),
            chrom: "chr17".to_string(),
            start: 7_668_402,
            end: 7_687_550,
            strand: Strand::Reverse,
            exons: vec![],
        }]);
        let tracks = vec![
            Track::with_payload("genes", "Genes", payload, &cfg),
            Track::new("reads", "Reads", crate::track::TrackKind::Reads, 12.0),
        ];
        App::new(Genome::grch38(), region, tracks, cfg, None).unwrap()
    }

    #[test]
    fn test_app_creation() {
        let app = make_test_app();
        assert_eq!(app.composer.len(), 2);
        assert!(!app.should_quit);
        // The gene track rendered during the initial layout pass.
        assert!(!app.composer.track("genes").unwrap().commands().is_empty());
    }

    #[test]
    fn test_handle_key_quit() {
        let mut app = make_test_app();
        app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_handle_key_pan_changes_region() {
        let mut app = make_test_app();
        let before = app.controller.region().clone();
        app.handle_key(KeyCode::Right, KeyModifiers::NONE).unwrap();
        assert_ne!(app.controller.region(), &before);
        assert_eq!(app.controller.region().span(), before.span());
    }

    #[test]
    fn test_handle_key_zoom() {
        let mut app = make_test_app();
        app.handle_key(KeyCode::Char('+'), KeyModifiers::NONE).unwrap();
        assert_eq!(app.controller.region().span(), 9_574);
        app.handle_key(KeyCode::Char('-'), KeyModifiers::NONE).unwrap();
        assert_eq!(app.controller.region().span(), 19_148);
    }

    #[test]
    fn test_handle_key_selection_bounds() {
        let mut app = make_test_app();
        app.handle_key(KeyCode::Up, KeyModifiers::NONE).unwrap();
        assert_eq!(app.selected, 0);
        app.handle_key(KeyCode::Down, KeyModifiers::NONE).unwrap();
        assert_eq!(app.selected, 1);
        app.handle_key(KeyCode::Down, KeyModifiers::NONE).unwrap();
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_handle_key_visibility_toggle() {
        let mut app = make_test_app();
        app.handle_key(KeyCode::Char('v'), KeyModifiers::NONE).unwrap();
        assert!(!app.composer.track("genes").unwrap().visible());
        app.handle_key(KeyCode::Char('v'), KeyModifiers::NONE).unwrap();
        assert!(app.composer.track("genes").unwrap().visible());
    }

    #[test]
    fn test_handle_key_reorder() {
        let mut app = make_test_app();
        app.handle_key(KeyCode::Char(']'), KeyModifiers::NONE).unwrap();
        let order: Vec<&str> = app.composer.tracks().map(|t| t.id.as_str()).collect();
        assert_eq!(order, ["reads", "genes"]);
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_session_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        {
            let mut app = make_test_app();
            app.session_path = Some(path.clone());
            app.handle_key(KeyCode::Char('c'), KeyModifiers::NONE).unwrap();
            app.save_session().unwrap();
        }

        let cfg = LayoutConfig::terminal();
        let region = GenomicRegion::new("chr17", 7_668_402, 7_687_550).unwrap();
        let tracks = vec![
            Track::new("genes", "Genes", crate::track::TrackKind::Gene, 5.0),
            Track::new("reads", "Reads", crate::track::TrackKind::Reads, 12.0),
        ];
        let app = App::new(Genome::grch38(), region, tracks, cfg, Some(path)).unwrap();
        assert!(app.composer.track("genes").unwrap().collapsed());
    }
}
