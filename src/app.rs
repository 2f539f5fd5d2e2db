use std::collections::VecDeque;
use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use gridhook::controller::{ControllerConfig, GridController, InputEvent, Propagation};
use gridhook::intent::{Intent, Owner};
use gridhook::model::ControllerState;
use gridhook::model::config::AppConfig;
use gridhook::owner::{COLUMNS, DocumentOwner};
use gridhook::surface::{ElementId, FocusTarget, GridSurface, RenderedGrid};

use crate::msg::Msg;

const LOG_LIMIT: usize = 8;

/// Hands intents to the document and keeps a short log for the status line.
struct Recorder<'a> {
    document: &'a mut DocumentOwner,
    log: &'a mut VecDeque<String>,
}

impl Owner for Recorder<'_> {
    fn push_event(&mut self, intent: Intent) {
        push_bounded(self.log, format!("{} {}", intent.name(), intent.payload()));
        self.document.push_event(intent);
    }
}

/// Screen area of one rendered cell, for pointer routing.
#[derive(Debug, Clone, Copy)]
struct HitCell {
    area: Rect,
    row: usize,
    col: usize,
}

pub struct App {
    controller: GridController,
    document: DocumentOwner,
    grid: RenderedGrid,
    hit_map: Vec<HitCell>,
    pointer_inside: bool,
    scroll_top: usize,
    pub notifications: VecDeque<String>,
    intents: VecDeque<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let mode = config.general.mode;
        let document = DocumentOwner::load(&config.document_path(), mode)?;
        let controller = GridController::new(ControllerConfig::from(config));

        let mut app = Self {
            controller,
            document,
            grid: RenderedGrid::new(mode, COLUMNS),
            hit_map: Vec::new(),
            pointer_inside: false,
            scroll_top: 0,
            notifications: VecDeque::new(),
            intents: VecDeque::new(),
            should_quit: false,
        };
        app.document.render_into(&mut app.grid);
        app.controller.attach(&mut app.grid);
        Ok(app)
    }

    // ── MVU: Update ──────────────────────────────────────────────

    pub fn update(&mut self, msg: Msg) {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Mouse(mouse) => self.handle_mouse(mouse),
            Msg::Resize => {}
            Msg::SaveDocument => self.save_document(),
            Msg::DocumentChanged(path) => self.handle_document_changed(&path),
        }
        self.sync_render();
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('c') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('s') => {
                    self.save_document();
                    return;
                }
                _ => {}
            }
        }

        if self.dispatch(InputEvent::Key(key)) == Propagation::Default
            && let Some(input) = self.grid.focused_affordance_mut()
        {
            input.apply_default_key(key);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let hit = self.hit_test(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer_inside = hit.is_some();
                if self.dispatch(InputEvent::MouseDown(hit)) == Propagation::Default
                    && let Some(cell) = hit
                {
                    let target = if self.grid.editing_cell() == Some(cell) {
                        FocusTarget::Affordance(cell)
                    } else {
                        FocusTarget::Cell(cell)
                    };
                    self.grid.focus(target);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                if hit.is_some() {
                    self.pointer_inside = true;
                    self.dispatch(InputEvent::MouseOver(hit));
                } else if self.pointer_inside {
                    self.pointer_inside = false;
                    self.dispatch(InputEvent::MouseLeave);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.dispatch(InputEvent::MouseUp(hit));
            }
            MouseEventKind::ScrollDown => {
                let last = self.grid.row_count().saturating_sub(1);
                self.scroll_top = (self.scroll_top + 1).min(last);
            }
            MouseEventKind::ScrollUp => self.scroll_top = self.scroll_top.saturating_sub(1),
            _ => {}
        }
    }

    fn dispatch(&mut self, event: InputEvent) -> Propagation {
        let mut recorder = Recorder {
            document: &mut self.document,
            log: &mut self.intents,
        };
        self.controller.dispatch(&mut self.grid, &mut recorder, event)
    }

    /// Re-render the grid when the document owes one, then let the controller catch up.
    fn sync_render(&mut self) {
        if !self.document.dirty {
            return;
        }
        self.document.render_into(&mut self.grid);
        self.controller.on_rendered(&mut self.grid);
    }

    fn save_document(&mut self) {
        if !self.document.modified {
            return;
        }
        match self.document.save() {
            Ok(()) => self.push_notification("saved".to_string()),
            Err(err) => {
                tracing::error!("save failed: {err:#}");
                self.push_notification(format!("save failed: {err}"));
            }
        }
    }

    fn handle_document_changed(&mut self, path: &Path) {
        let Some(own) = self.document.path() else {
            return;
        };
        if !same_file_path(own, path) {
            return;
        }

        match self.document.reload() {
            Ok(true) => self.push_notification("reloaded from disk".to_string()),
            Ok(false) => {}
            Err(err) => {
                tracing::warn!("reload failed: {err:#}");
                self.push_notification(format!("reload failed: {err}"));
            }
        }
    }

    fn push_notification(&mut self, message: String) {
        push_bounded(&mut self.notifications, message);
    }

    fn hit_test(&self, x: u16, y: u16) -> Option<ElementId> {
        let hit = self
            .hit_map
            .iter()
            .find(|hit| hit.area.contains(Position::new(x, y)))?;
        self.grid.cell_at(hit.row, hit.col)
    }

    // ── MVU: View ────────────────────────────────────────────────

    pub fn view(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // grid
                Constraint::Length(1), // intent log
                Constraint::Length(1), // status bar
            ])
            .split(frame.area());

        self.render_grid(frame, chunks[0]);
        self.render_intent_line(frame, chunks[1]);
        self.render_status_bar(frame, chunks[2]);
    }

    fn render_grid(&mut self, frame: &mut Frame, area: Rect) {
        let title = self
            .document
            .path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "[document]".to_string());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.hit_map.clear();
        if inner.height < 2 {
            return;
        }

        let constraints: Vec<Constraint> = (0..self.grid.columns().len())
            .map(|col| match col {
                0 => Constraint::Length(6),
                1 => Constraint::Fill(3),
                _ => Constraint::Fill(1),
            })
            .collect();
        let columns = Layout::horizontal(constraints).split(inner);

        let header_style = Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        for (name, rect) in self.grid.columns().iter().zip(columns.iter()) {
            let cell = Rect {
                y: inner.y,
                height: 1,
                ..*rect
            };
            frame.render_widget(Paragraph::new(name.as_str()).style(header_style), cell);
        }

        let body_height = (inner.height - 1) as usize;
        self.scroll_to_focus(body_height);
        let bottom = (self.scroll_top + body_height).min(self.grid.row_count());

        for (offset, row) in (self.scroll_top..bottom).enumerate() {
            let y = inner.y + 1 + offset as u16;
            let ids: Vec<ElementId> = self.grid.row(row).map(<[_]>::to_vec).unwrap_or_default();

            for (col, (id, rect)) in ids.into_iter().zip(columns.iter()).enumerate() {
                let area = Rect {
                    y,
                    height: 1,
                    ..*rect
                };
                self.hit_map.push(HitCell { area, row, col });

                let (text, style) = self.cell_view(id);
                frame.render_widget(Paragraph::new(text).style(style), area);

                if self.grid.focus_target() == FocusTarget::Affordance(id)
                    && let Some(input) = self.grid.affordance(id)
                {
                    let (_, caret) = input.selection();
                    frame.set_cursor_position((caret_x(area, caret), y));
                }
            }
        }
    }

    fn cell_view(&self, id: ElementId) -> (String, Style) {
        let Some(attrs) = self.grid.attrs(id) else {
            return (String::new(), Style::default());
        };

        if let Some(input) = self.grid.affordance(id) {
            let style = Style::default().fg(Color::Black).bg(Color::Yellow);
            return (input.value().replace('\n', "⏎"), style);
        }

        let mut style = if attrs.line.is_some() {
            Style::default().fg(Color::DarkGray)
        } else if attrs.col_name.as_deref() == Some("note") {
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::ITALIC)
        } else {
            Style::default().fg(Color::Gray)
        };
        if self.grid.is_selected(id) {
            style = style.fg(Color::White).bg(Color::Rgb(40, 60, 110));
        }
        if self.grid.is_focused(id) {
            style = style.add_modifier(Modifier::REVERSED);
        }

        let text = if attrs.line.is_some() {
            format!("{:>4}", attrs.text)
        } else {
            attrs.text.clone()
        };
        (text, style)
    }

    fn scroll_to_focus(&mut self, height: usize) {
        let row = match self.grid.focus_target() {
            FocusTarget::Root => None,
            FocusTarget::Cell(id) | FocusTarget::Affordance(id) => {
                self.grid.attrs(id).map(|attrs| attrs.row)
            }
        };

        if let Some(row) = row {
            if row < self.scroll_top {
                self.scroll_top = row;
            } else if height > 0 && row >= self.scroll_top + height {
                self.scroll_top = row + 1 - height;
            }
        }
        self.scroll_top = self
            .scroll_top
            .min(self.grid.row_count().saturating_sub(1));
    }

    fn render_intent_line(&self, frame: &mut Frame, area: Rect) {
        let text = self
            .intents
            .back()
            .map(|intent| format!(" → {intent}"))
            .unwrap_or_else(|| " no intents yet".to_string());
        let line = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(line, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let state = self.controller.state();
        let mode_style = match state {
            ControllerState::Navigating => Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            ControllerState::Editing => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            ControllerState::Selecting => Style::default()
                .fg(Color::Black)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            ControllerState::AwaitingRender => Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        };
        let mode_span = Span::styled(format!(" {} ", state.label()), mode_style);

        let grid_mode = if self.document.mode().is_author() {
            "author"
        } else {
            "read-only"
        };
        let dirty_marker = if self.document.modified { " [+]" } else { "" };
        let pos = self.controller.focus_position();

        let mut suffix = String::new();
        if let Some(range) = self.controller.selection().range() {
            let (low, high) = range.normalized();
            suffix.push_str(&format!(" | lines {}-{}", low + 1, high + 1));
        }
        if let Some(input) = self
            .grid
            .editing_cell()
            .and_then(|cell| self.grid.affordance(cell))
        {
            let (line, col) = input.caret_line_col();
            suffix.push_str(&format!(" | caret {}:{}", line + 1, col + 1));
        }
        if let Some(note) = self.notifications.back() {
            suffix.push_str(&format!(" | {note}"));
        }

        let info = Span::styled(
            format!(
                " {grid_mode}{dirty_marker}  {}:{}  {} lines{suffix} ",
                pos.row + 1,
                pos.col + 1,
                self.document.line_count(),
            ),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        );

        let bar = Line::from(vec![mode_span, info]);
        let status = Paragraph::new(bar).style(Style::default().bg(Color::DarkGray));
        frame.render_widget(status, area);
    }
}

/// Terminal column for a char-indexed caret, kept inside the cell.
fn caret_x(area: Rect, caret: usize) -> u16 {
    let offset = u16::try_from(caret).unwrap_or(u16::MAX);
    area.x
        .saturating_add(offset)
        .min(area.right().saturating_sub(1))
}

fn push_bounded(queue: &mut VecDeque<String>, message: String) {
    queue.push_back(message);
    while queue.len() > LOG_LIMIT {
        queue.pop_front();
    }
}

fn same_file_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
