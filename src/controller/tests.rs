use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::*;
use crate::model::{GridMode, LineRange};
use crate::surface::{CellAttrs, RenderedGrid};

struct Harness {
    grid: RenderedGrid,
    owner: Vec<Intent>,
    ctrl: GridController,
    mode: GridMode,
    lines: Vec<String>,
}

impl Harness {
    fn new(mode: GridMode, lines: &[&str]) -> Self {
        Self::with_config(mode, lines, ControllerConfig::default())
    }

    fn with_config(mode: GridMode, lines: &[&str], config: ControllerConfig) -> Self {
        let mut harness = Self {
            grid: RenderedGrid::new(mode, ["line", "content", "note"]),
            owner: Vec::new(),
            ctrl: GridController::new(config),
            mode,
            lines: lines.iter().map(|line| line.to_string()).collect(),
        };
        harness.build(None, None);
        harness.ctrl.attach(&mut harness.grid);
        harness
    }

    fn build(&mut self, editing: Option<(usize, usize)>, latest_line: Option<usize>) {
        self.grid.reset(self.mode, ["line", "content", "note"]);
        for (idx, text) in self.lines.iter().enumerate() {
            self.grid.push_row([
                CellAttrs::line_number(idx),
                CellAttrs::text(text.clone())
                    .editable()
                    .deletable()
                    .bound_to(format!("c{idx}"), "content"),
                CellAttrs::text(format!("note {idx}")),
            ]);
        }
        if let Some((row, col)) = editing {
            let value = self.lines[row].clone();
            self.grid.mount_affordance(row, col, &value);
        }
        self.grid.set_latest_line(latest_line);
    }

    /// Owner re-render, optionally with an affordance mounted.
    fn rerender(&mut self, editing: Option<(usize, usize)>) {
        self.build(editing, None);
        self.ctrl.on_rendered(&mut self.grid);
    }

    fn send(&mut self, event: InputEvent) -> Propagation {
        self.ctrl.dispatch(&mut self.grid, &mut self.owner, event)
    }

    fn key(&mut self, code: KeyCode) -> Propagation {
        self.send(InputEvent::Key(KeyEvent::from(code)))
    }

    fn key_with(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Propagation {
        self.send(InputEvent::Key(KeyEvent::new(code, modifiers)))
    }

    fn focus_cell(&mut self, row: usize, col: usize) {
        let id = self.grid.cell_at(row, col).unwrap();
        assert!(self.grid.focus(FocusTarget::Cell(id)));
    }

    fn focused_pos(&self) -> Option<(usize, usize)> {
        match self.grid.focus_target() {
            FocusTarget::Cell(id) | FocusTarget::Affordance(id) => {
                self.grid.attrs(id).map(|attrs| (attrs.row, attrs.col))
            }
            FocusTarget::Root => None,
        }
    }

    fn line_cell(&self, line: usize) -> Option<ElementId> {
        self.grid.line_number_cell(line)
    }

    fn marked_lines(&self) -> Vec<usize> {
        (0..self.lines.len())
            .filter(|line| self.grid.is_line_selected(*line))
            .collect()
    }
}

fn five_lines() -> Vec<&'static str> {
    vec!["zero", "one", "two", "three", "four"]
}

// ========================================================================
// Navigation
// ========================================================================

#[test]
fn arrows_move_focus_within_bounds() {
    let mut h = Harness::new(GridMode::ReadOnly, &five_lines());
    h.focus_cell(0, 0);

    for _ in 0..10 {
        assert_eq!(h.key(KeyCode::Down), Propagation::Consumed);
        h.key(KeyCode::Right);
    }
    assert_eq!(h.focused_pos(), Some((4, 2)));

    h.key(KeyCode::Up);
    h.key(KeyCode::Left);
    assert_eq!(h.focused_pos(), Some((3, 1)));
    assert!(h.owner.is_empty());
}

#[test]
fn enter_on_root_focuses_default_cell() {
    let mut h = Harness::new(GridMode::ReadOnly, &five_lines());
    h.grid.focus(FocusTarget::Root);

    assert_eq!(h.key(KeyCode::Enter), Propagation::Consumed);
    assert_eq!(h.focused_pos(), Some((0, 0)));
}

#[test]
fn focus_telemetry_is_opt_in() {
    let config = ControllerConfig {
        emit_cell_focused: true,
        ..Default::default()
    };
    let mut h = Harness::with_config(GridMode::ReadOnly, &five_lines(), config);
    h.focus_cell(1, 1);

    h.key(KeyCode::Down);
    assert_eq!(h.owner, vec![Intent::CellFocused { row: 2, col: 1 }]);
}

#[test]
fn activation_telemetry_carries_cell_text() {
    let config = ControllerConfig {
        emit_cell_activated: true,
        ..Default::default()
    };
    let mut h = Harness::with_config(GridMode::Author, &five_lines(), config);
    h.focus_cell(2, 2);

    assert_eq!(h.key(KeyCode::Enter), Propagation::Consumed);
    assert_eq!(
        h.owner,
        vec![Intent::CellActivated {
            row: 2,
            col: 2,
            cell_content: "note 2".to_string(),
        }]
    );
}

#[test]
fn read_only_mode_ignores_edit_and_selection_gestures() {
    let mut h = Harness::new(GridMode::ReadOnly, &five_lines());
    h.focus_cell(1, 1);
    h.key(KeyCode::Enter);

    h.focus_cell(1, 0);
    h.key(KeyCode::Char(' '));
    h.key(KeyCode::Enter);
    let down_on_line = h.line_cell(1);
    h.send(InputEvent::MouseDown(down_on_line));

    assert!(h.owner.is_empty());
    assert_eq!(h.ctrl.state(), ControllerState::Navigating);
}

#[test]
fn latest_line_hint_wins_after_render_in_author_mode() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(0, 1);
    h.key(KeyCode::Down);

    h.build(None, Some(3));
    h.ctrl.on_rendered(&mut h.grid);
    assert_eq!(h.focused_pos(), Some((3, 1)));
}

#[test]
fn last_known_focus_survives_a_render() {
    let mut h = Harness::new(GridMode::ReadOnly, &five_lines());
    h.focus_cell(2, 2);
    h.key(KeyCode::Left);

    h.build(None, Some(4));
    h.ctrl.on_rendered(&mut h.grid);
    assert_eq!(h.focused_pos(), Some((2, 1)));
}

// ========================================================================
// Editing
// ========================================================================

#[test]
fn edit_round_trip_with_indent_and_submit() {
    let mut h = Harness::new(GridMode::Author, &["hello", "world"]);
    h.focus_cell(0, 1);

    assert_eq!(h.key(KeyCode::Enter), Propagation::Consumed);
    assert_eq!(
        h.owner,
        vec![Intent::StartEdit {
            row_index: 0,
            col_index: 1
        }]
    );
    assert_eq!(h.ctrl.state(), ControllerState::AwaitingRender);

    // navigation is suspended until the affordance shows up
    h.key(KeyCode::Down);
    assert_eq!(h.focused_pos(), Some((0, 1)));

    h.rerender(Some((0, 1)));
    assert_eq!(h.ctrl.state(), ControllerState::Editing);
    let cell = h.grid.editing_cell().unwrap();
    assert_eq!(h.grid.focus_target(), FocusTarget::Affordance(cell));
    assert_eq!(h.grid.affordance(cell).unwrap().selection(), (5, 5));

    h.grid.affordance_mut(cell).unwrap().set_selection_range(1, 4);
    assert_eq!(h.key(KeyCode::Tab), Propagation::Consumed);
    let input = h.grid.affordance(cell).unwrap();
    assert_eq!(input.value(), "h\tello");
    assert_eq!(input.selection(), (1, 5));

    // plain keys belong to the input
    assert_eq!(h.key(KeyCode::Char('x')), Propagation::Default);
    assert_eq!(h.key(KeyCode::Down), Propagation::Default);

    assert_eq!(
        h.key_with(KeyCode::Enter, KeyModifiers::CONTROL),
        Propagation::Consumed
    );
    assert_eq!(
        h.owner.last(),
        Some(&Intent::UpdateCell {
            chunk_id: "c0".to_string(),
            col_name: "content".to_string(),
            value: "h\tello".to_string(),
        })
    );

    h.rerender(None);
    assert_eq!(h.ctrl.state(), ControllerState::Navigating);
    assert_eq!(h.focused_pos(), Some((0, 1)));
}

#[test]
fn cmd_enter_submits_too() {
    let mut h = Harness::new(GridMode::Author, &["hello"]);
    h.focus_cell(0, 1);
    h.key(KeyCode::Enter);
    h.rerender(Some((0, 1)));

    h.key_with(KeyCode::Enter, KeyModifiers::SUPER);
    assert!(matches!(h.owner.last(), Some(Intent::UpdateCell { .. })));
}

#[test]
fn escape_cancels_edit_and_restores_origin_focus() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(2, 1);
    h.key(KeyCode::Enter);
    h.rerender(Some((2, 1)));

    assert_eq!(h.key(KeyCode::Esc), Propagation::Consumed);
    assert_eq!(h.owner.last(), Some(&Intent::CancelEdit));
    assert_eq!(h.focused_pos(), Some((2, 1)));

    h.rerender(None);
    assert_eq!(h.ctrl.state(), ControllerState::Navigating);
    assert_eq!(h.focused_pos(), Some((2, 1)));
}

#[test]
fn escape_works_before_the_affordance_renders() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(1, 1);
    h.key(KeyCode::Enter);

    assert_eq!(h.key(KeyCode::Esc), Propagation::Consumed);
    assert_eq!(h.owner.last(), Some(&Intent::CancelEdit));
}

#[test]
fn missing_affordance_clears_pending_edit_on_next_render() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(3, 1);
    h.key(KeyCode::Enter);

    h.rerender(None);
    assert_eq!(h.ctrl.state(), ControllerState::Navigating);
    assert_eq!(h.focused_pos(), Some((3, 1)));
    h.key(KeyCode::Down);
    assert_eq!(h.focused_pos(), Some((4, 1)));
}

#[test]
fn backspace_in_empty_deletable_cell_deletes_line() {
    let mut h = Harness::new(GridMode::Author, &["keep", ""]);
    h.focus_cell(1, 1);
    h.key(KeyCode::Enter);
    h.rerender(Some((1, 1)));

    assert_eq!(h.key(KeyCode::Backspace), Propagation::Consumed);
    assert_eq!(h.owner.last(), Some(&Intent::DeleteLine));
    let cell = h.grid.editing_cell().unwrap();
    assert_eq!(h.grid.affordance(cell).unwrap().value(), "");
}

#[test]
fn backspace_with_text_is_left_to_the_input() {
    let mut h = Harness::new(GridMode::Author, &["keep"]);
    h.focus_cell(0, 1);
    h.key(KeyCode::Enter);
    h.rerender(Some((0, 1)));
    let sent = h.owner.len();

    assert_eq!(h.key(KeyCode::Backspace), Propagation::Default);
    assert_eq!(h.owner.len(), sent);
}

#[test]
fn affordance_rendered_by_owner_alone_is_adopted() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.rerender(Some((4, 1)));

    assert_eq!(h.ctrl.state(), ControllerState::Editing);
    assert_eq!(h.ctrl.edit_session().unwrap().target(), FocusPosition::new(4, 1));
    assert_eq!(h.focused_pos(), Some((4, 1)));
}

// ========================================================================
// Line-range selection
// ========================================================================

#[test]
fn space_down_down_enter_rechunks() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(2, 0);

    assert_eq!(h.key(KeyCode::Char(' ')), Propagation::Consumed);
    h.key(KeyCode::Down);
    h.key(KeyCode::Down);
    assert_eq!(h.marked_lines(), vec![2, 3, 4]);
    assert_eq!(h.key(KeyCode::Enter), Propagation::Consumed);

    assert_eq!(
        h.owner,
        vec![
            Intent::StartSelection(LineRange::new(2, 2)),
            Intent::UpdateSelection(LineRange::new(2, 3)),
            Intent::UpdateSelection(LineRange::new(2, 4)),
            Intent::Rechunk(Some(LineRange::new(2, 4))),
        ]
    );
    assert!(h.ctrl.selection().is_cleared());
    assert!(h.marked_lines().is_empty());
    assert_eq!(h.ctrl.state(), ControllerState::Navigating);
}

#[test]
fn commit_refocuses_sentinel_after_render() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(3, 0);
    h.key(KeyCode::Char('v'));
    h.key(KeyCode::Enter);
    assert_eq!(h.focused_pos(), Some((0, 1)));

    h.rerender(None);
    assert_eq!(h.focused_pos(), Some((0, 1)));
}

#[test]
fn commit_can_refocus_the_anchor_line() {
    let config = ControllerConfig {
        refocus_after_commit: RefocusTarget::Anchor,
        rechunk_payload: RechunkPayload::Bare,
        ..Default::default()
    };
    let mut h = Harness::with_config(GridMode::Author, &five_lines(), config);
    h.focus_cell(1, 0);
    h.key(KeyCode::Char('V'));
    h.key(KeyCode::Down);
    h.key(KeyCode::Enter);

    assert_eq!(h.owner.last(), Some(&Intent::Rechunk(None)));
    h.rerender(None);
    assert_eq!(h.focused_pos(), Some((1, 0)));
}

#[test]
fn enter_arms_then_starts_then_commits() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(1, 0);

    h.key(KeyCode::Enter);
    assert!(h.owner.is_empty());
    assert_eq!(h.ctrl.state(), ControllerState::Selecting);

    // armed mode still navigates
    h.key(KeyCode::Down);
    assert_eq!(h.focused_pos(), Some((2, 0)));

    h.key(KeyCode::Enter);
    assert_eq!(h.owner, vec![Intent::StartSelection(LineRange::new(2, 2))]);

    h.key(KeyCode::Enter);
    assert_eq!(h.owner.last(), Some(&Intent::Rechunk(Some(LineRange::new(2, 2)))));
}

#[test]
fn escape_while_armed_disarms_silently() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(1, 0);
    h.key(KeyCode::Enter);

    assert_eq!(h.key(KeyCode::Esc), Propagation::Consumed);
    assert!(h.owner.is_empty());
    assert!(h.ctrl.selection().is_cleared());
}

#[test]
fn escape_cancels_range_and_clears_markers() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(0, 0);
    h.key(KeyCode::Char(' '));
    h.key(KeyCode::Down);
    h.key(KeyCode::Down);
    h.key(KeyCode::Up);

    assert_eq!(h.key(KeyCode::Esc), Propagation::Consumed);
    assert_eq!(h.owner.last(), Some(&Intent::CancelSelection));
    assert_eq!(
        h.ctrl.selection(),
        LineSelection {
            anchor: None,
            current: None,
            active: false
        }
    );
    assert!(h.marked_lines().is_empty());
}

#[test]
fn horizontal_arrows_do_nothing_while_selecting() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(1, 0);
    h.key(KeyCode::Char(' '));

    assert_eq!(h.key(KeyCode::Right), Propagation::Consumed);
    assert_eq!(h.focused_pos(), Some((1, 0)));
    assert_eq!(h.owner.len(), 1);
}

#[test]
fn selection_markers_survive_a_render() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(1, 0);
    h.key(KeyCode::Char(' '));
    h.key(KeyCode::Down);

    h.rerender(None);
    assert_eq!(h.marked_lines(), vec![1, 2]);
    assert_eq!(h.focused_pos(), Some((2, 0)));

    h.key(KeyCode::Down);
    assert_eq!(h.owner.last(), Some(&Intent::UpdateSelection(LineRange::new(1, 3))));
}

#[test]
fn pointer_drag_commits_on_release() {
    let mut h = Harness::new(GridMode::Author, &five_lines());

    let down = h.line_cell(1);
    assert_eq!(h.send(InputEvent::MouseDown(down)), Propagation::Consumed);
    assert!(h.ctrl.listens(Listener::MouseOver));

    let over = h.line_cell(2);
    h.send(InputEvent::MouseOver(over));
    let over = h.line_cell(3);
    h.send(InputEvent::MouseOver(over));
    assert_eq!(h.marked_lines(), vec![1, 2, 3]);

    let up = h.line_cell(3);
    assert_eq!(h.send(InputEvent::MouseUp(up)), Propagation::Consumed);
    assert_eq!(
        h.owner,
        vec![
            Intent::StartSelection(LineRange::new(1, 1)),
            Intent::UpdateSelection(LineRange::new(1, 2)),
            Intent::UpdateSelection(LineRange::new(1, 3)),
            Intent::Rechunk(Some(LineRange::new(1, 3))),
        ]
    );
    assert!(!h.ctrl.listens(Listener::MouseOver));
    assert!(h.ctrl.selection().is_cleared());
}

#[test]
fn mouse_over_without_drag_is_not_heard() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    let over = h.line_cell(2);

    assert_eq!(h.send(InputEvent::MouseOver(over)), Propagation::Default);
    assert!(h.owner.is_empty());
}

#[test]
fn pointer_down_outside_line_numbers_cancels() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(2, 0);
    h.key(KeyCode::Char(' '));
    h.key(KeyCode::Down);

    let content = h.grid.cell_at(0, 1);
    assert_eq!(h.send(InputEvent::MouseDown(content)), Propagation::Consumed);
    assert_eq!(h.owner.last(), Some(&Intent::CancelSelection));
    assert!(!h.owner.iter().any(|intent| matches!(intent, Intent::Rechunk(_))));
    assert!(h.ctrl.selection().is_cleared());
}

#[test]
fn release_outside_line_numbers_cancels_drag() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    let down = h.line_cell(0);
    h.send(InputEvent::MouseDown(down));

    h.send(InputEvent::MouseUp(None));
    assert_eq!(h.owner.last(), Some(&Intent::CancelSelection));
    assert!(!h.ctrl.listens(Listener::MouseOver));
}

#[test]
fn new_press_restarts_an_anchored_range() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(0, 0);
    h.key(KeyCode::Char(' '));

    let down = h.line_cell(3);
    h.send(InputEvent::MouseDown(down));
    assert_eq!(
        h.owner,
        vec![
            Intent::StartSelection(LineRange::new(0, 0)),
            Intent::CancelSelection,
            Intent::StartSelection(LineRange::new(3, 3)),
        ]
    );
    assert_eq!(h.ctrl.selection().anchor, Some(3));
}

#[test]
fn leaving_the_grid_mid_drag_cancels_by_default() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    let down = h.line_cell(1);
    h.send(InputEvent::MouseDown(down));

    assert_eq!(h.send(InputEvent::MouseLeave), Propagation::Consumed);
    assert_eq!(h.owner.last(), Some(&Intent::CancelSelection));
}

#[test]
fn leaving_the_grid_can_keep_the_drag() {
    let config = ControllerConfig {
        cancel_on_pointer_leave: false,
        ..Default::default()
    };
    let mut h = Harness::with_config(GridMode::Author, &five_lines(), config);
    let down = h.line_cell(1);
    h.send(InputEvent::MouseDown(down));

    assert_eq!(h.send(InputEvent::MouseLeave), Propagation::Default);
    assert_eq!(h.ctrl.selection().anchor, Some(1));
    assert!(h.ctrl.listens(Listener::MouseOver));
}

#[test]
fn unselectable_line_numbers_ignore_gestures() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.grid.reset(GridMode::Author, ["line", "content"]);
    h.grid
        .push_row([CellAttrs::line_number(0).unselectable(), CellAttrs::text("x")]);
    h.focus_cell(0, 0);

    h.key(KeyCode::Char(' '));
    let down = h.line_cell(0);
    h.send(InputEvent::MouseDown(down));
    assert!(h.owner.is_empty());
}

// ========================================================================
// Mutual exclusion
// ========================================================================

#[test]
fn edit_cannot_start_while_selecting() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(1, 0);
    h.key(KeyCode::Enter);
    h.key(KeyCode::Right);
    assert_eq!(h.focused_pos(), Some((1, 1)));

    assert_eq!(h.key(KeyCode::Enter), Propagation::Default);
    assert!(h.owner.is_empty());
    assert!(h.ctrl.edit_session().is_none());
    assert!(h.ctrl.selection().is_armed());
}

#[test]
fn selection_cannot_start_while_editing() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(1, 1);
    h.key(KeyCode::Enter);
    h.rerender(Some((1, 1)));
    let before = h.ctrl.edit_session().cloned();
    let sent = h.owner.len();

    let down = h.line_cell(3);
    assert_eq!(h.send(InputEvent::MouseDown(down)), Propagation::Default);
    assert_eq!(h.key(KeyCode::Char(' ')), Propagation::Default);

    assert_eq!(h.owner.len(), sent);
    assert!(h.ctrl.selection().is_cleared());
    assert_eq!(h.ctrl.edit_session().cloned(), before);
    assert_eq!(h.ctrl.state(), ControllerState::Editing);
}

// ========================================================================
// Lifecycle
// ========================================================================

#[test]
fn detached_controller_hears_nothing() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(1, 0);
    h.ctrl.detach(&mut h.grid, &mut h.owner);
    assert!(!h.ctrl.is_attached());

    assert_eq!(h.key(KeyCode::Char(' ')), Propagation::Default);
    let down = h.line_cell(2);
    assert_eq!(h.send(InputEvent::MouseDown(down)), Propagation::Default);
    assert!(h.owner.is_empty());
}

#[test]
fn detach_drops_the_drag_listener() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    let down = h.line_cell(1);
    h.send(InputEvent::MouseDown(down));
    assert!(h.ctrl.listens(Listener::MouseOver));

    h.ctrl.detach(&mut h.grid, &mut h.owner);
    assert!(!h.ctrl.listens(Listener::MouseOver));

    h.ctrl.attach(&mut h.grid);
    assert!(h.ctrl.listens(Listener::KeyDown));
    assert!(!h.ctrl.listens(Listener::MouseOver));
}

#[test]
fn detach_mid_drag_cancels_the_range() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    let down = h.line_cell(1);
    h.send(InputEvent::MouseDown(down));
    assert_eq!(h.ctrl.state(), ControllerState::Selecting);

    h.ctrl.detach(&mut h.grid, &mut h.owner);
    assert_eq!(
        h.owner,
        vec![
            Intent::StartSelection(LineRange::new(1, 1)),
            Intent::CancelSelection,
        ]
    );
    assert!(h.ctrl.selection().is_cleared());
    assert!(h.marked_lines().is_empty());

    h.ctrl.attach(&mut h.grid);
    assert!(!h.ctrl.listens(Listener::MouseOver));
    assert_eq!(h.ctrl.state(), ControllerState::Navigating);

    let over = h.line_cell(3);
    assert_eq!(h.send(InputEvent::MouseOver(over)), Propagation::Default);
    assert_eq!(h.owner.len(), 2);

    // A fresh press starts a new range without a stale cancel.
    let down = h.line_cell(2);
    assert_eq!(h.send(InputEvent::MouseDown(down)), Propagation::Consumed);
    assert_eq!(h.owner.last(), Some(&Intent::StartSelection(LineRange::new(2, 2))));
    assert_eq!(h.owner.len(), 3);
}

#[test]
fn detach_disarms_selecting_mode_quietly() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(1, 0);
    h.ctrl.selection.arm().unwrap();

    h.ctrl.detach(&mut h.grid, &mut h.owner);
    assert!(h.owner.is_empty());
    assert!(h.ctrl.selection().is_cleared());
}

#[test]
fn rerender_of_a_large_grid_stays_linear() {
    let lines: Vec<String> = (0..20_000).map(|idx| format!("line {idx}")).collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut h = Harness::new(GridMode::Author, &lines);

    let started = std::time::Instant::now();
    h.rerender(None);
    assert!(h.marked_lines().is_empty());

    let down = h.line_cell(19_990);
    h.send(InputEvent::MouseDown(down));
    h.rerender(None);
    assert_eq!(h.marked_lines(), vec![19_990]);
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
}

#[test]
fn key_release_is_ignored() {
    let mut h = Harness::new(GridMode::Author, &five_lines());
    h.focus_cell(1, 0);
    let mut release = KeyEvent::from(KeyCode::Char(' '));
    release.kind = crossterm::event::KeyEventKind::Release;

    assert_eq!(h.send(InputEvent::Key(release)), Propagation::Default);
    assert!(h.owner.is_empty());
}
