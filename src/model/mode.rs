use serde::Deserialize;

/// Grid-level interaction mode, fixed when the grid is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMode {
    /// Plain focus navigation only.
    #[default]
    ReadOnly,
    /// Editing and line-range selection are enabled.
    Author,
}

impl GridMode {
    pub fn is_author(self) -> bool {
        self == GridMode::Author
    }
}

/// Controller interaction states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// Arrow keys move cell focus.
    #[default]
    Navigating,
    /// An intent was sent and the owner has not re-rendered yet.
    AwaitingRender,
    /// An edit affordance is mounted for one cell.
    Editing,
    /// A line range is armed or being extended.
    Selecting,
}

impl ControllerState {
    pub fn label(&self) -> &'static str {
        match self {
            ControllerState::Navigating => "NAV",
            ControllerState::AwaitingRender => "WAIT",
            ControllerState::Editing => "EDIT",
            ControllerState::Selecting => "SELECT",
        }
    }
}

