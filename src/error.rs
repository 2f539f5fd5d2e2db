use thiserror::Error;

/// Why an input produced no transition.
///
/// Neither case is fatal. The dispatcher logs it and the next input re-reads the grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The element a transition needs is not rendered (yet).
    #[error("target not found: {0}")]
    TargetNotFound(String),

    /// The gesture means nothing in the current state.
    #[error("invalid gesture: {0}")]
    InvalidGesture(&'static str),
}
