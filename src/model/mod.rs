pub mod config;
pub mod mode;
pub mod position;
pub mod selection;

pub use mode::{ControllerState, GridMode};
pub use position::{Direction, FocusPosition, GridBounds};
pub use selection::{LineRange, LineSelection};
