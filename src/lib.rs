//! Keyboard and pointer controller for server-driven editing grids.
//!
//! A [`GridController`] listens to one rendered grid, keeps cell focus, runs at most one edit
//! session or one line-range selection, and reports what the user asked for as [`Intent`]s to
//! an [`Owner`]. The owner re-renders on its own schedule and calls
//! [`GridController::on_rendered`] when it has.

pub mod controller;
pub mod error;
pub mod intent;
pub mod model;
pub mod owner;
pub mod surface;

pub use controller::{ControllerConfig, GridController, InputEvent, Propagation};
pub use error::GridError;
pub use intent::{Intent, Owner};
pub use owner::DocumentOwner;
pub use surface::{GridSurface, RenderedGrid};
