pub mod controller;
pub mod ticks;

pub use controller::{GestureState, Viewport, ViewportController, ZoomState};
pub use ticks::{generate_ticks, Tick};
