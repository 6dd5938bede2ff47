mod controller;
mod state;

pub use controller::{StyleSettings, TickInput, WindowStyleController};
pub use state::{DragSession, TransparencyLevel, WindowRuntimeState, step_alpha};
