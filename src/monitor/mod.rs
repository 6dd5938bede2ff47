mod enumerate;
mod types;

pub use enumerate::{enumerate_monitors, primary_monitor};
pub use types::{MonitorRect, ScreenRect, WindowRect};
