use crate::error::NativeError;
use crate::monitor::{MonitorRect, WindowRect};

use super::WindowAdapter;

/// Adapter for platforms without the native window APIs.
///
/// Every write is dropped and every query comes back empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullWindow;

impl WindowAdapter for NullWindow {
    fn window_rect(&self) -> Option<WindowRect> {
        None
    }

    fn set_position(&mut self, _x: i32, _y: i32) {}

    fn set_size(&mut self, _width: i32, _height: i32) {}

    fn set_frame_visible(&mut self, _visible: bool) {}

    fn set_click_through(&mut self, _click_through: bool) {}

    fn set_background_transparent(&mut self, _transparent: bool) {}

    fn set_alpha(&mut self, _alpha: u8) {}

    fn set_topmost(&mut self, _topmost: bool) {}

    fn cursor_position(&self) -> Option<(i32, i32)> {
        None
    }

    fn monitor_rects(&self) -> Result<Vec<MonitorRect>, NativeError> {
        Err(NativeError::NoHandle)
    }

    fn primary_monitor_rect(&self) -> Option<MonitorRect> {
        None
    }

    fn is_focused(&self) -> bool {
        false
    }

    fn activate(&mut self) {}
}
