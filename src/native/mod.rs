//! Seam between the window-style logic and the OS window APIs.
//!
//! Every native write funnels through [`WindowAdapter`]. Writes are
//! fire-and-forget: an implementation logs its own failures and never reports
//! them back, so the controller keeps its logical state whatever the platform
//! does with the call.

mod null;
mod simulated;
#[cfg(windows)]
mod win32;

pub use null::NullWindow;
pub use simulated::{SimulatedWindow, WindowWrite};
#[cfg(windows)]
pub use win32::Win32Window;

use crate::error::NativeError;
use crate::monitor::{MonitorRect, WindowRect};

pub trait WindowAdapter {
    /// Outer bounds of the window, or `None` when they cannot be queried.
    fn window_rect(&self) -> Option<WindowRect>;

    fn position(&self) -> Option<(i32, i32)> {
        self.window_rect().map(|r| (r.left, r.top))
    }

    /// Screen position of the client area's top-left corner.
    fn client_origin(&self) -> Option<(i32, i32)> {
        self.position()
    }

    fn set_position(&mut self, x: i32, y: i32);
    fn set_size(&mut self, width: i32, height: i32);

    /// Show the regular OS frame, or switch to a borderless popup.
    fn set_frame_visible(&mut self, visible: bool);
    /// Let pointer events pass to whatever is under the window.
    fn set_click_through(&mut self, click_through: bool);
    /// Make the window background see-through (per-pixel content alpha).
    fn set_background_transparent(&mut self, transparent: bool);
    /// Whole-window layered alpha.
    fn set_alpha(&mut self, alpha: u8);
    fn set_topmost(&mut self, topmost: bool);

    /// Pointer position in screen coordinates.
    fn cursor_position(&self) -> Option<(i32, i32)>;
    fn monitor_rects(&self) -> Result<Vec<MonitorRect>, NativeError>;
    fn primary_monitor_rect(&self) -> Option<MonitorRect>;

    fn is_focused(&self) -> bool;
    /// Bring the window to the foreground.
    fn activate(&mut self);
}

/// Pointer position relative to the client area, queried from the OS.
///
/// Unlike window pointer events this keeps working while the window is
/// click-through and receives no input of its own.
pub fn pointer_in_client<A: WindowAdapter + ?Sized>(window: &A) -> Option<(f32, f32)> {
    let (cx, cy) = window.cursor_position()?;
    let (ox, oy) = window.client_origin()?;
    Some(((cx - ox) as f32, (cy - oy) as f32))
}

impl<T: WindowAdapter + ?Sized> WindowAdapter for Box<T> {
    fn window_rect(&self) -> Option<WindowRect> {
        (**self).window_rect()
    }

    fn position(&self) -> Option<(i32, i32)> {
        (**self).position()
    }

    fn client_origin(&self) -> Option<(i32, i32)> {
        (**self).client_origin()
    }

    fn set_position(&mut self, x: i32, y: i32) {
        (**self).set_position(x, y)
    }

    fn set_size(&mut self, width: i32, height: i32) {
        (**self).set_size(width, height)
    }

    fn set_frame_visible(&mut self, visible: bool) {
        (**self).set_frame_visible(visible)
    }

    fn set_click_through(&mut self, click_through: bool) {
        (**self).set_click_through(click_through)
    }

    fn set_background_transparent(&mut self, transparent: bool) {
        (**self).set_background_transparent(transparent)
    }

    fn set_alpha(&mut self, alpha: u8) {
        (**self).set_alpha(alpha)
    }

    fn set_topmost(&mut self, topmost: bool) {
        (**self).set_topmost(topmost)
    }

    fn cursor_position(&self) -> Option<(i32, i32)> {
        (**self).cursor_position()
    }

    fn monitor_rects(&self) -> Result<Vec<MonitorRect>, NativeError> {
        (**self).monitor_rects()
    }

    fn primary_monitor_rect(&self) -> Option<MonitorRect> {
        (**self).primary_monitor_rect()
    }

    fn is_focused(&self) -> bool {
        (**self).is_focused()
    }

    fn activate(&mut self) {
        (**self).activate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::ScreenRect;

    #[test]
    fn pointer_is_relative_to_client_origin() {
        let mut window = SimulatedWindow::new(ScreenRect::new(300, 200, 700, 600));
        assert_eq!(pointer_in_client(&window), None);

        window.cursor = Some((350, 260));
        assert_eq!(pointer_in_client(&window), Some((50.0, 60.0)));

        window.cursor = Some((10, 10));
        assert_eq!(pointer_in_client(&window), Some((-290.0, -190.0)));
    }

    #[test]
    fn boxed_adapter_forwards_pointer_queries() {
        let mut window = SimulatedWindow::new(ScreenRect::new(0, 0, 100, 100));
        window.cursor = Some((5, 7));
        let boxed: Box<dyn WindowAdapter> = Box::new(window);
        assert_eq!(pointer_in_client(&boxed), Some((5.0, 7.0)));
        assert_eq!(pointer_in_client(&NullWindow), None);
    }
}
