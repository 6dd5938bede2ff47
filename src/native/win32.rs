use std::ffi::c_void;

use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows::Win32::Foundation::{COLORREF, HWND, POINT, RECT};
use windows::Win32::Graphics::Dwm::DwmExtendFrameIntoClientArea;
use windows::Win32::Graphics::Gdi::ClientToScreen;
use windows::Win32::UI::Controls::MARGINS;
use windows::Win32::UI::WindowsAndMessaging::{
    GWL_EXSTYLE, GWL_STYLE, GetCursorPos, GetForegroundWindow, GetWindowLongW,
    GetWindowRect, HWND_NOTOPMOST, HWND_TOPMOST, LWA_ALPHA, SET_WINDOW_POS_FLAGS,
    SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER,
    SetForegroundWindow, SetLayeredWindowAttributes, SetWindowLongW, SetWindowPos, WS_EX_LAYERED,
    WS_EX_TRANSPARENT, WS_POPUP, WS_VISIBLE,
};

use crate::error::NativeError;
use crate::monitor::{self, MonitorRect, WindowRect};

use super::WindowAdapter;

/// Win32 implementation of [`WindowAdapter`] bound to one top-level window.
///
/// The window is kept layered (`WS_EX_LAYERED`) for its whole life so that
/// whole-window alpha can be applied at any time.
pub struct Win32Window {
    hwnd: HWND,
    /// Style captured at attach time, restored when the frame is shown again.
    default_style: u32,
    /// Extended style captured at attach time (plus `WS_EX_LAYERED`).
    default_ex_style: u32,
}

impl Win32Window {
    /// Bind to the native handle behind a winit (or any raw-window-handle) window.
    pub fn attach(window: &impl HasWindowHandle) -> Result<Self, NativeError> {
        let handle = window
            .window_handle()
            .map_err(|e| NativeError::call("window_handle", e))?;
        let RawWindowHandle::Win32(raw) = handle.as_raw() else {
            return Err(NativeError::NoHandle);
        };
        let hwnd = HWND(raw.hwnd.get() as *mut c_void);

        let (default_style, default_ex_style) = unsafe {
            let style = GetWindowLongW(hwnd, GWL_STYLE) as u32;
            let ex_style = GetWindowLongW(hwnd, GWL_EXSTYLE) as u32 | WS_EX_LAYERED.0;
            SetWindowLongW(hwnd, GWL_EXSTYLE, ex_style as i32);
            (style, ex_style)
        };

        let this = Self {
            hwnd,
            default_style,
            default_ex_style,
        };
        // A freshly layered window is invisible until its attributes are set.
        unsafe {
            if let Err(e) = SetLayeredWindowAttributes(hwnd, COLORREF(0), 0xFF, LWA_ALPHA) {
                tracing::warn!("SetLayeredWindowAttributes failed on attach: {e}");
            }
        }
        Ok(this)
    }

    fn set_window_pos(
        &self,
        insert_after: Option<HWND>,
        x: i32,
        y: i32,
        cx: i32,
        cy: i32,
        flags: SET_WINDOW_POS_FLAGS,
    ) {
        if let Err(e) = unsafe { SetWindowPos(self.hwnd, insert_after, x, y, cx, cy, flags) } {
            tracing::warn!("SetWindowPos failed: {e}");
        }
    }
}

impl WindowAdapter for Win32Window {
    fn window_rect(&self) -> Option<WindowRect> {
        let mut rect = RECT::default();
        match unsafe { GetWindowRect(self.hwnd, &mut rect) } {
            Ok(()) => Some(WindowRect::new(rect.left, rect.top, rect.right, rect.bottom)),
            Err(e) => {
                tracing::warn!("GetWindowRect failed: {e}");
                None
            }
        }
    }

    fn client_origin(&self) -> Option<(i32, i32)> {
        let mut origin = POINT::default();
        if unsafe { ClientToScreen(self.hwnd, &mut origin) }.as_bool() {
            Some((origin.x, origin.y))
        } else {
            tracing::warn!("ClientToScreen failed");
            None
        }
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.set_window_pos(None, x, y, 0, 0, SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE);
    }

    fn set_size(&mut self, width: i32, height: i32) {
        self.set_window_pos(
            None,
            0,
            0,
            width,
            height,
            SWP_NOMOVE | SWP_NOZORDER | SWP_NOACTIVATE,
        );
    }

    fn set_frame_visible(&mut self, visible: bool) {
        let style = if visible {
            self.default_style
        } else {
            WS_POPUP.0 | WS_VISIBLE.0
        };
        unsafe {
            SetWindowLongW(self.hwnd, GWL_STYLE, style as i32);
        }
        // Style changes only take effect after a frame-changed reposition.
        self.set_window_pos(
            None,
            0,
            0,
            0,
            0,
            SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE | SWP_FRAMECHANGED,
        );
    }

    fn set_click_through(&mut self, click_through: bool) {
        let ex_style = if click_through {
            WS_EX_LAYERED.0 | WS_EX_TRANSPARENT.0
        } else {
            self.default_ex_style
        };
        unsafe {
            SetWindowLongW(self.hwnd, GWL_EXSTYLE, ex_style as i32);
        }
    }

    fn set_background_transparent(&mut self, transparent: bool) {
        let inset = if transparent { -1 } else { 0 };
        let margins = MARGINS {
            cxLeftWidth: inset,
            cxRightWidth: inset,
            cyTopHeight: inset,
            cyBottomHeight: inset,
        };
        if let Err(e) = unsafe { DwmExtendFrameIntoClientArea(self.hwnd, &margins) } {
            tracing::warn!("DwmExtendFrameIntoClientArea failed: {e}");
        }

        // Shrink by one pixel and restore so the swap chain is rebuilt;
        // otherwise the first frames after the switch come out distorted.
        if let Some(rect) = self.window_rect() {
            let (cx, cy) = (rect.width(), rect.height());
            self.set_size(cx - 1, cy - 1);
            self.set_size(cx, cy);
        }
    }

    fn set_alpha(&mut self, alpha: u8) {
        if let Err(e) =
            unsafe { SetLayeredWindowAttributes(self.hwnd, COLORREF(0), alpha, LWA_ALPHA) }
        {
            tracing::warn!("SetLayeredWindowAttributes failed: {e}");
        }
    }

    fn set_topmost(&mut self, topmost: bool) {
        let insert_after = if topmost { HWND_TOPMOST } else { HWND_NOTOPMOST };
        self.set_window_pos(
            Some(insert_after),
            0,
            0,
            0,
            0,
            SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
        );
    }

    fn cursor_position(&self) -> Option<(i32, i32)> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }
            .ok()
            .map(|()| (point.x, point.y))
    }

    fn monitor_rects(&self) -> Result<Vec<MonitorRect>, NativeError> {
        monitor::enumerate_monitors()
    }

    fn primary_monitor_rect(&self) -> Option<MonitorRect> {
        monitor::primary_monitor()
    }

    fn is_focused(&self) -> bool {
        unsafe { GetForegroundWindow() == self.hwnd }
    }

    fn activate(&mut self) {
        if !unsafe { SetForegroundWindow(self.hwnd) }.as_bool() {
            tracing::debug!("SetForegroundWindow was refused");
        }
    }
}
