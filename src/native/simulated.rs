use crate::error::NativeError;
use crate::monitor::{MonitorRect, ScreenRect, WindowRect};

use super::WindowAdapter;

/// One native write observed by a [`SimulatedWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowWrite {
    Position(i32, i32),
    Size(i32, i32),
    FrameVisible(bool),
    ClickThrough(bool),
    BackgroundTransparent(bool),
    Alpha(u8),
    TopMost(bool),
    Activate,
}

/// In-memory window used for headless runs and tests.
///
/// Geometry writes update the stored rectangle so later queries see them,
/// and every write is appended to [`SimulatedWindow::writes`].
#[derive(Debug, Clone)]
pub struct SimulatedWindow {
    pub rect: WindowRect,
    pub monitors: Vec<MonitorRect>,
    pub cursor: Option<(i32, i32)>,
    pub focused: bool,
    pub frame_visible: bool,
    pub click_through: bool,
    pub background_transparent: bool,
    pub alpha: u8,
    pub topmost: bool,
    pub writes: Vec<WindowWrite>,
}

impl SimulatedWindow {
    /// A window at `rect` on a single 1920x1080 primary display.
    pub fn new(rect: WindowRect) -> Self {
        Self::with_monitors(rect, vec![ScreenRect::new(0, 0, 1920, 1080)])
    }

    /// The first monitor in `monitors` acts as the primary display.
    pub fn with_monitors(rect: WindowRect, monitors: Vec<MonitorRect>) -> Self {
        Self {
            rect,
            monitors,
            cursor: None,
            focused: true,
            frame_visible: true,
            click_through: false,
            background_transparent: false,
            alpha: 0xFF,
            topmost: false,
            writes: Vec::new(),
        }
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn count_writes(&self, pred: impl Fn(&WindowWrite) -> bool) -> usize {
        self.writes.iter().filter(|w| pred(w)).count()
    }
}

impl WindowAdapter for SimulatedWindow {
    fn window_rect(&self) -> Option<WindowRect> {
        Some(self.rect)
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.rect = ScreenRect::from_origin_size(x, y, self.rect.width(), self.rect.height());
        self.writes.push(WindowWrite::Position(x, y));
    }

    fn set_size(&mut self, width: i32, height: i32) {
        self.rect = ScreenRect::from_origin_size(self.rect.left, self.rect.top, width, height);
        self.writes.push(WindowWrite::Size(width, height));
    }

    fn set_frame_visible(&mut self, visible: bool) {
        self.frame_visible = visible;
        self.writes.push(WindowWrite::FrameVisible(visible));
    }

    fn set_click_through(&mut self, click_through: bool) {
        self.click_through = click_through;
        self.writes.push(WindowWrite::ClickThrough(click_through));
    }

    fn set_background_transparent(&mut self, transparent: bool) {
        self.background_transparent = transparent;
        self.writes.push(WindowWrite::BackgroundTransparent(transparent));
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
        self.writes.push(WindowWrite::Alpha(alpha));
    }

    fn set_topmost(&mut self, topmost: bool) {
        self.topmost = topmost;
        self.writes.push(WindowWrite::TopMost(topmost));
    }

    fn cursor_position(&self) -> Option<(i32, i32)> {
        self.cursor
    }

    fn monitor_rects(&self) -> Result<Vec<MonitorRect>, NativeError> {
        if self.monitors.is_empty() {
            return Err(NativeError::NoMonitors);
        }
        Ok(self.monitors.clone())
    }

    fn primary_monitor_rect(&self) -> Option<MonitorRect> {
        self.monitors.first().copied()
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn activate(&mut self) {
        self.focused = true;
        self.writes.push(WindowWrite::Activate);
    }
}
