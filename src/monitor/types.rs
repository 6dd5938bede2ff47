use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in virtual-screen coordinates.
///
/// `right` and `bottom` are exclusive, matching what the OS reports for
/// window and monitor bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Geometry of one connected display.
pub type MonitorRect = ScreenRect;

/// Outer bounds of a top-level window, frame included.
pub type WindowRect = ScreenRect;

impl ScreenRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Half-open containment test: the left/top edges are inside, the
    /// right/bottom edges are not.
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}
