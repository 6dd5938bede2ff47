//! Window position and size persisted across runs.
//!
//! The last known geometry is kept in a [`KeyValueStore`]; at startup it is
//! re-applied and checked against the live monitor layout so that a window
//! saved on a display that is gone no longer ends up out of reach.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::monitor::{MonitorRect, WindowRect};
use crate::native::WindowAdapter;
use crate::store::KeyValueStore;

pub const POSITION_X_KEY: &str = "InitialPositionX";
pub const POSITION_Y_KEY: &str = "InitialPositionY";
pub const WIDTH_KEY: &str = "InitialWidth";
pub const HEIGHT_KEY: &str = "InitialHeight";

/// Persisted sizes at or below this are treated as corrupt and not applied.
pub const MIN_SANE_SIZE: i32 = 100;
/// Distance kept from every edge of the primary monitor after a relocation.
pub const SAFETY_MARGIN: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPlacement {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowPlacement {
    pub fn rect(&self) -> WindowRect {
        WindowRect::from_origin_size(self.x, self.y, self.width, self.height)
    }
}

impl From<WindowRect> for WindowPlacement {
    fn from(rect: WindowRect) -> Self {
        Self {
            x: rect.left,
            y: rect.top,
            width: rect.width(),
            height: rect.height(),
        }
    }
}

/// A placement is valid when some monitor holds both the window's top-left
/// corner and the point two thirds of the way to its bottom-right corner.
pub fn placement_is_valid(window: WindowRect, monitors: &[MonitorRect]) -> bool {
    let test_x = window.left + window.width() * 2 / 3;
    let test_y = window.top + window.height() * 2 / 3;

    // Keep scanning after a partial match: overlapping monitor reports
    // can put the corner in more than one rectangle.
    monitors
        .iter()
        .filter(|m| m.contains(window.left, window.top))
        .any(|m| m.contains(test_x, test_y))
}

/// Move `window` onto `primary`, shrinking it if needed so that it stays
/// [`SAFETY_MARGIN`] away from every edge.
pub fn relocate_into(window: WindowRect, primary: MonitorRect) -> WindowPlacement {
    // Never below one unit, even on a monitor narrower than both margins.
    let width = window.width().min(primary.width() - 2 * SAFETY_MARGIN).max(1);
    let height = window.height().min(primary.height() - 2 * SAFETY_MARGIN).max(1);

    let x = clamp_lenient(
        window.left,
        primary.left + SAFETY_MARGIN,
        primary.right - SAFETY_MARGIN - width,
    );
    let y = clamp_lenient(
        window.top,
        primary.top + SAFETY_MARGIN,
        primary.bottom - SAFETY_MARGIN - height,
    );

    WindowPlacement {
        x,
        y,
        width,
        height,
    }
}

/// Clamp that favours `min` instead of panicking when the range is empty.
fn clamp_lenient(value: i32, min: i32, max: i32) -> i32 {
    value.min(max).max(min)
}

pub struct PlacementStore<S> {
    store: S,
    last_position: Option<(i32, i32)>,
    check_interval: Duration,
    until_check: Duration,
}

impl<S: KeyValueStore> PlacementStore<S> {
    pub fn new(store: S, check_interval: Duration) -> Self {
        Self {
            store,
            last_position: None,
            check_interval,
            until_check: check_interval,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Geometry currently on record, if all four values are present.
    pub fn persisted(&self) -> Option<WindowPlacement> {
        Some(WindowPlacement {
            x: self.store.get_int(POSITION_X_KEY)?,
            y: self.store.get_int(POSITION_Y_KEY)?,
            width: self.store.get_int(WIDTH_KEY)?,
            height: self.store.get_int(HEIGHT_KEY)?,
        })
    }

    /// Apply the saved geometry to `window`, then relocate it if the result
    /// is not visible enough on any monitor.
    pub fn load<A: WindowAdapter + ?Sized>(&mut self, window: &mut A) {
        let saved_x = self.store.get_int(POSITION_X_KEY);
        let saved_y = self.store.get_int(POSITION_Y_KEY);
        if let (Some(x), Some(y)) = (saved_x, saved_y) {
            self.last_position = Some((x, y));
            window.set_position(x, y);
        } else if let Some((x, y)) = window.position() {
            // First run: seed the record from wherever the OS put us.
            self.last_position = Some((x, y));
            self.write_position(x, y);
        }

        let width = self.store.get_int(WIDTH_KEY).unwrap_or(0);
        let height = self.store.get_int(HEIGHT_KEY).unwrap_or(0);
        if width > MIN_SANE_SIZE && height > MIN_SANE_SIZE {
            window.set_size(width, height);
        }

        self.adjust_if_invalid(window);
    }

    /// Record the live position if it moved since the last record.
    pub fn check<A: WindowAdapter + ?Sized>(&mut self, window: &A) {
        let Some(pos) = window.position() else {
            return;
        };
        if self.last_position == Some(pos) {
            return;
        }
        self.last_position = Some(pos);
        self.write_position(pos.0, pos.1);
        tracing::debug!("window moved to ({}, {})", pos.0, pos.1);
    }

    /// Advance the periodic check timer by `elapsed`; runs [`Self::check`]
    /// whenever the interval has passed. Returns whether a check ran.
    pub fn poll<A: WindowAdapter + ?Sized>(&mut self, elapsed: Duration, window: &A) -> bool {
        self.until_check = self.until_check.saturating_sub(elapsed);
        if !self.until_check.is_zero() {
            return false;
        }
        self.until_check = self.check_interval;
        self.check(window);
        true
    }

    /// Persist the live position and size unconditionally (shutdown path).
    pub fn save<A: WindowAdapter + ?Sized>(&mut self, window: &A) {
        let Some(rect) = window.window_rect() else {
            tracing::warn!("could not read window bounds, placement not saved");
            return;
        };
        self.write(WindowPlacement::from(rect));
        if let Err(e) = self.store.flush() {
            tracing::warn!("failed to flush window placement: {e}");
        }
    }

    /// Returns `true` when the window had to be moved.
    fn adjust_if_invalid<A: WindowAdapter + ?Sized>(&mut self, window: &mut A) -> bool {
        let Some(rect) = window.window_rect() else {
            tracing::warn!("could not read window bounds, skipping placement validation");
            return false;
        };

        let monitors = match window.monitor_rects() {
            Ok(monitors) => monitors,
            Err(e) => {
                tracing::warn!("monitor enumeration failed, treating placement as invalid: {e}");
                Vec::new()
            }
        };
        if placement_is_valid(rect, &monitors) {
            return false;
        }

        let Some(primary) = window
            .primary_monitor_rect()
            .or_else(|| monitors.first().copied())
        else {
            tracing::warn!("no primary monitor available, leaving window where it is");
            return false;
        };

        let fixed = relocate_into(rect, primary);
        tracing::info!(
            "window at {:?} is off-screen, moving to ({}, {}) {}x{}",
            rect,
            fixed.x,
            fixed.y,
            fixed.width,
            fixed.height
        );
        self.write(fixed);
        window.set_position(fixed.x, fixed.y);
        window.set_size(fixed.width, fixed.height);
        true
    }

    fn write(&mut self, placement: WindowPlacement) {
        self.last_position = Some((placement.x, placement.y));
        self.write_position(placement.x, placement.y);
        self.store.set_int(WIDTH_KEY, placement.width);
        self.store.set_int(HEIGHT_KEY, placement.height);
    }

    fn write_position(&mut self, x: i32, y: i32) {
        self.store.set_int(POSITION_X_KEY, x);
        self.store.set_int(POSITION_Y_KEY, y);
    }
}
