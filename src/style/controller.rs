use crate::command::Command;
use crate::config::AppConfig;
use crate::native::WindowAdapter;

use super::state::{DragSession, TransparencyLevel, WindowRuntimeState, step_alpha};

/// Ticks between a primary-button press and the hit test that may start a
/// drag. The press and the pixel sample land in different passes, so the
/// decision waits until both describe the same frame.
const HIT_TEST_DELAY_TICKS: u8 = 2;

/// Tunables taken from [`AppConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleSettings {
    pub default_window_size: (i32, i32),
    pub alpha_lerp_factor: f32,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for StyleSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            default_window_size: config.default_window_size,
            alpha_lerp_factor: config.alpha_lerp_factor,
        }
    }
}

/// Per-tick observations fed into [`WindowStyleController::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Latest pixel hit-test result.
    pub on_opaque_pixel: bool,
    /// Whether the primary pointer button is currently held.
    pub primary_button_down: bool,
}

/// Drives the native window style from commands and per-frame signals.
///
/// All state lives in [`WindowRuntimeState`]; native writes go through the
/// owned [`WindowAdapter`] and are only issued when a value changes.
pub struct WindowStyleController<A> {
    window: A,
    settings: StyleSettings,
    state: WindowRuntimeState,
    drag: Option<DragSession>,
    hit_test_countdown: u8,
}

impl<A: WindowAdapter> WindowStyleController<A> {
    pub fn new(window: A, settings: StyleSettings) -> Self {
        Self {
            window,
            settings,
            state: WindowRuntimeState::default(),
            drag: None,
            hit_test_countdown: 0,
        }
    }

    /// Push the initial logical state to the native window.
    pub fn initialize(&mut self) {
        self.window.set_alpha(self.state.current_alpha);
        self.window.set_topmost(self.state.effective_topmost());
    }

    /// See-through background with a hidden frame, as chosen before the
    /// companion process is up.
    pub fn enter_overlay_mode(&mut self) {
        self.set_transparent(true);
        self.set_frame_visible(false);
    }

    pub fn state(&self) -> &WindowRuntimeState {
        &self.state
    }

    pub fn drag_session(&self) -> Option<DragSession> {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn window(&self) -> &A {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut A {
        &mut self.window
    }

    pub fn apply(&mut self, command: &Command) {
        tracing::debug!("window command: {command:?}");
        match *command {
            Command::ChromaKey { a, .. } => self.set_transparent(a == 0.0),
            Command::FrameVisibility(visible) => self.set_frame_visible(visible),
            Command::IgnoreMouse(ignore) => self.state.prefer_ignore_mouse_input = ignore,
            Command::TopMost(topmost) => {
                self.state.is_topmost = topmost;
                self.window.set_topmost(self.state.effective_topmost());
            }
            Command::WindowDraggable(draggable) => {
                if !draggable {
                    self.drag = None;
                }
                self.state.is_draggable_when_frame_hidden = draggable;
            }
            Command::MoveWindow { x, y } => self.window.set_position(x, y),
            Command::ResetWindowSize => {
                let (width, height) = self.settings.default_window_size;
                self.window.set_size(width, height);
            }
            Command::SetTransparencyLevel(ordinal) => match TransparencyLevel::try_from(ordinal) {
                Ok(level) => self.state.target_transparency_level = level,
                Err(bad) => tracing::debug!("ignoring unknown transparency level {bad}"),
            },
            Command::SetAlphaOnTransparent(alpha) => {
                self.state.alpha_on_transparent = alpha.clamp(0, 255) as u8;
            }
            Command::EnableTextureShare(_) | Command::SetTextureShareResolution(_) => {
                tracing::debug!("texture share command sent to window style controller");
            }
        }
    }

    /// Primary pointer button went down.
    ///
    /// Any running drag stops here since touch input may never report the
    /// matching release.
    pub fn on_primary_button_pressed(&mut self) {
        self.hit_test_countdown = HIT_TEST_DELAY_TICKS;
        self.drag = None;
    }

    /// Run one frame of the state machine. Must be called exactly once per
    /// display refresh.
    pub fn tick(&mut self, input: TickInput) {
        self.update_click_through(input.on_opaque_pixel);
        self.update_drag(input);
        self.update_alpha(input.on_opaque_pixel);
    }

    fn update_click_through(&mut self, on_opaque_pixel: bool) {
        let through = self.state.derive_click_through(on_opaque_pixel);
        if through == self.state.is_click_through {
            return;
        }
        self.state.is_click_through = through;
        self.window.set_click_through(through);
    }

    fn update_drag(&mut self, input: TickInput) {
        if self.state.is_frame_hidden
            && self.state.is_draggable_when_frame_hidden
            && self.hit_test_countdown == 1
            && input.on_opaque_pixel
        {
            self.hit_test_countdown = 0;
            self.start_drag();
        }

        if !input.primary_button_down {
            self.drag = None;
        }

        if let Some(drag) = self.drag
            && let Some(pointer) = self.window.cursor_position()
        {
            let (x, y) = drag.window_origin_for(pointer);
            if self.window.position() != Some((x, y)) {
                self.window.set_position(x, y);
            }
        }

        self.hit_test_countdown = self.hit_test_countdown.saturating_sub(1);
    }

    fn start_drag(&mut self) {
        if !self.window.is_focused() {
            self.window.activate();
        }
        let (Some(pointer), Some(origin)) = (self.window.cursor_position(), self.window.position())
        else {
            tracing::debug!("pointer or window position unavailable, drag not started");
            return;
        };
        self.drag = Some(DragSession {
            pointer_offset: (pointer.0 - origin.0, pointer.1 - origin.1),
        });
    }

    fn update_alpha(&mut self, on_opaque_pixel: bool) {
        let target = self.state.target_alpha(on_opaque_pixel);
        let next = step_alpha(self.state.current_alpha, target, self.settings.alpha_lerp_factor);
        if next == self.state.current_alpha {
            return;
        }
        self.state.current_alpha = next;
        self.window.set_alpha(next);
    }

    fn set_transparent(&mut self, transparent: bool) {
        if self.state.is_transparent == transparent {
            return;
        }
        self.state.is_transparent = transparent;
        self.window.set_background_transparent(transparent);
        if !transparent {
            // An opaque window captures clicks whatever is under the pointer.
            self.update_click_through(false);
        }
    }

    fn set_frame_visible(&mut self, visible: bool) {
        self.state.is_frame_hidden = !visible;
        self.window.set_frame_visible(visible);
        // Topmost only applies to the frameless overlay look.
        self.window.set_topmost(self.state.effective_topmost());

        if visible {
            self.drag = None;
            self.update_click_through(false);
            if self.state.current_alpha != 0xFF {
                self.state.current_alpha = 0xFF;
                self.window.set_alpha(0xFF);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::ScreenRect;
    use crate::native::{NullWindow, SimulatedWindow, WindowWrite};

    fn overlay_controller() -> WindowStyleController<SimulatedWindow> {
        let window = SimulatedWindow::new(ScreenRect::new(100, 100, 500, 700));
        let mut controller = WindowStyleController::new(window, StyleSettings::default());
        controller.initialize();
        controller.enter_overlay_mode();
        controller.window_mut().clear_writes();
        controller
    }

    fn held(on_opaque_pixel: bool) -> TickInput {
        TickInput {
            on_opaque_pixel,
            primary_button_down: true,
        }
    }

    #[test]
    fn overlay_mode_hides_frame_and_raises_topmost() {
        let window = SimulatedWindow::new(ScreenRect::new(0, 0, 400, 400));
        let mut controller = WindowStyleController::new(window, StyleSettings::default());
        controller.initialize();
        assert!(!controller.window().topmost);

        controller.enter_overlay_mode();
        let w = controller.window();
        assert!(w.background_transparent);
        assert!(!w.frame_visible);
        assert!(w.topmost);
    }

    #[test]
    fn click_through_follows_pixel_under_pointer() {
        let mut c = overlay_controller();
        c.tick(TickInput::default());
        assert!(c.state().is_click_through);
        assert!(c.window().click_through);

        c.tick(TickInput {
            on_opaque_pixel: true,
            ..Default::default()
        });
        assert!(!c.state().is_click_through);
        assert!(!c.window().click_through);
    }

    #[test]
    fn click_through_drops_as_soon_as_window_turns_opaque() {
        let mut c = overlay_controller();
        c.tick(TickInput::default());
        assert!(c.window().click_through);

        c.apply(&Command::ChromaKey {
            a: 1.0,
            r: 0.0,
            g: 0.0,
            b: 0.0,
        });
        assert!(!c.state().is_click_through);
        assert!(!c.window().click_through);
    }

    #[test]
    fn click_through_drops_as_soon_as_frame_shows() {
        let mut c = overlay_controller();
        c.tick(TickInput::default());
        assert!(c.window().click_through);

        c.apply(&Command::FrameVisibility(true));
        assert!(!c.state().is_click_through);
        assert!(!c.window().click_through);
        assert_eq!(
            c.window()
                .count_writes(|w| matches!(w, WindowWrite::ClickThrough(false))),
            1
        );
    }

    #[test]
    fn repeated_ticks_issue_no_redundant_writes() {
        let mut c = overlay_controller();
        c.apply(&Command::SetTransparencyLevel(TransparencyLevel::None as i32));
        c.tick(TickInput::default());
        let writes = c.window().writes.len();
        for _ in 0..10 {
            c.tick(TickInput::default());
        }
        assert_eq!(c.window().writes.len(), writes);
    }

    #[test]
    fn drag_starts_two_ticks_after_press_on_opaque_pixel() {
        let mut c = overlay_controller();
        c.window_mut().cursor = Some((150, 160));

        c.on_primary_button_pressed();
        c.tick(held(true));
        assert!(!c.is_dragging());
        c.tick(held(true));
        assert_eq!(
            c.drag_session(),
            Some(DragSession {
                pointer_offset: (50, 60)
            })
        );

        c.window_mut().cursor = Some((400, 300));
        c.tick(held(true));
        assert_eq!(c.window().rect.left, 350);
        assert_eq!(c.window().rect.top, 240);

        c.tick(TickInput {
            on_opaque_pixel: true,
            primary_button_down: false,
        });
        assert!(!c.is_dragging());
    }

    #[test]
    fn press_on_transparent_pixel_does_not_drag() {
        let mut c = overlay_controller();
        c.window_mut().cursor = Some((150, 160));
        c.on_primary_button_pressed();
        c.tick(held(false));
        c.tick(held(false));
        c.tick(held(true));
        assert!(!c.is_dragging());
    }

    #[test]
    fn drag_requires_hidden_frame_and_permission() {
        let mut c = overlay_controller();
        c.window_mut().cursor = Some((150, 160));
        c.apply(&Command::WindowDraggable(false));
        c.on_primary_button_pressed();
        c.tick(held(true));
        c.tick(held(true));
        assert!(!c.is_dragging());

        c.apply(&Command::WindowDraggable(true));
        c.apply(&Command::FrameVisibility(true));
        c.on_primary_button_pressed();
        c.tick(held(true));
        c.tick(held(true));
        assert!(!c.is_dragging());
    }

    #[test]
    fn disabling_drag_ends_session() {
        let mut c = overlay_controller();
        c.window_mut().cursor = Some((150, 160));
        c.on_primary_button_pressed();
        c.tick(held(true));
        c.tick(held(true));
        assert!(c.is_dragging());

        c.apply(&Command::WindowDraggable(false));
        assert!(!c.is_dragging());
    }

    #[test]
    fn alpha_fades_while_on_character() {
        let mut c = overlay_controller();
        c.apply(&Command::SetAlphaOnTransparent(100));
        for _ in 0..64 {
            c.tick(TickInput {
                on_opaque_pixel: true,
                ..Default::default()
            });
        }
        assert_eq!(c.state().current_alpha, 100);
        assert_eq!(c.window().alpha, 100);

        c.apply(&Command::FrameVisibility(true));
        assert_eq!(c.state().current_alpha, 255);
        assert_eq!(c.window().alpha, 255);
        c.tick(TickInput {
            on_opaque_pixel: true,
            ..Default::default()
        });
        assert_eq!(c.state().current_alpha, 255);
    }

    #[test]
    fn invalid_level_is_ignored() {
        let mut c = overlay_controller();
        c.apply(&Command::SetTransparencyLevel(TransparencyLevel::Always as i32));
        c.apply(&Command::SetTransparencyLevel(9));
        assert_eq!(c.state().target_transparency_level, TransparencyLevel::Always);
    }

    #[test]
    fn alpha_payload_is_clamped() {
        let mut c = overlay_controller();
        c.apply(&Command::SetAlphaOnTransparent(300));
        assert_eq!(c.state().alpha_on_transparent, 255);
        c.apply(&Command::SetAlphaOnTransparent(-5));
        assert_eq!(c.state().alpha_on_transparent, 0);
    }

    #[test]
    fn topmost_only_applies_without_frame() {
        let window = SimulatedWindow::new(ScreenRect::new(0, 0, 400, 400));
        let mut c = WindowStyleController::new(window, StyleSettings::default());
        c.apply(&Command::TopMost(true));
        assert!(!c.window().topmost);
        c.apply(&Command::FrameVisibility(false));
        assert!(c.window().topmost);
        c.apply(&Command::TopMost(false));
        assert!(!c.window().topmost);
    }

    #[test]
    fn move_and_reset_size() {
        let mut c = overlay_controller();
        c.apply(&Command::MoveWindow { x: -20, y: 30 });
        c.apply(&Command::ResetWindowSize);
        assert_eq!(c.window().rect, ScreenRect::new(-20, 30, 780, 630));
    }

    #[test]
    fn chroma_key_toggles_transparency_once() {
        let window = SimulatedWindow::new(ScreenRect::new(0, 0, 400, 400));
        let mut c = WindowStyleController::new(window, StyleSettings::default());
        let key = |a| Command::ChromaKey {
            a,
            r: 0.0,
            g: 1.0,
            b: 0.0,
        };
        c.apply(&key(0.0));
        c.apply(&key(0.0));
        assert!(c.state().is_transparent);
        assert_eq!(
            c.window()
                .count_writes(|w| matches!(w, WindowWrite::BackgroundTransparent(true))),
            1
        );
        c.apply(&key(1.0));
        assert!(!c.state().is_transparent);
    }

    #[test]
    fn logical_state_survives_no_op_adapter() {
        let mut c = WindowStyleController::new(NullWindow, StyleSettings::default());
        c.enter_overlay_mode();
        c.apply(&Command::SetTransparencyLevel(TransparencyLevel::Always as i32));
        c.on_primary_button_pressed();
        for _ in 0..64 {
            c.tick(held(true));
        }
        assert!(c.state().is_transparent);
        assert!(c.state().is_frame_hidden);
        assert_eq!(c.state().current_alpha, 0x80);
        assert!(!c.is_dragging());
    }
}
