/// Policy for when whole-window alpha blending applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(i32)]
pub enum TransparencyLevel {
    None = 0,
    WhenDragDisabledAndOnCharacter = 1,
    #[default]
    WhenOnCharacter = 2,
    WhenDragDisabled = 3,
    Always = 4,
}

impl TryFrom<i32> for TransparencyLevel {
    type Error = i32;

    fn try_from(ordinal: i32) -> Result<Self, Self::Error> {
        match ordinal {
            0 => Ok(Self::None),
            1 => Ok(Self::WhenDragDisabledAndOnCharacter),
            2 => Ok(Self::WhenOnCharacter),
            3 => Ok(Self::WhenDragDisabled),
            4 => Ok(Self::Always),
            other => Err(other),
        }
    }
}

impl TransparencyLevel {
    pub const ALL: [TransparencyLevel; 5] = [
        Self::None,
        Self::WhenDragDisabledAndOnCharacter,
        Self::WhenOnCharacter,
        Self::WhenDragDisabled,
        Self::Always,
    ];

    /// Alpha this level asks for, before the frame-visible override.
    pub fn alpha(self, draggable: bool, on_opaque_pixel: bool, alpha_on_transparent: u8) -> u8 {
        let transparent = match self {
            Self::None => false,
            Self::WhenDragDisabledAndOnCharacter => !draggable && on_opaque_pixel,
            Self::WhenOnCharacter => on_opaque_pixel,
            Self::WhenDragDisabled => !draggable,
            Self::Always => true,
        };
        if transparent { alpha_on_transparent } else { 0xFF }
    }
}

/// Logical style of the window; the controller's single source of truth.
///
/// `is_click_through` is only ever true while both `is_transparent` and
/// `is_frame_hidden` are, and a window with a visible frame stays at
/// `current_alpha == 255`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowRuntimeState {
    pub is_transparent: bool,
    pub is_frame_hidden: bool,
    pub is_draggable_when_frame_hidden: bool,
    pub prefer_ignore_mouse_input: bool,
    pub is_topmost: bool,
    pub is_click_through: bool,
    pub current_alpha: u8,
    pub target_transparency_level: TransparencyLevel,
    pub alpha_on_transparent: u8,
}

impl Default for WindowRuntimeState {
    fn default() -> Self {
        Self {
            is_transparent: false,
            is_frame_hidden: false,
            is_draggable_when_frame_hidden: true,
            prefer_ignore_mouse_input: false,
            // Topmost is on by default; it only takes effect once the frame hides.
            is_topmost: true,
            is_click_through: false,
            current_alpha: 0xFF,
            target_transparency_level: TransparencyLevel::WhenOnCharacter,
            alpha_on_transparent: 0x80,
        }
    }
}

impl WindowRuntimeState {
    /// Whether pointer events should fall through the window this tick.
    pub fn derive_click_through(&self, on_opaque_pixel: bool) -> bool {
        if !self.is_transparent || !self.is_frame_hidden {
            // Visible background or rectangular window: always capture clicks.
            return false;
        }
        if !self.is_draggable_when_frame_hidden && self.prefer_ignore_mouse_input {
            return true;
        }
        !on_opaque_pixel
    }

    /// Whole-window alpha the window should converge to.
    pub fn target_alpha(&self, on_opaque_pixel: bool) -> u8 {
        if !self.is_frame_hidden {
            return 0xFF;
        }
        self.target_transparency_level.alpha(
            self.is_draggable_when_frame_hidden,
            on_opaque_pixel,
            self.alpha_on_transparent,
        )
    }

    /// Whether the native topmost flag should be set.
    pub fn effective_topmost(&self) -> bool {
        self.is_topmost && self.is_frame_hidden
    }
}

/// One smoothing step from `current` toward `target`.
///
/// Linear interpolation by `factor`; when integer truncation would leave the
/// value unchanged it moves one step instead, so the target is always reached.
pub fn step_alpha(current: u8, target: u8, factor: f32) -> u8 {
    if current == target {
        return current;
    }
    let factor = factor.clamp(0.0, 1.0);
    let lerped = f32::from(current) + (f32::from(target) - f32::from(current)) * factor;
    let next = lerped.clamp(0.0, 255.0) as u8;
    if next != current {
        return next;
    }
    if target > current { current + 1 } else { current - 1 }
}

/// Transient state of an in-progress frameless drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragSession {
    /// Pointer position minus window origin at drag start.
    pub pointer_offset: (i32, i32),
}

impl DragSession {
    pub fn window_origin_for(&self, pointer: (i32, i32)) -> (i32, i32) {
        (
            pointer.0 - self.pointer_offset.0,
            pointer.1 - self.pointer_offset.1,
        )
    }
}
