//! Decides whether the pointer rests on visible character pixels.
//!
//! Sampling happens once per completed frame. A cheap ray test against the
//! bounding boxes of the tracked meshes rules out most positions before any
//! pixel is read back.

use crate::error::HitTestError;

/// Client-area rectangle the frame is rendered into, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
}

/// World-space bounding box of one rendered element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Slab test. Only hits in front of the ray origin count.
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            if dir.abs() < f32::EPSILON {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return false;
            }
        }
        t_far >= 0.0
    }
}

/// What the hit tester needs from the renderer for one finished frame.
pub trait RenderedFrame {
    fn viewport(&self) -> Viewport;
    /// Camera ray through a viewport pixel.
    fn ray_through(&self, x: f32, y: f32) -> Ray;
    /// Alpha of one pixel, normalised to 0.0-1.0.
    fn read_alpha(&self, x: i32, y: i32) -> Result<f32, HitTestError>;
}

/// RGBA8 frame in memory, viewed through an orthographic camera looking
/// down +Z with one world unit per pixel.
#[derive(Debug, Clone)]
pub struct CpuFrame {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl CpuFrame {
    /// A fully transparent frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.rgba[idx..idx + 4].copy_from_slice(&rgba);
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, rgba: [u8; 4]) {
        for py in y..y.saturating_add(height) {
            for px in x..x.saturating_add(width) {
                self.set_pixel(px, py, rgba);
            }
        }
    }
}

impl RenderedFrame for CpuFrame {
    fn viewport(&self) -> Viewport {
        Viewport {
            x: 0.0,
            y: 0.0,
            width: self.width as f32,
            height: self.height as f32,
        }
    }

    fn ray_through(&self, x: f32, y: f32) -> Ray {
        Ray {
            origin: [x, y, -1.0],
            direction: [0.0, 0.0, 1.0],
        }
    }

    fn read_alpha(&self, x: i32, y: i32) -> Result<f32, HitTestError> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return Err(HitTestError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4 + 3;
        Ok(f32::from(self.rgba[idx]) / 255.0)
    }
}

pub struct PixelHitTester {
    opaque_threshold: f32,
    tracked_bounds: Vec<Aabb>,
    last_pointer: Option<(f32, f32)>,
    on_opaque_pixel: bool,
}

impl PixelHitTester {
    pub fn new(opaque_threshold: f32) -> Self {
        Self {
            opaque_threshold,
            tracked_bounds: Vec::new(),
            last_pointer: None,
            on_opaque_pixel: false,
        }
    }

    /// Replace the boxes used by the coarse test (e.g. after a model load).
    pub fn set_tracked_bounds(&mut self, bounds: Vec<Aabb>) {
        self.tracked_bounds = bounds;
        self.last_pointer = None;
    }

    pub fn clear_tracked_bounds(&mut self) {
        self.set_tracked_bounds(Vec::new());
    }

    /// Result of the most recent sample.
    pub fn is_on_opaque_pixel(&self) -> bool {
        self.on_opaque_pixel
    }

    /// Sample the frame under `pointer` (viewport pixel coordinates) and
    /// return whether it lies on an opaque pixel.
    pub fn sample(&mut self, pointer: (f32, f32), frame: &impl RenderedFrame) -> bool {
        if let Some(prev) = self.last_pointer {
            let dx = pointer.0 - prev.0;
            let dy = pointer.1 - prev.1;
            if dx * dx + dy * dy < f32::EPSILON {
                return self.on_opaque_pixel;
            }
        }
        self.last_pointer = Some(pointer);

        let (x, y) = pointer;
        if !frame.viewport().contains(x, y) || !self.might_hit_character(frame, x, y) {
            self.on_opaque_pixel = false;
            return false;
        }

        self.on_opaque_pixel = match frame.read_alpha(x.floor() as i32, y.floor() as i32) {
            Ok(alpha) => alpha >= self.opaque_threshold,
            Err(e) => {
                tracing::debug!("pixel read failed: {e}");
                false
            }
        };
        self.on_opaque_pixel
    }

    /// Force "not opaque", e.g. when the pointer left the window.
    pub fn reset(&mut self) {
        self.last_pointer = None;
        self.on_opaque_pixel = false;
    }

    fn might_hit_character(&self, frame: &impl RenderedFrame, x: f32, y: f32) -> bool {
        let ray = frame.ray_through(x, y);
        self.tracked_bounds.iter().any(|b| b.intersects_ray(&ray))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_square() -> CpuFrame {
        let mut frame = CpuFrame::transparent(100, 100);
        frame.fill_rect(40, 40, 20, 20, [255, 255, 255, 255]);
        // Faint shadow below the threshold.
        frame.fill_rect(40, 60, 20, 5, [0, 0, 0, 10]);
        frame
    }

    fn covering_box() -> Aabb {
        Aabb::new([30.0, 30.0, 0.0], [70.0, 70.0, 1.0])
    }

    #[test]
    fn opaque_pixel_inside_tracked_bounds_hits() {
        let frame = frame_with_square();
        let mut tester = PixelHitTester::new(0.1);
        tester.set_tracked_bounds(vec![covering_box()]);

        assert!(tester.sample((50.0, 50.0), &frame));
        assert!(!tester.sample((35.0, 35.0), &frame));
        assert!(!tester.sample((45.0, 62.0), &frame));
    }

    #[test]
    fn without_tracked_bounds_nothing_is_opaque() {
        let frame = frame_with_square();
        let mut tester = PixelHitTester::new(0.1);
        assert!(!tester.sample((50.0, 50.0), &frame));
    }

    #[test]
    fn pointer_outside_viewport_is_not_opaque() {
        let frame = frame_with_square();
        let mut tester = PixelHitTester::new(0.1);
        tester.set_tracked_bounds(vec![Aabb::new([-500.0; 3], [500.0; 3])]);
        assert!(!tester.sample((-3.0, 50.0), &frame));
        assert!(!tester.sample((50.0, 100.0), &frame));
    }

    #[test]
    fn unmoved_pointer_reuses_previous_result() {
        let mut frame = frame_with_square();
        let mut tester = PixelHitTester::new(0.1);
        tester.set_tracked_bounds(vec![covering_box()]);
        assert!(tester.sample((50.0, 50.0), &frame));

        frame.set_pixel(50, 50, [0, 0, 0, 0]);
        assert!(tester.sample((50.0, 50.0), &frame));
        assert!(!tester.sample((50.5, 50.5), &frame));
    }

    struct BrokenFrame;

    impl RenderedFrame for BrokenFrame {
        fn viewport(&self) -> Viewport {
            Viewport {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
            }
        }

        fn ray_through(&self, x: f32, y: f32) -> Ray {
            Ray {
                origin: [x, y, -1.0],
                direction: [0.0, 0.0, 1.0],
            }
        }

        fn read_alpha(&self, x: i32, y: i32) -> Result<f32, HitTestError> {
            Err(HitTestError::OutOfBounds {
                x,
                y,
                width: 0,
                height: 0,
            })
        }
    }

    #[test]
    fn read_failure_counts_as_not_opaque() {
        let mut tester = PixelHitTester::new(0.1);
        tester.set_tracked_bounds(vec![Aabb::new([0.0; 3], [10.0; 3])]);
        assert!(!tester.sample((5.0, 5.0), &BrokenFrame));
    }

    #[test]
    fn ray_box_intersection() {
        let b = Aabb::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let hit = Ray {
            origin: [0.5, 0.5, -5.0],
            direction: [0.0, 0.0, 1.0],
        };
        let miss = Ray {
            origin: [2.0, 0.5, -5.0],
            direction: [0.0, 0.0, 1.0],
        };
        let behind = Ray {
            origin: [0.5, 0.5, 5.0],
            direction: [0.0, 0.0, 1.0],
        };
        let diagonal = Ray {
            origin: [-1.0, -1.0, -1.0],
            direction: [1.0, 1.0, 1.0],
        };
        assert!(b.intersects_ray(&hit));
        assert!(!b.intersects_ray(&miss));
        assert!(!b.intersects_ray(&behind));
        assert!(b.intersects_ray(&diagonal));
    }
}
