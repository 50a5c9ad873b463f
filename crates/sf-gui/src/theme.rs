//! Colours, sprite sizes, and the camera that fits the map to the window.

use macroquad::prelude::*;
use sf_core::Rgba;

/// Colour used for letterbox bars around the map.
pub const LETTERBOX: Color = Color::new(0.0, 0.0, 0.0, 1.0);
/// HUD text colour.
pub const HUD_TEXT: Color = Color::new(1.0, 0.945, 0.910, 1.0);
/// HUD shadow colour.
pub const HUD_SHADOW: Color = Color::new(0.0, 0.0, 0.0, 0.6);

/// Minion body size in world pixels.
pub const MINION_SIZE: (f32, f32) = (20.0, 22.0);
/// Tower footprint in world pixels.
pub const TOWER_SIZE: (f32, f32) = (44.0, 70.0);
/// Shadow ellipse radii at scale 1.
pub const SHADOW_RADII: (f32, f32) = (30.0, 12.0);

/// Convert a kernel colour.
pub fn color(rgba: Rgba) -> Color {
    let [r, g, b, a] = rgba.to_f32();
    Color::new(r, g, b, a)
}

/// Channel-wise product of two colours.
pub fn tinted(base: Color, tint: Rgba) -> Color {
    let t = color(tint);
    Color::new(base.r * t.r, base.g * t.g, base.b * t.b, base.a * t.a)
}

/// Scale and offset that fit a `world_w` by `world_h` map into the window.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    world_w: f32,
    world_h: f32,
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl Viewport {
    /// Fit the map to the current window size, letterboxed.
    pub fn fit(world_w: f32, world_h: f32) -> Self {
        let world_w = world_w.max(1.0);
        let world_h = world_h.max(1.0);
        let scale = (screen_width() / world_w).min(screen_height() / world_h);
        Self {
            world_w,
            world_h,
            scale,
            offset_x: (screen_width() - world_w * scale) / 2.0,
            offset_y: (screen_height() - world_h * scale) / 2.0,
        }
    }

    /// Point the camera at the map.
    pub fn apply(&self) {
        set_camera(&Camera2D {
            zoom: vec2(2.0 / self.world_w, 2.0 / self.world_h),
            target: vec2(self.world_w / 2.0, self.world_h / 2.0),
            viewport: Some((
                self.offset_x as i32,
                self.offset_y as i32,
                (self.world_w * self.scale) as i32,
                (self.world_h * self.scale) as i32,
            )),
            ..Default::default()
        });
    }

    /// Map width and height in world pixels.
    pub fn world_size(&self) -> (f32, f32) {
        (self.world_w, self.world_h)
    }

    /// Convert a window position to world pixels.
    pub fn to_world(&self, (x, y): (f32, f32)) -> glam::Vec2 {
        glam::Vec2::new(
            (x - self.offset_x) / self.scale,
            (y - self.offset_y) / self.scale,
        )
    }
}
