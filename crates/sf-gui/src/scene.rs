//! Painting the terrain, the kernel's draw list, and the HUD.
//!
//! Every sprite is a flat shape. Sizes are in world pixels, so the camera set
//! up by [`Viewport`](crate::theme::Viewport) does all the scaling.

use macroquad::prelude::*;
use sf_core::Terrain;
use sf_simulation::particle::ParticleSprite;
use sf_simulation::render::{FLASH_SPRITE_SIZE, palette};
use sf_simulation::{DrawCommand, Simulation, Sprite, draw_list};

use crate::theme::{self, HUD_SHADOW, HUD_TEXT, MINION_SIZE, SHADOW_RADII, TOWER_SIZE};

/// Checkerboard terrain.
pub fn draw_tiles(sim: &Simulation) {
    let tiles = sim.world().tiles();
    let size = tiles.tile_size();
    for (x, y, terrain) in tiles.cells() {
        let light = (x + y) % 2 == 0;
        // Traps are hidden, so their trigger cells look like ground.
        let rgba = match (terrain, light) {
            (Terrain::Ground | Terrain::TrapTrigger, true) => palette::GROUND_LIGHT,
            (Terrain::Ground | Terrain::TrapTrigger, false) => palette::GROUND_DARK,
            (Terrain::Placeable, true) => palette::PLACEABLE_LIGHT,
            (Terrain::Placeable, false) => palette::PLACEABLE_DARK,
            (Terrain::Void, true) => palette::BACKGROUND_LIGHT,
            (Terrain::Void, false) => palette::BACKGROUND_DARK,
        };
        draw_rectangle(x as f32 * size, y as f32 * size, size, size, theme::color(rgba));
    }
}

/// Every live entity, shadows first, back to front.
pub fn draw_entities(sim: &Simulation) {
    for command in draw_list(sim.world()) {
        draw_command(&command);
    }
}

fn draw_command(command: &DrawCommand) {
    let at = command.screen_position();
    let (x, y) = (at.x, at.y);
    let scale = command.scale;
    match command.sprite {
        Sprite::Shadow => {
            draw_ellipse(
                x,
                y,
                SHADOW_RADII.0 * scale.x,
                SHADOW_RADII.1 * scale.y,
                0.0,
                theme::color(command.tint),
            );
        }
        Sprite::Minion(_) => {
            let (w, h) = (MINION_SIZE.0 * scale.x, MINION_SIZE.1 * scale.y);
            let color = theme::tinted(WHITE, command.tint);
            let left = x - w * command.anchor.x;
            let top = y - h * command.anchor.y;
            draw_ellipse(left + w / 2.0, top + h / 2.0, w / 2.0, h / 2.0, 0.0, color);
            // Eye on the facing side.
            let eye = if command.flip { left + w * 0.3 } else { left + w * 0.7 };
            draw_circle(eye, top + h * 0.35, 2.5, BLACK);
        }
        Sprite::Tower(_) => {
            let (w, h) = (TOWER_SIZE.0 * scale.x, TOWER_SIZE.1 * scale.y);
            let left = x - w * command.anchor.x;
            let top = y - h * command.anchor.y;
            draw_rectangle(left, top, w, h, theme::tinted(LIGHTGRAY, command.tint));
            draw_rectangle_lines(left, top, w, h, 3.0, DARKGRAY);
            if let Some(health) = command.label {
                let text = health.to_string();
                let dims = measure_text(&text, None, 28, 1.0);
                draw_text(&text, x - dims.width / 2.0, top - 6.0, 28.0, WHITE);
            }
        }
        Sprite::Arrow => shape(command, 4.0, 24.0, BROWN),
        Sprite::Shell => {
            draw_circle(x, y, 8.0 * scale.x, DARKGRAY);
        }
        Sprite::Trap => shape(command, 24.0, 10.0, Color::new(0.3, 0.3, 0.3, 0.5)),
        Sprite::Particle(ParticleSprite::Dust) => {
            draw_circle(x, y, 10.0 * scale.x, theme::tinted(BEIGE, command.tint));
        }
        Sprite::Particle(ParticleSprite::Flash) => {
            draw_circle(
                x,
                y,
                FLASH_SPRITE_SIZE / 2.0 * scale.x,
                theme::tinted(WHITE, command.tint),
            );
        }
        Sprite::Particle(ParticleSprite::Brick) => shape(command, 10.0, 6.0, BROWN),
    }
}

/// A rotated rectangle pivoting on the command's anchor.
fn shape(command: &DrawCommand, w: f32, h: f32, base: Color) {
    let at = command.screen_position();
    draw_rectangle_ex(
        at.x,
        at.y,
        w * command.scale.x,
        h * command.scale.y,
        DrawRectangleParams {
            offset: vec2(command.anchor.x, command.anchor.y),
            rotation: command.rotation,
            color: theme::tinted(base, command.tint),
        },
    );
}

/// Inventory, level name, key hints, and the transition fade.
pub fn draw_hud(sim: &Simulation, world_w: f32, world_h: f32) {
    let level = sim.level();
    let title = if level.description.is_empty() {
        format!("Level {}", sim.current_level() + 1)
    } else {
        format!("Level {}: {}", sim.current_level() + 1, level.description)
    };
    shadowed_text(&title, 16.0, 36.0, 32.0);
    shadowed_text(
        &format!("Minions: {}", sim.world().inventory()),
        16.0,
        72.0,
        32.0,
    );
    shadowed_text(
        "R reload   N next   M previous   right click: defender",
        16.0,
        world_h - 16.0,
        22.0,
    );

    if let Some(transition) = sim.transition() {
        let fade = transition.progress().clamp(0.0, 1.0);
        draw_rectangle(0.0, 0.0, world_w, world_h, Color::new(0.0, 0.0, 0.0, fade));
    }
}

fn shadowed_text(text: &str, x: f32, y: f32, size: f32) {
    draw_text(text, x + 2.0, y + 2.0, size, HUD_SHADOW);
    draw_text(text, x, y, size, HUD_TEXT);
}
