//! Pointer and keyboard input, translated into simulation calls.

use macroquad::prelude::*;
use sf_simulation::{LevelRequest, Simulation};

use crate::theme::Viewport;

/// Debug keys for level changes.
const LEVEL_KEYS: [(KeyCode, LevelRequest); 3] = [
    (KeyCode::R, LevelRequest::Reload),
    (KeyCode::N, LevelRequest::Advance),
    (KeyCode::M, LevelRequest::Previous),
];

/// Forward this frame's pointer state.
///
/// Left press places an attacker, holding drags a trail of them, release ends
/// the trail. Right click drops a debug defender.
pub fn handle_pointer(sim: &mut Simulation, viewport: &Viewport) {
    let position = viewport.to_world(mouse_position());

    if is_mouse_button_pressed(MouseButton::Left) {
        sim.place_attacker(position);
    } else if is_mouse_button_down(MouseButton::Left) {
        sim.drag_to(position);
    }
    if is_mouse_button_released(MouseButton::Left) {
        sim.release_pointer();
    }

    if is_mouse_button_pressed(MouseButton::Right) {
        sim.spawn_debug_defender(position);
    }
}

/// The level change asked for by a key pressed this frame, if any.
pub fn level_key() -> Option<LevelRequest> {
    LEVEL_KEYS
        .iter()
        .find(|(key, _)| is_key_pressed(*key))
        .map(|(_, request)| *request)
}

/// Check if the Escape key was pressed this frame.
pub fn quit_pressed() -> bool {
    is_key_pressed(KeyCode::Escape)
}
