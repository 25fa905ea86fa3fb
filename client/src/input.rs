//! Keyboard sampling for the controlled paddle

use macroquad::prelude::{is_key_down, KeyCode};

/// Anything that can tell the predictor which way the paddle should move.
pub trait InputSource {
    /// -1.0 for up, 1.0 for down, 0.0 when idle or both are held.
    fn axis(&mut self) -> f32;
}

/// Up/down key pair for one player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyBindings {
    pub up: KeyCode,
    pub down: KeyCode,
}

impl KeyBindings {
    /// W/S for player 1, arrow keys for everyone else.
    pub fn for_player(player_id: u32) -> Self {
        if player_id == 1 {
            Self {
                up: KeyCode::W,
                down: KeyCode::S,
            }
        } else {
            Self {
                up: KeyCode::Up,
                down: KeyCode::Down,
            }
        }
    }
}

pub fn axis_from_keys(up: bool, down: bool) -> f32 {
    let mut axis = 0.0;
    if up {
        axis -= 1.0;
    }
    if down {
        axis += 1.0;
    }
    axis
}

/// Polls the macroquad keyboard state once per call.
pub struct KeyboardInput {
    bindings: KeyBindings,
}

impl KeyboardInput {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> KeyBindings {
        self.bindings
    }
}

impl InputSource for KeyboardInput {
    fn axis(&mut self) -> f32 {
        axis_from_keys(is_key_down(self.bindings.up), is_key_down(self.bindings.down))
    }
}
