// SPDX-License-Identifier: CEPL-1.0
use std::collections::HashSet;

use lumen_math::{glam::Vec2, Movement};
use winit::{
    event::{ElementState, MouseButton},
    keyboard::KeyCode,
};

/// Keyboard and mouse state accumulated between two frames.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
    pressed: Vec<KeyCode>,
    looking: bool,
    mouse_delta: Vec2,
}

impl InputState {
    pub fn key(&mut self, code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // OS key repeat arrives as more presses; only the first counts.
                if self.held.insert(code) {
                    self.pressed.push(code);
                }
            }
            ElementState::Released => {
                self.held.remove(&code);
            }
        }
    }

    /// Mouse look is active while the right button is held.
    pub fn mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Right {
            self.looking = state == ElementState::Pressed;
        }
    }

    pub fn mouse_motion(&mut self, dx: f64, dy: f64) {
        if self.looking {
            self.mouse_delta += Vec2::new(dx as f32, dy as f32);
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    pub fn is_looking(&self) -> bool {
        self.looking
    }

    /// WASD, Space/Ctrl for up/down, Shift to go fast.
    pub fn movement(&self) -> Movement {
        let bindings = [
            (KeyCode::KeyW, Movement::FORWARD),
            (KeyCode::KeyS, Movement::BACK),
            (KeyCode::KeyA, Movement::LEFT),
            (KeyCode::KeyD, Movement::RIGHT),
            (KeyCode::Space, Movement::UP),
            (KeyCode::ControlLeft, Movement::DOWN),
            (KeyCode::ShiftLeft, Movement::FAST),
            (KeyCode::ShiftRight, Movement::FAST),
        ];
        bindings
            .into_iter()
            .filter(|(code, _)| self.held.contains(code))
            .fold(Movement::empty(), |acc, (_, m)| acc | m)
    }

    /// Keys that went down since the last [`end_frame`](Self::end_frame).
    pub fn just_pressed(&self) -> &[KeyCode] {
        &self.pressed
    }

    pub fn take_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }

    /// Forget everything; used when focus is lost so keys do not stick.
    pub fn clear(&mut self) {
        self.held.clear();
        self.pressed.clear();
        self.looking = false;
        self.mouse_delta = Vec2::ZERO;
    }
}
