// SPDX-License-Identifier: CEPL-1.0
use bitflags::bitflags;
use glam::{Quat, Vec2, Vec3};

use crate::camera::CameraState;

bitflags! {
    /// Movement keys held during a frame.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Movement: u8 {
        const FORWARD = 1 << 0;
        const BACK    = 1 << 1;
        const LEFT    = 1 << 2;
        const RIGHT   = 1 << 3;
        const UP      = 1 << 4;
        const DOWN    = 1 << 5;
        const FAST    = 1 << 6;
    }
}

/// Free-fly navigation: translate eye and center together, rotate the look
/// direction about the eye.
#[derive(Clone, Copy, Debug)]
pub struct FlyController {
    /// World units per second.
    pub speed: f32,
    pub fast_multiplier: f32,
    /// Radians per pixel of mouse motion.
    pub look_sensitivity: f32,
}

impl Default for FlyController {
    fn default() -> Self {
        Self {
            speed: 3.0,
            fast_multiplier: 4.0,
            look_sensitivity: 0.003,
        }
    }
}

// Keep pitch short of the poles so look_at never sees a dir parallel to up.
const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

impl FlyController {
    pub fn update(&self, cam: &mut CameraState, movement: Movement, mouse_delta: Vec2, dt: f32) {
        let up = cam.up.try_normalize().unwrap_or(Vec3::Z);
        let dist = (cam.center - cam.eye).length().max(1e-3);
        let mut dir = cam.look_dir();

        if mouse_delta != Vec2::ZERO {
            dir = Quat::from_axis_angle(up, -mouse_delta.x * self.look_sensitivity) * dir;

            let current = dir.dot(up).clamp(-1.0, 1.0).asin();
            let target = (current - mouse_delta.y * self.look_sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
            if let Some(right) = dir.cross(up).try_normalize() {
                dir = (Quat::from_axis_angle(right, target - current) * dir).normalize();
            }
        }

        let right = dir.cross(up).try_normalize().unwrap_or(Vec3::X);
        let mut step = Vec3::ZERO;
        if movement.contains(Movement::FORWARD) {
            step += dir;
        }
        if movement.contains(Movement::BACK) {
            step -= dir;
        }
        if movement.contains(Movement::RIGHT) {
            step += right;
        }
        if movement.contains(Movement::LEFT) {
            step -= right;
        }
        if movement.contains(Movement::UP) {
            step += up;
        }
        if movement.contains(Movement::DOWN) {
            step -= up;
        }

        let mut speed = self.speed;
        if movement.contains(Movement::FAST) {
            speed *= self.fast_multiplier;
        }

        cam.eye += step.normalize_or_zero() * speed * dt;
        cam.center = cam.eye + dir * dist;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cam() -> CameraState {
        CameraState {
            eye: Vec3::new(0.0, -5.0, 0.0),
            center: Vec3::ZERO,
            up: Vec3::Z,
            ..Default::default()
        }
    }

    #[test]
    fn idle_input_leaves_camera_alone() {
        let mut c = cam();
        FlyController::default().update(&mut c, Movement::empty(), Vec2::ZERO, 0.016);
        assert_eq!(c, cam());
    }

    #[test]
    fn forward_moves_eye_and_center_together() {
        let mut c = cam();
        let fly = FlyController {
            speed: 2.0,
            ..Default::default()
        };
        fly.update(&mut c, Movement::FORWARD, Vec2::ZERO, 0.5);
        assert!((c.eye - Vec3::new(0.0, -4.0, 0.0)).length() < 1e-5);
        assert!((c.center - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut c = cam();
        FlyController::default().update(
            &mut c,
            Movement::LEFT | Movement::RIGHT | Movement::UP | Movement::DOWN,
            Vec2::ZERO,
            1.0,
        );
        assert!((c.eye - cam().eye).length() < 1e-5);
    }

    #[test]
    fn fast_multiplies_speed() {
        let mut c = cam();
        let fly = FlyController {
            speed: 1.0,
            fast_multiplier: 3.0,
            ..Default::default()
        };
        fly.update(&mut c, Movement::UP | Movement::FAST, Vec2::ZERO, 1.0);
        assert!((c.eye.z - 3.0).abs() < 1e-5);
    }

    #[test]
    fn mouse_look_keeps_distance_and_clamps_pitch() {
        let mut c = cam();
        let fly = FlyController::default();
        fly.update(&mut c, Movement::empty(), Vec2::new(120.0, -10_000.0), 0.016);

        assert!(((c.center - c.eye).length() - 5.0).abs() < 1e-3);
        let pitch = c.look_dir().dot(Vec3::Z).asin();
        assert!(pitch <= MAX_PITCH + 1e-4);
        assert!(pitch > MAX_PITCH - 1e-2);
    }

    #[test]
    fn yaw_turns_left_for_negative_x() {
        let mut c = cam();
        let fly = FlyController {
            look_sensitivity: std::f32::consts::FRAC_PI_2 / 100.0,
            ..Default::default()
        };
        // Looking +Y; a quarter turn to the left faces -X.
        fly.update(&mut c, Movement::empty(), Vec2::new(-100.0, 0.0), 0.016);
        assert!((c.look_dir() - Vec3::NEG_X).length() < 1e-3, "{:?}", c.look_dir());
    }
}
