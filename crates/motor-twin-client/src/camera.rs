//! Orbit camera around the motors.
//!
//! Left-drag orbits around the target, the scroll wheel zooms. Input over the
//! control panel is left to egui.

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::input::egui_wants_any_pointer_input;

/// Closest the camera may get to the target.
pub const MIN_RADIUS: f32 = 1.0;
/// Farthest the camera may get from the target.
pub const MAX_RADIUS: f32 = 50.0;

/// Pitch limit, just short of straight up or down.
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Plugin for orbit camera controls.
pub struct OrbitCameraPlugin;

impl Plugin for OrbitCameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitSettings>().add_systems(
            Update,
            (orbit_with_mouse, zoom_with_scroll, apply_orbit)
                .chain()
                .run_if(not(egui_wants_any_pointer_input)),
        );
    }
}

/// Settings for orbit input.
#[derive(Resource)]
pub struct OrbitSettings {
    /// Radians of rotation per pixel dragged.
    pub drag_sensitivity: f32,
    /// Zoom factor per scroll line.
    pub zoom_step: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.005,
            zoom_step: 1.1,
        }
    }
}

/// Camera that orbits a fixed target.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    /// Rotation about the vertical axis, in radians.
    pub yaw: f32,
    /// Elevation above the horizontal plane, in radians.
    pub pitch: f32,
}

impl OrbitCamera {
    /// Orbit around the origin starting from `eye`.
    pub fn looking_at_origin_from(eye: Vec3) -> Self {
        let radius = eye.length().clamp(MIN_RADIUS, MAX_RADIUS);
        let horizontal = Vec2::new(eye.x, eye.z).length();
        Self {
            target: Vec3::ZERO,
            radius,
            yaw: eye.x.atan2(eye.z),
            pitch: eye.y.atan2(horizontal),
        }
    }

    /// World-space camera position.
    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + self.radius * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    /// Rotate by a drag delta in radians.
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.yaw = (self.yaw + yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Scale the radius, staying within bounds.
    pub fn zoom(&mut self, factor: f32) {
        self.radius = (self.radius * factor).clamp(MIN_RADIUS, MAX_RADIUS);
    }
}

/// Orbit while the left mouse button is held.
#[allow(clippy::needless_pass_by_value)]
fn orbit_with_mouse(
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: MessageReader<MouseMotion>,
    settings: Res<OrbitSettings>,
    mut cameras: Query<&mut OrbitCamera>,
) {
    let delta: Vec2 = motion.read().map(|event| event.delta).sum();
    if !mouse.pressed(MouseButton::Left) || delta == Vec2::ZERO {
        return;
    }

    for mut camera in &mut cameras {
        camera.rotate(
            -delta.x * settings.drag_sensitivity,
            delta.y * settings.drag_sensitivity,
        );
    }
}

/// Zoom with the scroll wheel.
#[allow(clippy::needless_pass_by_value)]
fn zoom_with_scroll(
    mut scroll: MessageReader<MouseWheel>,
    settings: Res<OrbitSettings>,
    mut cameras: Query<&mut OrbitCamera>,
) {
    for event in scroll.read() {
        // Normalize scroll value: web reports pixels, native reports lines.
        let lines = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / 120.0,
        };
        if lines == 0.0 {
            continue;
        }
        let factor = settings.zoom_step.powf(-lines);
        for mut camera in &mut cameras {
            camera.zoom(factor);
        }
    }
}

/// Move the camera transform to match its orbit.
fn apply_orbit(mut cameras: Query<(&OrbitCamera, &mut Transform), Changed<OrbitCamera>>) {
    for (camera, mut transform) in &mut cameras {
        *transform = Transform::from_translation(camera.eye()).looking_at(camera.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_round_trips_start_position() {
        let eye = Vec3::new(0.0, 1.5, 6.0);
        let camera = OrbitCamera::looking_at_origin_from(eye);
        assert!(camera.eye().distance(eye) < 1e-4);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = OrbitCamera::looking_at_origin_from(Vec3::new(0.0, 0.0, 5.0));
        camera.rotate(0.0, 10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        camera.rotate(0.0, -20.0);
        assert!(camera.pitch > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_zoom_is_bounded() {
        let mut camera = OrbitCamera::looking_at_origin_from(Vec3::new(0.0, 0.0, 5.0));
        camera.zoom(0.0001);
        assert_eq!(camera.radius, MIN_RADIUS);
        camera.zoom(1000.0);
        assert_eq!(camera.radius, MAX_RADIUS);
    }
}
