//! Render loop for the twin.
//!
//! Holds the controller state as a resource and advances every tagged
//! rotating part by the step the current rate implies for this frame.

use bevy::prelude::*;
use motor_twin::rotation::normalize_angle;
use motor_twin::{FrameClock, TwinState};

/// Plugin for the twin state and the spin system.
pub struct ControllerPlugin;

impl Plugin for ControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Twin>()
            .init_resource::<SpinClock>()
            .add_systems(Update, spin_rotating_parts);
    }
}

/// The controller state shared by the UI, the bus drain and the spin system.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct Twin(pub TwinState);

/// Frame clock used by the spin system.
#[derive(Resource, Default, Deref)]
pub struct SpinClock(pub FrameClock);

/// A mesh node that spins with the rotor.
///
/// The angle is tracked separately from the transform so it can be wrapped
/// without accumulating error in the quaternion.
#[derive(Component, Debug)]
pub struct RotatingPart {
    /// Rotation the node had when it was loaded.
    rest: Quat,
    /// Accumulated rotation about local Z, in `[0, 2π)`.
    angle: f64,
}

impl RotatingPart {
    pub fn new(rest: Quat) -> Self {
        Self { rest, angle: 0.0 }
    }

    #[cfg(test)]
    pub fn rest(&self) -> Quat {
        self.rest
    }

    #[cfg(test)]
    pub fn angle(&self) -> f64 {
        self.angle
    }
}

/// Advance every rotating part by one frame.
#[allow(clippy::needless_pass_by_value)]
fn spin_rotating_parts(
    time: Res<Time>,
    twin: Res<Twin>,
    clock: Res<SpinClock>,
    mut parts: Query<(&mut RotatingPart, &mut Transform)>,
) {
    let step = clock.step(twin.rate(), f64::from(time.delta_secs()));
    if step == 0.0 {
        return;
    }

    for (mut part, mut transform) in &mut parts {
        part.angle = normalize_angle(part.angle + step);
        #[allow(clippy::cast_possible_truncation)]
        let angle = part.angle as f32;
        transform.rotation = part.rest * Quat::from_rotation_z(angle);
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use bevy::ecs::system::RunSystemOnce;

    use super::*;

    fn world_with_rate(rpm: u32) -> World {
        let mut world = World::new();
        world.insert_resource(Time::<()>::default());
        world.insert_resource(SpinClock::default());
        let mut twin = Twin::default();
        twin.slider_input(rpm);
        world.insert_resource(twin);
        world
    }

    fn part_entities(world: &mut World) -> Vec<Entity> {
        let mut entities: Vec<_> = world
            .query_filtered::<Entity, With<RotatingPart>>()
            .iter(world)
            .collect();
        entities.sort();
        entities
    }

    #[test]
    fn test_spin_accumulates_per_frame() {
        let mut world = world_with_rate(1500);
        let part = world
            .spawn((Transform::default(), RotatingPart::new(Quat::IDENTITY)))
            .id();

        for _ in 0..10 {
            world.run_system_once(spin_rotating_parts).unwrap();
        }

        let expected = normalize_angle(10.0 * 1500.0 * TAU / 3600.0);
        let angle = world.get::<RotatingPart>(part).unwrap().angle();
        assert!((angle - expected).abs() < 1e-9);

        #[allow(clippy::cast_possible_truncation)]
        let expected_rotation = Quat::from_rotation_z(expected as f32);
        let rotation = world.get::<Transform>(part).unwrap().rotation;
        assert!(rotation.angle_between(expected_rotation) < 1e-4);
    }

    #[test]
    fn test_spin_keeps_rest_orientation() {
        let mut world = world_with_rate(60);
        let rest = Quat::from_rotation_x(0.5);
        let part = world
            .spawn((Transform::from_rotation(rest), RotatingPart::new(rest)))
            .id();

        world.run_system_once(spin_rotating_parts).unwrap();

        #[allow(clippy::cast_possible_truncation)]
        let expected = rest * Quat::from_rotation_z((TAU / 60.0) as f32);
        let rotation = world.get::<Transform>(part).unwrap().rotation;
        assert!(rotation.angle_between(expected) < 1e-5);
    }

    #[test]
    fn test_stationary_rotor_does_not_move() {
        let mut world = world_with_rate(0);
        let part = world
            .spawn((Transform::default(), RotatingPart::new(Quat::IDENTITY)))
            .id();

        world.run_system_once(spin_rotating_parts).unwrap();
        assert_eq!(world.get::<RotatingPart>(part).unwrap().angle(), 0.0);
    }

    #[test]
    fn test_mode_switches_keep_parts() {
        let mut world = world_with_rate(900);
        for _ in 0..4 {
            world.spawn((Transform::default(), RotatingPart::new(Quat::IDENTITY)));
        }
        let before = part_entities(&mut world);

        world.resource_mut::<Twin>().select_bus_driven();
        world.run_system_once(spin_rotating_parts).unwrap();
        world.resource_mut::<Twin>().select_manual();
        world.run_system_once(spin_rotating_parts).unwrap();
        world.resource_mut::<Twin>().select_bus_driven();
        world.run_system_once(spin_rotating_parts).unwrap();

        assert_eq!(part_entities(&mut world), before);
        assert_eq!(before.len(), 4);
    }
}
