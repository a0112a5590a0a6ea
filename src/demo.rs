//! Built-in demo content
//!
//! A scene with the layout the game expects (car, 11 lane tiles, obstacle boxes, one
//! camera, one light) and a simple autopilot, for headless runs and tests.

use glam::{Quat, Vec3};

use crate::audio::AudioBackend;
use crate::consts::{TILE_COUNT, TILE_GAP};
use crate::scene::{SceneGraph, Transform};
use crate::sim::{GameSession, InputEvent, JumpPhase, Key};

/// Camera sits behind the car, above the lane
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 12.0, 6.0);

/// Build the demo scene with `obstacles` boxes spaced down the lane
pub fn build_scene(obstacles: usize) -> SceneGraph {
    let mut scene = SceneGraph::new();

    scene.add(Transform::new("Car", Vec3::ZERO));

    for i in 0..TILE_COUNT {
        let y = 6.0 - TILE_GAP * i as f32;
        scene.add(
            Transform::new(format!("Cube.{i:03}"), Vec3::new(0.0, y, -1.0))
                .with_scale(Vec3::new(8.0, TILE_GAP, 0.2)),
        );
    }

    for i in 0..obstacles {
        let y = -40.0 - 40.0 * i as f32;
        scene.add(
            Transform::new(format!("Box.{i:03}"), Vec3::new(0.0, y, 0.0))
                .with_scale(Vec3::new(2.0, 0.5, 0.5)),
        );
    }

    // Pitched to look down the lane toward -Y
    let pitch = Quat::from_rotation_x(-75f32.to_radians());
    scene.add_camera(
        Transform::new("Camera", CAMERA_POSITION).with_rotation(pitch),
        60f32.to_radians(),
    );
    scene.add_light(
        Transform::new("Light", Vec3::new(0.0, 0.0, 10.0)),
        Vec3::new(1.0, 1.0, 0.9),
    );

    scene
}

/// Presses jump (no spin) when an obstacle gets close and lets go once it has passed
#[derive(Debug, Default)]
pub struct Autopilot {
    holding: bool,
}

impl Autopilot {
    /// Obstacle distance (along -Y) at which to take off
    pub const TRIGGER_DISTANCE: f32 = 18.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Decide this frame's key events
    pub fn drive<B: AudioBackend>(&mut self, session: &mut GameSession<B>) {
        if session.is_game_over() {
            session.handle_event(InputEvent::KeyUp(Key::Space));
            session.handle_event(InputEvent::KeyDown(Key::Space));
            self.holding = true;
            return;
        }

        let car_y = session.car_pose().position.y;
        let threat = session
            .world()
            .obstacle_transforms(session.scene())
            .map(|t| t.position.y - car_y)
            .any(|dy| (-Self::TRIGGER_DISTANCE..4.0).contains(&dy));

        match (threat, self.holding) {
            (true, false) if session.phase() == JumpPhase::Grounded => {
                session.handle_event(InputEvent::KeyDown(Key::Space));
                self.holding = true;
            }
            (false, true) => {
                session.handle_event(InputEvent::KeyUp(Key::Space));
                self.holding = false;
            }
            _ => {}
        }
    }
}
