//! The player's car and its jump state machine
//!
//! Pose (position/rotation) lives in the scene transform; everything else lives here.
//! A jump climbs while the button is held (capped in height and time), then falls at a
//! constant rate, spinning about an axis latched from the steering input at takeoff.

use glam::{Quat, Vec3};

use super::input::{Button, Steering};
use crate::scene::{TransformId, Transform};
use crate::tuning::{CarDims, Tuning};
use crate::{LATERAL, UP};

/// Points in the collision hull: 8 box corners + 4 roof ridge points
pub const HULL_POINTS: usize = 12;

/// Slack on the air-time cap so summed fixed steps reach it on the expected frame
const AIR_TIME_EPSILON: f32 = 1e-4;

/// Jump phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpPhase {
    /// On the lane, no jump in progress
    #[default]
    Grounded,
    /// Jump held, climbing
    Rising,
    /// Jump released, descending
    Falling,
}

/// Phase change reported by `Car::step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpTransition {
    TookOff,
    Released,
    Landed,
}

/// Collision hull in body and world space
#[derive(Debug, Clone, PartialEq)]
pub struct CarHull {
    /// Body-frame offsets
    pub original: [Vec3; HULL_POINTS],
    /// Same points in world space, refreshed once per frame
    pub current: [Vec3; HULL_POINTS],
}

impl CarHull {
    pub fn from_dims(dims: &CarDims) -> Self {
        let hw = dims.width / 2.0;
        let hl = dims.length / 2.0;
        let hh = dims.height / 2.0;
        let hr = dims.roof_length / 2.0;
        let original = [
            Vec3::new(hw, hl, 0.0),
            Vec3::new(hw, hl, -hh),
            Vec3::new(hw, -hl, 0.0),
            Vec3::new(hw, -hl, -hh),
            Vec3::new(-hw, hl, 0.0),
            Vec3::new(-hw, hl, -hh),
            Vec3::new(-hw, -hl, 0.0),
            Vec3::new(-hw, -hl, -hh),
            Vec3::new(hw, hr, hh),
            Vec3::new(hw, -hr, hh),
            Vec3::new(-hw, hr, hh),
            Vec3::new(-hw, -hr, hh),
        ];
        Self {
            original,
            current: original,
        }
    }

    /// Transform the body-frame points into world space
    pub fn update(&mut self, rotation: Quat, position: Vec3) {
        let rotation = rotation.normalize();
        for (current, original) in self.current.iter_mut().zip(&self.original) {
            *current = rotation * *original + position;
        }
    }
}

/// Gameplay state of the car
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub transform: TransformId,
    /// Climb rate while the jump is held
    pub vertical_speed: f32,
    /// Extra lane speed on top of the base speed
    pub forward_speed: f32,
    /// Latched spin axis; zero means no spin
    pub rotation_axis: Vec3,
    pub angular_speed: f32,
    /// Seconds since takeoff
    pub air_time: f32,
    pub phase: JumpPhase,
    pub bounce_count: u16,
    pub total_jump_downs: u16,
    pub hull: CarHull,
}

impl Car {
    pub fn new(transform: TransformId, tuning: &Tuning) -> Self {
        Self {
            transform,
            vertical_speed: tuning.vertical_speed,
            forward_speed: 0.0,
            rotation_axis: Vec3::ZERO,
            angular_speed: tuning.angular_speed,
            air_time: 0.0,
            phase: JumpPhase::Grounded,
            bounce_count: 0,
            total_jump_downs: 0,
            hull: CarHull::from_dims(&tuning.car_dims),
        }
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.phase == JumpPhase::Grounded
    }

    /// Put the car on the lane without touching its pose (used on crash)
    pub fn force_grounded(&mut self) {
        self.phase = JumpPhase::Grounded;
    }

    /// Choose the spin axis from steering. Cleared while grounded; latched once set.
    pub fn select_rotation_axis(&mut self, steering: Steering) {
        if self.is_grounded() {
            self.rotation_axis = Vec3::ZERO;
        }
        if self.rotation_axis != Vec3::ZERO {
            return;
        }
        if steering.left {
            self.rotation_axis = UP;
        } else if steering.right {
            self.rotation_axis = -UP;
        }
        if steering.up {
            self.rotation_axis = LATERAL;
        }
    }

    /// Advance the jump by `dt` seconds, writing the pose and refreshing the hull
    pub fn step(
        &mut self,
        jump: &mut Button,
        steering: Steering,
        tuning: &Tuning,
        pose: &mut Transform,
        dt: f32,
    ) -> Option<JumpTransition> {
        let mut transition = None;

        if jump.pressed {
            self.select_rotation_axis(steering);

            if self.is_grounded() {
                self.phase = JumpPhase::Rising;
                self.bounce_count = self.bounce_count.wrapping_add(1);
                self.total_jump_downs = self
                    .total_jump_downs
                    .saturating_add(u16::from(jump.take_downs()));
                transition = Some(JumpTransition::TookOff);
            }

            pose.position.z += self.vertical_speed * dt;
            self.air_time += dt;
            if self.air_time + AIR_TIME_EPSILON >= tuning.max_air_time {
                jump.force_release();
            }

            pose.position.z = pose.position.z.min(tuning.max_height);
        }

        if jump.released && !self.is_grounded() {
            if self.phase == JumpPhase::Rising {
                self.phase = JumpPhase::Falling;
                transition = Some(JumpTransition::Released);
            }
            pose.position.z -= tuning.gravity * dt;
        }

        if !self.is_grounded() && self.rotation_axis != Vec3::ZERO {
            let spin = Quat::from_axis_angle(self.rotation_axis, self.angular_speed * dt);
            pose.rotation = (pose.rotation * spin).normalize();
        }

        if self.phase == JumpPhase::Falling && pose.position.z <= 0.0 {
            self.land(pose);
            transition = Some(JumpTransition::Landed);
        }

        self.hull.update(pose.rotation, pose.position);
        transition
    }

    fn land(&mut self, pose: &mut Transform) {
        pose.position.z = 0.0;
        pose.rotation = Quat::IDENTITY;
        self.total_jump_downs = 0;
        self.forward_speed = 0.0;
        self.air_time = 0.0;
        self.phase = JumpPhase::Grounded;
    }

    /// Back to the starting state at the origin
    pub fn reset(&mut self, tuning: &Tuning, pose: &mut Transform) {
        *self = Self::new(self.transform, tuning);
        pose.position = Vec3::ZERO;
        pose.rotation = Quat::IDENTITY;
        self.hull.update(pose.rotation, pose.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use crate::scene::SceneGraph;
    use proptest::prelude::*;

    fn setup() -> (Car, Transform, Tuning) {
        let mut scene = SceneGraph::new();
        let id = scene.add(Transform::new("Car", Vec3::ZERO));
        let tuning = Tuning::default();
        (Car::new(id, &tuning), scene[id].clone(), tuning)
    }

    fn pressed_jump() -> Button {
        Button {
            down_count: 1,
            pressed: true,
            released: false,
        }
    }

    #[test]
    fn test_grounded_stays_put_without_jump() {
        let (mut car, mut pose, tuning) = setup();
        let mut jump = Button::default();
        for _ in 0..120 {
            assert_eq!(car.step(&mut jump, Steering::default(), &tuning, &mut pose, FRAME_DT), None);
        }
        assert_eq!(pose.position.z, 0.0);
        assert_eq!(pose.rotation, Quat::IDENTITY);
        assert!(car.is_grounded());
    }

    #[test]
    fn test_takeoff_latches_axis_and_counts() {
        let (mut car, mut pose, tuning) = setup();
        let mut jump = pressed_jump();
        let steer = Steering {
            left: true,
            ..Default::default()
        };

        let t = car.step(&mut jump, steer, &tuning, &mut pose, FRAME_DT);
        assert_eq!(t, Some(JumpTransition::TookOff));
        assert_eq!(car.phase, JumpPhase::Rising);
        assert_eq!(car.rotation_axis, UP);
        assert_eq!(car.bounce_count, 1);
        assert_eq!(car.total_jump_downs, 1);
        assert_eq!(jump.down_count, 0);

        // Changing steering mid-air does not re-select
        let steer = Steering {
            up: true,
            ..Default::default()
        };
        car.step(&mut jump, steer, &tuning, &mut pose, FRAME_DT);
        assert_eq!(car.rotation_axis, UP);
    }

    #[test]
    fn test_axis_precedence() {
        let (mut car, ..) = setup();
        car.select_rotation_axis(Steering {
            left: true,
            right: true,
            up: false,
        });
        assert_eq!(car.rotation_axis, UP);

        car.rotation_axis = Vec3::ZERO;
        car.select_rotation_axis(Steering {
            right: true,
            ..Default::default()
        });
        assert_eq!(car.rotation_axis, -UP);

        car.rotation_axis = Vec3::ZERO;
        car.select_rotation_axis(Steering {
            left: true,
            right: false,
            up: true,
        });
        assert_eq!(car.rotation_axis, LATERAL);
    }

    #[test]
    fn test_height_clamped_while_rising() {
        let (mut car, mut pose, tuning) = setup();
        let mut jump = pressed_jump();
        // A single huge step would climb far past the ceiling
        car.step(&mut jump, Steering::default(), &tuning, &mut pose, 1.2);
        assert!(pose.position.z <= tuning.max_height);
        assert_eq!(car.phase, JumpPhase::Rising);
    }

    #[test]
    fn test_air_time_cap_forces_release() {
        let (mut car, mut pose, tuning) = setup();
        let mut jump = pressed_jump();
        let dt = 0.25;
        let mut t = 0.0;
        let mut released_at = None;
        // Player holds the key for 2 seconds
        while t < 2.0 {
            car.step(&mut jump, Steering::default(), &tuning, &mut pose, dt);
            t += dt;
            if released_at.is_none() && car.phase != JumpPhase::Rising {
                released_at = Some(t);
            }
        }
        let released_at = released_at.expect("jump never ended");
        assert!(released_at <= 1.5 + 1e-4, "released at {released_at}");
        assert!(!jump.pressed);
        assert!(jump.released);
    }

    #[test]
    fn test_air_time_cap_at_frame_rate() {
        let (mut car, mut pose, tuning) = setup();
        let mut jump = pressed_jump();
        let mut left_rising = None;
        for frame in 1..=120 {
            car.step(&mut jump, Steering::default(), &tuning, &mut pose, FRAME_DT);
            if car.phase != JumpPhase::Rising {
                left_rising = Some(frame);
                break;
            }
        }
        // 1.5 s at 60 Hz
        assert_eq!(left_rising, Some(90));
        assert_eq!(car.phase, JumpPhase::Falling);
        assert!(jump.released);
    }

    #[test]
    fn test_full_jump_lands_and_resets() {
        let (mut car, mut pose, tuning) = setup();
        let mut jump = pressed_jump();
        let steer = Steering {
            up: true,
            ..Default::default()
        };
        let mut landed = false;
        for _ in 0..600 {
            if car.step(&mut jump, steer, &tuning, &mut pose, FRAME_DT)
                == Some(JumpTransition::Landed)
            {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(pose.position.z, 0.0);
        assert_eq!(pose.rotation, Quat::IDENTITY);
        assert_eq!(car.air_time, 0.0);
        assert_eq!(car.total_jump_downs, 0);
        assert!(car.is_grounded());
    }

    #[test]
    fn test_early_release_falls() {
        let (mut car, mut pose, tuning) = setup();
        let mut jump = pressed_jump();
        for _ in 0..10 {
            car.step(&mut jump, Steering::default(), &tuning, &mut pose, FRAME_DT);
        }
        let peak = pose.position.z;
        jump.force_release();
        let t = car.step(&mut jump, Steering::default(), &tuning, &mut pose, FRAME_DT);
        assert_eq!(t, Some(JumpTransition::Released));
        assert!(pose.position.z < peak);
    }

    #[test]
    fn test_hull_follows_pose() {
        let (mut car, ..) = setup();
        let pos = Vec3::new(1.0, -2.0, 0.5);
        car.hull.update(Quat::IDENTITY, pos);
        for (c, o) in car.hull.current.iter().zip(&car.hull.original) {
            assert!((*c - (*o + pos)).length() < 1e-6);
        }

        // Half turn about Z mirrors X and Y
        car.hull.update(Quat::from_rotation_z(std::f32::consts::PI), Vec3::ZERO);
        let o = car.hull.original[0];
        let c = car.hull.current[0];
        assert!((c - Vec3::new(-o.x, -o.y, o.z)).length() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_rising_never_exceeds_ceiling(dts in proptest::collection::vec(0.0f32..0.5, 1..64)) {
            let (mut car, mut pose, tuning) = setup();
            let mut jump = pressed_jump();
            for dt in dts {
                car.step(&mut jump, Steering::default(), &tuning, &mut pose, dt);
                if car.phase == JumpPhase::Rising {
                    prop_assert!(pose.position.z <= tuning.max_height);
                }
                prop_assert!(pose.position.z >= 0.0);
            }
        }

        #[test]
        fn prop_idle_grounded_is_stable(dts in proptest::collection::vec(0.0f32..1.0, 1..64)) {
            let (mut car, mut pose, tuning) = setup();
            let mut jump = Button::default();
            for dt in dts {
                car.step(&mut jump, Steering::default(), &tuning, &mut pose, dt);
                prop_assert_eq!(pose.position.z, 0.0);
                prop_assert_eq!(pose.rotation, Quat::IDENTITY);
            }
        }
    }
}
