//! Car vs obstacle collision
//!
//! Broad phase is a center distance check. The exact test projects the car hull and
//! the obstacle's axis-aligned box onto six candidate axes: the three world axes and
//! the car's three local axes. This is not a complete OBB-OBB separating axis test
//! (edge cross products are never tried), so a few grazing configurations report
//! overlap where a full test would not.

use glam::{Quat, Vec3};

use super::car::HULL_POINTS;
use crate::scene::Transform;

/// Axis-aligned box corners from a transform's position and scale
pub fn box_corners(obstacle: &Transform) -> [Vec3; 8] {
    let p = obstacle.position;
    let h = obstacle.scale * 0.5;
    [
        Vec3::new(p.x + h.x, p.y + h.y, p.z + h.z),
        Vec3::new(p.x + h.x, p.y - h.y, p.z + h.z),
        Vec3::new(p.x + h.x, p.y + h.y, p.z - h.z),
        Vec3::new(p.x + h.x, p.y - h.y, p.z - h.z),
        Vec3::new(p.x - h.x, p.y + h.y, p.z + h.z),
        Vec3::new(p.x - h.x, p.y - h.y, p.z + h.z),
        Vec3::new(p.x - h.x, p.y + h.y, p.z - h.z),
        Vec3::new(p.x - h.x, p.y - h.y, p.z - h.z),
    ]
}

/// World axes followed by the car's local axes in world space
pub fn candidate_axes(car_rotation: Quat) -> [Vec3; 6] {
    let r = car_rotation.normalize();
    [
        Vec3::X,
        Vec3::Y,
        Vec3::Z,
        (r * Vec3::X).normalize(),
        (r * Vec3::Y).normalize(),
        (r * Vec3::Z).normalize(),
    ]
}

/// (min, max) of the points projected onto `axis`
#[inline]
pub fn project(points: &[Vec3], axis: Vec3) -> (f32, f32) {
    points.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Center distance between the car and an obstacle
#[inline]
pub fn check_distance(car_position: Vec3, obstacle: &Transform) -> f32 {
    (obstacle.position - car_position).length()
}

/// True if no candidate axis separates the hull from the obstacle box
pub fn separating_axis_test(
    car_corners: &[Vec3; HULL_POINTS],
    car_rotation: Quat,
    obstacle: &Transform,
) -> bool {
    let box_points = box_corners(obstacle);

    for axis in candidate_axes(car_rotation) {
        let (car_min, car_max) = project(car_corners, axis);
        let (box_min, box_max) = project(&box_points, axis);
        if car_max < box_min || box_max < car_min {
            return false;
        }
    }

    true
}

/// Broad phase then exact test against every obstacle
pub fn check_collision<'a>(
    car_pose: &Transform,
    car_corners: &[Vec3; HULL_POINTS],
    obstacles: impl IntoIterator<Item = &'a Transform>,
    broad_phase_radius: f32,
) -> bool {
    obstacles.into_iter().any(|obstacle| {
        check_distance(car_pose.position, obstacle) < broad_phase_radius
            && separating_axis_test(car_corners, car_pose.rotation, obstacle)
    })
}
