//! Data-driven gameplay constants
//!
//! Defaults match `crate::consts`. A JSON file may override any subset of fields.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Car body dimensions used to build the collision hull
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarDims {
    /// Extent along X
    pub width: f32,
    /// Extent along Y
    pub length: f32,
    /// Body height; the lower box spans `-height/2..0`, the roof ridge sits at `+height/2`
    pub height: f32,
    /// Length of the roof ridge along Y
    pub roof_length: f32,
}

impl Default for CarDims {
    fn default() -> Self {
        Self {
            width: 2.5,
            length: 5.6,
            height: 1.7,
            roof_length: 1.6,
        }
    }
}

/// All gameplay balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Jump ===
    pub gravity: f32,
    pub vertical_speed: f32,
    pub angular_speed: f32,
    pub max_air_time: f32,
    pub max_height: f32,

    // === Lane ===
    pub base_speed: f32,
    pub tile_count: usize,
    pub tile_gap: f32,

    // === Obstacles ===
    pub obstacle_spacing: f32,
    pub obstacle_spacing_steps: u32,
    /// Index (from the front of the ring) of the obstacle whose crossing triggers a recycle
    pub obstacle_lookahead: usize,
    pub obstacle_speed_factor: f32,
    /// Canonical box extents restored on recycle
    pub obstacle_scale: Vec3,

    // === Sound cues ===
    pub sound_threshold_y: f32,
    pub sound_max_distance: f32,
    pub sound_volume: f32,

    // === Collision ===
    pub broad_phase_radius: f32,
    pub car_dims: CarDims,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            vertical_speed: VERTICAL_SPEED,
            angular_speed: ANGULAR_SPEED,
            max_air_time: MAX_AIR_TIME,
            max_height: MAX_HEIGHT,

            base_speed: BASE_SPEED,
            tile_count: TILE_COUNT,
            tile_gap: TILE_GAP,

            obstacle_spacing: OBSTACLE_SPACING,
            obstacle_spacing_steps: OBSTACLE_SPACING_STEPS,
            obstacle_lookahead: 0,
            obstacle_speed_factor: OBSTACLE_SPEED_FACTOR,
            obstacle_scale: Vec3::new(2.0, 0.5, 0.5),

            sound_threshold_y: SOUND_THRESHOLD_Y,
            sound_max_distance: SOUND_MAX_DISTANCE,
            sound_volume: 1.0,

            broad_phase_radius: BROAD_PHASE_RADIUS,
            car_dims: CarDims::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_count == 0 {
            return Err(ConfigError::Invalid("tile_count must be at least 1".into()));
        }
        if self.obstacle_spacing_steps == 0 {
            return Err(ConfigError::Invalid(
                "obstacle_spacing_steps must be at least 1".into(),
            ));
        }
        let non_negative = [
            ("gravity", self.gravity),
            ("vertical_speed", self.vertical_speed),
            ("max_air_time", self.max_air_time),
            ("max_height", self.max_height),
            ("base_speed", self.base_speed),
            ("tile_gap", self.tile_gap),
            ("broad_phase_radius", self.broad_phase_radius),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }
        Ok(())
    }
}
