//! Bouncy Car - lane-scrolling arcade driving game core
//!
//! Core modules:
//! - `sim`: Per-frame simulation (input edges, jump, scrolling, collision, session)
//! - `scene`: Handles into the externally owned scene graph, plus the renderer seam
//! - `audio`: Positional sound playback seam and volume control
//! - `tuning`: Data-driven gameplay constants
//! - `settings`: Player preferences

pub mod audio;
pub mod demo;
pub mod error;
pub mod scene;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, SetupError};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Frame timestep the headless runner uses (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Height loss per second once the jump is released
    pub const GRAVITY: f32 = 5.0;
    /// Lane scroll speed with no forward boost
    pub const BASE_SPEED: f32 = 10.0;
    /// Longest a jump may be held before it is forcibly released (seconds)
    pub const MAX_AIR_TIME: f32 = 1.5;
    /// Height ceiling while rising
    pub const MAX_HEIGHT: f32 = 3.0;
    /// Climb rate while the jump is held
    pub const VERTICAL_SPEED: f32 = 3.0;
    /// One full turn per second
    pub const ANGULAR_SPEED: f32 = std::f32::consts::TAU;

    /// Number of tiles the lane is built from
    pub const TILE_COUNT: usize = 11;
    /// Spacing between consecutive tiles along the scroll axis
    pub const TILE_GAP: f32 = 6.0;

    /// Broad-phase rejection distance between car and obstacle centers
    pub const BROAD_PHASE_RADIUS: f32 = 6.0;

    /// Obstacle placement step behind the rearmost tile
    pub const OBSTACLE_SPACING: f32 = 20.0;
    /// Number of discrete spacing multiples (1..=N)
    pub const OBSTACLE_SPACING_STEPS: u32 = 5;
    /// Obstacles travel this many times faster than the lane
    pub const OBSTACLE_SPEED_FACTOR: f32 = 3.0;
    /// Obstacles closer than this scroll position start their sound cue
    pub const SOUND_THRESHOLD_Y: f32 = -80.0;
    /// Audible radius of an obstacle's cue
    pub const SOUND_MAX_DISTANCE: f32 = 5.0;

    /// Listener smoothing step handed to the audio backend
    pub const LISTENER_DT: f32 = 1.0 / 60.0;
}

/// Vertical (height) axis
pub const UP: Vec3 = Vec3::Z;
/// Scroll axis; the lane travels toward +Y, past the camera
pub const FORWARD: Vec3 = Vec3::Y;
/// Lateral horizontal axis
pub const LATERAL: Vec3 = Vec3::X;

