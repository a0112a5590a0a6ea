//! Per-frame simulation module
//!
//! All gameplay logic lives here:
//! - Frame driven, single writer
//! - Seeded RNG only
//! - No rendering or platform dependencies beyond the `scene`/`audio` seams

pub mod car;
pub mod collision;
pub mod input;
pub mod session;
pub mod world;

pub use car::{Car, CarHull, HULL_POINTS, JumpPhase, JumpTransition};
pub use collision::{check_collision, check_distance, separating_axis_test};
pub use input::{Button, ButtonKind, Buttons, InputEvent, Key, Steering};
pub use session::{GameEvent, GameSession, Hud};
pub use world::{Obstacle, ScrollReport, World};
