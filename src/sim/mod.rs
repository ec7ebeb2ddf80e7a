//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module touches the
//! platform:
//! - Randomness comes from a seeded RNG owned by the session
//! - Tilt arrives as an explicit per-tick input
//! - Rendering only reads a `Snapshot`

pub mod geometry;
pub mod level;
pub mod physics;
pub mod state;
pub mod tick;

pub use geometry::{Footprint, Hole, Obstacle};
pub use level::{ArenaLayout, DifficultyTier, Tier, generate, path_is_clear};
pub use physics::{Ball, PhysicsParams, StepOutcome, is_ball_stopped, step};
pub use state::{
    AxisInversion, GameEvent, GamePhase, GameState, HoleProximity, LossReason, SessionError,
    Snapshot, load_delay, touches_border,
};
pub use tick::{TickInput, ball_at_rest_in_hole, tick};
