//! Tilt Maze - steer a ball into the hole by tilting the device
//!
//! Core modules:
//! - `sim`: Physics, level generation and the per-level session
//! - `input`: Tilt register and orientation calibration
//! - `persistence`: Key/value storage for progress and calibration
//! - `game`: Driver wiring the session to input, storage and feedback

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod game;
pub mod input;
pub mod persistence;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use game::Game;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Logical arena size; all generated geometry lives in this square
    pub const ARENA_SIZE: f32 = 400.0;

    /// Tilt-to-acceleration factor (per tick)
    pub const GRAVITY: f32 = 0.5;
    /// Velocity retention applied every tick after clamping
    pub const FRICTION: f32 = 0.98;
    /// Velocity retention on collision reflection
    pub const BOUNCE: f32 = 0.7;
    /// Per-component velocity clamp
    pub const MAX_VELOCITY: f32 = 15.0;

    /// Ball radius as a fraction of the smaller viewport side
    pub const BALL_RADIUS_FRACTION: f32 = 0.03;
    /// Ball speed under which the ball counts as resting in the hole
    pub const STILLNESS_THRESHOLD: f32 = 1.0;

    /// Width of the lethal border (viewport pixels)
    pub const BORDER_WIDTH: f32 = 15.0;

    /// Starting time budget before the tier bonus is applied (seconds)
    pub const BASE_TIME_LIMIT: f32 = 30.0;
    /// Time budget never drops below this (seconds)
    pub const MIN_TIME_LIMIT: f32 = 15.0;

    /// Axis inversion lasts this long once triggered (seconds)
    pub const INVERSION_DURATION: f32 = 3.0;
    /// No inversion during the first second of a level
    pub const INVERSION_GRACE: f32 = 1.0;
    /// Per-tick chance of triggering the inversion
    pub const INVERSION_CHANCE: f64 = 0.003;

    /// Degrees of device tilt mapped to a full tilt of 1.0
    pub const ORIENTATION_SENSITIVITY: f32 = 45.0;
}

/// Format seconds as `MM:SS`
pub fn format_time(seconds: f32) -> String {
    let total = seconds.max(0.0);
    let mins = (total / 60.0).floor() as u32;
    let secs = (total % 60.0).floor() as u32;
    format!("{:02}:{:02}", mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(9.9), "00:09");
        assert_eq!(format_time(75.2), "01:15");
        assert_eq!(format_time(-3.0), "00:00");
    }
}
