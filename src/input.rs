//! Tilt input
//!
//! Device orientation arrives as events at its own cadence. Each reading is
//! calibrated into a tilt vector and written to a [`TiltRegister`]; the game
//! loop reads whatever value is there when it ticks. Only the latest reading
//! matters, so there is no queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::ORIENTATION_SENSITIVITY;

/// Resting orientation offsets (degrees)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Left/right offset (gamma)
    pub x: f32,
    /// Front/back offset (beta)
    pub y: f32,
}

impl Calibration {
    /// Treat the given orientation as level
    pub fn from_orientation(beta: f32, gamma: f32) -> Self {
        Self { x: gamma, y: beta }
    }

    /// Map raw orientation angles to a tilt vector in [-1, 1]².
    ///
    /// `gamma` is left/right tilt, `beta` front/back tilt, both in degrees.
    pub fn tilt(&self, beta: f32, gamma: f32) -> Vec2 {
        let tilt = Vec2::new(
            (gamma - self.x) / ORIENTATION_SENSITIVITY,
            (beta - self.y) / ORIENTATION_SENSITIVITY,
        );
        tilt.clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
    }
}

/// Single-slot, latest-value-wins tilt store shared between the input
/// callback and the game loop. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct TiltRegister {
    slot: Arc<AtomicU64>,
}

impl TiltRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current tilt
    pub fn store(&self, tilt: Vec2) {
        let bits = ((tilt.x.to_bits() as u64) << 32) | tilt.y.to_bits() as u64;
        self.slot.store(bits, Ordering::Release);
    }

    /// Most recent tilt (zero before the first reading)
    pub fn load(&self) -> Vec2 {
        let bits = self.slot.load(Ordering::Acquire);
        Vec2::new(
            f32::from_bits((bits >> 32) as u32),
            f32::from_bits(bits as u32),
        )
    }

    pub fn reset(&self) {
        self.store(Vec2::ZERO);
    }
}
