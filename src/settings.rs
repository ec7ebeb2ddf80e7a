//! Game rules and preferences
//!
//! Persisted separately from progress under its own storage key.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::{self, PersistenceError, Storage};
use crate::sim::PhysicsParams;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Rules ===
    /// Touching the red border loses the level
    pub lethal_border: bool,
    /// Border strip width (viewport pixels)
    pub border_width: f32,
    /// Random one-off control reversal each level
    pub axis_inversion: bool,
    /// Show the loading pause before each level
    pub level_load_delay: bool,
    /// Ball speed under which it counts as resting in the hole
    pub stillness_threshold: f32,
    pub physics: PhysicsParams,

    // === Feedback ===
    pub sound: bool,
    /// Vibration on collisions, win and loss
    pub haptics: bool,
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lethal_border: true,
            border_width: BORDER_WIDTH,
            axis_inversion: true,
            level_load_delay: true,
            stillness_threshold: STILLNESS_THRESHOLD,
            physics: PhysicsParams::default(),

            sound: true,
            haptics: true,
            volume: 0.8,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "tilt_maze_settings";

    /// Classic rules: no lethal border, no inversion
    pub fn relaxed() -> Self {
        Self {
            lethal_border: false,
            axis_inversion: false,
            ..Self::default()
        }
    }

    /// Volume actually used for sound effects
    pub fn effective_volume(&self) -> f32 {
        if self.sound {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn load(store: &dyn Storage) -> Self {
        persistence::load(store, Self::STORAGE_KEY, Self::default())
    }

    pub fn save(&self, store: &mut dyn Storage) -> Result<(), PersistenceError> {
        persistence::save(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
