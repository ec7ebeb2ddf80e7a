//! Player progress: level reached, best time and tilt calibration

use super::{PersistenceError, Storage, load, save};
use crate::input::Calibration;

pub const CURRENT_LEVEL_KEY: &str = "currentLevel";
pub const BEST_TIME_KEY: &str = "bestTime";
pub const CALIBRATION_X_KEY: &str = "calibrationX";
pub const CALIBRATION_Y_KEY: &str = "calibrationY";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Level to start from (1-based)
    pub current_level: u32,
    /// Fastest completion of any level (seconds)
    pub best_time: Option<f32>,
    pub calibration: Calibration,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            current_level: 1,
            best_time: None,
            calibration: Calibration::default(),
        }
    }
}

impl Progress {
    pub fn load(store: &dyn Storage) -> Self {
        let progress = Self {
            current_level: load(store, CURRENT_LEVEL_KEY, 1u32).max(1),
            best_time: load(store, BEST_TIME_KEY, None),
            calibration: Calibration {
                x: load(store, CALIBRATION_X_KEY, 0.0),
                y: load(store, CALIBRATION_Y_KEY, 0.0),
            },
        };
        log::info!(
            "Loaded progress: level {}, best time {:?}",
            progress.current_level,
            progress.best_time
        );
        progress
    }

    /// Record a completion time; returns true if it is a new best
    pub fn record_completion(&mut self, time: f32) -> bool {
        let is_best = self.best_time.is_none_or(|best| time < best);
        if is_best {
            self.best_time = Some(time);
        }
        is_best
    }

    pub fn save_level(&self, store: &mut dyn Storage) -> Result<(), PersistenceError> {
        save(store, CURRENT_LEVEL_KEY, &self.current_level)
    }

    pub fn save_best_time(&self, store: &mut dyn Storage) -> Result<(), PersistenceError> {
        save(store, BEST_TIME_KEY, &self.best_time)
    }

    pub fn save_calibration(&self, store: &mut dyn Storage) -> Result<(), PersistenceError> {
        save(store, CALIBRATION_X_KEY, &self.calibration.x)?;
        save(store, CALIBRATION_Y_KEY, &self.calibration.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_defaults_from_empty_store() {
        let store = MemoryStorage::new();
        assert_eq!(Progress::load(&store), Progress::default());
    }

    #[test]
    fn test_record_completion_keeps_fastest() {
        let mut progress = Progress::default();
        assert!(progress.record_completion(12.5));
        assert!(!progress.record_completion(14.0));
        assert!(!progress.record_completion(12.5));
        assert!(progress.record_completion(9.0));
        assert_eq!(progress.best_time, Some(9.0));
    }

    #[test]
    fn test_round_trip_through_store() {
        let mut store = MemoryStorage::new();
        let progress = Progress {
            current_level: 12,
            best_time: Some(8.25),
            calibration: Calibration { x: 3.0, y: -12.5 },
        };
        progress.save_level(&mut store).unwrap();
        progress.save_best_time(&mut store).unwrap();
        progress.save_calibration(&mut store).unwrap();

        assert_eq!(Progress::load(&store), progress);
    }

    #[test]
    fn test_level_zero_is_clamped() {
        let mut store = MemoryStorage::new();
        store.set(CURRENT_LEVEL_KEY, "0").unwrap();
        assert_eq!(Progress::load(&store).current_level, 1);
    }
}
