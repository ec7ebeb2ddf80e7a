//! Key/value persistence
//!
//! Values are JSON-encoded scalars under fixed keys. Reads never fail: a
//! missing or unreadable value falls back to the caller's default. Backends:
//! - `MemoryStorage`: in-process map (native runs, tests)
//! - `LocalStorage`: browser LocalStorage (wasm only)

mod memory;
mod progress;
#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStorage;
pub use progress::Progress;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("could not encode value: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// A string key/value store
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        (**self).remove(key)
    }
}

/// Load `key`, or `default` if absent or undecodable
pub fn load<T: DeserializeOwned>(store: &dyn Storage, key: &str, default: T) -> T {
    let Some(json) = store.get(key) else {
        return default;
    };
    match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Ignoring unreadable value for '{}': {}", key, e);
            default
        }
    }
}

pub fn save<T: Serialize + ?Sized>(
    store: &mut dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_returns_default() {
        let store = MemoryStorage::new();
        assert_eq!(load(&store, "currentLevel", 1u32), 1);
    }

    #[test]
    fn test_load_corrupt_returns_default() {
        let mut store = MemoryStorage::new();
        store.set("bestTime", "not json").unwrap();
        assert_eq!(load::<Option<f32>>(&store, "bestTime", None), None);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStorage::new();
        save(&mut store, "calibrationX", &-4.5f32).unwrap();
        assert_eq!(load(&store, "calibrationX", 0.0f32), -4.5);
        assert_eq!(store.get("calibrationX").as_deref(), Some("-4.5"));
    }

    #[test]
    fn test_boxed_storage() {
        let mut store: Box<dyn Storage> = Box::new(MemoryStorage::new());
        save(&mut store, "currentLevel", &7u32).unwrap();
        assert_eq!(load(&store, "currentLevel", 1u32), 7);
        store.remove("currentLevel").unwrap();
        assert_eq!(load(&store, "currentLevel", 1u32), 1);
    }
}
