//! Browser bindings
//!
//! The page owns the canvas, the animation frame loop and the
//! `deviceorientation` listener; it forwards everything here and draws from
//! the JSON snapshot.

use wasm_bindgen::prelude::*;

use crate::audio::AudioManager;
use crate::game::{Game, haptic_pattern};
use crate::persistence::{LocalStorage, MemoryStorage, Storage};
use crate::sim::GameEvent;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Tilt Maze starting...");
}

fn open_storage() -> Box<dyn Storage> {
    match LocalStorage::open() {
        Some(local) => Box::new(local),
        None => {
            log::warn!("LocalStorage unavailable - progress will not be saved");
            Box::new(MemoryStorage::new())
        }
    }
}

fn vibrate(pattern: &[u32]) {
    let Some(window) = web_sys::window() else { return };
    let navigator = window.navigator();
    match pattern {
        [ms] => {
            navigator.vibrate_with_duration(*ms);
        }
        _ => {
            let array = js_sys::Array::new();
            for ms in pattern {
                array.push(&JsValue::from(*ms));
            }
            navigator.vibrate_with_pattern(&array);
        }
    }
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game<Box<dyn Storage>>,
    audio: AudioManager,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebGame {
        let seed = js_sys::Date::now() as u64;
        let game = Game::new(open_storage(), seed, glam::Vec2::new(width, height));
        let audio = AudioManager::new(game.settings().effective_volume());
        log::info!("Game initialized with seed: {}", seed);
        WebGame { game, audio }
    }

    /// `deviceorientation` reading (degrees)
    pub fn set_orientation(&self, beta: f32, gamma: f32) {
        self.game.on_orientation(beta, gamma);
    }

    pub fn calibrate(&mut self, beta: f32, gamma: f32) {
        let event = self.game.calibrate(beta, gamma);
        self.feedback(&event);
    }

    /// Start from the saved level; also unlocks audio (call from a user gesture)
    pub fn start(&mut self) -> Result<(), JsError> {
        self.audio.resume();
        self.game.start()?;
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), JsError> {
        self.game.restart()?;
        Ok(())
    }

    pub fn next_level(&mut self) -> Result<(), JsError> {
        self.game.next_level()?;
        Ok(())
    }

    pub fn pause(&mut self) {
        self.game.pause();
    }

    pub fn resume(&mut self) {
        self.game.resume();
    }

    pub fn menu(&mut self) {
        self.game.menu();
    }

    /// Page hidden or window blurred
    pub fn focus_lost(&mut self) {
        self.game.on_focus_lost();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.game.resize(width, height);
    }

    /// Advance by `dt_ms` milliseconds
    pub fn tick(&mut self, dt_ms: f64) {
        let dt = (dt_ms / 1000.0) as f32;
        for event in self.game.tick(dt) {
            self.feedback(&event);
        }
    }

    pub fn set_sound(&mut self, enabled: bool, volume: f32) {
        let mut settings = self.game.settings().clone();
        settings.sound = enabled;
        settings.volume = volume;
        self.audio.set_volume(settings.effective_volume());
        self.game.update_settings(settings);
    }

    pub fn set_haptics(&mut self, enabled: bool) {
        let mut settings = self.game.settings().clone();
        settings.haptics = enabled;
        self.game.update_settings(settings);
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.game.snapshot()).unwrap_or_default()
    }

    pub fn best_time(&self) -> Option<f32> {
        self.game.progress().best_time
    }

    pub fn current_level(&self) -> u32 {
        self.game.progress().current_level
    }
}

impl WebGame {
    fn feedback(&self, event: &GameEvent) {
        self.audio.play_event(event);
        if self.game.settings().haptics
            && let Some(pattern) = haptic_pattern(event)
        {
            vibrate(pattern);
        }
    }
}
