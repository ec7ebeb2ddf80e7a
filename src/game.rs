//! Game driver
//!
//! Owns the session and wires it to the outside: tilt register in, storage
//! at level boundaries, events out. Platform front-ends (browser, native
//! runner) only talk to this type.

use glam::Vec2;

use crate::input::{Calibration, TiltRegister};
use crate::persistence::{Progress, Storage};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, SessionError, Snapshot, TickInput, tick};

/// Vibration pattern (milliseconds on/off) for an event, if any
pub fn haptic_pattern(event: &GameEvent) -> Option<&'static [u32]> {
    match event {
        GameEvent::Collision(_) => Some(&[30]),
        GameEvent::Won { .. } => Some(&[100, 50, 100]),
        GameEvent::Lost { .. } => Some(&[300]),
        GameEvent::Calibrated => Some(&[100]),
        GameEvent::LevelStarted { .. }
        | GameEvent::InversionStarted
        | GameEvent::InversionEnded => None,
    }
}

pub struct Game<S: Storage> {
    pub state: GameState,
    storage: S,
    progress: Progress,
    tilt: TiltRegister,
}

impl<S: Storage> Game<S> {
    /// Load settings and progress from `storage` and sit in the menu
    pub fn new(storage: S, seed: u64, viewport: Vec2) -> Self {
        let settings = Settings::load(&storage);
        let progress = Progress::load(&storage);

        let mut state = GameState::new(seed, viewport, settings);
        state.level = progress.current_level;

        Self {
            state,
            storage,
            progress,
            tilt: TiltRegister::new(),
        }
    }

    /// Handle for the orientation callback to write into
    pub fn tilt_register(&self) -> TiltRegister {
        self.tilt.clone()
    }

    /// Feed a raw orientation reading (degrees)
    pub fn on_orientation(&self, beta: f32, gamma: f32) {
        self.tilt.store(self.progress.calibration.tilt(beta, gamma));
    }

    /// Use the given orientation as the new resting position
    pub fn calibrate(&mut self, beta: f32, gamma: f32) -> GameEvent {
        self.progress.calibration = Calibration::from_orientation(beta, gamma);
        if let Err(e) = self.progress.save_calibration(&mut self.storage) {
            log::warn!("Failed to save calibration: {}", e);
        }
        log::info!("Calibrated at beta={:.1} gamma={:.1}", beta, gamma);
        GameEvent::Calibrated
    }

    /// Start (or continue from) the saved level
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.state.start_level(self.progress.current_level)
    }

    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.state.restart()
    }

    pub fn next_level(&mut self) -> Result<(), SessionError> {
        self.state.next_level()?;
        self.progress.current_level = self.state.level;
        if let Err(e) = self.progress.save_level(&mut self.storage) {
            log::warn!("Failed to save level: {}", e);
        }
        Ok(())
    }

    pub fn pause(&mut self) {
        self.state.pause();
    }

    pub fn resume(&mut self) {
        self.state.resume();
    }

    /// Window lost focus or page hidden
    pub fn on_focus_lost(&mut self) {
        if self.state.phase == GamePhase::Playing {
            log::info!("Auto-paused (focus lost)");
            self.state.pause();
        }
    }

    pub fn menu(&mut self) {
        self.state.return_to_menu();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(Vec2::new(width, height));
    }

    /// Run one frame with the latest tilt and return the events it produced
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        let input = TickInput {
            tilt: self.tilt.load(),
            pause: false,
        };
        tick(&mut self.state, &input, dt);

        let events = self.state.drain_events();
        for event in &events {
            if let GameEvent::Won { time, .. } = *event
                && self.progress.record_completion(time)
            {
                log::info!("New best time: {:.1}s", time);
                if let Err(e) = self.progress.save_best_time(&mut self.storage) {
                    log::warn!("Failed to save best time: {}", e);
                }
            }
        }
        events
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    /// Replace and persist the settings
    pub fn update_settings(&mut self, settings: Settings) {
        if let Err(e) = settings.save(&mut self.storage) {
            log::warn!("Failed to save settings: {}", e);
        }
        self.state.settings = settings;
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
