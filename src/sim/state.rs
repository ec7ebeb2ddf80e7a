//! Per-level session state
//!
//! The session owns the ball, the scaled layout and the timers for the level
//! being played. It moves through `Menu → Loading → Playing ⇄ Paused →
//! Won | GameOver`, and back to `Loading` on retry or next level.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::{Hole, Obstacle};
use super::level::{self, ArenaLayout};
use super::physics::{Ball, StepOutcome};
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No level running
    Menu,
    /// Level generated, waiting out the loading delay (no ball yet)
    Loading,
    Playing,
    /// Ticks are ignored until resumed
    Paused,
    /// Ball came to rest in the hole
    Won,
    /// Time ran out or the ball touched the border
    GameOver,
}

/// Why a level was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    TimeUp,
    Border,
}

/// Fire-and-forget notifications for audio/haptics and the driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    Collision(StepOutcome),
    Won { level: u32, time: f32 },
    Lost { level: u32, reason: LossReason },
    InversionStarted,
    InversionEnded,
    Calibrated,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid level index {0} (levels run from 1 to u32::MAX)")]
    InvalidLevel(u32),
}

/// One-shot "controls reversed" event per level
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisInversion {
    /// Already used up for this level
    pub triggered: bool,
    /// Seconds left while inverted
    pub remaining: f32,
}

impl AxisInversion {
    #[inline]
    pub fn active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// How close the ball is to the hole (for the renderer's hole highlight)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoleProximity {
    Away,
    Near,
    Inside,
}

/// Read-only view of the session handed to the renderer each frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub level: u32,
    pub difficulty: Option<&'static str>,
    pub arena: Vec2,
    /// Present when the border is lethal
    pub border_width: Option<f32>,
    pub ball: Option<Ball>,
    pub hole: Option<Hole>,
    pub obstacles: Vec<Obstacle>,
    pub inverted: bool,
    pub remaining_time: f32,
    pub hole_proximity: HoleProximity,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    rng: Pcg32,
    pub settings: Settings,
    /// Current level index (1-based)
    pub level: u32,
    pub phase: GamePhase,
    /// Viewport size; doubles as the physics arena
    pub viewport: Vec2,
    /// Layout of the running level, scaled to the viewport
    pub layout: Option<ArenaLayout>,
    /// Generated layout waiting for the loading delay to pass
    pub pending: Option<ArenaLayout>,
    pub ball: Option<Ball>,
    /// Seconds played this attempt (counts up)
    pub elapsed: f32,
    /// Seconds left of the loading delay
    pub loading_remaining: f32,
    pub inversion: AxisInversion,
    /// Elapsed time of the last won attempt
    pub last_completion_time: Option<f32>,
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(seed: u64, viewport: Vec2, settings: Settings) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            settings,
            level: 1,
            phase: GamePhase::Menu,
            viewport,
            layout: None,
            pending: None,
            ball: None,
            elapsed: 0.0,
            loading_remaining: 0.0,
            inversion: AxisInversion::default(),
            last_completion_time: None,
            events: Vec::new(),
        }
    }

    /// Generate `level` and begin it (after the loading delay, if enabled)
    pub fn start_level(&mut self, level: u32) -> Result<(), SessionError> {
        let layout = level::generate(level, &mut self.rng).ok_or(SessionError::InvalidLevel(level))?;

        self.level = level;
        self.layout = None;
        self.ball = None;

        if self.settings.level_load_delay {
            self.loading_remaining = load_delay(level);
            self.pending = Some(layout);
            self.phase = GamePhase::Loading;
            log::info!(
                "Loading level {} ({})",
                level,
                layout_tier_name(self.pending.as_ref())
            );
        } else {
            self.install(layout);
        }
        Ok(())
    }

    /// Begin a specific layout immediately, skipping generation and delay
    pub fn start_with_layout(&mut self, layout: ArenaLayout) {
        self.level = layout.level;
        self.install(layout);
    }

    /// Install the pending layout once the loading delay is over
    pub(crate) fn finish_loading(&mut self) {
        if let Some(layout) = self.pending.take() {
            self.install(layout);
        }
    }

    fn install(&mut self, layout: ArenaLayout) {
        let scaled = layout.scale_for_screen(self.viewport.x, self.viewport.y);
        let radius = Ball::radius_for_viewport(self.viewport.x, self.viewport.y);

        self.ball = Some(Ball::new(scaled.ball_start, radius));
        self.layout = Some(scaled);
        self.pending = None;
        self.loading_remaining = 0.0;
        self.elapsed = 0.0;
        self.inversion = AxisInversion::default();
        self.phase = GamePhase::Playing;
        self.push_event(GameEvent::LevelStarted { level: self.level });

        log::info!(
            "Level {} started ({}, {} obstacles, {:.0}s)",
            self.level,
            layout_tier_name(self.layout.as_ref()),
            self.layout.as_ref().map_or(0, |l| l.obstacles.len()),
            self.time_limit()
        );
    }

    /// Fresh layout for the same level
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.start_level(self.level)
    }

    pub fn next_level(&mut self) -> Result<(), SessionError> {
        let next = self
            .level
            .checked_add(1)
            .ok_or(SessionError::InvalidLevel(self.level))?;
        self.start_level(next)
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            log::info!("Paused");
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            log::info!("Resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => {}
        }
    }

    /// Abandon the current level
    pub fn return_to_menu(&mut self) {
        self.phase = GamePhase::Menu;
        self.ball = None;
        self.layout = None;
        self.pending = None;
        self.inversion = AxisInversion::default();
    }

    /// Track a viewport change. The running layout and ball are re-scaled
    /// in place so the level stays inside the new arena.
    pub fn resize(&mut self, viewport: Vec2) {
        let old = ArenaLayout::scale_factor(self.viewport.x, self.viewport.y);
        let new = ArenaLayout::scale_factor(viewport.x, viewport.y);
        self.viewport = viewport;
        if old <= 0.0 || new <= 0.0 || old == new {
            return;
        }

        let ratio = new / old;
        if let Some(layout) = self.layout.as_mut() {
            *layout = layout.scaled(ratio);
        }
        if let Some(ball) = self.ball.as_mut() {
            ball.pos *= ratio;
            ball.vel *= ratio;
            ball.radius = Ball::radius_for_viewport(viewport.x, viewport.y);
        }
        log::info!("Resized to {}x{} (scale x{:.2})", viewport.x, viewport.y, ratio);
    }

    pub fn time_limit(&self) -> f32 {
        self.layout.as_ref().map_or(0.0, |l| l.time_limit)
    }

    pub fn remaining_time(&self) -> f32 {
        (self.time_limit() - self.elapsed).max(0.0)
    }

    pub fn hole_proximity(&self) -> HoleProximity {
        let (Some(ball), Some(layout)) = (self.ball.as_ref(), self.layout.as_ref()) else {
            return HoleProximity::Away;
        };
        let hole = &layout.hole;
        if hole.contains_ball(ball.pos, ball.radius) {
            HoleProximity::Inside
        } else if ball.pos.distance(hole.center()) < hole.radius + ball.radius * 2.0 {
            HoleProximity::Near
        } else {
            HoleProximity::Away
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            level: self.level,
            difficulty: self
                .layout
                .as_ref()
                .or(self.pending.as_ref())
                .map(|l| l.difficulty.tier.name()),
            arena: self.viewport,
            border_width: self
                .settings
                .lethal_border
                .then_some(self.settings.border_width),
            ball: self.ball,
            hole: self.layout.as_ref().map(|l| l.hole),
            obstacles: self
                .layout
                .as_ref()
                .map(|l| l.obstacles.clone())
                .unwrap_or_default(),
            inverted: self.inversion.active(),
            remaining_time: self.remaining_time(),
            hole_proximity: self.hole_proximity(),
        }
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }
}

/// Artificial loading pause, longer for later levels (seconds)
pub fn load_delay(level: u32) -> f32 {
    0.5 + (level as f32 * 0.1).min(1.0)
}

fn layout_tier_name(layout: Option<&ArenaLayout>) -> &'static str {
    layout.map_or("?", |l| l.difficulty.tier.name())
}

/// True if the ball edge reaches into the lethal border strip
pub fn touches_border(ball: &Ball, arena: Vec2, border_width: f32) -> bool {
    ball.pos.x - ball.radius <= border_width
        || ball.pos.x + ball.radius >= arena.x - border_width
        || ball.pos.y - ball.radius <= border_width
        || ball.pos.y + ball.radius >= arena.y - border_width
}
