//! Per-frame simulation tick
//!
//! One tick per display frame: countdown → tilt → physics → loss checks →
//! axis inversion → win check. Tilt is passed in explicitly; the caller reads
//! the latest value from the input register right before ticking.

use glam::Vec2;
use rand::Rng;

use super::physics::{self, is_ball_stopped};
use super::state::{GameEvent, GamePhase, GameState, LossReason, touches_border};
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Calibrated tilt in [-1, 1]²
    pub tilt: Vec2,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the session by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        state.toggle_pause();
    }

    match state.phase {
        GamePhase::Loading => {
            state.loading_remaining -= dt;
            if state.loading_remaining <= 0.0 {
                state.finish_loading();
            }
        }
        GamePhase::Playing => play(state, input.tilt, dt),
        GamePhase::Menu | GamePhase::Paused | GamePhase::Won | GamePhase::GameOver => {}
    }
}

fn play(state: &mut GameState, tilt: Vec2, dt: f32) {
    // Timer counts up; reaching the limit ends the attempt
    state.elapsed += dt;
    let limit = state.time_limit();
    if state.elapsed >= limit {
        state.elapsed = limit;
        lose(state, LossReason::TimeUp);
        return;
    }

    let tilt = tilt.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
    let tilt = if state.inversion.active() { -tilt } else { tilt };

    let arena = state.viewport;
    let params = state.settings.physics;
    let outcome = match (state.ball.as_mut(), state.layout.as_ref()) {
        (Some(ball), Some(layout)) => physics::step(ball, &layout.obstacles, arena, tilt, &params),
        _ => return,
    };

    if state.settings.lethal_border {
        let touching = state
            .ball
            .as_ref()
            .is_some_and(|b| touches_border(b, arena, state.settings.border_width));
        if touching {
            lose(state, LossReason::Border);
            return;
        }
    }

    if outcome.any() {
        state.push_event(GameEvent::Collision(outcome));
    }

    update_inversion(state, dt);

    if ball_at_rest_in_hole(state) {
        win(state);
    }
}

/// Count down an active inversion, or roll for the level's single one.
/// Only the roll depends on the setting; a running inversion always ends.
fn update_inversion(state: &mut GameState, dt: f32) {
    if state.inversion.active() {
        state.inversion.remaining -= dt;
        if !state.inversion.active() {
            state.inversion.remaining = 0.0;
            state.push_event(GameEvent::InversionEnded);
            log::info!("Axis inversion ended");
        }
        return;
    }

    if state.settings.axis_inversion
        && !state.inversion.triggered
        && state.elapsed > INVERSION_GRACE
        && state.rng_mut().random_bool(INVERSION_CHANCE)
    {
        state.inversion.triggered = true;
        state.inversion.remaining = INVERSION_DURATION;
        state.push_event(GameEvent::InversionStarted);
        log::info!("Axis inversion activated");
    }
}

/// Ball entirely inside the hole and nearly still
pub fn ball_at_rest_in_hole(state: &GameState) -> bool {
    let (Some(ball), Some(layout)) = (state.ball.as_ref(), state.layout.as_ref()) else {
        return false;
    };
    layout.hole.contains_ball(ball.pos, ball.radius)
        && is_ball_stopped(ball, state.settings.stillness_threshold)
}

fn win(state: &mut GameState) {
    let time = state.elapsed;
    state.phase = GamePhase::Won;
    state.last_completion_time = Some(time);
    state.push_event(GameEvent::Won {
        level: state.level,
        time,
    });
    log::info!("Level {} complete in {:.1}s", state.level, time);
}

fn lose(state: &mut GameState, reason: LossReason) {
    state.phase = GamePhase::GameOver;
    state.push_event(GameEvent::Lost {
        level: state.level,
        reason,
    });
    log::info!("Level {} lost: {:?}", state.level, reason);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::geometry::Hole;
    use crate::sim::level::{ArenaLayout, Tier};

    const DT: f32 = 1.0 / 60.0;

    fn open_layout() -> ArenaLayout {
        let difficulty = Tier::Tutorial.difficulty();
        ArenaLayout {
            level: 1,
            time_limit: difficulty.time_limit(),
            ball_start: Vec2::new(100.0, 100.0),
            hole: Hole::new(Vec2::new(300.0, 300.0), difficulty.hole_radius),
            obstacles: Vec::new(),
            difficulty,
        }
    }

    fn quiet_settings() -> Settings {
        Settings {
            level_load_delay: false,
            axis_inversion: false,
            ..Settings::default()
        }
    }

    fn playing_state() -> GameState {
        let mut state = GameState::new(42, Vec2::new(400.0, 400.0), quiet_settings());
        state.start_with_layout(open_layout());
        state.drain_events();
        state
    }

    #[test]
    fn test_tilt_moves_ball() {
        let mut state = playing_state();
        let input = TickInput {
            tilt: Vec2::new(1.0, 0.0),
            ..Default::default()
        };
        tick(&mut state, &input, DT);

        let ball = state.ball.unwrap();
        assert!((ball.pos.x - 100.49).abs() < 1e-4);
        assert!((state.elapsed - DT).abs() < 1e-6);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_fast_ball_over_hole_does_not_win() {
        let mut state = playing_state();
        let ball = state.ball.as_mut().unwrap();
        ball.pos = Vec2::new(300.0, 300.0);
        ball.vel = Vec2::new(5.0, 0.0);

        tick(&mut state, &TickInput::default(), DT);

        let ball = state.ball.unwrap();
        let hole = state.layout.as_ref().unwrap().hole;
        assert!(hole.contains_ball(ball.pos, ball.radius));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_still_ball_in_hole_wins() {
        let mut state = playing_state();
        // 17 + 12 < 30: just inside
        state.ball.as_mut().unwrap().pos = Vec2::new(317.0, 300.0);

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.phase, GamePhase::Won);
        assert_eq!(state.last_completion_time, Some(DT));
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Won { level: 1, time: DT }]
        );
    }

    #[test]
    fn test_still_ball_on_hole_rim_does_not_win() {
        let mut state = playing_state();
        // 18 + 12 == 30: not strictly inside
        state.ball.as_mut().unwrap().pos = Vec2::new(318.0, 300.0);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_time_up() {
        let mut state = playing_state();
        state.elapsed = 39.99;
        tick(&mut state, &TickInput::default(), 0.05);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.elapsed, 40.0);
        assert_eq!(state.remaining_time(), 0.0);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Lost {
                level: 1,
                reason: LossReason::TimeUp
            }]
        );
    }

    #[test]
    fn test_border_is_lethal() {
        let mut state = playing_state();
        let ball = state.ball.as_mut().unwrap();
        ball.pos = Vec2::new(30.0, 200.0);
        ball.vel = Vec2::new(-5.0, 0.0);

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(matches!(
            state.drain_events().as_slice(),
            [GameEvent::Lost {
                reason: LossReason::Border,
                ..
            }]
        ));
    }

    #[test]
    fn test_border_harmless_when_disabled() {
        let mut state = playing_state();
        state.settings.lethal_border = false;
        let ball = state.ball.as_mut().unwrap();
        ball.pos = Vec2::new(14.0, 200.0);
        ball.vel = Vec2::new(-5.0, 0.0);

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.ball.unwrap().pos.x, 12.0);
        assert!(matches!(
            state.drain_events().as_slice(),
            [GameEvent::Collision(outcome)] if outcome.wall_collision
        ));
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut state = playing_state();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let before = state.ball.unwrap();
        let tilt = TickInput {
            tilt: Vec2::new(1.0, 1.0),
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut state, &tilt, DT);
        }
        assert_eq!(state.ball.unwrap(), before);
        assert_eq!(state.elapsed, 0.0);

        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_loading_installs_level() {
        let settings = Settings {
            axis_inversion: false,
            ..Settings::default()
        };
        let mut state = GameState::new(9, Vec2::new(400.0, 400.0), settings);
        state.start_level(1).unwrap();
        assert_eq!(state.phase, GamePhase::Loading);

        // 0.6s delay for level 1
        for _ in 0..35 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.phase, GamePhase::Loading);
        assert!(state.ball.is_none());

        for _ in 0..2 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.ball.unwrap().pos, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_inversion_negates_tilt_and_expires() {
        let mut state = playing_state();
        state.settings.axis_inversion = true;
        state.inversion.triggered = true;
        state.inversion.remaining = INVERSION_DURATION;

        let input = TickInput {
            tilt: Vec2::new(1.0, 0.0),
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert!(state.ball.unwrap().vel.x < 0.0);
        assert!(state.snapshot().inverted);

        // Burn down the rest of the inversion
        state.inversion.remaining = DT / 2.0;
        state.drain_events();
        tick(&mut state, &TickInput::default(), DT);
        assert!(!state.inversion.active());
        assert!(state.drain_events().contains(&GameEvent::InversionEnded));
    }

    #[test]
    fn test_inversion_triggers_at_most_once() {
        let mut state = playing_state();
        state.settings.axis_inversion = true;
        state.layout.as_mut().unwrap().time_limit = 10_000.0;

        let mut started = 0;
        for _ in 0..20_000 {
            tick(&mut state, &TickInput::default(), DT);
            started += state
                .drain_events()
                .iter()
                .filter(|e| **e == GameEvent::InversionStarted)
                .count();
        }
        assert!(state.inversion.triggered);
        assert_eq!(started, 1);
    }

    #[test]
    fn test_inversion_expires_after_being_disabled() {
        let mut state = playing_state();
        state.settings.axis_inversion = true;
        state.inversion.triggered = true;
        state.inversion.remaining = INVERSION_DURATION;
        state.settings.axis_inversion = false;

        let mut ended = false;
        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), DT);
            ended |= state.drain_events().contains(&GameEvent::InversionEnded);
        }
        assert!(ended);
        assert!(!state.inversion.active());
        assert!(!state.snapshot().inverted);
    }

    #[test]
    fn test_disabled_inversion_never_starts() {
        let mut state = playing_state();
        state.layout.as_mut().unwrap().time_limit = 10_000.0;
        for _ in 0..20_000 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(!state.inversion.triggered);
    }

    #[test]
    fn test_no_inversion_during_grace() {
        let mut state = playing_state();
        state.settings.axis_inversion = true;
        for _ in 0..59 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(!state.inversion.triggered);
    }
}
