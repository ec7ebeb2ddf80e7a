//! Tilt Maze entry point
//!
//! The browser build starts from `web::wasm_main`. Natively this is a
//! headless runner: `tilt-maze [level] [seed]` prints the generated layout as
//! JSON and lets a simple autopilot try to sink the ball.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use tilt_maze::Game;
    use tilt_maze::consts::ARENA_SIZE;
    use tilt_maze::persistence::{self, MemoryStorage};
    use tilt_maze::sim::{GameEvent, GamePhase, generate};

    const DT: f32 = 1.0 / 60.0;
    /// Autopilot gains: pull toward the hole, damp current velocity
    const PULL: f32 = 0.02;
    const DAMPING: f32 = 0.6;

    fn arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> T {
        match args.get(index) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid argument {:?}", raw);
                default
            }),
            None => default,
        }
    }

    pub fn run() {
        env_logger::init();

        let args: Vec<String> = std::env::args().collect();
        let level: u32 = arg(&args, 1, 1);
        let seed: u64 = arg(&args, 2, 0);
        log::info!("Tilt Maze (native) level {} seed {}", level, seed);

        let mut rng = Pcg32::seed_from_u64(seed);
        let Some(layout) = generate(level, &mut rng) else {
            eprintln!("Level must be at least 1");
            std::process::exit(2);
        };
        match serde_json::to_string_pretty(&layout) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to encode layout: {}", e),
        }

        let mut store = MemoryStorage::new();
        if let Err(e) = persistence::save(&mut store, "currentLevel", &level) {
            log::warn!("Failed to seed storage: {}", e);
        }
        let mut game = Game::new(store, seed, Vec2::splat(ARENA_SIZE));
        if let Err(e) = game.start() {
            log::error!("{}", e);
            return;
        }

        let register = game.tilt_register();
        let mut collisions = 0u32;
        loop {
            if let (Some(ball), Some(layout)) = (game.state.ball, game.state.layout.as_ref()) {
                let tilt = (layout.hole.center() - ball.pos) * PULL - ball.vel * DAMPING;
                register.store(tilt.clamp(Vec2::splat(-1.0), Vec2::splat(1.0)));
            }

            for event in game.tick(DT) {
                match event {
                    GameEvent::Collision(_) => collisions += 1,
                    GameEvent::Won { time, .. } => {
                        println!(
                            "Won level {} in {} ({} collisions)",
                            level,
                            tilt_maze::format_time(time),
                            collisions
                        );
                    }
                    GameEvent::Lost { reason, .. } => {
                        println!("Lost level {}: {:?} ({} collisions)", level, reason, collisions);
                    }
                    _ => {}
                }
            }

            if matches!(game.state.phase, GamePhase::Won | GamePhase::GameOver) {
                break;
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_main, this is just to satisfy the compiler
}
