//! Procedural level generation
//!
//! Levels are laid out in a fixed 400×400 logical arena and scaled to the
//! viewport afterwards. Placement is rejection sampling with bounded retries;
//! the hole is only accepted if a straight run from the ball start reaches it
//! without touching an obstacle, which keeps every generated level solvable.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::geometry::{
    Footprint, Hole, MIN_CIRCLE_RADIUS, MIN_RECT_HEIGHT, MIN_RECT_WIDTH, Obstacle,
};
use crate::consts::*;

/// Ball start inset from the arena edge
pub const START_INSET: f32 = 50.0;
/// Space reserved around the ball start while placing obstacles
pub const START_CLEARANCE: f32 = 20.0;
/// Base gap between obstacles
pub const OBSTACLE_MARGIN: f32 = 25.0;
/// Base gap between the hole and everything else
pub const HOLE_MARGIN: f32 = 60.0;
/// Gaps never shrink below this, whatever the tier
pub const MIN_MARGIN: f32 = 15.0;
pub const OBSTACLE_ATTEMPTS: usize = 100;
pub const HOLE_ATTEMPTS: usize = 150;
/// An obstacle that fits nowhere is shrunk by this factor and retried
pub const SHRINK_FACTOR: f32 = 0.75;
pub const SHRINK_STEPS: u32 = 3;
/// Fresh obstacle layouts tried per obstacle count before dropping one
pub const LAYOUT_ATTEMPTS: usize = 8;
/// Points sampled along the start→hole line
pub const PATH_SAMPLES: usize = 50;
/// Hole center stays this far (plus its radius) from the arena edge after drift
pub const HOLE_EDGE_MARGIN: f32 = 30.0;
/// Holes drift off their sampled spot past this level
pub const HOLE_DRIFT_START_LEVEL: u32 = 10;
pub const HOLE_DRIFT_MAX: f32 = 15.0;
pub const HOLE_DRIFT_PER_LEVEL: f32 = 1.5;
/// Probability an obstacle is a rectangle rather than a circle
pub const RECT_PROBABILITY: f64 = 0.65;

/// Ball radius in arena units, used when sweeping the start→hole path
pub const PATH_BALL_RADIUS: f32 = ARENA_SIZE * BALL_RADIUS_FRACTION;

/// Anchor spots (as arena fractions) used when sampling runs out of attempts
const FALLBACK_ANCHORS: [(f32, f32); 6] = [
    (0.8, 0.8),
    (0.2, 0.8),
    (0.8, 0.2),
    (0.2, 0.2),
    (0.5, 0.8),
    (0.8, 0.5),
];

/// Difficulty bands, in level order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Tutorial,
    Easy,
    Normal,
    Hard,
    Expert,
    Master,
}

impl Tier {
    pub const ALL: [Tier; 6] = [
        Tier::Tutorial,
        Tier::Easy,
        Tier::Normal,
        Tier::Hard,
        Tier::Expert,
        Tier::Master,
    ];

    /// Tier for a 1-based level index
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=1 => Tier::Tutorial,
            2..=5 => Tier::Easy,
            6..=15 => Tier::Normal,
            16..=30 => Tier::Hard,
            31..=75 => Tier::Expert,
            _ => Tier::Master,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Tutorial => "Tutorial",
            Tier::Easy => "Easy",
            Tier::Normal => "Normal",
            Tier::Hard => "Hard",
            Tier::Expert => "Expert",
            Tier::Master => "Master",
        }
    }

    pub fn difficulty(&self) -> DifficultyTier {
        let (obstacle_range, time_bonus, hole_radius) = match self {
            Tier::Tutorial => ((0, 1), 10.0, 30.0),
            Tier::Easy => ((1, 3), 5.0, 28.0),
            Tier::Normal => ((2, 5), 0.0, 25.0),
            Tier::Hard => ((3, 7), -5.0, 23.0),
            Tier::Expert => ((5, 10), -10.0, 20.0),
            Tier::Master => ((7, 15), -15.0, 18.0),
        };
        DifficultyTier {
            tier: *self,
            obstacle_range,
            time_bonus,
            hole_radius,
        }
    }
}

/// Parameters fixed by a tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTier {
    pub tier: Tier,
    /// Inclusive obstacle count range
    pub obstacle_range: (u32, u32),
    /// Seconds added to (or taken from) the base time limit
    pub time_bonus: f32,
    pub hole_radius: f32,
}

impl DifficultyTier {
    pub fn for_level(level: u32) -> Self {
        Tier::for_level(level).difficulty()
    }

    pub fn time_limit(&self) -> f32 {
        (BASE_TIME_LIMIT + self.time_bonus).max(MIN_TIME_LIMIT)
    }

    fn spread(&self) -> f32 {
        (self.obstacle_range.1 - self.obstacle_range.0) as f32
    }

    /// 0..=1, grows with the width of the obstacle range
    fn complexity(&self) -> f32 {
        (self.spread() / 10.0).min(1.0)
    }

    /// Harder tiers pack things tighter
    fn margin(&self, base: f32) -> f32 {
        (base - self.spread() * 2.0).max(MIN_MARGIN)
    }
}

/// A generated level, in logical arena units until scaled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaLayout {
    pub level: u32,
    /// Seconds allowed to finish the level
    pub time_limit: f32,
    pub ball_start: Vec2,
    pub hole: Hole,
    pub obstacles: Vec<Obstacle>,
    pub difficulty: DifficultyTier,
}

impl ArenaLayout {
    /// Uniform factor mapping the logical arena onto a viewport
    pub fn scale_factor(viewport_width: f32, viewport_height: f32) -> f32 {
        viewport_width.min(viewport_height) / ARENA_SIZE
    }

    /// Copy of this layout with every position and size scaled to the viewport
    pub fn scale_for_screen(&self, viewport_width: f32, viewport_height: f32) -> ArenaLayout {
        self.scaled(Self::scale_factor(viewport_width, viewport_height))
    }

    /// Copy with every position and size multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> ArenaLayout {
        ArenaLayout {
            level: self.level,
            time_limit: self.time_limit,
            ball_start: self.ball_start * factor,
            hole: self.hole.scaled(factor),
            obstacles: self.obstacles.iter().map(|o| o.scaled(factor)).collect(),
            difficulty: self.difficulty,
        }
    }

    /// Straight-line reachability of the hole for a ball of `ball_radius`
    pub fn hole_reachable(&self, ball_radius: f32) -> bool {
        path_is_clear(
            self.ball_start,
            self.hole.center(),
            &self.obstacles,
            ball_radius,
        )
    }
}

/// True if a ball of `radius` can travel in a straight line from `from` to
/// `to` without touching any obstacle (checked at discrete samples)
pub fn path_is_clear(from: Vec2, to: Vec2, obstacles: &[Obstacle], radius: f32) -> bool {
    (0..=PATH_SAMPLES).all(|i| {
        let point = from.lerp(to, i as f32 / PATH_SAMPLES as f32);
        !obstacles.iter().any(|o| o.overlaps_circle(point, radius))
    })
}

/// Generate a level. Returns `None` for level 0.
pub fn generate<R: Rng>(level: u32, rng: &mut R) -> Option<ArenaLayout> {
    if level == 0 {
        return None;
    }
    Some(build_layout(level, DifficultyTier::for_level(level), rng))
}

fn build_layout<R: Rng>(level: u32, difficulty: DifficultyTier, rng: &mut R) -> ArenaLayout {
    let (min, max) = difficulty.obstacle_range;
    let mut count = rng.random_range(min..=max);
    let ball_start = choose_ball_start(level, rng);
    let layout = |hole: Vec2, obstacles: Vec<Obstacle>| ArenaLayout {
        level,
        time_limit: difficulty.time_limit(),
        ball_start,
        hole: Hole::new(hole, difficulty.hole_radius),
        obstacles,
        difficulty,
    };

    loop {
        for _ in 0..LAYOUT_ATTEMPTS {
            let obstacles = place_obstacles(count, &difficulty, ball_start, rng);
            if let Some(spot) = place_hole(&obstacles, ball_start, &difficulty, rng) {
                let spot = drift_hole(level, spot, &obstacles, ball_start, &difficulty, rng);
                return layout(spot, obstacles);
            }
        }

        if count == 0 {
            break;
        }
        log::debug!(
            "Level {}: no reachable hole with {} obstacles, retrying with {}",
            level,
            count,
            count - 1
        );
        count -= 1;
    }

    // Nothing left to block the path, so the farthest corner always works
    let spot = farthest_corner(ball_start, difficulty.hole_radius);
    log::debug!("Level {}: hole fell back to corner {:?}", level, spot);
    layout(spot, Vec::new())
}

fn choose_ball_start<R: Rng>(level: u32, rng: &mut R) -> Vec2 {
    let near = START_INSET;
    let far = ARENA_SIZE - START_INSET;

    if level == 1 {
        return Vec2::new(near, near);
    }

    if level <= 5 {
        let corners = [
            Vec2::new(near, near),
            Vec2::new(far, near),
            Vec2::new(near, far),
        ];
        return corners[rng.random_range(0..corners.len())];
    }

    let along = near + rng.random::<f32>() * (far - near);
    match rng.random_range(0..4) {
        0 => Vec2::new(along, near), // top
        1 => Vec2::new(far, along),  // right
        2 => Vec2::new(along, far),  // bottom
        _ => Vec2::new(near, along), // left
    }
}

/// Draw an obstacle shape (not yet positioned) sized for the tier.
/// Returns the obstacle centered at the origin.
fn random_shape<R: Rng>(difficulty: &DifficultyTier, rng: &mut R) -> Obstacle {
    let complexity = difficulty.complexity();

    if rng.random_bool(RECT_PROBABILITY) {
        let variability = 1.0 + complexity * 0.8;
        let width = (15.0 + rng.random::<f32>() * 25.0) * variability;
        let height = (30.0 + rng.random::<f32>() * 80.0) * variability;
        Obstacle::rect_centered(Vec2::ZERO, width.max(MIN_RECT_WIDTH), height.max(MIN_RECT_HEIGHT))
    } else {
        let variability = 1.0 + complexity * 0.5;
        let radius = (12.0 + rng.random::<f32>() * 18.0) * variability;
        Obstacle::circle(Vec2::ZERO, radius.max(MIN_CIRCLE_RADIUS))
    }
}

fn move_to(shape: Obstacle, center: Vec2) -> Obstacle {
    match shape {
        Obstacle::Rectangle { width, height, .. } => Obstacle::rect_centered(center, width, height),
        Obstacle::Circle { radius, .. } => Obstacle::circle(center, radius),
    }
}

fn place_obstacles<R: Rng>(
    count: u32,
    difficulty: &DifficultyTier,
    ball_start: Vec2,
    rng: &mut R,
) -> Vec<Obstacle> {
    let margin = difficulty.margin(OBSTACLE_MARGIN);
    let mut placed = vec![Footprint::new(ball_start, START_CLEARANCE)];
    let mut obstacles = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let shape = random_shape(difficulty, rng);
        match place_obstacle(shape, &placed, &obstacles, ball_start, margin, rng) {
            Some(obstacle) => {
                placed.push(Footprint::from(&obstacle));
                obstacles.push(obstacle);
            }
            None => log::debug!(
                "Dropped obstacle of radius {:.1}: no free spot",
                shape.placement_radius()
            ),
        }
    }

    obstacles
}

/// Find a spot for `shape`: random samples, then the fixed anchors, then the
/// same again with a smaller shape. `None` only once shrinking runs out.
fn place_obstacle<R: Rng>(
    mut shape: Obstacle,
    placed: &[Footprint],
    obstacles: &[Obstacle],
    ball_start: Vec2,
    margin: f32,
    rng: &mut R,
) -> Option<Obstacle> {
    for attempt in 0..=SHRINK_STEPS {
        if attempt > 0 {
            shape = shape.shrunk(SHRINK_FACTOR);
        }
        let radius = shape.placement_radius();
        let fits = |center: Vec2| {
            let candidate = move_to(shape, center);
            candidate.inside(ARENA_SIZE)
                && !candidate.overlaps_circle(ball_start, START_CLEARANCE)
                && !obstacles.iter().any(|o| o.intersects(&candidate))
        };

        let spot = sample_position(placed, radius, margin, OBSTACLE_ATTEMPTS, rng, fits)
            .or_else(|| anchor_position(placed, radius, margin, rng, fits));
        if let Some(center) = spot {
            if attempt > 0 {
                log::debug!("Obstacle shrunk {} time(s) to fit", attempt);
            }
            return Some(move_to(shape, center));
        }
    }
    None
}

/// Hole spot reachable from the start. The clearance to obstacles is
/// relaxed step by step before giving up.
fn place_hole<R: Rng>(
    obstacles: &[Obstacle],
    ball_start: Vec2,
    difficulty: &DifficultyTier,
    rng: &mut R,
) -> Option<Vec2> {
    let radius = difficulty.hole_radius;

    let mut placed = vec![Footprint::new(ball_start, START_CLEARANCE)];
    placed.extend(obstacles.iter().map(Footprint::from));

    let reachable = |spot: Vec2| {
        !obstacles.iter().any(|o| o.overlaps_circle(spot, radius))
            && path_is_clear(ball_start, spot, obstacles, PATH_BALL_RADIUS)
    };

    let margins = [
        difficulty.margin(HOLE_MARGIN),
        difficulty.margin(OBSTACLE_MARGIN),
        MIN_MARGIN,
    ];
    margins.into_iter().find_map(|margin| {
        sample_position(&placed, radius, margin, HOLE_ATTEMPTS, rng, reachable)
            .or_else(|| anchor_position(&placed, radius, margin, rng, reachable))
    })
}

/// Rejection-sample a spot for a footprint of `radius` that clears every
/// placed footprint by `margin` and passes `accept`
fn sample_position<R: Rng, F: Fn(Vec2) -> bool>(
    placed: &[Footprint],
    radius: f32,
    margin: f32,
    attempts: usize,
    rng: &mut R,
    accept: F,
) -> Option<Vec2> {
    let lo = margin + radius;
    let hi = ARENA_SIZE - margin - radius;
    if hi <= lo {
        return None;
    }

    (0..attempts).find_map(|_| {
        let spot = Vec2::new(rng.random_range(lo..hi), rng.random_range(lo..hi));
        let clear = placed.iter().all(|p| p.clears(spot, radius, margin));
        (clear && accept(spot)).then_some(spot)
    })
}

/// First fallback anchor, in random order, that keeps a footprint of
/// `radius` inside the arena, clears everything placed and passes `accept`
fn anchor_position<R: Rng, F: Fn(Vec2) -> bool>(
    placed: &[Footprint],
    radius: f32,
    margin: f32,
    rng: &mut R,
    accept: F,
) -> Option<Vec2> {
    let mut anchors = FALLBACK_ANCHORS.map(|(fx, fy)| Vec2::new(fx, fy) * ARENA_SIZE);
    anchors.shuffle(rng);
    anchors.into_iter().find(|&spot| {
        spot.cmpge(Vec2::splat(radius)).all()
            && spot.cmple(Vec2::splat(ARENA_SIZE - radius)).all()
            && placed.iter().all(|p| p.clears(spot, radius, margin))
            && accept(spot)
    })
}

/// Nudge the hole by a small random offset on later levels.
/// The nudge is discarded if it would make the hole unreachable or overlap
/// an obstacle.
fn drift_hole<R: Rng>(
    level: u32,
    spot: Vec2,
    obstacles: &[Obstacle],
    ball_start: Vec2,
    difficulty: &DifficultyTier,
    rng: &mut R,
) -> Vec2 {
    if level <= HOLE_DRIFT_START_LEVEL {
        return spot;
    }

    let max_drift = ((level - HOLE_DRIFT_START_LEVEL) as f32 * HOLE_DRIFT_PER_LEVEL).min(HOLE_DRIFT_MAX);
    let distance = rng.random::<f32>() * max_drift;
    let angle = rng.random::<f32>() * TAU;

    let radius = difficulty.hole_radius;
    let lo = radius + HOLE_EDGE_MARGIN;
    let hi = ARENA_SIZE - radius - HOLE_EDGE_MARGIN;
    let drifted = (spot + Vec2::from_angle(angle) * distance).clamp(Vec2::splat(lo), Vec2::splat(hi));

    let overlaps = obstacles.iter().any(|o| {
        o.overlaps_circle(drifted, radius) || !Footprint::from(o).clears(drifted, radius, 0.0)
    });
    if overlaps || !path_is_clear(ball_start, drifted, obstacles, PATH_BALL_RADIUS) {
        return spot;
    }
    drifted
}

/// Inset arena corner farthest from `from`
fn farthest_corner(from: Vec2, hole_radius: f32) -> Vec2 {
    let lo = hole_radius + HOLE_EDGE_MARGIN;
    let hi = ARENA_SIZE - lo;
    [
        Vec2::new(lo, lo),
        Vec2::new(hi, lo),
        Vec2::new(lo, hi),
        Vec2::new(hi, hi),
    ]
    .into_iter()
    .max_by(|a, b| a.distance(from).total_cmp(&b.distance(from)))
    .unwrap_or(Vec2::new(hi, hi))
}
