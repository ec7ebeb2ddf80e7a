//! Ball physics: tilt gravity, wall bounces and obstacle collisions
//!
//! One call to [`step`] advances the ball by one frame. Integration is plain
//! explicit Euler with no substeps; all constants are per-tick quantities.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Obstacle;
use crate::consts::*;

/// The player's ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Acceleration applied during the last step (recomputed every step)
    pub acc: Vec2,
    pub radius: f32,
}

impl Ball {
    /// Ball at rest at `pos`
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            radius,
        }
    }

    /// Ball radius for a viewport of the given size
    pub fn radius_for_viewport(width: f32, height: f32) -> f32 {
        width.min(height) * BALL_RADIUS_FRACTION
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Tunable physics coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParams {
    pub gravity: f32,
    pub friction: f32,
    pub bounce: f32,
    pub max_velocity: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            bounce: BOUNCE,
            max_velocity: MAX_VELOCITY,
        }
    }
}

/// What the ball touched during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub wall_collision: bool,
    pub obstacle_collision: bool,
}

impl StepOutcome {
    pub fn any(&self) -> bool {
        self.wall_collision || self.obstacle_collision
    }
}

/// Advance the ball one tick and resolve every collision.
///
/// `arena` is the arena size (width, height); `tilt` is expected in [-1, 1]².
pub fn step(
    ball: &mut Ball,
    obstacles: &[Obstacle],
    arena: Vec2,
    tilt: Vec2,
    params: &PhysicsParams,
) -> StepOutcome {
    apply_gravity(ball, tilt, params);
    ball.pos += ball.vel;

    let wall_collision = resolve_walls(ball, arena, params.bounce);

    // Every obstacle is checked; a push out of one may push into another
    let mut obstacle_collision = false;
    for obstacle in obstacles {
        obstacle_collision |= resolve_obstacle(ball, obstacle, params.bounce);
    }

    StepOutcome {
        wall_collision,
        obstacle_collision,
    }
}

/// Accelerate along the tilt, clamp per component, then apply friction
fn apply_gravity(ball: &mut Ball, tilt: Vec2, params: &PhysicsParams) {
    ball.acc = tilt * params.gravity;
    ball.vel += ball.acc;
    ball.vel = ball
        .vel
        .clamp(Vec2::splat(-params.max_velocity), Vec2::splat(params.max_velocity));
    ball.vel *= params.friction;
}

/// Keep the ball inside the arena; each edge is handled independently
fn resolve_walls(ball: &mut Ball, arena: Vec2, bounce: f32) -> bool {
    let mut collided = false;
    let r = ball.radius;

    if ball.pos.x - r < 0.0 {
        ball.pos.x = r;
        ball.vel.x = -ball.vel.x * bounce;
        collided = true;
    }
    if ball.pos.x + r > arena.x {
        ball.pos.x = arena.x - r;
        ball.vel.x = -ball.vel.x * bounce;
        collided = true;
    }
    if ball.pos.y - r < 0.0 {
        ball.pos.y = r;
        ball.vel.y = -ball.vel.y * bounce;
        collided = true;
    }
    if ball.pos.y + r > arena.y {
        ball.pos.y = arena.y - r;
        ball.vel.y = -ball.vel.y * bounce;
        collided = true;
    }

    collided
}

/// Detect and resolve a collision with one obstacle
pub fn resolve_obstacle(ball: &mut Ball, obstacle: &Obstacle, bounce: f32) -> bool {
    if !obstacle.overlaps_circle(ball.pos, ball.radius) {
        return false;
    }
    match *obstacle {
        Obstacle::Rectangle {
            x,
            y,
            width,
            height,
        } => resolve_rect(ball, x, y, width, height, bounce),
        Obstacle::Circle { x, y, radius } => resolve_circle(ball, Vec2::new(x, y), radius, bounce),
    }
    true
}

/// Push the ball out along the axis of least penetration and reflect that
/// velocity component only
fn resolve_rect(ball: &mut Ball, x: f32, y: f32, width: f32, height: f32, bounce: f32) {
    let r = ball.radius;
    let left = (ball.pos.x + r) - x;
    let right = (x + width) - (ball.pos.x - r);
    let top = (ball.pos.y + r) - y;
    let bottom = (y + height) - (ball.pos.y - r);

    let min = left.min(right).min(top).min(bottom);

    if min == left {
        ball.pos.x = x - r;
        ball.vel.x = -ball.vel.x.abs() * bounce;
    } else if min == right {
        ball.pos.x = x + width + r;
        ball.vel.x = ball.vel.x.abs() * bounce;
    } else if min == top {
        ball.pos.y = y - r;
        ball.vel.y = -ball.vel.y.abs() * bounce;
    } else {
        ball.pos.y = y + height + r;
        ball.vel.y = ball.vel.y.abs() * bounce;
    }
}

/// Split correction: move half the overlap along the center line, then
/// reflect about the normal with bounce attenuation
fn resolve_circle(ball: &mut Ball, center: Vec2, radius: f32, bounce: f32) {
    let delta = ball.pos - center;
    let distance = delta.length();
    if distance <= 0.0 {
        // Concentric: no defined normal
        return;
    }

    let normal = delta / distance;
    let overlap = ball.radius + radius - distance;
    ball.pos += normal * overlap * 0.5;

    let v_dot_n = ball.vel.dot(normal);
    ball.vel -= 2.0 * v_dot_n * normal * bounce;
}

/// True if the ball's speed is below `threshold`
#[inline]
pub fn is_ball_stopped(ball: &Ball, threshold: f32) -> bool {
    ball.speed() < threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ARENA: Vec2 = Vec2::new(400.0, 400.0);

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_single_tick_from_rest() {
        let mut ball = Ball::new(Vec2::new(100.0, 100.0), 12.0);
        let outcome = step(
            &mut ball,
            &[],
            ARENA,
            Vec2::new(1.0, 0.0),
            &PhysicsParams::default(),
        );

        assert!(approx(ball.acc.x, 0.5));
        assert!(approx(ball.vel.x, 0.49));
        assert!(approx(ball.pos.x, 100.49));
        assert_eq!(ball.pos.y, 100.0);
        assert_eq!(outcome, StepOutcome::default());
    }

    #[test]
    fn test_velocity_clamped_before_friction() {
        let mut ball = Ball::new(Vec2::new(200.0, 200.0), 12.0);
        ball.vel = Vec2::new(14.9, -14.9);
        step(
            &mut ball,
            &[],
            ARENA,
            Vec2::new(1.0, -1.0),
            &PhysicsParams::default(),
        );
        assert!(approx(ball.vel.x, 15.0 * 0.98));
        assert!(approx(ball.vel.y, -15.0 * 0.98));
    }

    #[test]
    fn test_wall_bounce() {
        let mut ball = Ball::new(Vec2::new(395.0, 200.0), 12.0);
        ball.vel = Vec2::new(10.0, 0.0);
        let outcome = step(&mut ball, &[], ARENA, Vec2::ZERO, &PhysicsParams::default());

        assert!(outcome.wall_collision);
        assert!(!outcome.obstacle_collision);
        assert!(approx(ball.pos.x, 388.0));
        assert!(approx(ball.vel.x, -10.0 * 0.98 * 0.7));
    }

    #[test]
    fn test_corner_bounce_both_axes() {
        let mut ball = Ball::new(Vec2::new(5.0, 5.0), 12.0);
        ball.vel = Vec2::new(-3.0, -3.0);
        let outcome = step(&mut ball, &[], ARENA, Vec2::ZERO, &PhysicsParams::default());

        assert!(outcome.wall_collision);
        assert_eq!(ball.pos, Vec2::new(12.0, 12.0));
        assert!(ball.vel.x > 0.0 && ball.vel.y > 0.0);
    }

    #[test]
    fn test_rect_resolves_to_tangent() {
        // Ball overlapping the left face by 4 units
        let rect = Obstacle::Rectangle {
            x: 100.0,
            y: 50.0,
            width: 40.0,
            height: 100.0,
        };
        let mut ball = Ball::new(Vec2::new(92.0, 100.0), 12.0);
        ball.vel = Vec2::new(3.0, 1.0);

        assert!(resolve_obstacle(&mut ball, &rect, BOUNCE));
        assert_eq!(ball.pos.x + ball.radius, 100.0);
        assert_eq!(ball.pos.y, 100.0);
        assert!(approx(ball.vel.x, -3.0 * BOUNCE));
        assert_eq!(ball.vel.y, 1.0);
    }

    #[test]
    fn test_rect_bottom_face() {
        let rect = Obstacle::Rectangle {
            x: 100.0,
            y: 50.0,
            width: 100.0,
            height: 20.0,
        };
        let mut ball = Ball::new(Vec2::new(150.0, 80.0), 12.0);
        ball.vel = Vec2::new(0.5, -2.0);

        assert!(resolve_obstacle(&mut ball, &rect, BOUNCE));
        assert_eq!(ball.pos.y - ball.radius, 70.0);
        assert!(approx(ball.vel.y, 2.0 * BOUNCE));
        assert_eq!(ball.vel.x, 0.5);
    }

    #[test]
    fn test_rect_miss_near_corner() {
        let rect = Obstacle::Rectangle {
            x: 100.0,
            y: 100.0,
            width: 20.0,
            height: 20.0,
        };
        // Diagonal distance to the corner is ~14.1 > 12
        let mut ball = Ball::new(Vec2::new(90.0, 90.0), 12.0);
        assert!(!resolve_obstacle(&mut ball, &rect, BOUNCE));
        assert_eq!(ball.pos, Vec2::new(90.0, 90.0));
    }

    #[test]
    fn test_circle_split_correction() {
        let obstacle = Obstacle::circle(Vec2::new(100.0, 100.0), 20.0);
        // Overlap of 4 along +x
        let mut ball = Ball::new(Vec2::new(128.0, 100.0), 12.0);
        ball.vel = Vec2::new(-5.0, 0.0);

        assert!(resolve_obstacle(&mut ball, &obstacle, BOUNCE));
        assert!(approx(ball.pos.x, 130.0));
        // v - 2(v·n)n*bounce = -5 - 2*(-5)*0.7 = 2
        assert!(approx(ball.vel.x, 2.0));
        assert!(approx(ball.vel.y, 0.0));
    }

    #[test]
    fn test_concentric_circle_does_not_produce_nan() {
        let obstacle = Obstacle::circle(Vec2::new(100.0, 100.0), 20.0);
        let mut ball = Ball::new(Vec2::new(100.0, 100.0), 12.0);
        assert!(resolve_obstacle(&mut ball, &obstacle, BOUNCE));
        assert!(ball.pos.is_finite());
        assert!(ball.vel.is_finite());
    }

    #[test]
    fn test_obstacle_flags_accumulate() {
        let obstacles = [
            Obstacle::Rectangle {
                x: 300.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
            },
            Obstacle::circle(Vec2::new(100.0, 100.0), 10.0),
        ];
        let mut ball = Ball::new(Vec2::new(118.0, 100.0), 12.0);
        let outcome = step(
            &mut ball,
            &obstacles,
            ARENA,
            Vec2::ZERO,
            &PhysicsParams::default(),
        );
        assert!(outcome.obstacle_collision);
        assert!(!outcome.wall_collision);
        assert!(outcome.any());
    }

    #[test]
    fn test_zero_tilt_rest_stays_at_rest() {
        let mut ball = Ball::new(Vec2::new(200.0, 200.0), 12.0);
        for _ in 0..100 {
            step(&mut ball, &[], ARENA, Vec2::ZERO, &PhysicsParams::default());
        }
        assert_eq!(ball.pos, Vec2::new(200.0, 200.0));
        assert!(is_ball_stopped(&ball, STILLNESS_THRESHOLD));
    }

    #[test]
    fn test_is_ball_stopped_threshold() {
        let mut ball = Ball::new(Vec2::ZERO, 5.0);
        ball.vel = Vec2::new(0.6, 0.8);
        assert!(!is_ball_stopped(&ball, 1.0));
        assert!(is_ball_stopped(&ball, 1.01));
    }

    #[test]
    fn test_radius_for_viewport() {
        assert!(approx(Ball::radius_for_viewport(800.0, 400.0), 12.0));
    }

    proptest! {
        #[test]
        fn prop_ball_stays_in_arena(
            x in 0.0f32..400.0,
            y in 0.0f32..400.0,
            vx in -15.0f32..15.0,
            vy in -15.0f32..15.0,
            tx in -1.0f32..=1.0,
            ty in -1.0f32..=1.0,
            radius in 2.0f32..40.0,
        ) {
            let mut ball = Ball::new(Vec2::new(x, y), radius);
            ball.vel = Vec2::new(vx, vy);
            step(&mut ball, &[], ARENA, Vec2::new(tx, ty), &PhysicsParams::default());
            prop_assert!(ball.pos.x >= radius && ball.pos.x <= 400.0 - radius);
            prop_assert!(ball.pos.y >= radius && ball.pos.y <= 400.0 - radius);
        }

        #[test]
        fn prop_friction_decay(
            vx in -15.0f32..15.0,
            vy in -15.0f32..15.0,
            n in 1usize..60,
        ) {
            // Large arena so no wall is reached
            let arena = Vec2::splat(100_000.0);
            let mut ball = Ball::new(Vec2::splat(50_000.0), 10.0);
            ball.vel = Vec2::new(vx, vy);
            let v0 = ball.speed();
            let mut previous = v0;
            for _ in 0..n {
                step(&mut ball, &[], arena, Vec2::ZERO, &PhysicsParams::default());
                prop_assert!(ball.speed() <= previous + 1e-6);
                previous = ball.speed();
            }
            let expected = v0 * FRICTION.powi(n as i32);
            prop_assert!((ball.speed() - expected).abs() <= 1e-3 * v0.max(1.0));
        }
    }
}
