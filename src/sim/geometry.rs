//! Arena geometry shared by physics and level generation
//!
//! Obstacles are axis-aligned rectangles (anchored at their top-left corner)
//! or circles (anchored at their center). Everything here is plain data plus
//! distance queries; no collision response lives in this module.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Smallest obstacle dimensions the generator produces
pub const MIN_RECT_WIDTH: f32 = 10.0;
pub const MIN_RECT_HEIGHT: f32 = 20.0;
pub const MIN_CIRCLE_RADIUS: f32 = 8.0;

/// A static obstacle in the arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Obstacle {
    Rectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
    },
}

impl Obstacle {
    /// Rectangle centered on `center`
    pub fn rect_centered(center: Vec2, width: f32, height: f32) -> Self {
        Obstacle::Rectangle {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        Obstacle::Circle {
            x: center.x,
            y: center.y,
            radius,
        }
    }

    /// Geometric center
    pub fn center(&self) -> Vec2 {
        match *self {
            Obstacle::Rectangle {
                x,
                y,
                width,
                height,
            } => Vec2::new(x + width / 2.0, y + height / 2.0),
            Obstacle::Circle { x, y, .. } => Vec2::new(x, y),
        }
    }

    /// Half-extent used when spacing obstacles apart: the radius for
    /// circles, half the longer side for rectangles. Corners of long
    /// rectangles poke past it, so placement also runs [`Obstacle::intersects`].
    pub fn placement_radius(&self) -> f32 {
        match *self {
            Obstacle::Rectangle { width, height, .. } => width.max(height) / 2.0,
            Obstacle::Circle { radius, .. } => radius,
        }
    }

    /// Same shape scaled about its center, never below the minimum sizes
    pub fn shrunk(&self, factor: f32) -> Self {
        match *self {
            Obstacle::Rectangle { width, height, .. } => Obstacle::rect_centered(
                self.center(),
                (width * factor).max(MIN_RECT_WIDTH),
                (height * factor).max(MIN_RECT_HEIGHT),
            ),
            Obstacle::Circle { x, y, radius } => Obstacle::Circle {
                x,
                y,
                radius: (radius * factor).max(MIN_CIRCLE_RADIUS),
            },
        }
    }

    /// True if this obstacle lies fully inside a `size` arena
    pub fn inside(&self, size: f32) -> bool {
        match *self {
            Obstacle::Rectangle {
                x,
                y,
                width,
                height,
            } => x >= 0.0 && y >= 0.0 && x + width <= size && y + height <= size,
            Obstacle::Circle { x, y, radius } => {
                x - radius >= 0.0 && y - radius >= 0.0 && x + radius <= size && y + radius <= size
            }
        }
    }

    /// Exact shape overlap test
    pub fn intersects(&self, other: &Obstacle) -> bool {
        match (*self, *other) {
            (Obstacle::Circle { x, y, radius }, _) => other.overlaps_circle(Vec2::new(x, y), radius),
            (_, Obstacle::Circle { x, y, radius }) => self.overlaps_circle(Vec2::new(x, y), radius),
            (
                Obstacle::Rectangle {
                    x: ax,
                    y: ay,
                    width: aw,
                    height: ah,
                },
                Obstacle::Rectangle {
                    x: bx,
                    y: by,
                    width: bw,
                    height: bh,
                },
            ) => ax < bx + bw && bx < ax + aw && ay < by + bh && by < ay + ah,
        }
    }

    /// Closest point on (or in) the obstacle to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        match *self {
            Obstacle::Rectangle {
                x,
                y,
                width,
                height,
            } => Vec2::new(p.x.clamp(x, x + width), p.y.clamp(y, y + height)),
            Obstacle::Circle { x, y, radius } => {
                let center = Vec2::new(x, y);
                let offset = p - center;
                if offset.length() <= radius {
                    p
                } else {
                    center + offset.normalize_or_zero() * radius
                }
            }
        }
    }

    /// True if a circle at `center` with `radius` overlaps this obstacle
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        match *self {
            Obstacle::Rectangle { .. } => center.distance(self.closest_point(center)) < radius,
            Obstacle::Circle { x, y, radius: r } => center.distance(Vec2::new(x, y)) < radius + r,
        }
    }

    /// Copy with every coordinate and size multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        match *self {
            Obstacle::Rectangle {
                x,
                y,
                width,
                height,
            } => Obstacle::Rectangle {
                x: x * factor,
                y: y * factor,
                width: width * factor,
                height: height * factor,
            },
            Obstacle::Circle { x, y, radius } => Obstacle::Circle {
                x: x * factor,
                y: y * factor,
                radius: radius * factor,
            },
        }
    }
}

/// The target hole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Hole {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            x: center.x,
            y: center.y,
            radius,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// True when a ball of `ball_radius` at `ball_pos` lies entirely inside
    pub fn contains_ball(&self, ball_pos: Vec2, ball_radius: f32) -> bool {
        ball_pos.distance(self.center()) + ball_radius < self.radius
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            radius: self.radius * factor,
        }
    }
}

/// Placed footprint used while laying out a level (ball start, obstacles, hole)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub center: Vec2,
    pub radius: f32,
}

impl Footprint {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// True if a footprint of `radius` at `center` keeps `margin` of free
    /// space between itself and this one
    pub fn clears(&self, center: Vec2, radius: f32, margin: f32) -> bool {
        center.distance(self.center) >= self.radius + radius + margin
    }
}

impl From<&Obstacle> for Footprint {
    fn from(obstacle: &Obstacle) -> Self {
        Footprint::new(obstacle.center(), obstacle.placement_radius())
    }
}
