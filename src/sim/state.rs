//! World state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::tick::FrameClock;
use crate::tuning::{Physics, Tuning};

/// A static axis-aligned rectangle, immutable for the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Top-left corner
    pub origin: Vec2,
    pub size: Vec2,
}

impl Obstacle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// Point on (or inside) the rectangle nearest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}

/// The rolling ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
        }
    }
}

/// Complete simulation state for one session
#[derive(Debug, Clone, Serialize)]
pub struct World {
    pub ball: Ball,
    pub obstacles: Vec<Obstacle>,
    /// Arena size, unknown until the drawing surface has been measured
    pub bounds: Option<Vec2>,
    pub physics: Physics,
    /// Frame timing (not part of the observable state)
    #[serde(skip)]
    pub clock: FrameClock,
}

impl World {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            ball: Ball::new(tuning.ball_start, tuning.ball_radius),
            obstacles: tuning.obstacles.clone(),
            bounds: None,
            physics: tuning.physics,
            clock: FrameClock::new(tuning.physics.first_frame_dt, tuning.physics.max_frame_dt),
        }
    }

    /// Record a newly measured arena size.
    ///
    /// The ball keeps its position and velocity; only later bound checks see
    /// the new size. A zero-area size means the surface is not laid out yet.
    ///
    /// After a shrink, the wall clamp can push the ball into an obstacle. The
    /// obstacle hit then reverts to the previous position, which may lie
    /// outside the new walls, so the ball can be stranded there.
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        let bounds = if width > 0.0 && height > 0.0 {
            Some(Vec2::new(width, height))
        } else {
            None
        };

        if bounds != self.bounds {
            log::info!("Arena resized to {}x{}", width, height);
            self.bounds = bounds;
            // The frame loop restarts on a size change
            self.clock.reset();
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(&Tuning::default())
    }
}
