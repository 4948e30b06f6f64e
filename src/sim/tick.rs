//! Per-frame simulation tick
//!
//! Driven by the display refresh: one call per rendered frame, with the step
//! length measured from frame timestamps rather than a fixed rate.

use glam::Vec2;

use super::collision::{WallContacts, resolve_with};
use super::state::World;
use crate::consts::{FIRST_FRAME_DT, MAX_FRAME_DT};

/// Turns frame timestamps into clamped step lengths
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    first_frame_dt: f32,
    max_dt: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(FIRST_FRAME_DT, MAX_FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(first_frame_dt: f32, max_dt: f32) -> Self {
        Self {
            last_ms: None,
            first_frame_dt,
            max_dt,
        }
    }

    /// Step length in seconds for a frame stamped `now_ms`.
    ///
    /// Long gaps (a paused tab, a dropped frame) are capped at `max_dt`, and a
    /// timestamp earlier than the last one yields a zero step.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            None => self.first_frame_dt,
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, self.max_dt),
        };
        self.last_ms = Some(now_ms);
        dt
    }

    /// Forget the previous frame; the next one uses the first-frame step
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// What happened during one tick (diagnostics only)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// False when the arena size is still unknown
    pub stepped: bool,
    pub walls: WallContacts,
    pub obstacle_hits: u32,
}

/// Advance the world by one frame of `dt` seconds under `tilt`
pub fn tick(world: &mut World, tilt: Vec2, dt: f32) -> TickReport {
    let Some(bounds) = world.bounds else {
        return TickReport::default();
    };

    let physics = world.physics;
    let ball = &mut world.ball;

    let previous = ball.pos;
    let vel = (ball.vel + tilt * physics.tilt_accel * dt) * physics.frame_damping;
    let candidate = ball.pos + vel;

    let resolved = resolve_with(
        candidate,
        previous,
        vel,
        ball.radius,
        bounds,
        &world.obstacles,
        &physics,
    );

    ball.pos = resolved.pos;
    ball.vel = resolved.vel;

    if resolved.obstacle_hits > 0 {
        log::trace!(
            "Obstacle contact x{} at ({:.1}, {:.1})",
            resolved.obstacle_hits,
            candidate.x,
            candidate.y
        );
    }

    TickReport {
        stepped: true,
        walls: resolved.walls,
        obstacle_hits: resolved.obstacle_hits,
    }
}

impl World {
    /// Run the frame stamped `now_ms` (e.g. a `requestAnimationFrame` time)
    pub fn frame(&mut self, now_ms: f64, tilt: Vec2) -> TickReport {
        let dt = self.clock.advance(now_ms);
        tick(self, tilt, dt)
    }
}
