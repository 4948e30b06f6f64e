//! Data-driven game balance
//!
//! Every constant the simulation reads lives here so a level can be described
//! by a JSON file. Missing fields fall back to the built-in defaults.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Obstacle;

/// Errors produced while loading a tuning file
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("Failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid tuning value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Integration and collision response constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Physics {
    pub tilt_accel: f32,
    pub frame_damping: f32,
    pub max_frame_dt: f32,
    pub first_frame_dt: f32,
    pub wall_perpendicular_damping: f32,
    pub wall_parallel_damping: f32,
    pub obstacle_damping: f32,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            tilt_accel: TILT_ACCEL,
            frame_damping: FRAME_DAMPING,
            max_frame_dt: MAX_FRAME_DT,
            first_frame_dt: FIRST_FRAME_DT,
            wall_perpendicular_damping: WALL_PERPENDICULAR_DAMPING,
            wall_parallel_damping: WALL_PARALLEL_DAMPING,
            obstacle_damping: OBSTACLE_DAMPING,
        }
    }
}

/// Level layout plus physics constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub ball_start: Vec2,
    pub ball_radius: f32,
    pub physics: Physics,
    pub obstacles: Vec<Obstacle>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ball_start: Vec2::new(BALL_START.0, BALL_START.1),
            ball_radius: BALL_RADIUS,
            physics: Physics::default(),
            obstacles: default_obstacles(),
        }
    }
}

/// The neon wall layout
pub fn default_obstacles() -> Vec<Obstacle> {
    vec![
        Obstacle::new(80.0, 260.0, 360.0, 32.0),
        Obstacle::new(120.0, 520.0, 32.0, 260.0),
        Obstacle::new(260.0, 500.0, 360.0, 36.0),
        Obstacle::new(520.0, 260.0, 36.0, 420.0),
        Obstacle::new(180.0, 860.0, 420.0, 32.0),
    ]
}

impl Tuning {
    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read a tuning document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.ball_radius > 0.0) {
            return Err(invalid("ball_radius", "must be greater than zero"));
        }
        if !self.ball_start.is_finite() {
            return Err(invalid("ball_start", "must be finite"));
        }

        let p = &self.physics;
        if !p.tilt_accel.is_finite() {
            return Err(invalid("physics.tilt_accel", "must be finite"));
        }
        for (field, value) in [
            ("physics.frame_damping", p.frame_damping),
            ("physics.wall_perpendicular_damping", p.wall_perpendicular_damping),
            ("physics.wall_parallel_damping", p.wall_parallel_damping),
            ("physics.obstacle_damping", p.obstacle_damping),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, format!("{value} is outside [0, 1]")));
            }
        }
        if !(p.max_frame_dt > 0.0) {
            return Err(invalid("physics.max_frame_dt", "must be greater than zero"));
        }
        if !(p.first_frame_dt >= 0.0 && p.first_frame_dt <= p.max_frame_dt) {
            return Err(invalid(
                "physics.first_frame_dt",
                "must be within [0, max_frame_dt]",
            ));
        }

        if let Some(i) = self
            .obstacles
            .iter()
            .position(|o| !o.origin.is_finite() || !(o.size.x >= 0.0 && o.size.y >= 0.0))
        {
            return Err(invalid("obstacles", format!("obstacle {i} has a negative or non-finite extent")));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}
