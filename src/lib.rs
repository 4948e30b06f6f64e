//! Gyro Ball - a tilt-steered ball maze
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (integration, wall and obstacle collisions)
//! - `tilt`: Rotation-rate mapping and the sensor-to-frame tilt handoff
//! - `tuning`: Data-driven constants and obstacle layout
//! - `renderer`: Draw list and WebGPU SDF pipeline
//! - `platform`: Browser sensor adapters

pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tilt;
pub mod tuning;

pub use renderer::{Scene, Theme};
pub use sim::{Ball, FrameClock, Obstacle, World, tick};
pub use tilt::{
    HeldKeys, SensorSubscription, TiltCell, TiltSensor, rotation_rate_sample, tilt_from_rotation_rate,
};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Ball spawn position (pixels)
    pub const BALL_START: (f32, f32) = (220.0, 220.0);
    pub const BALL_RADIUS: f32 = 38.0;

    /// Tilt-to-acceleration scale (pixels/frame per second per unit tilt)
    pub const TILT_ACCEL: f32 = 180.0;
    /// Per-frame velocity damping
    pub const FRAME_DAMPING: f32 = 0.985;

    /// Longest step a single frame may integrate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;
    /// Step used for the first frame after start or resize (seconds)
    pub const FIRST_FRAME_DT: f32 = 0.016;

    /// Wall bounce: velocity component perpendicular to the wall
    pub const WALL_PERPENDICULAR_DAMPING: f32 = 0.45;
    /// Wall bounce: velocity component parallel to the wall
    pub const WALL_PARALLEL_DAMPING: f32 = 0.9;
    /// Obstacle bounce applied to both velocity components
    pub const OBSTACLE_DAMPING: f32 = 0.35;
}
