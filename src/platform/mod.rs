//! Platform abstraction layer
//!
//! Sensor adapters implementing [`crate::tilt::TiltSensor`]. Only the browser
//! has real ones; native builds drive tilt from a script instead.

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{DeviceMotionSensor, KeyboardTilt};
