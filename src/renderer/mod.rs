//! Rendering module
//!
//! `Scene` is the per-frame draw list; `SdfRenderState` draws it with WebGPU
//! using signed distance fields in the fragment shader.

pub mod scene;
pub mod sdf_pipeline;
pub mod theme;

pub use scene::{DrawCommand, Label, LabelStyle, Scene};
pub use sdf_pipeline::SdfRenderState;
pub use theme::{Color, Theme};
