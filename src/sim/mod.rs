//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module touches rendering,
//! sensors or the browser:
//! - Step length comes from frame timestamps, capped for stability
//! - Obstacles are static for the whole session
//! - Arena bounds may change at any time (surface resize)

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Resolution, WallContacts, circle_hits_rect, resolve, resolve_with};
pub use state::{Ball, Obstacle, World};
pub use tick::{FrameClock, TickReport, tick};
