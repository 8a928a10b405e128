//! Component definitions stored in the engine's ECS world.
//!
//! Components are plain data. Behavior lives in systems.

mod common;
mod hatch;
mod interior;

pub use common::*;
pub use hatch::*;
pub use interior::*;
