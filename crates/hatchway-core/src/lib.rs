//! Hatchway Core - walkable interiors for multi-part vessels
//!
//! Lets a crew member move between the interiors of a vessel's parts by
//! pairing up the hatches that sit on joined attachment nodes, including
//! joins that run through passthrough parts with no interior of their own.
//!
//! # Architecture
//!
//! Interiors and hatches live in a `hecs` world owned by [`IvaEngine`]:
//! - **Components**: `Interior` (controller + hatch list), `CutBarrier`, `Hatch`
//! - **Systems**: connectivity resolution, hatch state, cut batching, topology
//! - **Host**: the game side, reached only through the traits in [`host`]
//!
//! Hatch partners are `hecs::Entity` handles, so a despawned partner is
//! detected with a liveness check instead of leaving a dangling reference.
//!
//! # Example
//!
//! ```rust,no_run
//! use hatchway_core::prelude::*;
//! use hatchway_core::headless::{HeadlessHost, VesselLayout};
//!
//! let mut host = HeadlessHost::new(VesselLayout::new(1));
//! let mut engine = IvaEngine::new();
//!
//! let config = InteriorConfig::default().with_hatch(HatchConfig::at_node("top"));
//! let interior = engine.spawn_interior(&mut host, 1, &config).unwrap();
//!
//! // Next frame: hatches look for their partners
//! engine.update(&mut host);
//! engine.set_phase(GamePhase::Flight);
//!
//! for hatch in engine.hatches_of(interior) {
//!     engine.toggle(&mut host, hatch);
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod headless;
pub mod host;
pub mod registry;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{CutConfig, HatchConfig, HideWhenOpen, InteriorConfig};
    pub use crate::engine::{GamePhase, IvaEngine};
    pub use crate::error::IvaError;
    pub use crate::host::Host;
    pub use crate::registry::ModelRegistry;
}
