//! Systems - logic that operates on interior and hatch components

pub mod connectivity;
pub mod cut_barrier;
pub mod hatch_state;
pub mod topology;

pub use connectivity::{find_partner, link, resolve_connection, tube_length};
pub use cut_barrier::{begin_barrier, execute_batch, fire_barrier, report_hatch_cut};
pub use hatch_state::{
    apply_visuals, bind_geometry, close_all_hatches, make_permanent_passage, set_enabled,
    set_open, toggle,
};
pub use topology::{
    invalidate_stale_connections, is_stale, refresh_hatch, requeue_unpaired, sever,
    stale_interiors,
};
