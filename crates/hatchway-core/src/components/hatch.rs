//! Hatch component - one traversable opening and its pairing state.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::common::{ObjectId, PartId};
use crate::config::HatchConfig;

pub const DEFAULT_OPEN_CUE: &str = "hatch_open";
pub const DEFAULT_CLOSE_CUE: &str = "hatch_close";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HatchState {
    Closed,
    Open,
}

impl HatchState {
    pub fn from_open(open: bool) -> Self {
        if open {
            HatchState::Open
        } else {
            HatchState::Closed
        }
    }

    pub fn is_open(self) -> bool {
        self == HatchState::Open
    }

    pub fn toggled(self) -> Self {
        match self {
            HatchState::Closed => HatchState::Open,
            HatchState::Open => HatchState::Closed,
        }
    }
}

/// Progress of a hatch's late initialization (cut report + partner search)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Waiting for the next finish-initialization pass
    Pending,
    /// Partner search already ran for this vessel topology
    Attempted,
}

/// Hatch component
///
/// `connected` is a non-owning handle into the same `World`. It is always
/// written on both sides at once; a handle that no longer resolves means the
/// partner was despawned and the link is stale.
#[derive(Debug, Clone)]
pub struct Hatch {
    /// Interior entity that owns this hatch
    pub interior: Entity,
    /// Part the owning interior belongs to
    pub part: PartId,
    pub config: HatchConfig,
    pub state: HatchState,
    pub connected: Option<Entity>,
    pub resolution: Resolution,
    /// Set once this hatch has reported to its interior's cut barrier
    pub cut_reported: bool,
    pub enabled: bool,
    /// Paired with doors hidden: a permanent passage, no longer operable
    pub permanent: bool,
    /// Bound door object, if the door name resolved
    pub door: Option<ObjectId>,
    /// Bound hide-when-open objects (unmatched entries are dropped at bind time)
    pub hide_when_open: Vec<ObjectId>,
    /// Length of the visual bridge toward the partner, if any
    pub tube_length: Option<f32>,
}

impl Hatch {
    pub fn new(interior: Entity, part: PartId, config: HatchConfig) -> Self {
        let enabled = config.start_enabled;
        Self {
            interior,
            part,
            config,
            state: HatchState::Closed,
            connected: None,
            resolution: Resolution::Pending,
            cut_reported: false,
            enabled,
            permanent: false,
            door: None,
            hide_when_open: Vec::new(),
            tube_length: None,
        }
    }

    pub fn attach_node(&self) -> Option<&str> {
        self.config.attach_node_id.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn open_cue(&self) -> &str {
        self.config.open_cue.as_deref().unwrap_or(DEFAULT_OPEN_CUE)
    }

    pub fn close_cue(&self) -> &str {
        self.config.close_cue.as_deref().unwrap_or(DEFAULT_CLOSE_CUE)
    }

    pub fn cue_for(&self, state: HatchState) -> &str {
        match state {
            HatchState::Open => self.open_cue(),
            HatchState::Closed => self.close_cue(),
        }
    }
}
