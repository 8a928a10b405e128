//! Per-interior and per-hatch configuration.
//!
//! These are the options a part's interior declares at load time. Keys are
//! camelCase in JSON; every field has a default so configs only list what
//! they change.

use serde::{Deserialize, Serialize};

use crate::components::{CutKind, Vec3};
use crate::error::IvaError;

/// Maximum distance between a hide-when-open entry's expected position and
/// the scene object it binds to.
pub const HIDE_MATCH_TOLERANCE: f32 = 0.15;

/// An object to hide while the hatch is open, matched by name and position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HideWhenOpen {
    pub name: String,
    #[serde(default)]
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HatchConfig {
    /// Physical joint this hatch sits on
    pub attach_node_id: Option<String>,
    /// Door object shown while closed
    pub door_name: Option<String>,
    /// Tool object for this hatch's cutout
    pub cutout_transform_name: Option<String>,
    /// Object the cutout is subtracted from
    pub cutout_target_transform_name: Option<String>,
    pub hide_door_when_connected: bool,
    /// Exterior exit point handed to the EVA collaborator
    pub airlock_name: Option<String>,
    /// Bridge length override; 0 derives it from node positions
    pub tube_extent: f32,
    pub hide_when_open: Vec<HideWhenOpen>,
    pub open_cue: Option<String>,
    pub close_cue: Option<String>,
    pub start_enabled: bool,
}

impl Default for HatchConfig {
    fn default() -> Self {
        Self {
            attach_node_id: None,
            door_name: None,
            cutout_transform_name: None,
            cutout_target_transform_name: None,
            hide_door_when_connected: false,
            airlock_name: None,
            tube_extent: 0.0,
            hide_when_open: Vec::new(),
            open_cue: None,
            close_cue: None,
            start_enabled: true,
        }
    }
}

impl HatchConfig {
    pub fn at_node(node: impl Into<String>) -> Self {
        Self {
            attach_node_id: Some(node.into()),
            ..Self::default()
        }
    }

    pub fn with_door(mut self, name: impl Into<String>) -> Self {
        self.door_name = Some(name.into());
        self
    }

    pub fn with_cutout(mut self, tool: impl Into<String>, target: impl Into<String>) -> Self {
        self.cutout_transform_name = Some(tool.into());
        self.cutout_target_transform_name = Some(target.into());
        self
    }

    pub fn with_airlock(mut self, name: impl Into<String>) -> Self {
        self.airlock_name = Some(name.into());
        self
    }

    pub fn hiding_door_when_connected(mut self) -> Self {
        self.hide_door_when_connected = true;
        self
    }

    pub fn with_tube_extent(mut self, extent: f32) -> Self {
        self.tube_extent = extent;
        self
    }

    pub fn hiding_when_open(mut self, name: impl Into<String>, position: Vec3) -> Self {
        self.hide_when_open.push(HideWhenOpen {
            name: name.into(),
            position,
        });
        self
    }

    /// A hatch contributes to its interior's cut barrier only when both the
    /// tool and the target are named.
    pub fn declares_cutout(&self) -> bool {
        self.cutout_transform_name.is_some() && self.cutout_target_transform_name.is_some()
    }
}

/// A cut that does not depend on any hatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutConfig {
    pub target: String,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub kind: CutKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteriorConfig {
    pub hatches: Vec<HatchConfig>,
    pub cuts: Vec<CutConfig>,
}

impl InteriorConfig {
    pub fn from_json(json: &str) -> Result<Self, IvaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_hatch(mut self, hatch: HatchConfig) -> Self {
        self.hatches.push(hatch);
        self
    }

    pub fn with_cut(mut self, cut: CutConfig) -> Self {
        self.cuts.push(cut);
        self
    }

    /// Number of hatch-driven cut requests the barrier must wait for.
    /// Computed from configuration alone, before any hatch exists.
    pub fn expected_hatch_cuts(&self) -> u32 {
        self.hatches.iter().filter(|h| h.declares_cutout()).count() as u32
    }
}
