//! Collaborator interfaces the core consumes from the host game.
//!
//! The core never touches the engine directly. Scene management, audio,
//! EVA spawning and the mesh boolean all sit behind these traits.

use crate::components::{CrewId, CutKind, ModelId, ObjectId, PartId, Vec3, VesselId};

/// Read access to the physical part graph
pub trait VesselGraph {
    fn vessel_of(&self, part: PartId) -> Option<VesselId>;

    /// The vessel the player is currently flying
    fn active_vessel(&self) -> Option<VesselId>;

    fn part_count(&self, vessel: VesselId) -> usize;

    /// Interior model instantiated for this part, if it has one
    fn interior_model(&self, part: PartId) -> Option<ModelId>;

    /// Part attached to `part` at node `node`. `None` when the node does not
    /// exist or nothing is attached there.
    fn find_attached_part(&self, part: PartId, node: &str) -> Option<PartId>;

    /// Node on `part` that faces back toward `from`
    fn find_opposing_node(&self, part: PartId, from: PartId) -> Option<String>;

    /// Slot pair for parts that carry a connection straight through
    fn passthrough_mapping(&self, part: PartId) -> Option<(String, String)>;

    /// Node position in the vessel frame
    fn node_position(&self, part: PartId, node: &str) -> Option<Vec3>;

    fn is_on_active_vessel(&self, part: PartId) -> bool {
        match (self.vessel_of(part), self.active_vessel()) {
            (Some(vessel), Some(active)) => vessel == active,
            _ => false,
        }
    }
}

pub trait EvaSpawner {
    /// Try to put `crew` outside through `airlock`. Returns true on success.
    fn spawn_eva(&mut self, crew: CrewId, airlock: Option<&str>) -> bool;
}

pub trait CuePlayer {
    fn play_cue(&mut self, cue: &str);
}

pub trait MeshCutter {
    /// Apply one cut. Returns the replacement mesh for boolean cuts, `None`
    /// when the target was deleted or the cut produced nothing.
    fn perform_mesh_cut(
        &mut self,
        target: ObjectId,
        tool: Option<ObjectId>,
        kind: CutKind,
    ) -> Option<ObjectId>;
}

/// Named objects inside interior models
pub trait SceneObjects {
    /// All objects with this name in the model, with their local positions
    fn find_objects_named(&self, model: ModelId, name: &str) -> Vec<(ObjectId, Vec3)>;

    fn set_visible(&mut self, object: ObjectId, visible: bool);

    fn find_object(&self, model: ModelId, name: &str) -> Option<ObjectId> {
        self.find_objects_named(model, name)
            .first()
            .map(|(id, _)| *id)
    }
}

/// Everything the engine needs from the host in one bound
pub trait Host: VesselGraph + EvaSpawner + CuePlayer + MeshCutter + SceneObjects {}

impl<T> Host for T where T: VesselGraph + EvaSpawner + CuePlayer + MeshCutter + SceneObjects {}
