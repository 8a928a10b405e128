//! Headless host - an in-memory implementation of every collaborator trait.
//!
//! Backs the test suites and the simulation harness. Vessel layouts load from
//! JSON; cues, EVA requests and cuts are recorded for inspection.

use serde::{Deserialize, Serialize};

use crate::components::{CrewId, CutKind, ModelId, ObjectId, PartId, Vec3, VesselId};
use crate::error::IvaError;
use crate::host::{CuePlayer, EvaSpawner, MeshCutter, SceneObjects, VesselGraph};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    pub id: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub attached: Option<PartId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartLayout {
    pub id: PartId,
    pub vessel: VesselId,
    #[serde(default)]
    pub interior: Option<ModelId>,
    #[serde(default)]
    pub nodes: Vec<NodeLayout>,
    #[serde(default)]
    pub passthrough: Option<(String, String)>,
}

impl PartLayout {
    pub fn new(id: PartId, vessel: VesselId) -> Self {
        Self {
            id,
            vessel,
            interior: None,
            nodes: Vec::new(),
            passthrough: None,
        }
    }

    pub fn with_interior(mut self, model: ModelId) -> Self {
        self.interior = Some(model);
        self
    }

    pub fn with_node(mut self, id: impl Into<String>, position: Vec3) -> Self {
        self.nodes.push(NodeLayout {
            id: id.into(),
            position,
            attached: None,
        });
        self
    }

    pub fn with_passthrough(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.passthrough = Some((a.into(), b.into()));
        self
    }

    fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Serializable part graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VesselLayout {
    #[serde(default)]
    pub active_vessel: Option<VesselId>,
    #[serde(default)]
    pub parts: Vec<PartLayout>,
}

impl VesselLayout {
    pub fn new(active_vessel: VesselId) -> Self {
        Self {
            active_vessel: Some(active_vessel),
            parts: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, IvaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_part(mut self, part: PartLayout) -> Self {
        self.parts.push(part);
        self
    }

    pub fn part(&self, id: PartId) -> Option<&PartLayout> {
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn part_mut(&mut self, id: PartId) -> Option<&mut PartLayout> {
        self.parts.iter_mut().find(|p| p.id == id)
    }

    /// Join `a` at `node_a` to `b` at `node_b`. Missing parts or nodes are
    /// ignored.
    pub fn attach(&mut self, a: PartId, node_a: &str, b: PartId, node_b: &str) {
        self.set_attached(a, node_a, Some(b));
        self.set_attached(b, node_b, Some(a));
    }

    /// One-sided attachment, for building malformed graphs
    pub fn set_attached(&mut self, part: PartId, node: &str, attached: Option<PartId>) {
        if let Some(n) = self
            .part_mut(part)
            .and_then(|p| p.nodes.iter_mut().find(|n| n.id == node))
        {
            n.attached = attached;
        }
    }

    /// Split the join at `part`'s node `node` and move every part reachable
    /// from `part` (without crossing that join) to `new_vessel`.
    pub fn decouple(&mut self, part: PartId, node: &str, new_vessel: VesselId) {
        let Some(other) = self.find_attached_part(part, node) else {
            return;
        };
        self.set_attached(part, node, None);
        let back = self
            .part(other)
            .and_then(|p| p.nodes.iter().find(|n| n.attached == Some(part)))
            .map(|n| n.id.clone());
        if let Some(back) = back {
            self.set_attached(other, &back, None);
        }

        let mut stack = vec![part];
        let mut seen = std::collections::HashSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(p) = self.part_mut(current) {
                p.vessel = new_vessel;
                stack.extend(p.nodes.iter().filter_map(|n| n.attached));
            }
        }
    }
}

impl VesselGraph for VesselLayout {
    fn vessel_of(&self, part: PartId) -> Option<VesselId> {
        self.part(part).map(|p| p.vessel)
    }

    fn active_vessel(&self) -> Option<VesselId> {
        self.active_vessel
    }

    fn part_count(&self, vessel: VesselId) -> usize {
        self.parts.iter().filter(|p| p.vessel == vessel).count()
    }

    fn interior_model(&self, part: PartId) -> Option<ModelId> {
        self.part(part).and_then(|p| p.interior)
    }

    fn find_attached_part(&self, part: PartId, node: &str) -> Option<PartId> {
        self.part(part)?.node(node)?.attached
    }

    fn find_opposing_node(&self, part: PartId, from: PartId) -> Option<String> {
        self.part(part)?
            .nodes
            .iter()
            .find(|n| n.attached == Some(from))
            .map(|n| n.id.clone())
    }

    fn passthrough_mapping(&self, part: PartId) -> Option<(String, String)> {
        self.part(part)?.passthrough.clone()
    }

    fn node_position(&self, part: PartId, node: &str) -> Option<Vec3> {
        self.part(part)?.node(node).map(|n| n.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub model: ModelId,
    pub name: String,
    pub position: Vec3,
    pub visible: bool,
    pub deleted: bool,
}

/// Recorded call to the mesh cutter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutCall {
    pub target: ObjectId,
    pub tool: Option<ObjectId>,
    pub kind: CutKind,
    pub result: Option<ObjectId>,
}

#[derive(Debug, Clone)]
pub struct HeadlessHost {
    pub layout: VesselLayout,
    pub objects: Vec<SceneObject>,
    /// Outcome returned for every EVA request
    pub eva_succeeds: bool,
    pub eva_requests: Vec<(CrewId, Option<String>)>,
    pub cues: Vec<String>,
    pub cuts: Vec<CutCall>,
    next_object: ObjectId,
}

impl HeadlessHost {
    pub fn new(layout: VesselLayout) -> Self {
        Self {
            layout,
            objects: Vec::new(),
            eva_succeeds: true,
            eva_requests: Vec::new(),
            cues: Vec::new(),
            cuts: Vec::new(),
            next_object: 1,
        }
    }

    pub fn add_object(&mut self, model: ModelId, name: impl Into<String>, position: Vec3) -> ObjectId {
        let id = self.next_object;
        self.next_object += 1;
        self.objects.push(SceneObject {
            id,
            model,
            name: name.into(),
            position,
            visible: true,
            deleted: false,
        });
        id
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn is_visible(&self, id: ObjectId) -> bool {
        self.object(id).is_some_and(|o| o.visible && !o.deleted)
    }

    pub fn clear_records(&mut self) {
        self.eva_requests.clear();
        self.cues.clear();
        self.cuts.clear();
    }
}

impl VesselGraph for HeadlessHost {
    fn vessel_of(&self, part: PartId) -> Option<VesselId> {
        self.layout.vessel_of(part)
    }

    fn active_vessel(&self) -> Option<VesselId> {
        self.layout.active_vessel()
    }

    fn part_count(&self, vessel: VesselId) -> usize {
        self.layout.part_count(vessel)
    }

    fn interior_model(&self, part: PartId) -> Option<ModelId> {
        self.layout.interior_model(part)
    }

    fn find_attached_part(&self, part: PartId, node: &str) -> Option<PartId> {
        self.layout.find_attached_part(part, node)
    }

    fn find_opposing_node(&self, part: PartId, from: PartId) -> Option<String> {
        self.layout.find_opposing_node(part, from)
    }

    fn passthrough_mapping(&self, part: PartId) -> Option<(String, String)> {
        self.layout.passthrough_mapping(part)
    }

    fn node_position(&self, part: PartId, node: &str) -> Option<Vec3> {
        self.layout.node_position(part, node)
    }
}

impl EvaSpawner for HeadlessHost {
    fn spawn_eva(&mut self, crew: CrewId, airlock: Option<&str>) -> bool {
        self.eva_requests.push((crew, airlock.map(str::to_owned)));
        self.eva_succeeds
    }
}

impl CuePlayer for HeadlessHost {
    fn play_cue(&mut self, cue: &str) {
        self.cues.push(cue.to_owned());
    }
}

impl MeshCutter for HeadlessHost {
    fn perform_mesh_cut(
        &mut self,
        target: ObjectId,
        tool: Option<ObjectId>,
        kind: CutKind,
    ) -> Option<ObjectId> {
        let result = match kind {
            CutKind::Delete => {
                if let Some(obj) = self.objects.iter_mut().find(|o| o.id == target) {
                    obj.deleted = true;
                }
                None
            }
            CutKind::Boolean => {
                let source = self.object(target)?.clone();
                if let Some(obj) = self.objects.iter_mut().find(|o| o.id == target) {
                    obj.deleted = true;
                }
                Some(self.add_object(source.model, source.name, source.position))
            }
        };
        self.cuts.push(CutCall {
            target,
            tool,
            kind,
            result,
        });
        result
    }
}

impl SceneObjects for HeadlessHost {
    fn find_objects_named(&self, model: ModelId, name: &str) -> Vec<(ObjectId, Vec3)> {
        self.objects
            .iter()
            .filter(|o| o.model == model && o.name == name && !o.deleted)
            .map(|o| (o.id, o.position))
            .collect()
    }

    fn set_visible(&mut self, object: ObjectId, visible: bool) {
        if let Some(obj) = self.objects.iter_mut().find(|o| o.id == object) {
            obj.visible = visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_part_layout() -> VesselLayout {
        let mut layout = VesselLayout::new(1)
            .with_part(PartLayout::new(1, 1).with_node("top", Vec3::new(0.0, 1.0, 0.0)))
            .with_part(PartLayout::new(2, 1).with_node("bottom", Vec3::new(0.0, 1.0, 0.0)));
        layout.attach(1, "top", 2, "bottom");
        layout
    }

    #[test]
    fn test_attach_is_two_sided() {
        let layout = two_part_layout();
        assert_eq!(layout.find_attached_part(1, "top"), Some(2));
        assert_eq!(layout.find_opposing_node(2, 1).as_deref(), Some("bottom"));
        assert_eq!(layout.find_attached_part(1, "missing"), None);
    }

    #[test]
    fn test_decouple_moves_parts_to_new_vessel() {
        let mut layout = two_part_layout();
        layout.decouple(2, "bottom", 9);

        assert_eq!(layout.vessel_of(2), Some(9));
        assert_eq!(layout.vessel_of(1), Some(1));
        assert_eq!(layout.find_attached_part(1, "top"), None);
        assert_eq!(layout.part_count(1), 1);
    }

    #[test]
    fn test_layout_from_json() {
        let json = r#"{
            "active_vessel": 1,
            "parts": [
                { "id": 1, "vessel": 1, "interior": 100, "nodes": [{ "id": "top", "attached": 2 }] },
                { "id": 2, "vessel": 1, "nodes": [{ "id": "bottom", "attached": 1 }], "passthrough": ["bottom", "top"] }
            ]
        }"#;
        let layout = VesselLayout::from_json(json).unwrap();

        assert_eq!(layout.interior_model(1), Some(100));
        assert_eq!(
            layout.passthrough_mapping(2),
            Some(("bottom".to_string(), "top".to_string()))
        );
        assert!(layout.is_on_active_vessel(2));
    }

    #[test]
    fn test_boolean_cut_replaces_target() {
        let mut host = HeadlessHost::new(VesselLayout::new(1));
        let shell = host.add_object(5, "shell", Vec3::ZERO);
        let tool = host.add_object(5, "cutter", Vec3::ZERO);

        let replaced = host.perform_mesh_cut(shell, Some(tool), CutKind::Boolean).unwrap();

        assert_ne!(replaced, shell);
        assert!(!host.is_visible(shell));
        assert_eq!(host.find_object(5, "shell"), Some(replaced));
    }
}
