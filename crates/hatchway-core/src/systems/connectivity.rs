//! Connectivity resolver - pairs a hatch with the hatch physically joined to
//! it, walking through passthrough parts that have no interior of their own.

use std::collections::HashSet;

use hecs::{Entity, World};

use crate::components::{Hatch, Interior, PartId, Resolution};
use crate::host::VesselGraph;
use crate::registry::ModelRegistry;

/// Resolve `hatch`'s partner and link both sides.
///
/// Runs the search at most once per hatch: a live connection is returned as
/// is, and a hatch whose search already ran comes back `None` until the
/// topology watcher marks it pending again.
pub fn resolve_connection(
    world: &mut World,
    registry: &ModelRegistry,
    graph: &impl VesselGraph,
    hatch: Entity,
) -> Option<Entity> {
    let (part, node, connected, resolution) = {
        let h = world.get::<&Hatch>(hatch).ok()?;
        (
            h.part,
            h.attach_node().map(str::to_owned),
            h.connected,
            h.resolution,
        )
    };

    if let Some(partner) = connected {
        if world.contains(partner) {
            return Some(partner);
        }
    }
    if resolution == Resolution::Attempted {
        return None;
    }
    if let Ok(mut h) = world.get::<&mut Hatch>(hatch) {
        h.resolution = Resolution::Attempted;
    }

    let node = node?;
    let partner = find_partner(world, registry, graph, hatch, part, &node)?;
    link(world, hatch, partner);
    Some(partner)
}

/// Walk the attachment graph from `part` at `node` and return the hatch on
/// the far side, if any. Read-only.
pub fn find_partner(
    world: &World,
    registry: &ModelRegistry,
    graph: &impl VesselGraph,
    hatch: Entity,
    part: PartId,
    node: &str,
) -> Option<Entity> {
    // A valid vessel never needs more hops than it has parts.
    let limit = graph
        .vessel_of(part)
        .map(|v| graph.part_count(v))
        .unwrap_or(0)
        .max(1);

    let mut visited: HashSet<PartId> = HashSet::new();
    visited.insert(part);
    let mut current_part = part;
    let mut current_node = node.to_owned();

    for _ in 0..limit {
        let other = graph.find_attached_part(current_part, &current_node)?;
        if !visited.insert(other) {
            log::warn!(
                "Hatch search from part {} revisited part {}, vessel graph has a cycle",
                part,
                other
            );
            return None;
        }

        let Some(opposing) = graph.find_opposing_node(other, current_part) else {
            log::debug!(
                "Part {} has no node facing part {}",
                other,
                current_part
            );
            return None;
        };

        if let Some(controller) = graph.interior_model(other).and_then(|m| registry.lookup(m)) {
            return hatch_at_node(world, controller, &opposing, hatch);
        }

        let (a, b) = graph.passthrough_mapping(other)?;
        let far = if opposing == a {
            b
        } else if opposing == b {
            a
        } else {
            log::debug!(
                "Part {} entered at node '{}' which is not a passthrough slot",
                other,
                opposing
            );
            return None;
        };

        current_part = other;
        current_node = far;
    }

    log::warn!(
        "Hatch search from part {} exceeded {} hops, giving up",
        part,
        limit
    );
    None
}

/// Scan a controller's hatches for the one sitting on `node`
fn hatch_at_node(world: &World, controller: Entity, node: &str, seeker: Entity) -> Option<Entity> {
    let interior = world.get::<&Interior>(controller).ok()?;
    for &candidate in &interior.hatches {
        if candidate == seeker {
            continue;
        }
        let Ok(h) = world.get::<&Hatch>(candidate) else {
            continue;
        };
        if h.attach_node() != Some(node) {
            continue;
        }
        if let Some(existing) = h.connected {
            if existing != seeker && world.contains(existing) {
                log::warn!(
                    "Hatch on node '{}' of model {} is already connected elsewhere",
                    node,
                    interior.model
                );
                return None;
            }
        }
        return Some(candidate);
    }
    None
}

/// Link two hatches to each other in one step.
pub fn link(world: &mut World, a: Entity, b: Entity) {
    if let Ok(mut h) = world.get::<&mut Hatch>(a) {
        h.connected = Some(b);
        h.resolution = Resolution::Attempted;
    }
    if let Ok(mut h) = world.get::<&mut Hatch>(b) {
        h.connected = Some(a);
        h.resolution = Resolution::Attempted;
    }
}

/// Length of the visual bridge drawn from `hatch` toward its partner.
///
/// An explicit `tubeExtent` wins. Otherwise each side draws half of the gap
/// between the two attachment nodes, so the halves meet in the middle.
pub fn tube_length(world: &World, graph: &impl VesselGraph, hatch: Entity) -> Option<f32> {
    let h = world.get::<&Hatch>(hatch).ok()?;
    let partner = h.connected.filter(|p| world.contains(*p))?;
    if h.config.tube_extent > 0.0 {
        return Some(h.config.tube_extent);
    }

    let other = world.get::<&Hatch>(partner).ok()?;
    let here = graph.node_position(h.part, h.attach_node()?)?;
    let there = graph.node_position(other.part, other.attach_node()?)?;
    let half = here.distance(&there) / 2.0;
    (half > f32::EPSILON).then_some(half)
}
