//! Topology watcher - keeps hatch pairings valid after the vessel changes
//! shape (decoupling, docking, part destruction).

use hecs::{Entity, World};

use crate::components::{Hatch, HatchState, Interior, Resolution};
use crate::host::{CuePlayer, SceneObjects, VesselGraph};
use crate::registry::ModelRegistry;
use crate::systems::connectivity::tube_length;
use crate::systems::hatch_state::{apply_visuals, commit};

/// Registered interiors whose part is no longer on the active vessel
pub fn stale_interiors(world: &World, registry: &ModelRegistry, graph: &impl VesselGraph) -> Vec<Entity> {
    registry
        .iter()
        .filter_map(|(_, controller)| {
            let part = world.get::<&Interior>(controller).ok().map(|i| i.part);
            match part {
                Some(part) if graph.is_on_active_vessel(part) => None,
                _ => Some(controller),
            }
        })
        .collect()
}

/// True when `hatch` points at a partner that is gone or now belongs to a
/// different vessel.
pub fn is_stale(world: &World, graph: &impl VesselGraph, hatch: &Hatch) -> bool {
    let Some(partner) = hatch.connected else {
        return false;
    };
    let Ok(other) = world.get::<&Hatch>(partner) else {
        return true;
    };
    let here = graph.vessel_of(hatch.part);
    here.is_none() || here != graph.vessel_of(other.part)
}

/// Close `hatch`, drop its connection on both sides and queue it for
/// another partner search.
pub fn sever<H>(world: &mut World, host: &mut H, hatch: Entity)
where
    H: CuePlayer + SceneObjects,
{
    let partner = match world.get::<&mut Hatch>(hatch) {
        Ok(mut h) => {
            h.permanent = false;
            h.resolution = Resolution::Pending;
            h.connected.take()
        }
        Err(_) => return,
    };
    commit(world, host, hatch, HatchState::Closed, true);

    if let Some(partner) = partner {
        if let Ok(mut other) = world.get::<&mut Hatch>(partner) {
            if other.connected == Some(hatch) {
                other.connected = None;
                other.permanent = false;
                other.resolution = Resolution::Pending;
            }
        }
        if world.contains(partner) {
            commit(world, host, partner, HatchState::Closed, true);
        }
    }
}

/// Sever every stale connection. Returns the hatches that need a new
/// partner search.
pub fn invalidate_stale_connections<H>(world: &mut World, host: &mut H) -> Vec<Entity>
where
    H: VesselGraph + CuePlayer + SceneObjects,
{
    let stale: Vec<Entity> = world
        .query::<&Hatch>()
        .iter()
        .filter(|(_, h)| is_stale(world, &*host, h))
        .map(|(e, _)| e)
        .collect();

    let mut invalidated = Vec::new();
    for hatch in stale {
        let partner = world.get::<&Hatch>(hatch).ok().and_then(|h| h.connected);
        log::info!("Hatch {:?} lost its partner, closing", hatch);
        sever(world, host, hatch);
        let live_partner = partner.filter(|p| world.contains(*p));
        for entity in std::iter::once(hatch).chain(live_partner) {
            if !invalidated.contains(&entity) {
                invalidated.push(entity);
            }
        }
    }
    invalidated
}

/// Mark unpaired hatches on the active vessel for another partner search.
/// A new join (docking) may have given them a partner.
pub fn requeue_unpaired(world: &mut World, graph: &impl VesselGraph) -> Vec<Entity> {
    let mut requeued = Vec::new();
    for (entity, h) in world.query_mut::<&mut Hatch>() {
        if h.connected.is_none()
            && h.resolution == Resolution::Attempted
            && graph.is_on_active_vessel(h.part)
        {
            h.resolution = Resolution::Pending;
            requeued.push(entity);
        }
    }
    requeued
}

/// Recheck one hatch without searching for a new partner: clear a dead
/// link, recompute the tube and reapply visuals.
pub fn refresh_hatch<H>(world: &mut World, host: &mut H, hatch: Entity)
where
    H: VesselGraph + SceneObjects,
{
    let tube = tube_length(world, &*host, hatch);
    let Ok(mut h) = world.get::<&mut Hatch>(hatch) else {
        return;
    };
    if h.connected.is_some_and(|p| !world.contains(p)) {
        h.connected = None;
        h.permanent = false;
    }
    h.tube_length = tube;
    let state = h.state;
    apply_visuals(host, &h, state);
}
