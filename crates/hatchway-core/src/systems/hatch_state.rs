//! Hatch state machine - open/close with EVA fallback and propagation to the
//! connected hatch.

use hecs::{Entity, World};

use crate::components::{CrewId, Hatch, HatchState, ModelId, ObjectId, VesselId};
use crate::config::{HatchConfig, HIDE_MATCH_TOLERANCE};
use crate::error::IvaError;
use crate::host::{CuePlayer, EvaSpawner, SceneObjects, VesselGraph};

/// Partner handle, if it still points at a live entity
fn live_partner(world: &World, hatch: &Hatch) -> Option<Entity> {
    hatch.connected.filter(|p| world.contains(*p))
}

/// Move `hatch` to `target`, propagating to its partner.
///
/// Opening an unconnected hatch is an exit to vacuum: the EVA collaborator
/// decides, and on refusal nothing changes. The partner is only visited when
/// its state differs from `target`, so propagation stops after one hop.
/// Returns true if this hatch changed state.
pub fn set_open<H>(
    world: &mut World,
    host: &mut H,
    crew: Option<CrewId>,
    hatch: Entity,
    target: HatchState,
) -> bool
where
    H: EvaSpawner + CuePlayer + SceneObjects,
{
    let Some(snapshot) = world.get::<&Hatch>(hatch).ok().map(|h| (*h).clone()) else {
        return false;
    };
    if snapshot.permanent {
        return false;
    }

    let partner = live_partner(world, &snapshot);
    if target.is_open() {
        let partner_enabled = partner
            .and_then(|p| world.get::<&Hatch>(p).ok().map(|h| h.enabled || h.permanent))
            .unwrap_or(true);
        if !snapshot.enabled || !partner_enabled {
            log::debug!("Hatch {:?} is disabled, ignoring open", hatch);
            return false;
        }
        if partner.is_none() && !request_eva(host, crew, &snapshot) {
            return false;
        }
    }

    let changed = commit(world, host, hatch, target, true);

    if let Some(partner) = partner {
        let partner_state = world.get::<&Hatch>(partner).ok().map(|h| h.state);
        if partner_state.is_some_and(|s| s != target) {
            set_open(world, host, crew, partner, target);
        }
    }
    changed
}

pub fn toggle<H>(world: &mut World, host: &mut H, crew: Option<CrewId>, hatch: Entity) -> bool
where
    H: EvaSpawner + CuePlayer + SceneObjects,
{
    let Some(state) = world.get::<&Hatch>(hatch).ok().map(|h| h.state) else {
        return false;
    };
    set_open(world, host, crew, hatch, state.toggled())
}

fn request_eva(host: &mut impl EvaSpawner, crew: Option<CrewId>, hatch: &Hatch) -> bool {
    let Some(crew) = crew else {
        log::info!("No crew member in the interior, cannot go EVA");
        return false;
    };
    let spawned = host.spawn_eva(crew, hatch.config.airlock_name.as_deref());
    if !spawned {
        log::info!("EVA refused for crew {}", crew);
    }
    spawned
}

/// Write `target` into the hatch and update its visuals. Plays the matching
/// cue when the state actually changes and `with_cue` is set.
pub(crate) fn commit<H>(
    world: &mut World,
    host: &mut H,
    hatch: Entity,
    target: HatchState,
    with_cue: bool,
) -> bool
where
    H: CuePlayer + SceneObjects,
{
    let Ok(mut h) = world.get::<&mut Hatch>(hatch) else {
        return false;
    };
    apply_visuals(host, &h, target);
    if h.state == target {
        return false;
    }
    if with_cue {
        host.play_cue(h.cue_for(target));
    }
    h.state = target;
    true
}

/// Show or hide the door and hide-when-open objects for `state`.
pub fn apply_visuals(scene: &mut impl SceneObjects, hatch: &Hatch, state: HatchState) {
    let closed = !state.is_open();
    if let Some(door) = hatch.door {
        scene.set_visible(door, closed && !hatch.permanent);
    }
    for &object in &hatch.hide_when_open {
        scene.set_visible(object, closed);
    }
}

/// Turn a freshly paired hatch into a permanent passage if either side asks
/// to hide its door once connected. Both sides are forced open without a
/// cue and drop out of all further open/close handling.
pub fn make_permanent_passage<H>(world: &mut World, host: &mut H, hatch: Entity) -> bool
where
    H: CuePlayer + SceneObjects,
{
    let Some((partner, wants_hidden, permanent)) = world.get::<&Hatch>(hatch).ok().map(|h| {
        (
            live_partner(world, &h),
            h.config.hide_door_when_connected,
            h.permanent,
        )
    }) else {
        return false;
    };
    let Some(partner) = partner else {
        return false;
    };
    if permanent {
        return false;
    }
    let partner_wants_hidden = world
        .get::<&Hatch>(partner)
        .ok()
        .is_some_and(|h| h.config.hide_door_when_connected);
    if !wants_hidden && !partner_wants_hidden {
        return false;
    }

    for side in [hatch, partner] {
        if let Ok(mut h) = world.get::<&mut Hatch>(side) {
            h.permanent = true;
            h.enabled = true;
        }
        commit(world, host, side, HatchState::Open, false);
    }
    true
}

/// Enable or disable a hatch. Disabling closes it (and its partner).
/// Permanent passages ignore this.
pub fn set_enabled<H>(
    world: &mut World,
    host: &mut H,
    crew: Option<CrewId>,
    hatch: Entity,
    enabled: bool,
) -> bool
where
    H: EvaSpawner + CuePlayer + SceneObjects,
{
    let is_open = {
        let Ok(mut h) = world.get::<&mut Hatch>(hatch) else {
            return false;
        };
        if h.permanent {
            return false;
        }
        h.enabled = enabled;
        h.is_open()
    };
    if !enabled && is_open {
        set_open(world, host, crew, hatch, HatchState::Closed);
    }
    true
}

/// Close every operable hatch on `vessel`. Only ever requests `Closed`, so
/// no EVA is possible. Returns how many hatches changed state, partners
/// closed through propagation included.
pub fn close_all_hatches<H>(world: &mut World, host: &mut H, vessel: VesselId) -> usize
where
    H: VesselGraph + EvaSpawner + CuePlayer + SceneObjects,
{
    let was_open: Vec<Entity> = world
        .query::<&Hatch>()
        .iter()
        .filter(|(_, h)| h.is_open() && !h.permanent)
        .map(|(e, _)| e)
        .collect();
    let on_vessel: Vec<Entity> = was_open
        .iter()
        .copied()
        .filter(|&e| {
            world
                .get::<&Hatch>(e)
                .is_ok_and(|h| host.vessel_of(h.part) == Some(vessel))
        })
        .collect();

    for hatch in on_vessel {
        let still_open = world.get::<&Hatch>(hatch).is_ok_and(|h| h.is_open());
        if still_open {
            set_open(world, host, None, hatch, HatchState::Closed);
        }
    }

    was_open
        .into_iter()
        .filter(|&e| world.get::<&Hatch>(e).is_ok_and(|h| !h.is_open()))
        .count()
}

/// Resolve the door and hide-when-open objects named in `config`.
/// Anything that fails to resolve is logged and left unbound.
pub fn bind_geometry(
    scene: &impl SceneObjects,
    model: ModelId,
    config: &HatchConfig,
) -> (Option<ObjectId>, Vec<ObjectId>) {
    let door = config.door_name.as_ref().and_then(|name| {
        let found = scene.find_object(model, name);
        if found.is_none() {
            log::error!(
                "{}",
                IvaError::Configuration {
                    model,
                    name: name.clone()
                }
            );
        }
        found
    });

    let mut hidden = Vec::new();
    for entry in &config.hide_when_open {
        let candidates = scene.find_objects_named(model, &entry.name);
        match candidates
            .iter()
            .find(|(_, pos)| pos.approx_eq(&entry.position, HIDE_MATCH_TOLERANCE))
        {
            Some((id, _)) => hidden.push(*id),
            None => log::warn!(
                "{}",
                IvaError::ResourceMissing {
                    model,
                    name: entry.name.clone()
                }
            ),
        }
    }
    (door, hidden)
}
