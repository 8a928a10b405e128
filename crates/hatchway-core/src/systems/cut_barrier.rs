//! Cut barrier - collects static and hatch-driven cut requests for an
//! interior and runs them as one batch once every expected hatch reported.

use std::collections::HashMap;

use hecs::{Entity, World};

use crate::components::{CutBarrier, CutKind, CutRequest, Hatch, Interior, ModelId, ObjectId};
use crate::config::{CutConfig, HatchConfig, InteriorConfig};
use crate::engine::GamePhase;
use crate::error::IvaError;
use crate::host::{MeshCutter, SceneObjects};

/// Build the barrier for a model about to load. The expected count comes
/// from configuration alone; static cuts are resolved now.
pub fn begin_barrier(scene: &impl SceneObjects, model: ModelId, config: &InteriorConfig) -> CutBarrier {
    let mut requests = Vec::with_capacity(config.cuts.len());
    for cut in &config.cuts {
        match resolve_static_cut(scene, model, cut) {
            Ok(request) => requests.push(request),
            Err(e) => log::error!("{}", e),
        }
    }
    CutBarrier::new(config.expected_hatch_cuts(), requests)
}

fn resolve_named(scene: &impl SceneObjects, model: ModelId, name: &str) -> Result<ObjectId, IvaError> {
    scene
        .find_object(model, name)
        .ok_or_else(|| IvaError::Configuration {
            model,
            name: name.to_owned(),
        })
}

fn resolve_static_cut(
    scene: &impl SceneObjects,
    model: ModelId,
    cut: &CutConfig,
) -> Result<CutRequest, IvaError> {
    let target = resolve_named(scene, model, &cut.target)?;
    match cut.kind {
        CutKind::Delete => Ok(CutRequest::delete(target)),
        CutKind::Boolean => {
            let tool_name = cut.tool.as_deref().ok_or_else(|| IvaError::Configuration {
                model,
                name: format!("{} (no tool)", cut.target),
            })?;
            let tool = resolve_named(scene, model, tool_name)?;
            Ok(CutRequest::boolean(target, tool))
        }
    }
}

fn resolve_hatch_cut(
    scene: &impl SceneObjects,
    model: ModelId,
    config: &HatchConfig,
) -> Result<Option<CutRequest>, IvaError> {
    let (Some(tool), Some(target)) = (
        config.cutout_transform_name.as_deref(),
        config.cutout_target_transform_name.as_deref(),
    ) else {
        return Ok(None);
    };
    let tool = resolve_named(scene, model, tool)?;
    let target = resolve_named(scene, model, target)?;
    Ok(Some(CutRequest::boolean(target, tool)))
}

/// Report `hatch`'s cutout to its interior's barrier, firing the batch if it
/// was the last one expected. Each hatch reports at most once. A cutout that
/// fails to resolve still counts down but contributes nothing.
pub fn report_hatch_cut<H>(world: &mut World, host: &mut H, hatch: Entity, phase: GamePhase) -> bool
where
    H: SceneObjects + MeshCutter,
{
    let (interior, config) = {
        let Ok(mut h) = world.get::<&mut Hatch>(hatch) else {
            return false;
        };
        if h.cut_reported || !h.config.declares_cutout() {
            return false;
        }
        h.cut_reported = true;
        (h.interior, h.config.clone())
    };
    let Some(model) = world.get::<&Interior>(interior).ok().map(|i| i.model) else {
        return false;
    };

    let request = match resolve_hatch_cut(&*host, model, &config) {
        Ok(request) => request,
        Err(e) => {
            log::error!("{}", e);
            None
        }
    };

    let ready = match world.get::<&mut CutBarrier>(interior) {
        Ok(mut barrier) => barrier.contribute(request),
        Err(_) => return false,
    };
    if ready {
        fire_barrier(world, host, interior, phase);
    }
    true
}

/// Run the barrier's batch if it is ready. Outside the loading phase the
/// batch is discarded instead. Returns the number of cuts performed.
/// An empty batch still consumes the barrier.
pub fn fire_barrier(
    world: &mut World,
    cutter: &mut impl MeshCutter,
    interior: Entity,
    phase: GamePhase,
) -> usize {
    let Some(model) = world.get::<&Interior>(interior).ok().map(|i| i.model) else {
        return 0;
    };
    let batch = match world.get::<&mut CutBarrier>(interior) {
        Ok(mut barrier) => barrier.take(),
        Err(_) => None,
    };
    let Some(batch) = batch.filter(|b| !b.is_empty()) else {
        return 0;
    };

    if phase != GamePhase::Loading {
        log::error!(
            "{}",
            IvaError::BarrierMisuse {
                model,
                discarded: batch.len()
            }
        );
        return 0;
    }

    log::info!("Model {}: running {} mesh cut(s)", model, batch.len());
    execute_batch(cutter, &batch)
}

/// Apply every request in order. Cuts against the same target chain: the
/// mesh a cut returns becomes the target of the next cut on that object.
pub fn execute_batch(cutter: &mut impl MeshCutter, batch: &[CutRequest]) -> usize {
    let mut replaced: HashMap<ObjectId, ObjectId> = HashMap::new();
    let mut performed = 0;

    for request in batch {
        let target = replaced.get(&request.target).copied().unwrap_or(request.target);
        let result = cutter.perform_mesh_cut(target, request.tool, request.kind);
        performed += 1;
        match result {
            Some(mesh) => {
                replaced.insert(request.target, mesh);
            }
            None => {
                replaced.remove(&request.target);
            }
        }
    }
    performed
}
