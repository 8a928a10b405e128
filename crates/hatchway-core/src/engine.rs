//! Interior engine - main entry point for the scene collaborator.
//!
//! Owns the hatch/interior world and the model registry, and runs the
//! systems in the right order for each lifecycle event.

use hecs::{Entity, World};

use crate::components::*;
use crate::config::InteriorConfig;
use crate::error::IvaError;
use crate::host::Host;
use crate::registry::ModelRegistry;
use crate::systems::*;

/// Whether shared mesh data may be modified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Assets are still loading; mesh cuts are allowed
    Loading,
    /// Active flight; mesh data is live and must not be cut
    Flight,
}

/// Main interior engine
pub struct IvaEngine {
    /// ECS world holding interiors and hatches
    pub world: World,
    /// Model -> interior controller lookups
    pub registry: ModelRegistry,
    pub phase: GamePhase,
    /// Crew member currently walking the interior (used for EVA)
    pub active_crew: Option<CrewId>,
    /// Hatches waiting for their late initialization pass
    pending: Vec<Entity>,
}

impl IvaEngine {
    /// Create an empty engine in the loading phase
    pub fn new() -> Self {
        Self {
            world: World::new(),
            registry: ModelRegistry::new(),
            phase: GamePhase::Loading,
            active_crew: None,
            pending: Vec::new(),
        }
    }

    pub fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
    }

    pub fn set_active_crew(&mut self, crew: Option<CrewId>) {
        self.active_crew = crew;
    }

    /// Spawn the interior for `part` and register it.
    ///
    /// Hatches are created closed and queued; they search for partners in the
    /// next `finish_initialization` pass so every hatch spawned alongside
    /// them is already registered. If the configuration expects no
    /// hatch-driven cuts, the static cut batch runs right away.
    pub fn spawn_interior<H: Host>(
        &mut self,
        host: &mut H,
        part: PartId,
        config: &InteriorConfig,
    ) -> Result<Entity, IvaError> {
        if !host.is_on_active_vessel(part) {
            return Err(IvaError::InactiveVessel { part });
        }
        let model = host.interior_model(part).ok_or(IvaError::NoInterior { part })?;
        if let Some(existing) = self.registry.lookup(model) {
            if self.world.contains(existing) {
                log::warn!("Model {} already spawned, keeping existing interior", model);
                return Ok(existing);
            }
        }

        let barrier = begin_barrier(&*host, model, config);
        let interior = self.world.spawn((Interior::new(model, part), barrier));

        let mut hatches = Vec::with_capacity(config.hatches.len());
        for hatch_config in &config.hatches {
            let (door, hidden) = bind_geometry(&*host, model, hatch_config);
            let mut hatch = Hatch::new(interior, part, hatch_config.clone());
            hatch.door = door;
            hatch.hide_when_open = hidden;
            apply_visuals(host, &hatch, hatch.state);
            hatches.push(self.world.spawn((hatch,)));
        }
        if let Ok(mut i) = self.world.get::<&mut Interior>(interior) {
            i.hatches = hatches.clone();
        }
        self.pending.extend(hatches);
        self.registry.register(model, interior);

        log::info!(
            "Spawned interior for part {} (model {}, {} hatches)",
            part,
            model,
            config.hatches.len()
        );

        fire_barrier(&mut self.world, host, interior, self.phase);
        Ok(interior)
    }

    /// Release an interior: unregister it, despawn its hatches and close any
    /// hatch on another interior that was paired with one of them.
    pub fn despawn_interior<H: Host>(&mut self, host: &mut H, interior: Entity) -> bool {
        let Some((model, hatches)) = self
            .world
            .get::<&Interior>(interior)
            .ok()
            .map(|i| (i.model, i.hatches.clone()))
        else {
            return false;
        };

        let mut orphaned = Vec::new();
        for &hatch in &hatches {
            let partner = self.world.get::<&Hatch>(hatch).ok().and_then(|h| h.connected);
            if let Some(partner) = partner.filter(|p| !hatches.contains(p)) {
                orphaned.push(partner);
            }
            if let Err(e) = self.world.despawn(hatch) {
                log::debug!("Hatch {:?} already gone: {}", hatch, e);
            }
        }
        if let Err(e) = self.world.despawn(interior) {
            log::debug!("Interior {:?} already gone: {}", interior, e);
        }

        if self.registry.lookup(model) == Some(interior) {
            self.registry.unregister(model);
        }
        self.pending.retain(|e| self.world.contains(*e));
        for partner in orphaned {
            sever(&mut self.world, host, partner);
            if !self.pending.contains(&partner) {
                self.pending.push(partner);
            }
        }

        log::info!("Despawned interior for model {}", model);
        true
    }

    /// Late initialization for every queued hatch: report cutouts to the cut
    /// barrier, search for partners, set up permanent passages and refresh.
    /// Returns how many hatches were processed.
    pub fn finish_initialization<H: Host>(&mut self, host: &mut H) -> usize {
        let batch: Vec<Entity> = std::mem::take(&mut self.pending)
            .into_iter()
            .filter(|e| self.world.contains(*e))
            .collect();

        for &hatch in &batch {
            report_hatch_cut(&mut self.world, host, hatch, self.phase);
        }

        let mut touched = batch.clone();
        for &hatch in &batch {
            if let Some(partner) = resolve_connection(&mut self.world, &self.registry, &*host, hatch) {
                make_permanent_passage(&mut self.world, host, hatch);
                if !touched.contains(&partner) {
                    touched.push(partner);
                }
            }
        }

        for hatch in touched {
            refresh_hatch(&mut self.world, host, hatch);
        }
        batch.len()
    }

    /// Per-frame update. Runs the late initialization pass when hatches are
    /// waiting for it.
    pub fn update<H: Host>(&mut self, host: &mut H) {
        if !self.pending.is_empty() {
            self.finish_initialization(host);
        }
    }

    pub fn set_open<H: Host>(&mut self, host: &mut H, hatch: Entity, open: bool) -> bool {
        set_open(
            &mut self.world,
            host,
            self.active_crew,
            hatch,
            HatchState::from_open(open),
        )
    }

    pub fn toggle<H: Host>(&mut self, host: &mut H, hatch: Entity) -> bool {
        toggle(&mut self.world, host, self.active_crew, hatch)
    }

    pub fn set_enabled<H: Host>(&mut self, host: &mut H, hatch: Entity, enabled: bool) -> bool {
        set_enabled(&mut self.world, host, self.active_crew, hatch, enabled)
    }

    pub fn close_all_hatches<H: Host>(&mut self, host: &mut H, vessel: VesselId) -> usize {
        close_all_hatches(&mut self.world, host, vessel)
    }

    /// React to decoupling, docking or part loss on `vessel`.
    pub fn on_vessel_structure_changed<H: Host>(&mut self, host: &mut H, vessel: VesselId) {
        log::info!("Vessel {} changed structure, rechecking hatches", vessel);

        for interior in stale_interiors(&self.world, &self.registry, &*host) {
            self.despawn_interior(host, interior);
        }

        let mut requeued = invalidate_stale_connections(&mut self.world, host);
        requeued.extend(requeue_unpaired(&mut self.world, &*host));
        for hatch in requeued {
            if !self.pending.contains(&hatch) {
                self.pending.push(hatch);
            }
        }

        for hatch in self.hatches() {
            refresh_hatch(&mut self.world, host, hatch);
        }
    }

    /// Get a copy of a hatch
    pub fn hatch(&self, hatch: Entity) -> Option<Hatch> {
        self.world.get::<&Hatch>(hatch).ok().map(|h| (*h).clone())
    }

    pub fn state(&self, hatch: Entity) -> Option<HatchState> {
        self.world.get::<&Hatch>(hatch).ok().map(|h| h.state)
    }

    pub fn is_open(&self, hatch: Entity) -> bool {
        self.state(hatch).is_some_and(HatchState::is_open)
    }

    /// Live partner of a hatch
    pub fn connection(&self, hatch: Entity) -> Option<Entity> {
        self.world
            .get::<&Hatch>(hatch)
            .ok()
            .and_then(|h| h.connected)
            .filter(|p| self.world.contains(*p))
    }

    pub fn interior_for(&self, model: ModelId) -> Option<Entity> {
        self.registry.lookup(model)
    }

    pub fn hatches_of(&self, interior: Entity) -> Vec<Entity> {
        self.world
            .get::<&Interior>(interior)
            .map(|i| i.hatches.clone())
            .unwrap_or_default()
    }

    /// Hatch of `interior` sitting on attachment node `node`
    pub fn hatch_on_node(&self, interior: Entity, node: &str) -> Option<Entity> {
        self.hatches_of(interior).into_iter().find(|&h| {
            self.world
                .get::<&Hatch>(h)
                .is_ok_and(|h| h.attach_node() == Some(node))
        })
    }

    pub fn hatches(&self) -> Vec<Entity> {
        self.world.query::<&Hatch>().iter().map(|(e, _)| e).collect()
    }

    pub fn hatch_count(&self) -> usize {
        self.world.query::<&Hatch>().iter().count()
    }

    pub fn interior_count(&self) -> usize {
        self.world.query::<&Interior>().iter().count()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Default for IvaEngine {
    fn default() -> Self {
        Self::new()
    }
}
