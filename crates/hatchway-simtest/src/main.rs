//! Hatchway Headless Scenario Harness
//!
//! Loads a vessel scenario from JSON and drives the interior engine through
//! loading, flight and decoupling against the in-memory host.
//!
//! Usage:
//!   cargo run -p hatchway-simtest
//!   cargo run -p hatchway-simtest -- --verbose
//!   RUST_LOG=debug cargo run -p hatchway-simtest

use hatchway_core::headless::{HeadlessHost, VesselLayout};
use hatchway_core::host::SceneObjects;
use hatchway_core::prelude::*;
use hecs::Entity;
use serde::Deserialize;

// ── Scenario (tunnel-joined pod and hab, lab docked on top) ─────────────
const SCENARIO_JSON: &str = include_str!("../../../data/docked_stack.json");

const CREW: CrewId = 1;

#[derive(Debug, Deserialize)]
struct ObjectSpec {
    model: ModelId,
    name: String,
    #[serde(default)]
    position: Vec3,
}

#[derive(Debug, Deserialize)]
struct InteriorSpec {
    part: PartId,
    config: InteriorConfig,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    layout: VesselLayout,
    #[serde(default)]
    objects: Vec<ObjectSpec>,
    interiors: Vec<InteriorSpec>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

/// Engine, host and the hatches the checks refer to
struct Rig {
    engine: IvaEngine,
    host: HeadlessHost,
    pod_top: Entity,
    pod_side: Entity,
    hab_bottom: Entity,
    hab_top: Entity,
    lab_bottom: Entity,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Hatchway Scenario Harness ===\n");

    let mut results = Vec::new();

    // 1. Scenario load + interior spawn
    let Some(mut rig) = load_rig(&mut results) else {
        report(&results, verbose);
        std::process::exit(1);
    };

    // 2. Cut batching during loading
    results.extend(validate_cut_batches(&mut rig));

    // 3. Hatch pairing
    results.extend(validate_pairing(&rig));

    // 4. Open/close in flight
    results.extend(validate_hatch_state(&mut rig));

    // 5. Decoupling
    results.extend(validate_decoupling(&mut rig));

    if !report(&results, verbose) {
        std::process::exit(1);
    }
}

/// Print the summary; true if everything passed
fn report(results: &[TestResult], verbose: bool) -> bool {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );
    failed == 0
}

// ── 1. Scenario ─────────────────────────────────────────────────────────

fn load_rig(results: &mut Vec<TestResult>) -> Option<Rig> {
    println!("--- Scenario ---");

    let scenario: Scenario = match serde_json::from_str(SCENARIO_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(check("scenario_parse", false, format!("JSON parse error: {}", e)));
            return None;
        }
    };
    results.push(check(
        "scenario_parse",
        true,
        format!(
            "{} parts, {} interiors",
            scenario.layout.parts.len(),
            scenario.interiors.len()
        ),
    ));

    log::info!(
        "Loaded scenario with {} parts on vessel {:?}",
        scenario.layout.parts.len(),
        scenario.layout.active_vessel
    );
    let mut host = HeadlessHost::new(scenario.layout);
    for object in &scenario.objects {
        host.add_object(object.model, object.name.as_str(), object.position);
    }

    let mut engine = IvaEngine::new();
    engine.set_active_crew(Some(CREW));

    let mut interiors = Vec::new();
    for spec in &scenario.interiors {
        match engine.spawn_interior(&mut host, spec.part, &spec.config) {
            Ok(interior) => interiors.push(interior),
            Err(e) => {
                results.push(check("interior_spawn", false, format!("part {}: {}", spec.part, e)));
                return None;
            }
        }
    }
    results.push(check(
        "interior_spawn",
        engine.registry.len() == interiors.len(),
        format!("{} interiors registered", engine.registry.len()),
    ));

    let hatch = |model: ModelId, node: &str| {
        engine
            .interior_for(model)
            .and_then(|i| engine.hatch_on_node(i, node))
    };
    let found = (
        hatch(100, "top"),
        hatch(100, "side"),
        hatch(300, "bottom"),
        hatch(300, "top"),
        hatch(400, "bottom"),
    );
    let (Some(pod_top), Some(pod_side), Some(hab_bottom), Some(hab_top), Some(lab_bottom)) = found
    else {
        results.push(check("hatch_lookup", false, "a scenario hatch is missing"));
        return None;
    };
    results.push(check("hatch_lookup", true, format!("{} hatches", engine.hatch_count())));

    Some(Rig {
        engine,
        host,
        pod_top,
        pod_side,
        hab_bottom,
        hab_top,
        lab_bottom,
    })
}

// ── 2. Cut batches ──────────────────────────────────────────────────────

fn validate_cut_batches(rig: &mut Rig) -> Vec<TestResult> {
    println!("--- Cut Batches ---");
    let mut results = Vec::new();

    // Pod and hab each wait on a hatch cutout; the lab has nothing to cut
    results.push(check(
        "cuts_wait_for_hatches",
        rig.host.cuts.is_empty(),
        format!("{} cuts before late init", rig.host.cuts.len()),
    ));

    let processed = rig.engine.finish_initialization(&mut rig.host);
    results.push(check(
        "late_init_processed",
        processed == rig.engine.hatch_count(),
        format!("{} hatches initialized", processed),
    ));

    // pod: 1 hatch cut; hab: 1 static window + 1 hatch cut
    results.push(check(
        "cuts_fired_once",
        rig.host.cuts.len() == 3,
        format!("{} cuts performed", rig.host.cuts.len()),
    ));

    let chained = rig
        .host
        .cuts
        .windows(2)
        .any(|w| w[0].result == Some(w[1].target));
    results.push(check(
        "cuts_chain_on_same_target",
        chained,
        "second hab cut targets the first cut's result",
    ));

    rig.engine.update(&mut rig.host);
    results.push(check(
        "cuts_not_repeated",
        rig.host.cuts.len() == 3,
        format!("{} cuts after another update", rig.host.cuts.len()),
    ));

    results
}

// ── 3. Pairing ──────────────────────────────────────────────────────────

fn validate_pairing(rig: &Rig) -> Vec<TestResult> {
    println!("--- Pairing ---");
    let engine = &rig.engine;
    let mut results = Vec::new();

    results.push(check(
        "tunnel_pair",
        engine.connection(rig.pod_top) == Some(rig.hab_bottom),
        "pod top pairs with hab bottom through the tunnel",
    ));
    results.push(check(
        "docked_pair",
        engine.connection(rig.hab_top) == Some(rig.lab_bottom),
        "hab top pairs with lab bottom",
    ));
    results.push(check(
        "open_space_unpaired",
        engine.connection(rig.pod_side).is_none(),
        "pod side faces vacuum",
    ));

    let asymmetric: Vec<Entity> = engine
        .hatches()
        .into_iter()
        .filter(|&h| {
            engine
                .connection(h)
                .is_some_and(|p| engine.connection(p) != Some(h))
        })
        .collect();
    results.push(check(
        "pairs_symmetric",
        asymmetric.is_empty(),
        format!("{} one-sided links", asymmetric.len()),
    ));

    let tube = engine.hatch(rig.pod_top).and_then(|h| h.tube_length);
    results.push(check(
        "tunnel_tube_length",
        tube.is_some_and(|t| (t - 1.0).abs() < 0.001),
        format!("pod tube {:?}", tube),
    ));

    let permanent = [rig.hab_top, rig.lab_bottom]
        .iter()
        .all(|&h| engine.is_open(h) && engine.hatch(h).is_some_and(|h| h.permanent));
    let lab_door_hidden = rig
        .host
        .find_object(400, "lab_hatch_bottom")
        .is_some_and(|door| !rig.host.is_visible(door));
    results.push(check(
        "permanent_passage",
        permanent && lab_door_hidden,
        "hab/lab passage forced open with the lab door hidden",
    ));

    results
}

// ── 4. Hatch state ──────────────────────────────────────────────────────

fn validate_hatch_state(rig: &mut Rig) -> Vec<TestResult> {
    println!("--- Hatch State ---");
    let mut results = Vec::new();
    rig.engine.set_phase(GamePhase::Flight);
    rig.host.clear_records();

    rig.engine.set_open(&mut rig.host, rig.pod_top, true);
    results.push(check(
        "open_propagates",
        rig.engine.is_open(rig.pod_top) && rig.engine.is_open(rig.hab_bottom),
        format!("cues {:?}", rig.host.cues),
    ));
    results.push(check(
        "open_inside_no_eva",
        rig.host.eva_requests.is_empty(),
        "opening a paired hatch stays inside",
    ));

    let seals = rig.host.find_objects_named(300, "seal_ring");
    let hidden: Vec<ObjectId> = seals
        .iter()
        .map(|&(id, _)| id)
        .filter(|&id| !rig.host.is_visible(id))
        .collect();
    results.push(check(
        "hide_when_open_fuzzy",
        hidden.len() == 1,
        format!("{} of {} seal rings hidden", hidden.len(), seals.len()),
    ));

    rig.engine.set_open(&mut rig.host, rig.pod_side, true);
    results.push(check(
        "open_to_vacuum_eva",
        rig.host.eva_requests == vec![(CREW, Some("pod_airlock".to_string()))],
        format!("eva requests {:?}", rig.host.eva_requests),
    ));
    results.push(check(
        "cue_override",
        rig.host.cues.last().map(String::as_str) == Some("airlock_cycle"),
        "side hatch plays its own open cue",
    ));

    let stayed = !rig.engine.set_open(&mut rig.host, rig.lab_bottom, false);
    results.push(check(
        "permanent_ignores_close",
        stayed && rig.engine.is_open(rig.lab_bottom),
        "lab passage stays open",
    ));

    rig.host.clear_records();
    let closed = rig.engine.close_all_hatches(&mut rig.host, 1);
    let still_open: Vec<Entity> = [rig.pod_top, rig.pod_side, rig.hab_bottom]
        .into_iter()
        .filter(|&h| rig.engine.is_open(h))
        .collect();
    results.push(check(
        "close_all",
        still_open.is_empty() && rig.host.eva_requests.is_empty(),
        format!("{} closed, {} still open", closed, still_open.len()),
    ));

    results
}

// ── 5. Decoupling ───────────────────────────────────────────────────────

fn validate_decoupling(rig: &mut Rig) -> Vec<TestResult> {
    println!("--- Decoupling ---");
    let mut results = Vec::new();
    rig.host.clear_records();

    rig.host.layout.decouple(4, "bottom", 2);
    rig.engine.on_vessel_structure_changed(&mut rig.host, 1);

    results.push(check(
        "departed_interior_released",
        rig.engine.interior_for(400).is_none() && !rig.engine.world.contains(rig.lab_bottom),
        format!("{} interiors left", rig.engine.interior_count()),
    ));

    let hab_top = rig.engine.hatch(rig.hab_top);
    results.push(check(
        "severed_hatch_closed",
        hab_top
            .as_ref()
            .is_some_and(|h| h.connected.is_none() && !h.permanent && !h.is_open()),
        "hab top closed and unpaired",
    ));

    rig.engine.update(&mut rig.host);
    results.push(check(
        "tunnel_pair_survives",
        rig.engine.connection(rig.pod_top) == Some(rig.hab_bottom),
        "pod/hab link untouched",
    ));

    rig.engine.set_open(&mut rig.host, rig.hab_top, true);
    results.push(check(
        "severed_hatch_faces_vacuum",
        rig.host.eva_requests.len() == 1,
        format!("eva requests {:?}", rig.host.eva_requests),
    ));

    results
}
