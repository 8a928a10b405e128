//! Integration tests for hatch pairing, hatch state and cut batching.
//!
//! Exercises: spawn_interior → finish_initialization → set_open / toggle
//! → on_vessel_structure_changed, against the headless host.

use hatchway_core::headless::{HeadlessHost, PartLayout, VesselLayout};
use hatchway_core::prelude::*;
use hatchway_core::systems::report_hatch_cut;
use hecs::Entity;

// ── Helpers ────────────────────────────────────────────────────────────

const CREW: CrewId = 7;

fn node(y: f32) -> Vec3 {
    Vec3::new(0.0, y, 0.0)
}

/// X (interior, node "top") ── Y (passthrough, bottom/top) ── Z (interior, node "bottom")
fn stack_layout() -> VesselLayout {
    let mut layout = VesselLayout::new(1)
        .with_part(PartLayout::new(1, 1).with_interior(100).with_node("top", node(1.0)))
        .with_part(
            PartLayout::new(2, 1)
                .with_node("bottom", node(1.0))
                .with_node("top", node(3.0))
                .with_passthrough("top", "bottom"),
        )
        .with_part(PartLayout::new(3, 1).with_interior(300).with_node("bottom", node(3.0)));
    layout.attach(1, "top", 2, "bottom");
    layout.attach(2, "top", 3, "bottom");
    layout
}

fn hatch_interior(node: &str) -> InteriorConfig {
    InteriorConfig::default().with_hatch(HatchConfig::at_node(node))
}

fn engine_with_crew() -> IvaEngine {
    let mut engine = IvaEngine::new();
    engine.set_active_crew(Some(CREW));
    engine
}

fn spawn_stack(engine: &mut IvaEngine, host: &mut HeadlessHost, x: &InteriorConfig, z: &InteriorConfig) -> (Entity, Entity) {
    let ix = engine.spawn_interior(host, 1, x).unwrap();
    let iz = engine.spawn_interior(host, 3, z).unwrap();
    engine.update(host);
    let hx = engine.hatch_on_node(ix, "top").unwrap();
    let hz = engine.hatch_on_node(iz, "bottom").unwrap();
    (hx, hz)
}

/// Every connection in the world points back at its owner.
fn assert_symmetric(engine: &IvaEngine) {
    for hatch in engine.hatches() {
        if let Some(partner) = engine.connection(hatch) {
            assert_eq!(engine.connection(partner), Some(hatch));
        }
    }
}

// ── Connectivity ───────────────────────────────────────────────────────

#[test]
fn passthrough_part_is_skipped() {
    let mut host = HeadlessHost::new(stack_layout());
    let mut engine = engine_with_crew();

    let (hx, hz) = spawn_stack(&mut engine, &mut host, &hatch_interior("top"), &hatch_interior("bottom"));

    assert_eq!(engine.connection(hx), Some(hz));
    assert_eq!(engine.connection(hz), Some(hx));
    assert_symmetric(&engine);
}

#[test]
fn later_spawn_finds_earlier_hatch() {
    let mut host = HeadlessHost::new(stack_layout());
    let mut engine = engine_with_crew();

    let ix = engine.spawn_interior(&mut host, 1, &hatch_interior("top")).unwrap();
    engine.update(&mut host);
    let hx = engine.hatch_on_node(ix, "top").unwrap();
    assert_eq!(engine.connection(hx), None);

    let iz = engine.spawn_interior(&mut host, 3, &hatch_interior("bottom")).unwrap();
    engine.update(&mut host);
    let hz = engine.hatch_on_node(iz, "bottom").unwrap();

    assert_eq!(engine.connection(hx), Some(hz));
    assert_symmetric(&engine);
}

#[test]
fn passthrough_entered_off_slot_connects_nothing() {
    let mut layout = stack_layout();
    layout.part_mut(2).unwrap().passthrough = Some(("left".into(), "right".into()));
    let mut host = HeadlessHost::new(layout);
    let mut engine = engine_with_crew();

    let (hx, hz) = spawn_stack(&mut engine, &mut host, &hatch_interior("top"), &hatch_interior("bottom"));

    assert_eq!(engine.connection(hx), None);
    assert_eq!(engine.connection(hz), None);
}

#[test]
fn cyclic_passthrough_graph_terminates() {
    let mut layout = VesselLayout::new(1)
        .with_part(PartLayout::new(1, 1).with_interior(100).with_node("top", node(0.0)))
        .with_part(
            PartLayout::new(2, 1)
                .with_node("a", node(0.0))
                .with_node("b", node(1.0))
                .with_passthrough("a", "b"),
        )
        .with_part(
            PartLayout::new(3, 1)
                .with_node("a", node(1.0))
                .with_node("b", node(2.0))
                .with_passthrough("a", "b"),
        );
    layout.attach(1, "top", 2, "a");
    layout.attach(2, "b", 3, "a");
    // Malformed: 3's far slot loops back into 2
    layout.set_attached(3, "b", Some(2));
    let mut host = HeadlessHost::new(layout);
    let mut engine = engine_with_crew();

    let ix = engine.spawn_interior(&mut host, 1, &hatch_interior("top")).unwrap();
    engine.update(&mut host);

    let hx = engine.hatch_on_node(ix, "top").unwrap();
    assert_eq!(engine.connection(hx), None);
}

#[test]
fn tube_spans_half_the_passthrough() {
    let mut host = HeadlessHost::new(stack_layout());
    let mut engine = engine_with_crew();
    let z = InteriorConfig::default().with_hatch(HatchConfig::at_node("bottom").with_tube_extent(0.25));

    let (hx, hz) = spawn_stack(&mut engine, &mut host, &hatch_interior("top"), &z);

    let tube_x = engine.hatch(hx).unwrap().tube_length.unwrap();
    assert!((tube_x - 1.0).abs() < 0.001);
    assert_eq!(engine.hatch(hz).unwrap().tube_length, Some(0.25));
}

// ── Hatch state ────────────────────────────────────────────────────────

#[test]
fn open_to_vacuum_goes_eva() {
    let layout = VesselLayout::new(1)
        .with_part(PartLayout::new(1, 1).with_interior(100).with_node("top", node(1.0)));
    let mut host = HeadlessHost::new(layout);
    let mut engine = engine_with_crew();
    let config = InteriorConfig::default().with_hatch(HatchConfig::at_node("top").with_airlock("airlock"));

    let ix = engine.spawn_interior(&mut host, 1, &config).unwrap();
    engine.update(&mut host);
    let hx = engine.hatch_on_node(ix, "top").unwrap();

    assert_eq!(engine.connection(hx), None);
    assert!(engine.set_open(&mut host, hx, true));
    assert_eq!(host.eva_requests, vec![(CREW, Some("airlock".to_string()))]);
    assert!(engine.is_open(hx));
}

#[test]
fn connected_pair_converges_from_either_side() {
    let mut host = HeadlessHost::new(stack_layout());
    let mut engine = engine_with_crew();
    let (hx, hz) = spawn_stack(&mut engine, &mut host, &hatch_interior("top"), &hatch_interior("bottom"));

    engine.set_open(&mut host, hz, true);
    assert!(engine.is_open(hx) && engine.is_open(hz));

    engine.set_open(&mut host, hx, false);
    assert!(!engine.is_open(hx) && !engine.is_open(hz));

    // One cue per hatch per transition, never more
    assert_eq!(host.cues.len(), 4);
    assert!(host.eva_requests.is_empty());
}

#[test]
fn hide_door_when_connected_makes_permanent_passage() {
    let mut host = HeadlessHost::new(stack_layout());
    let door_x = host.add_object(100, "door", node(1.0));
    let door_z = host.add_object(300, "door", node(0.0));
    let mut engine = engine_with_crew();
    let x = InteriorConfig::default()
        .with_hatch(HatchConfig::at_node("top").with_door("door").hiding_door_when_connected());
    let z = InteriorConfig::default()
        .with_hatch(HatchConfig::at_node("bottom").with_door("door").hiding_door_when_connected());

    let (hx, hz) = spawn_stack(&mut engine, &mut host, &x, &z);

    assert!(engine.is_open(hx) && engine.is_open(hz));
    assert!(!host.is_visible(door_x));
    assert!(!host.is_visible(door_z));

    host.clear_records();
    assert!(!engine.set_open(&mut host, hx, false));
    assert!(!engine.toggle(&mut host, hz));
    assert!(engine.is_open(hx) && engine.is_open(hz));
    assert!(host.cues.is_empty());
}

#[test]
fn close_all_never_goes_eva() {
    let mut layout = stack_layout();
    layout.parts.push(PartLayout::new(4, 1).with_interior(400).with_node("side", node(5.0)));
    let mut host = HeadlessHost::new(layout);
    let mut engine = engine_with_crew();
    let (hx, _hz) = spawn_stack(&mut engine, &mut host, &hatch_interior("top"), &hatch_interior("bottom"));
    let iw = engine.spawn_interior(&mut host, 4, &hatch_interior("side")).unwrap();
    engine.update(&mut host);
    let hw = engine.hatch_on_node(iw, "side").unwrap();

    engine.set_open(&mut host, hx, true);
    engine.set_open(&mut host, hw, true);
    host.clear_records();

    let closed = engine.close_all_hatches(&mut host, 1);

    // hx, its partner hz, and hw
    assert_eq!(closed, 3);
    assert!(engine.hatches().iter().all(|&h| !engine.is_open(h)));
    assert!(host.eva_requests.is_empty());
    // Idempotent
    assert_eq!(engine.close_all_hatches(&mut host, 1), 0);
    assert!(host.eva_requests.is_empty());
}

#[test]
fn hide_when_open_objects_follow_state() {
    let layout = VesselLayout::new(1)
        .with_part(PartLayout::new(1, 1).with_interior(100).with_node("top", node(1.0)));
    let mut host = HeadlessHost::new(layout);
    let seal = host.add_object(100, "seal", Vec3::new(0.1, 1.05, 0.0));
    let mut engine = engine_with_crew();
    let config = InteriorConfig::default()
        .with_hatch(HatchConfig::at_node("top").hiding_when_open("seal", node(1.0)));

    let ix = engine.spawn_interior(&mut host, 1, &config).unwrap();
    engine.update(&mut host);
    let hx = engine.hatch_on_node(ix, "top").unwrap();

    assert!(host.is_visible(seal));
    engine.set_open(&mut host, hx, true);
    assert!(!host.is_visible(seal));
    engine.set_open(&mut host, hx, false);
    assert!(host.is_visible(seal));
}

// ── Cut barrier ────────────────────────────────────────────────────────

fn cut_layout_host() -> HeadlessHost {
    let layout = VesselLayout::new(1).with_part(
        PartLayout::new(1, 1)
            .with_interior(100)
            .with_node("top", node(1.0))
            .with_node("bottom", node(-1.0)),
    );
    let mut host = HeadlessHost::new(layout);
    for name in ["shell", "cutter_top", "cutter_bottom", "window_cutter"] {
        host.add_object(100, name, Vec3::ZERO);
    }
    host
}

fn cut_config() -> InteriorConfig {
    InteriorConfig::default()
        .with_hatch(HatchConfig::at_node("top").with_cutout("cutter_top", "shell"))
        .with_hatch(HatchConfig::at_node("bottom").with_cutout("cutter_bottom", "shell"))
        .with_cut(CutConfig {
            target: "shell".into(),
            tool: Some("window_cutter".into()),
            kind: CutKind::Boolean,
        })
}

#[test]
fn barrier_waits_for_every_hatch() {
    let mut host = cut_layout_host();
    let mut engine = engine_with_crew();

    let interior = engine.spawn_interior(&mut host, 1, &cut_config()).unwrap();
    assert!(host.cuts.is_empty());

    let top = engine.hatch_on_node(interior, "top").unwrap();
    assert!(report_hatch_cut(&mut engine.world, &mut host, top, GamePhase::Loading));
    assert!(host.cuts.is_empty());

    engine.update(&mut host);
    assert_eq!(host.cuts.len(), 3);

    // One-shot
    engine.finish_initialization(&mut host);
    assert!(!report_hatch_cut(&mut engine.world, &mut host, top, GamePhase::Loading));
    assert_eq!(host.cuts.len(), 3);
}

#[test]
fn barrier_with_no_hatch_cuts_fires_at_spawn() {
    let mut host = cut_layout_host();
    let mut engine = engine_with_crew();
    let config = InteriorConfig::default()
        .with_hatch(HatchConfig::at_node("top"))
        .with_cut(CutConfig {
            target: "shell".into(),
            tool: Some("window_cutter".into()),
            kind: CutKind::Boolean,
        });

    engine.spawn_interior(&mut host, 1, &config).unwrap();

    assert_eq!(host.cuts.len(), 1);
    engine.update(&mut host);
    assert_eq!(host.cuts.len(), 1);
}

#[test]
fn unresolved_cutout_still_releases_barrier() {
    let mut host = cut_layout_host();
    let mut engine = engine_with_crew();
    let config = InteriorConfig::default()
        .with_hatch(HatchConfig::at_node("top").with_cutout("no_such_cutter", "shell"))
        .with_hatch(HatchConfig::at_node("bottom").with_cutout("cutter_bottom", "shell"));

    engine.spawn_interior(&mut host, 1, &config).unwrap();
    engine.update(&mut host);

    assert_eq!(host.cuts.len(), 1);
}

#[test]
fn barrier_in_flight_discards_batch() {
    let mut host = cut_layout_host();
    let mut engine = engine_with_crew();

    engine.spawn_interior(&mut host, 1, &cut_config()).unwrap();
    engine.set_phase(GamePhase::Flight);
    engine.update(&mut host);

    assert!(host.cuts.is_empty());
}

// ── Topology ───────────────────────────────────────────────────────────

#[test]
fn decoupling_despawns_and_closes() {
    let mut host = HeadlessHost::new(stack_layout());
    let mut engine = engine_with_crew();
    let (hx, hz) = spawn_stack(&mut engine, &mut host, &hatch_interior("top"), &hatch_interior("bottom"));
    engine.set_open(&mut host, hx, true);

    // Z flies off on its own vessel
    host.layout.decouple(3, "bottom", 2);
    engine.on_vessel_structure_changed(&mut host, 1);

    assert!(engine.interior_for(300).is_none());
    assert!(!engine.world.contains(hz));
    assert_eq!(engine.connection(hx), None);
    assert!(!engine.is_open(hx));
    assert!(engine.hatch(hx).unwrap().tube_length.is_none());

    // With nothing attached any more, opening is an EVA
    engine.update(&mut host);
    assert!(engine.set_open(&mut host, hx, true));
    assert_eq!(host.eva_requests.len(), 1);
}

#[test]
fn docking_pairs_previously_unpaired_hatches() {
    let mut layout = stack_layout();
    layout.set_attached(2, "top", None);
    layout.set_attached(3, "bottom", None);
    let mut host = HeadlessHost::new(layout);
    let mut engine = engine_with_crew();
    let (hx, hz) = spawn_stack(&mut engine, &mut host, &hatch_interior("top"), &hatch_interior("bottom"));
    assert_eq!(engine.connection(hx), None);

    host.layout.attach(2, "top", 3, "bottom");
    engine.on_vessel_structure_changed(&mut host, 1);
    engine.update(&mut host);

    assert_eq!(engine.connection(hx), Some(hz));
    assert_symmetric(&engine);
}
