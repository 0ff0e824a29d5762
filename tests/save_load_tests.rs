#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use dnasandbox::simulation::error::SimError;
use dnasandbox::simulation::params::Params;
use dnasandbox::simulation::snapshot::SNAPSHOT_VERSION;
use dnasandbox::simulation::world::World;
use std::fs;

fn create_test_params() -> Params {
    Params {
        world_width: 800.0,
        world_height: 600.0,
        max_entities: 200,
        predator_ratio: 0.0,
        ..Params::default()
    }
}

fn temp_path(name: &str) -> String {
    std::env::temp_dir()
        .join(format!("dnasandbox_{}_{}.json", name, std::process::id()))
        .to_string_lossy()
        .into_owned()
}

fn running_world() -> World {
    let mut world = World::new(create_test_params()).expect("valid params");
    world.initialize(20).expect("within capacity");
    // Run simulation for a bit to create some state
    for _ in 0..5 {
        world.step(0.016).expect("step succeeds");
    }
    world
}

#[test]
fn test_save_and_load() {
    let world = running_world();
    let save_path = temp_path("round_trip");

    world.save_to_file(&save_path).expect("Failed to save world");

    let mut loaded = World::new(create_test_params()).expect("valid params");
    loaded
        .load_from_file(&save_path)
        .expect("Failed to load world");

    assert_eq!(loaded.entities().len(), world.entities().len());
    assert!((loaded.time() - world.time()).abs() < 0.001);
    assert_eq!(loaded.step_count(), world.step_count());

    for (original, restored) in world.entities().iter().zip(loaded.entities()) {
        assert_eq!(original.id, restored.id);
        assert!((original.pos[0] - restored.pos[0]).abs() < 0.001);
        assert!((original.pos[1] - restored.pos[1]).abs() < 0.001);
        assert!((original.vel[0] - restored.vel[0]).abs() < 0.001);
        assert!((original.vel[1] - restored.vel[1]).abs() < 0.001);
        assert!((original.mass - restored.mass).abs() < 0.001);
        assert!((original.radius - restored.radius).abs() < 0.001);
        assert!((original.dna.gravity[1] - restored.dna.gravity[1]).abs() < 0.001);
        assert!((original.dna.friction - restored.dna.friction).abs() < 1e-6);
        assert_eq!(original.kind, restored.kind);
        assert!((original.energy - restored.energy).abs() < 0.001);
        assert_eq!(original.age, restored.age);
        assert!(restored.trail.is_empty());
    }

    // the restored world keeps running and hands out fresh ids
    loaded.step(0.016).expect("restored world steps");

    fs::remove_file(&save_path).ok();
}

#[test]
fn test_save_creates_valid_json() {
    let world = running_world();
    let save_path = temp_path("valid_json");

    world.save_to_file(&save_path).expect("Failed to save world");

    let content = fs::read_to_string(&save_path).expect("Failed to read file");
    let json: serde_json::Value = serde_json::from_str(&content).expect("Invalid JSON");

    assert_eq!(json["version"], SNAPSHOT_VERSION);
    assert!(json["saved_at"].is_string());
    assert_eq!(json["entities"].as_array().map(Vec::len), Some(20));
    assert_eq!(json["entities"][0]["kind"], "Prey");

    fs::remove_file(&save_path).ok();
}

#[test]
fn test_load_nonexistent_file() {
    let mut world = running_world();
    let before = world.entities().len();

    let result = world.load_from_file("nonexistent_file_that_does_not_exist.json");

    assert!(matches!(result, Err(SimError::Io(_))));
    assert_eq!(world.entities().len(), before);
}

#[test]
fn test_load_invalid_json_leaves_world_intact() {
    let mut world = running_world();
    let path = temp_path("garbage");
    fs::write(&path, "{ not json").expect("write temp file");
    let ids: Vec<usize> = world.entities().iter().map(|e| e.id).collect();

    let result = world.load_from_file(&path);

    assert!(matches!(result, Err(SimError::Json(_))));
    let after: Vec<usize> = world.entities().iter().map(|e| e.id).collect();
    assert_eq!(ids, after);

    fs::remove_file(&path).ok();
}

#[test]
fn test_restore_rejects_bad_records() {
    let source = running_world();
    let mut target = World::new(create_test_params()).expect("valid params");
    target.initialize(3).expect("within capacity");

    let mut snapshot = source.snapshot();
    snapshot.entities[4].radius = -2.0;
    assert!(matches!(target.restore(&snapshot), Err(SimError::Snapshot(_))));

    let mut snapshot = source.snapshot();
    snapshot.entities[1].id = snapshot.entities[0].id;
    assert!(matches!(target.restore(&snapshot), Err(SimError::Snapshot(_))));

    let mut snapshot = source.snapshot();
    snapshot.entities[2].dna.friction = 3.0;
    assert!(target.restore(&snapshot).is_err());

    let mut snapshot = source.snapshot();
    snapshot.entities[0].pos[0] = f32::NAN;
    assert!(target.restore(&snapshot).is_err());

    let mut snapshot = source.snapshot();
    snapshot.version = SNAPSHOT_VERSION + 1;
    assert!(target.restore(&snapshot).is_err());

    assert_eq!(target.entities().len(), 3);
}

#[test]
fn test_restore_rejects_different_world_size() {
    let source = running_world();
    let mut target = World::new(Params::default()).expect("valid params");

    let result = target.restore(&source.snapshot());

    assert!(matches!(result, Err(SimError::Snapshot(_))));
    assert!(target.entities().is_empty());
}

#[test]
fn test_params_file_round_trip() {
    let params = Params {
        mix_rate: 0.25,
        max_entities: 42,
        ..Params::default()
    };
    let path = temp_path("params");

    params.to_file(&path).expect("write params");
    let loaded = Params::from_file(&path).expect("read params");

    assert_eq!(loaded, params);
    fs::remove_file(&path).ok();
}

#[test]
fn test_params_file_fills_missing_fields() {
    let path = temp_path("partial_params");
    fs::write(&path, r#"{ "mutation_chance": 0.5 }"#).expect("write temp file");

    let loaded = Params::from_file(&path).expect("read params");

    assert_eq!(loaded.mutation_chance, 0.5);
    assert_eq!(loaded.world_width, Params::default().world_width);
    fs::remove_file(&path).ok();
}
