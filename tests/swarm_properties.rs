//! Integration tests for whole-swarm properties.
//!
//! These drive the public API the way a host would and check the guarantees
//! that must hold on every tick: finite state, speed and force caps, fixed
//! population, containment, lifecycle timing, and sound neighbor queries.

use bioswarm::prelude::*;
use bioswarm::{SpatialConfig, SpatialIndex, SpawnContext};

const EPS: f32 = 1e-5;

fn assert_tick_invariants(sim: &SwarmSimulator) {
    let config = sim.config();
    assert_eq!(sim.population(), config.max_particles);
    assert_eq!(sim.output().len(), config.max_particles);
    for agent in sim.agents() {
        assert!(agent.is_finite(), "agent {} is not finite", agent.id);
        assert!(agent.acceleration.is_finite());
        assert!(
            agent.velocity.length() <= config.max_speed + EPS,
            "agent {} speed {} over cap",
            agent.id,
            agent.velocity.length()
        );
        assert!(
            agent.acceleration.length() <= config.max_force + EPS,
            "agent {} force {} over cap",
            agent.id,
            agent.acceleration.length()
        );
        assert!(agent.energy >= 0.1 && agent.energy <= 1.0);
    }
}

// ============================================================================
// Finiteness and caps
// ============================================================================

#[test]
fn test_default_swarm_stays_finite_and_capped() {
    let mut sim = SwarmSimulator::new(SwarmConfig::new().with_max_particles(400).with_seed(1)).unwrap();
    for _ in 0..300 {
        let stats = sim.tick(1.0 / 60.0);
        assert_eq!(stats.numeric_faults, 0);
        assert_tick_invariants(&sim);
    }
}

#[test]
fn test_coincident_agents_stay_finite() {
    let lifecycle = Lifecycle::new().spawn(SpawnShape::Point {
        position: Vec3::new(0.1, -0.2, 0.3),
        direction: Vec3::Y,
        spread: 0.0,
    });
    let config = SwarmConfig::new()
        .with_max_particles(64)
        .with_lifecycle(lifecycle)
        .with_seed(2);
    let mut sim = SwarmSimulator::new(config).unwrap();

    let start = sim.agents()[0].position;
    assert!(sim.agents().iter().all(|a| a.position == start));

    for _ in 0..120 {
        sim.tick(1.0 / 60.0);
        assert_tick_invariants(&sim);
    }

    // wander breaks the tie
    let spread = sim
        .agents()
        .iter()
        .map(|a| a.position.distance(start))
        .fold(0.0, f32::max);
    assert!(spread > 0.0);
}

#[test]
fn test_pointer_input_keeps_caps() {
    let mut sim = SwarmSimulator::new(SwarmConfig::new().with_max_particles(200).with_seed(3)).unwrap();
    let attract = PointerInput::new(Vec3::new(0.2, 0.2, 0.0)).with_radius(0.8).with_strength(5.0);
    let repel = attract.repel();
    for i in 0..120 {
        let pointer = if i % 2 == 0 { &attract } else { &repel };
        sim.tick_with(1.0 / 60.0, Some(pointer));
        assert_tick_invariants(&sim);
    }
}

// ============================================================================
// Containment
// ============================================================================

#[test]
fn test_containment_over_long_run() {
    let config = SwarmConfig::new()
        .with_max_particles(500)
        .with_limits(0.1, 0.03)
        .with_seed(4);
    let dt = 1.0 / 60.0;
    let allowed = config.bounds + config.max_speed * dt;
    let mut sim = SwarmSimulator::new(config).unwrap();

    for _ in 0..600 {
        sim.tick(dt);
        assert_tick_invariants(&sim);
        for agent in sim.agents() {
            assert!(
                agent.position.length() <= allowed,
                "agent {} escaped to {}",
                agent.id,
                agent.position.length()
            );
        }
    }
}

#[test]
fn test_spawn_outside_bounds_rejected() {
    let lifecycle = Lifecycle::new().spawn(SpawnShape::Box {
        min: Vec3::splat(1.5),
        max: Vec3::splat(2.0),
    });
    let config = SwarmConfig::new()
        .with_max_particles(50)
        .with_lifecycle(lifecycle)
        .with_seed(5);
    assert!(matches!(
        SwarmSimulator::new(config),
        Err(ConfigError::SpawnOutsideBounds { .. })
    ));
}

#[test]
fn test_recycled_records_stay_inside() {
    let lifecycle = Lifecycle::new()
        .lifetime_range(0.05..0.1)
        .spawn(SpawnShape::Shell {
            center: Vec3::ZERO,
            radius: 1.0,
            inward: true,
        });
    let config = SwarmConfig::new()
        .with_max_particles(200)
        .with_lifecycle(lifecycle)
        .with_seed(5);
    let bounds = config.bounds;
    let mut sim = SwarmSimulator::new(config).unwrap();

    let mut recycled = 0;
    for _ in 0..30 {
        recycled += sim.tick(1.0 / 60.0).recycled;
        for record in sim.output().records() {
            let radius = Vec3::from(record.position).length();
            assert!(radius <= bounds + EPS, "record published at {radius}");
        }
    }
    assert!(recycled > 0);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_single_wanderer_ages_exactly() {
    let weights = RuleWeights {
        separation: 0.0,
        alignment: 0.0,
        cohesion: 0.0,
        wander: 1.0,
        pointer: 0.0,
        containment: 0.0,
    };
    let config = SwarmConfig::new()
        .with_max_particles(1)
        .with_weights(weights)
        .with_lifecycle(Lifecycle::new().lifetime(10.0))
        .with_seed(6);
    let mut sim = SwarmSimulator::new(config).unwrap();

    // exactly representable in binary
    let dt = 1.0 / 64.0;
    let start = sim.agents()[0].position;
    for _ in 0..100 {
        let stats = sim.tick(dt);
        assert_eq!(stats.recycled, 0);
        assert_eq!(stats.neighbors_seen, 0);
    }

    let agent = &sim.agents()[0];
    assert_eq!(agent.age, 100.0 * dt);
    assert_eq!(agent.generation, 0);
    assert_ne!(agent.position, start);
}

#[test]
fn test_forced_age_recycles_in_place() {
    let mut sim = SwarmSimulator::new(SwarmConfig::new().with_max_particles(30).with_seed(7)).unwrap();
    sim.tick(1.0 / 60.0);

    let before = sim.agents()[12].clone();
    sim.force_age(12, before.max_age);
    let stats = sim.tick(1.0 / 60.0);

    assert_eq!(stats.recycled, 1);
    assert_eq!(sim.population(), 30);
    let after = &sim.agents()[12];
    assert_eq!(after.id, 12);
    assert_eq!(after.generation, before.generation + 1);
    assert_eq!(after.age, 0.0);
}

#[test]
fn test_population_constant_under_churn() {
    let lifecycle = Lifecycle::new().lifetime_range(0.05..0.2);
    let config = SwarmConfig::new()
        .with_max_particles(120)
        .with_lifecycle(lifecycle)
        .with_seed(8);
    let mut sim = SwarmSimulator::new(config).unwrap();

    let mut recycled = 0;
    for _ in 0..120 {
        recycled += sim.tick(1.0 / 60.0).recycled;
        assert_tick_invariants(&sim);
    }
    assert!(recycled > 120);
    for (i, agent) in sim.agents().iter().enumerate() {
        assert_eq!(agent.id as usize, i);
        assert!(agent.age < agent.max_age);
    }
}

// ============================================================================
// Quality
// ============================================================================

#[test]
fn test_quality_steady_at_target() {
    let quality = QualityConfig {
        interval_secs: 0.0,
        ..Default::default()
    };
    let config = SwarmConfig::new()
        .with_max_particles(100)
        .with_quality(quality)
        .with_seed(9);
    let mut sim = SwarmSimulator::new(config).unwrap();
    let before = sim.quality();
    for _ in 0..100 {
        sim.tick(1.0 / 60.0);
    }
    assert_eq!(sim.quality(), before);
}

#[test]
fn test_quality_backs_off_over_target() {
    let quality = QualityConfig {
        interval_secs: 0.0,
        target_population: Some(50),
        ..Default::default()
    };
    let config = SwarmConfig::new()
        .with_max_particles(200)
        .with_quality(quality)
        .with_seed(10);
    let mut sim = SwarmSimulator::new(config).unwrap();
    sim.tick(1.0 / 60.0);
    let state = sim.quality();
    assert!(state.render_scale < 1.0);
    assert!(state.render_scale >= 0.5);
    assert!(state.effect_intensity >= 0.3);
}

// ============================================================================
// Spatial index
// ============================================================================

#[test]
fn test_neighbor_query_has_no_false_negatives() {
    let cell_size = 0.12;
    let mut ctx = SpawnContext::new(Some(11), 1.0);
    let mut positions: Vec<Vec3> = (0..800).map(|_| ctx.random_in_sphere(1.0)).collect();
    // a few beyond the grid
    positions.extend((0..20).map(|_| ctx.random_on_sphere(3.0)));

    let mut index = SpatialIndex::new(SpatialConfig::for_extent(cell_size, 1.0));
    index.rebuild(positions.iter().copied());

    let mut candidates = Vec::new();
    for (i, &p) in positions.iter().enumerate() {
        index.query_into(p, cell_size, &mut candidates);
        for (j, &q) in positions.iter().enumerate() {
            if p.distance(q) <= cell_size {
                assert!(candidates.contains(&(j as u32)), "{i} missed neighbor {j}");
            }
        }
    }
}

// ============================================================================
// Host surface
// ============================================================================

#[test]
fn test_seeded_runs_are_repeatable() {
    let config = SwarmConfig::new().with_max_particles(150).with_seed(12);
    let mut a = SwarmSimulator::new(config.clone()).unwrap();
    let mut b = SwarmSimulator::new(config).unwrap();
    for _ in 0..60 {
        a.tick(1.0 / 60.0);
        b.tick(1.0 / 60.0);
    }
    assert_eq!(a.output().as_floats(), b.output().as_floats());
}

#[test]
fn test_json_config_drives_simulator() {
    let config = SwarmConfig::from_json(
        r#"{
            "max_particles": 75,
            "max_speed": 0.15,
            "weights": { "cohesion": 0.5 },
            "lifecycle": { "min_lifetime": 5.0, "max_lifetime": 6.0 },
            "seed": 13
        }"#,
    )
    .unwrap();
    let mut sim = SwarmSimulator::new(config).unwrap();
    sim.tick(1.0 / 60.0);
    assert_eq!(sim.output().len(), 75);
    assert_eq!(sim.output().as_bytes().len(), 75 * AgentRecord::SIZE);
    assert_tick_invariants(&sim);
}

#[test]
fn test_ambient_scene_runs() {
    let mut scene = AmbientScene::new(
        SwarmConfig::new().with_max_particles(64).with_seed(14),
        FieldConfig::new(32),
        ActivationNetwork::ring(6).unwrap(),
    )
    .unwrap();
    scene.network_mut().stimulate(0, 1.0);
    for _ in 0..120 {
        scene.advance(1.0 / 60.0, None);
    }
    let bound = scene.field().magnitude_bound();
    assert!(scene.field().samples().iter().all(|s| s.magnitude() <= bound + EPS));
    assert!(scene.network().activations().iter().all(|a| (0.0..=1.0).contains(a)));
    assert_tick_invariants(scene.swarm());
}
