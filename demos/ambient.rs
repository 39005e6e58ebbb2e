//! Headless ambient scene
//!
//! Runs the swarm, coherence field and activation network for a few seconds
//! of simulated time and prints what a renderer would receive.
//! Run with: RUST_LOG=bioswarm=debug cargo run --example ambient [config.json]

use bioswarm::prelude::*;

/// Stands in for a GPU upload: tracks mean energy per frame.
struct EnergyMeter {
    frames: usize,
    last_mean: f32,
}

impl FrameConsumer for EnergyMeter {
    fn name(&self) -> &str {
        "energy-meter"
    }

    fn consume(&mut self, records: &[AgentRecord]) -> Result<(), ConsumerError> {
        if records.is_empty() {
            return Err(ConsumerError::new(self.name(), "empty frame"));
        }
        self.frames += 1;
        self.last_mean = records.iter().map(|r| r.energy).sum::<f32>() / records.len() as f32;
        if self.frames % 60 == 0 {
            tracing::info!(frames = self.frames, mean_energy = self.last_mean, "energy meter");
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = match std::env::args().nth(1) {
        Some(path) => SwarmConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SwarmConfig::new()
            .with_max_particles(2_000)
            .with_lifecycle(Lifecycle::new().lifetime_range(4.0..10.0)),
    };

    let mut scene = AmbientScene::new(config, FieldConfig::new(256), ActivationNetwork::ring(12)?)?;
    scene.swarm_mut().attach_consumer(Box::new(EnergyMeter {
        frames: 0,
        last_mean: 0.0,
    }));

    let dt = 1.0 / 60.0;
    let mut recycled = 0;
    for frame in 0..600u32 {
        // Sweep the pointer across the scene
        let t = frame as f32 * dt;
        let pointer = PointerInput::from_2d(Vec2::new(t.cos() * 0.6, (t * 0.7).sin() * 0.4));
        if frame % 120 == 0 {
            scene.network_mut().stimulate(0, 1.0);
        }

        let stats = scene.advance(dt, Some(&pointer));
        recycled += stats.recycled;

        if frame % 60 == 0 {
            let quality = scene.swarm().quality();
            println!(
                "t={:5.2}s  neighbors={:7}  recycled={:4}  field={:.4}  node0={:.3}  scale={:.2}",
                t,
                stats.neighbors_seen,
                recycled,
                scene.field().mean_magnitude(),
                scene.network().activation(0).unwrap_or(0.0),
                quality.render_scale,
            );
        }
    }

    println!(
        "{} agents, {} bytes per frame",
        scene.swarm().population(),
        scene.swarm().output().as_bytes().len()
    );
    scene.dispose();
    Ok(())
}
