//! # TESSERA Demo
//!
//! Headless balls-in-a-bowl simulation.
//!
//! ```bash
//! # Defaults: 1000 balls, 600 frames at a fixed 1/120 s step
//! ./tessera_demo
//!
//! # Custom world and pacing
//! ./tessera_demo sim.toml
//!
//! # More detail
//! RUST_LOG=debug ./tessera_demo
//! ```

use std::process::ExitCode;

use tessera_demo::{DemoResult, SimConfig, Simulation};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "demo failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> DemoResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    tracing::info!(
        balls = config.balls.count,
        seed = config.balls.seed,
        frames = config.run.frames,
        target_fps = config.run.target_fps,
        paced = config.run.paced,
        "starting simulation"
    );

    let mut sim = Simulation::new(&config);
    let stats = sim.run(&config.run);

    tracing::info!(
        frames = stats.frames,
        simulated_secs = stats.simulated_secs,
        wall = ?stats.wall,
        energy = stats.energy,
        hit_bottom = stats.hit_bottom,
        "simulation finished"
    );
    println!("{}", sim.profiler().report());
    Ok(())
}
