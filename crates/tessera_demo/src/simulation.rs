//! # Simulation
//!
//! Owns the ball world and runs the per-frame systems in order.

use std::time::{Duration, Instant};

use tessera_core::EntityRange;

use crate::components::BallManager;
use crate::config::{RunConfig, SimConfig};
use crate::pacing::FrameLimiter;
use crate::profiler::Profiler;
use crate::spawn::spawn_balls;
use crate::systems::{EnergyLogger, MotionSolver};

/// Summary of a [`Simulation::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunStats {
    /// Frames simulated by this run.
    pub frames: u64,
    /// Simulated seconds since the simulation was created.
    pub simulated_secs: f32,
    /// Wall-clock time of this run.
    pub wall: Duration,
    /// Total energy per mass after the last frame.
    pub energy: f32,
    /// Whether any ball has reached the bottom.
    pub hit_bottom: bool,
}

/// A bowl of balls plus the systems that move them.
#[derive(Debug)]
pub struct Simulation {
    em: BallManager,
    balls: EntityRange,
    solver: MotionSolver,
    logger: EnergyLogger,
    profiler: Profiler,
    frames: u64,
}

impl Simulation {
    /// Spawns the balls described by `config`.
    ///
    /// `config` is expected to have passed [`SimConfig::validate`].
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        let mut em = BallManager::with_capacity(config.balls.count);
        let balls = spawn_balls(&mut em, &config.world, &config.balls);
        Self {
            em,
            balls,
            solver: MotionSolver::new(&config.world),
            logger: EnergyLogger::new(&config.world),
            profiler: Profiler::new(),
            frames: 0,
        }
    }

    /// Advances the world by `dt` seconds: motion, then logging.
    pub fn step(&mut self, dt: f32) {
        let mut step = self.profiler.scoped("step");
        {
            let _timer = step.scoped("motion");
            self.solver.update(&mut self.em, dt);
        }
        {
            let _timer = step.scoped("logger");
            self.logger.update(&mut self.em, dt);
        }
        self.frames += 1;
    }

    /// Runs `run.frames` frames.
    ///
    /// Paced runs sleep to hold `run.target_fps` and step by measured frame
    /// time; unpaced runs step by a fixed `1 / target_fps` as fast as possible.
    pub fn run(&mut self, run: &RunConfig) -> RunStats {
        #[allow(clippy::cast_possible_truncation)]
        let fixed_dt = (1.0 / run.target_fps) as f32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let report_every = (run.target_fps.round() as u64).max(1);

        let started = Instant::now();
        let mut limiter = FrameLimiter::new(run.target_fps, run.frame_window);
        limiter.start();

        for _ in 0..run.frames {
            let dt = if run.paced { limiter.frame() } else { fixed_dt };
            self.step(dt);

            if self.frames % report_every == 0 {
                tracing::info!(
                    frame = self.frames,
                    time = self.logger.time(),
                    energy = self.logger.energy(),
                    "energy report"
                );
            }
        }

        if run.paced {
            tracing::debug!(frame_time = limiter.frame_time(), "average frame work time");
        }

        RunStats {
            frames: run.frames,
            simulated_secs: self.logger.time(),
            wall: started.elapsed(),
            energy: self.logger.energy(),
            hit_bottom: self.logger.has_hit_bottom(),
        }
    }

    /// The ball world.
    #[must_use]
    pub fn manager(&self) -> &BallManager {
        &self.em
    }

    /// The ball world, mutably.
    pub fn manager_mut(&mut self) -> &mut BallManager {
        &mut self.em
    }

    /// Handles of the spawned balls.
    #[must_use]
    pub fn balls(&self) -> EntityRange {
        self.balls.clone()
    }

    /// Energy and bottom-contact tracking.
    #[must_use]
    pub fn logger(&self) -> &EnergyLogger {
        &self.logger
    }

    /// Total energy per mass after the last step.
    #[must_use]
    pub fn energy(&self) -> f32 {
        self.logger.energy()
    }

    /// Step timings.
    #[must_use]
    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    /// Steps taken so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
