//! # TESSERA Demo
//!
//! A headless simulation of balls falling into a circular bowl, built on the
//! compile-time typed ECS in `tessera_core`.
//!
//! ## Frame Order
//!
//! 1. **Gravity** - accumulate acceleration on every ball
//! 2. **Constraint** - push balls back inside the bowl, reflect their velocity
//!    and rescale its magnitude so energy is conserved
//! 3. **Integration** - drift-kick-drift position update
//! 4. **Logging** - total energy per mass, first contact with the bottom
//!
//! ## Example
//!
//! ```rust
//! use tessera_demo::{SimConfig, Simulation};
//!
//! let mut config = SimConfig::default();
//! config.balls.count = 10;
//!
//! let mut sim = Simulation::new(&config);
//! sim.step(1.0 / 120.0);
//! assert!(sim.energy().is_finite());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod colour;
pub mod components;
pub mod config;
pub mod error;
pub mod math;
pub mod pacing;
pub mod profiler;
pub mod simulation;
pub mod spawn;
pub mod systems;

pub use colour::{hsv_to_rgb, Hsv, Rgb};
pub use components::{BallManager, Balls, Physics, Render, Transform};
pub use config::{BallConfig, RunConfig, SimConfig, WorldConfig};
pub use error::{DemoError, DemoResult};
pub use math::Vec2;
pub use pacing::FrameLimiter;
pub use profiler::{Profiler, ScopedTimer, TimerStats};
pub use simulation::{RunStats, Simulation};
pub use spawn::spawn_balls;
pub use systems::{EnergyLogger, MotionSolver};
