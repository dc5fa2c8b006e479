//! # Simulation Configuration
//!
//! Loaded once at startup from TOML. Every field is optional; missing fields
//! take the defaults below.
//!
//! ```toml
//! [world]
//! gravity = { x = 0.0, y = 1.2 }
//! bowl_radius = 0.4
//!
//! [balls]
//! count = 1000
//! seed = 5489
//!
//! [run]
//! target_fps = 120.0
//! frames = 600
//! paced = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DemoError, DemoResult};
use crate::math::Vec2;

/// Global world properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Constant acceleration applied to every ball (`+y` is down).
    pub gravity: Vec2,
    /// Centre of the circular bowl.
    pub bowl_centre: Vec2,
    /// Radius of the bowl.
    pub bowl_radius: f32,
    /// A ball centre below this height counts as reaching the bottom.
    pub bottom_y: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 1.2),
            bowl_centre: Vec2::ZERO,
            bowl_radius: 0.4,
            bottom_y: 0.35,
        }
    }
}

/// How many balls to spawn and how.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Number of balls.
    pub count: usize,
    /// Smallest ball radius.
    pub min_radius: f32,
    /// Largest ball radius.
    pub max_radius: f32,
    /// Seed of the radius generator.
    pub seed: u64,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            min_radius: 0.002,
            max_radius: 0.02,
            seed: 5489,
        }
    }
}

/// Main loop settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Frames per second to aim for; also sets the fixed step when unpaced.
    pub target_fps: f64,
    /// Number of frames to simulate.
    pub frames: u64,
    /// Frames averaged by the frame-time window.
    pub frame_window: usize,
    /// Sleep to hold `target_fps` and step by measured time.
    pub paced: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_fps: 120.0,
            frames: 600,
            frame_window: 10,
            paced: false,
        }
    }
}

/// Complete simulation configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// World properties.
    pub world: WorldConfig,
    /// Ball spawning.
    pub balls: BallConfig,
    /// Main loop.
    pub run: RunConfig,
}

impl SimConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails
    /// [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> DemoResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are
    /// rejected by [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> DemoResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DemoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks that the configured world can be simulated.
    ///
    /// # Errors
    ///
    /// Returns [`DemoError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> DemoResult<()> {
        let invalid = |msg: String| Err(DemoError::InvalidConfig(msg));
        let (world, balls, run) = (&self.world, &self.balls, &self.run);

        if !(world.gravity.is_finite() && world.bowl_centre.is_finite()) {
            return invalid("world vectors must be finite".into());
        }
        if !(world.bowl_radius.is_finite() && world.bowl_radius > 0.0) {
            return invalid(format!("bowl_radius must be positive, got {}", world.bowl_radius));
        }
        if !(balls.min_radius.is_finite() && balls.min_radius > 0.0) {
            return invalid(format!("min_radius must be positive, got {}", balls.min_radius));
        }
        if !(balls.max_radius.is_finite() && balls.max_radius >= balls.min_radius) {
            return invalid(format!(
                "max_radius {} is below min_radius {}",
                balls.max_radius, balls.min_radius
            ));
        }
        if balls.max_radius >= world.bowl_radius {
            return invalid(format!(
                "max_radius {} does not fit in a bowl of radius {}",
                balls.max_radius, world.bowl_radius
            ));
        }
        if !(run.target_fps.is_finite() && run.target_fps > 0.0) {
            return invalid(format!("target_fps must be positive, got {}", run.target_fps));
        }
        if run.frame_window == 0 {
            return invalid("frame_window must hold at least one frame".into());
        }
        Ok(())
    }
}
