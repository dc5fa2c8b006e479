//! # Ball Systems
//!
//! Behaviour over ball components. Each system runs whole-world passes
//! through bulk queries.
//!
//! Per step, in order:
//! - [`MotionSolver`]: gravity, bowl constraint, drift-kick-drift
//! - [`EnergyLogger`]: energy total and bottom-contact event

use crate::components::{BallManager, Physics, Transform};
use crate::config::WorldConfig;
use crate::math::Vec2;

// ============================================================================
// MOTION
// ============================================================================

/// Moves balls under gravity inside a circular bowl.
#[derive(Clone, Debug)]
pub struct MotionSolver {
    gravity: Vec2,
    bowl_centre: Vec2,
    bowl_radius: f32,
}

impl MotionSolver {
    /// Creates a solver for `world`.
    #[must_use]
    pub fn new(world: &WorldConfig) -> Self {
        Self {
            gravity: world.gravity,
            bowl_centre: world.bowl_centre,
            bowl_radius: world.bowl_radius,
        }
    }

    /// Advances every ball by `dt`.
    pub fn update(&self, em: &mut BallManager, dt: f32) {
        self.apply_gravity(em);
        self.apply_constraint(em);
        Self::update_positions(em, dt);
    }

    fn apply_gravity(&self, em: &mut BallManager) {
        let gravity = self.gravity;
        em.for_all_components::<(Physics,)>(|(ph,)| ph.acc += gravity);
    }

    fn apply_constraint(&self, em: &mut BallManager) {
        em.for_all_components::<(Transform, Physics)>(|(tr, ph)| self.constrain(tr, ph));
    }

    /// Pushes a ball that left the bowl back onto its rim.
    ///
    /// The normal velocity is reflected, then the speed is rescaled so the
    /// ball's energy per mass equals the energy it had at the start of the
    /// previous step.
    fn constrain(&self, tr: &mut Transform, ph: &mut Physics) {
        let conn = tr.pos - self.bowl_centre;
        let dist = conn.length();
        let limit = self.bowl_radius - ph.radius;
        if dist <= limit {
            return;
        }

        let n = conn / dist;
        tr.pos = self.bowl_centre + n * limit;

        let vn = ph.vel.dot(n);
        let vt = ph.vel - n * vn;
        ph.vel = vt - n * vn;

        let e0 = energy(self.gravity, ph.old_pos, ph.old_vel);
        let speed_sq = 2.0 * (e0 + self.gravity.dot(tr.pos));
        let speed = ph.vel.length();
        // Leave the reflected velocity alone when the target speed is undefined
        if speed_sq > 0.0 && speed > 0.0 {
            ph.vel *= speed_sq.sqrt() / speed;
        }
    }

    fn update_positions(em: &mut BallManager, dt: f32) {
        em.for_all_components::<(Transform, Physics)>(|(tr, ph)| {
            ph.old_pos = tr.pos;
            ph.old_vel = ph.vel;

            // drift-kick-drift
            ph.velim = ph.vel + ph.old_acc * (dt / 2.0);
            tr.pos += ph.velim * dt;
            ph.vel = ph.velim + ph.acc * (dt / 2.0);

            ph.old_acc = ph.acc;
            ph.acc = Vec2::ZERO;
        });
    }
}

/// Energy per mass of a ball at `pos` moving with `vel`.
///
/// Potential energy decreases along `gravity`.
#[must_use]
pub fn energy(gravity: Vec2, pos: Vec2, vel: Vec2) -> f32 {
    -gravity.dot(pos) + vel.length_squared() / 2.0
}

// ============================================================================
// LOGGING
// ============================================================================

/// Tracks simulated time and total energy, and reports the first time any
/// ball reaches the bottom.
#[derive(Clone, Debug)]
pub struct EnergyLogger {
    gravity: Vec2,
    bottom_y: f32,
    activated: bool,
    time: f32,
    energy: f32,
}

impl EnergyLogger {
    /// Creates a logger for `world`.
    #[must_use]
    pub fn new(world: &WorldConfig) -> Self {
        Self {
            gravity: world.gravity,
            bottom_y: world.bottom_y,
            activated: false,
            time: 0.0,
            energy: 0.0,
        }
    }

    /// Accounts for a step of `dt`.
    pub fn update(&mut self, em: &mut BallManager, dt: f32) {
        self.time += dt;

        let (gravity, bottom_y) = (self.gravity, self.bottom_y);
        let mut total = 0.0;
        let mut reached = false;
        em.for_all_components::<(Transform, Physics)>(|(tr, ph)| {
            reached |= tr.pos.y > bottom_y;
            total += energy(gravity, tr.pos, ph.vel);
        });
        self.energy = total;

        if reached && !self.activated {
            self.activated = true;
            tracing::info!(time = self.time, "hit the bottom");
        }
    }

    /// Total energy per mass at the last update.
    #[must_use]
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Simulated seconds so far.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Whether a ball has reached the bottom.
    #[must_use]
    pub fn has_hit_bottom(&self) -> bool {
        self.activated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::EntityId;

    fn single_ball(pos: Vec2, vel: Vec2, radius: f32) -> (BallManager, EntityId) {
        let mut em = BallManager::new();
        let id = em
            .create_entities::<(Transform, Physics)>(1, |_, _, (tr, ph)| {
                tr.pos = pos;
                ph.old_pos = pos;
                ph.vel = vel;
                ph.old_vel = vel;
                ph.radius = radius;
            })
            .first()
            .expect("one ball");
        (em, id)
    }

    #[test]
    fn test_free_fall_matches_kinematics() {
        let world = WorldConfig::default();
        let solver = MotionSolver::new(&world);
        let (mut em, id) = single_ball(Vec2::ZERO, Vec2::ZERO, 0.01);

        // Drift-kick-drift lags one step behind on velocity
        let dt = 0.01;
        solver.update(&mut em, dt);
        let ph = em.component::<Physics>(id);
        assert!((ph.vel.y - world.gravity.y * dt / 2.0).abs() < 1e-6);
        assert_eq!(ph.old_acc, world.gravity);
        assert_eq!(ph.acc, Vec2::ZERO);

        solver.update(&mut em, dt);
        let ph = em.component::<Physics>(id);
        assert!((ph.vel.y - world.gravity.y * dt * 1.5).abs() < 1e-6);
        assert!(em.component::<Transform>(id).pos.y > 0.0);
    }

    #[test]
    fn test_constraint_projects_and_reflects() {
        let world = WorldConfig {
            gravity: Vec2::ZERO,
            ..WorldConfig::default()
        };
        let solver = MotionSolver::new(&world);
        let mut tr = Transform {
            pos: Vec2::new(0.0, 0.5),
        };
        let mut ph = Physics {
            radius: 0.1,
            vel: Vec2::new(1.0, 2.0),
            old_vel: Vec2::new(1.0, 2.0),
            old_pos: Vec2::new(0.0, 0.29),
            ..Physics::default()
        };

        solver.constrain(&mut tr, &mut ph);

        assert!((tr.pos.y - 0.3).abs() < 1e-6);
        assert!(tr.pos.x.abs() < 1e-6);
        // Normal component flipped, tangential kept, speed unchanged without gravity
        assert!((ph.vel.x - 1.0).abs() < 1e-5);
        assert!((ph.vel.y + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_constraint_leaves_inner_balls_alone() {
        let solver = MotionSolver::new(&WorldConfig::default());
        let mut tr = Transform {
            pos: Vec2::new(0.1, 0.1),
        };
        let mut ph = Physics {
            radius: 0.01,
            vel: Vec2::new(3.0, 0.0),
            ..Physics::default()
        };
        let before = (tr, ph);
        solver.constrain(&mut tr, &mut ph);
        assert_eq!((tr, ph), before);
    }

    #[test]
    fn test_constraint_conserves_energy() {
        let world = WorldConfig::default();
        let solver = MotionSolver::new(&world);
        let old_pos = Vec2::new(0.0, 0.35);
        let old_vel = Vec2::new(0.2, 1.0);
        let mut tr = Transform {
            pos: Vec2::new(0.01, 0.40),
        };
        let mut ph = Physics {
            radius: 0.02,
            vel: Vec2::new(0.2, 1.05),
            old_vel,
            old_pos,
            ..Physics::default()
        };

        solver.constrain(&mut tr, &mut ph);
        let before = energy(world.gravity, old_pos, old_vel);
        let after = energy(world.gravity, tr.pos, ph.vel);
        assert!((before - after).abs() < 1e-4, "{before} vs {after}");
    }

    #[test]
    fn test_logger_tracks_energy_and_bottom() {
        let world = WorldConfig::default();
        let mut logger = EnergyLogger::new(&world);
        let (mut em, _) = single_ball(Vec2::new(0.0, 0.1), Vec2::new(0.0, 2.0), 0.01);

        logger.update(&mut em, 0.5);
        let expected = energy(world.gravity, Vec2::new(0.0, 0.1), Vec2::new(0.0, 2.0));
        assert!((logger.energy() - expected).abs() < 1e-6);
        assert!((logger.time() - 0.5).abs() < f32::EPSILON);
        assert!(!logger.has_hit_bottom());

        let (mut low, _) = single_ball(Vec2::new(0.0, 0.38), Vec2::ZERO, 0.01);
        logger.update(&mut low, 0.5);
        assert!(logger.has_hit_bottom());
        assert!((logger.time() - 1.0).abs() < f32::EPSILON);
    }
}
