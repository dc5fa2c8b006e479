//! Initial ball placement.

use rand::distributions::Uniform;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_core::EntityRange;

use crate::colour::{hsv_to_rgb, Hsv};
use crate::components::{BallManager, Physics, Render, Transform};
use crate::config::{BallConfig, WorldConfig};
use crate::math::Vec2;

/// Fraction of the bowl radius the spawn line spans on each side.
const SPAN: f32 = 0.8;

/// Height of the spawn line, in bowl radii above the centre.
const LINE_Y: f32 = -0.2;

/// Spawns `balls.count` balls on a horizontal line across the bowl.
///
/// Ball `i` gets a radius drawn from `[min_radius, max_radius]`, shared by its
/// physics and render components, and hue `i / 5` (wrapping at 256).
///
/// # Panics
///
/// Panics if `min_radius > max_radius`; [`SimConfig::validate`] rejects
/// such configs.
///
/// [`SimConfig::validate`]: crate::SimConfig::validate
pub fn spawn_balls(em: &mut BallManager, world: &WorldConfig, balls: &BallConfig) -> EntityRange {
    let mut rng = ChaCha8Rng::seed_from_u64(balls.seed);
    let radii = Uniform::new_inclusive(balls.min_radius, balls.max_radius);

    #[allow(clippy::cast_precision_loss)]
    let last = balls.count.saturating_sub(1).max(1) as f32;

    let range = em.create_entities::<(Transform, Physics, Render)>(
        balls.count,
        |i, _, (tr, ph, re)| {
            #[allow(clippy::cast_precision_loss)]
            let along = (i as f32 / last - 0.5) * 2.0 * SPAN;
            tr.pos = world.bowl_centre + Vec2::new(along, LINE_Y) * world.bowl_radius;
            ph.old_pos = tr.pos;

            let radius = rng.sample(&radii);
            ph.radius = radius;
            re.radius = radius;

            #[allow(clippy::cast_possible_truncation)]
            let hue = (i / 5 % 256) as u8;
            re.colour = hsv_to_rgb(Hsv { h: hue, s: 150, v: 255 });
        },
    );

    tracing::info!(count = balls.count, seed = balls.seed, "spawned balls");
    range
}
