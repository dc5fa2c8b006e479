//! # Ball Components
//!
//! Pure data. Behaviour lives in [`systems`](crate::systems).

use tessera_core::EntityManager;

use crate::colour::Rgb;
use crate::math::Vec2;

/// Where a ball is.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    /// Centre of the ball.
    pub pos: Vec2,
}

/// Dynamic state for drift-kick-drift integration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Physics {
    /// Mass; unused by the solver, energies are per mass.
    pub mass: f32,
    /// Collision radius.
    pub radius: f32,
    /// Velocity at the end of the last step.
    pub vel: Vec2,
    /// Half-step velocity used for the drift.
    pub velim: Vec2,
    /// Velocity at the start of the last step.
    pub old_vel: Vec2,
    /// Position at the start of the last step.
    pub old_pos: Vec2,
    /// Acceleration accumulated for the current step.
    pub acc: Vec2,
    /// Acceleration of the previous step.
    pub old_acc: Vec2,
}

/// How a ball would be drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Render {
    /// Drawn radius.
    pub radius: f32,
    /// Fill colour.
    pub colour: Rgb,
}

tessera_core::universe! {
    /// Every component type a ball world can hold.
    pub struct Balls { Transform, Physics, Render }
}

/// Entity manager over the [`Balls`] universe.
pub type BallManager = EntityManager<Balls>;

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{Member, Universe};

    #[test]
    fn test_ball_universe_layout() {
        assert_eq!(<Balls as Universe>::LEN, 3);
        assert_eq!(<Transform as Member<Balls>>::INDEX, 0);
        assert_eq!(<Physics as Member<Balls>>::INDEX, 1);
        assert_eq!(<Render as Member<Balls>>::INDEX, 2);
    }
}
