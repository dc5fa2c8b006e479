//! # Tessera Core
//!
//! Compile-time typed Entity Component System (ECS) designed for:
//! - Component sets fixed at compile time, so misuse fails to build
//! - Bitmask signatures with O(1) component lookup
//! - Contiguous per-type storage for cache-friendly iteration
//!
//! ## Architecture Rules
//!
//! 1. **Static component universe** - Every store is parameterized by a
//!    [`universe!`] type list; indices and masks are constants
//! 2. **Append-only storage** - Slots never move, entities are never removed
//! 3. **Sorted slot lists** - An entity's slots follow type order, so a slot
//!    is found by counting mask bits
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::EntityManager;
//!
//! #[derive(Clone, Default)]
//! struct Position { x: f32, y: f32 }
//! #[derive(Clone, Default)]
//! struct Velocity { x: f32, y: f32 }
//!
//! tessera_core::universe! { pub struct Motion { Position, Velocity } }
//!
//! let mut em = EntityManager::<Motion>::with_capacity(1_000);
//! em.create_entities::<(Position, Velocity)>(1_000, |_, _, (_, vel)| vel.x = 1.0);
//! em.for_all_components::<(Position, Velocity)>(|(pos, vel)| pos.x += vel.x);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod memory;

pub use ecs::{
    BitIter, Column, Component, ComponentStorage, Entity, EntityId, EntityManager, EntityRange,
    Member, Query, TypeVisitor, Universe, MAX_COMPONENTS,
};
pub use memory::apply_permutation;
