//! # Entity Component System
//!
//! A statically typed ECS over a fixed universe of component types.
//!
//! ## Design Philosophy
//!
//! - The set of component types is declared once and checked at compile time
//! - Components are stored in dense, append-only arrays, one per type
//! - Entity IDs are simple indices; entities are never removed
//! - No dynamic dispatch in hot paths

mod component;
mod entity;
mod manager;
mod query;
mod storage;

pub use component::{index_of, Component, Member, TypeVisitor, Universe, MAX_COMPONENTS};
pub use entity::{slot_position, BitIter, Entity, EntityId, EntityRange};
pub use manager::EntityManager;
pub use query::{all_below, is_strictly_ascending, Query};
pub use storage::{Column, ComponentStorage};
