//! # Component Queries
//!
//! A query is a tuple of member types, e.g. `(Position, Velocity)`. Its
//! items are tuples of mutable references in the same order.
//!
//! Every query must be an *ordered subset* of the universe: each type is a
//! member, and the types appear in strictly ascending index order. This is
//! what lets the manager resolve component slots by bit counting, and it is
//! checked while compiling. A query out of declaration order is rejected:
//!
//! ```compile_fail
//! # #[derive(Clone, Default)] struct Position;
//! # #[derive(Clone, Default)] struct Velocity;
//! tessera_core::universe! { pub struct Motion { Position, Velocity } }
//!
//! let mut em = tessera_core::EntityManager::<Motion>::new();
//! em.for_all_components::<(Velocity, Position)>(|(_v, _p)| {});
//! ```
//!
//! So is a query naming the same type twice:
//!
//! ```compile_fail
//! # #[derive(Clone, Default)] struct Position;
//! # #[derive(Clone, Default)] struct Velocity;
//! tessera_core::universe! { pub struct Motion { Position, Velocity } }
//!
//! let mut em = tessera_core::EntityManager::<Motion>::new();
//! em.for_all_components::<(Position, Position)>(|(_a, _b)| {});
//! ```
//!
//! And a query naming a type outside the universe:
//!
//! ```compile_fail
//! # #[derive(Clone, Default)] struct Position;
//! # #[derive(Clone, Default)] struct Velocity;
//! # #[derive(Clone, Default)] struct Health;
//! tessera_core::universe! { pub struct Motion { Position, Velocity } }
//!
//! let mut em = tessera_core::EntityManager::<Motion>::new();
//! em.for_all_components::<(Position, Health)>(|(_p, _h)| {});
//! ```
//!
//! Membership is a trait bound, so `cargo check` already reports an outside
//! type. Ordering and repeats are a const assertion
//! ([`Query::ASSERT_ORDERED_SUBSET`]) that is evaluated only when a function
//! using the query is monomorphized during code generation. `cargo check`
//! therefore accepts an out-of-order query and `cargo build` rejects it
//! with E0080.

use super::component::{Member, Universe};
use super::entity::slot_position;
use super::storage::ComponentStorage;

mod sealed {
    pub trait Sealed {}
}

/// A tuple of component types that can be fetched together.
///
/// Implemented for tuples of 1 to 12 member types. This trait is sealed.
pub trait Query<U: Universe>: sealed::Sealed {
    /// OR of every listed type's bit.
    const MASK: u64;

    /// Number of listed types.
    const LEN: usize;

    /// Every listed type has an index inside the universe.
    const IS_SUBSET: bool;

    /// [`IS_SUBSET`](Self::IS_SUBSET) holds and indices strictly ascend.
    const IS_ORDERED_SUBSET: bool;

    /// Evaluating this constant fails compilation unless the query is an
    /// ordered subset.
    const ASSERT_ORDERED_SUBSET: () = assert!(
        Self::IS_ORDERED_SUBSET,
        "component list must name universe types in declaration order without repeats"
    );

    /// Mutable borrows of the listed columns.
    type Columns<'c>;

    /// Mutable references to one entity's listed components.
    type Item<'a>;

    /// Invokes `f` with each listed type's index, in list order.
    fn for_each_index(f: impl FnMut(u8));

    /// Default-constructs one component per listed type, pushing the new
    /// slots onto `slots` in list order.
    fn create_defaults(storage: &mut ComponentStorage<U>, slots: &mut Vec<usize>);

    /// Borrows the listed columns.
    fn columns(storage: &mut ComponentStorage<U>) -> Self::Columns<'_>;

    /// Resolves one entity's components through its sorted slot list.
    fn fetch<'a>(columns: &'a mut Self::Columns<'_>, mask: u64, slots: &[usize]) -> Self::Item<'a>;
}

/// Returns `true` if `indices` strictly ascend (sorted, no repeats).
#[must_use]
pub const fn is_strictly_ascending(indices: &[u8]) -> bool {
    let mut i = 1;
    while i < indices.len() {
        if indices[i - 1] >= indices[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Returns `true` if every index is below `len`.
#[must_use]
pub const fn all_below(indices: &[u8], len: usize) -> bool {
    let mut i = 0;
    while i < indices.len() {
        if indices[i] as usize >= len {
            return false;
        }
        i += 1;
    }
    true
}

macro_rules! impl_query {
    ($($name:ident),+) => {
        impl<$($name),+> sealed::Sealed for ($($name,)+) {}

        #[allow(non_snake_case)]
        impl<U: Universe, $($name: Member<U>),+> Query<U> for ($($name,)+) {
            const MASK: u64 = 0 $(| <$name as Member<U>>::BIT)+;
            const LEN: usize = [$(<$name as Member<U>>::INDEX),+].len();
            const IS_SUBSET: bool = all_below(&[$(<$name as Member<U>>::INDEX),+], U::LEN);
            const IS_ORDERED_SUBSET: bool = Self::IS_SUBSET
                && is_strictly_ascending(&[$(<$name as Member<U>>::INDEX),+]);

            type Columns<'c> = ($(&'c mut super::storage::Column<$name>,)+);
            type Item<'a> = ($(&'a mut $name,)+);

            #[inline]
            fn for_each_index(mut f: impl FnMut(u8)) {
                $(f(<$name as Member<U>>::INDEX);)+
            }

            #[inline]
            fn create_defaults(storage: &mut ComponentStorage<U>, slots: &mut Vec<usize>) {
                $(slots.push(storage.create_default::<$name>());)+
            }

            #[inline]
            fn columns(storage: &mut ComponentStorage<U>) -> Self::Columns<'_> {
                let () = Self::ASSERT_ORDERED_SUBSET;
                let mut split = storage.split();
                ($(split.take::<$name>(<$name as Member<U>>::INDEX),)+)
            }

            #[inline]
            fn fetch<'a>(
                columns: &'a mut Self::Columns<'_>,
                mask: u64,
                slots: &[usize],
            ) -> Self::Item<'a> {
                let ($($name,)+) = columns;
                ($(
                    $name.get_mut(slots[slot_position(mask, <$name as Member<U>>::BIT)]),
                )+)
            }
        }
    };
}

impl_query!(A);
impl_query!(A, B);
impl_query!(A, B, C);
impl_query!(A, B, C, D);
impl_query!(A, B, C, D, E);
impl_query!(A, B, C, D, E, F);
impl_query!(A, B, C, D, E, F, G);
impl_query!(A, B, C, D, E, F, G, H);
impl_query!(A, B, C, D, E, F, G, H, I);
impl_query!(A, B, C, D, E, F, G, H, I, J);
impl_query!(A, B, C, D, E, F, G, H, I, J, K);
impl_query!(A, B, C, D, E, F, G, H, I, J, K, L);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Position(f32);
    #[derive(Clone, Debug, Default, PartialEq)]
    struct Velocity(f32);
    #[derive(Clone, Debug, Default, PartialEq)]
    struct Color(u8);

    crate::universe! {
        struct Motion { Position, Velocity, Color }
    }

    #[test]
    fn test_strictly_ascending() {
        assert!(is_strictly_ascending(&[]));
        assert!(is_strictly_ascending(&[3]));
        assert!(is_strictly_ascending(&[0, 1, 5, 63]));
        assert!(!is_strictly_ascending(&[1, 0]));
        assert!(!is_strictly_ascending(&[2, 2]));
        assert!(!is_strictly_ascending(&[0, 4, 3]));
    }

    #[test]
    fn test_all_below() {
        assert!(all_below(&[0, 1, 2], 3));
        assert!(!all_below(&[0, 3], 3));
    }

    #[test]
    fn test_query_constants() {
        assert_eq!(<(Position,) as Query<Motion>>::MASK, 0b001);
        assert_eq!(<(Position, Color) as Query<Motion>>::MASK, 0b101);
        assert_eq!(<(Position, Velocity, Color) as Query<Motion>>::LEN, 3);

        assert!(<(Position, Color) as Query<Motion>>::IS_ORDERED_SUBSET);
        assert!(<(Color, Position) as Query<Motion>>::IS_SUBSET);
        assert!(!<(Color, Position) as Query<Motion>>::IS_ORDERED_SUBSET);
        assert!(!<(Velocity, Velocity) as Query<Motion>>::IS_ORDERED_SUBSET);
    }

    #[test]
    fn test_for_each_index_in_list_order() {
        let mut seen = Vec::new();
        <(Velocity, Color) as Query<Motion>>::for_each_index(|i| seen.push(i));
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_fetch_resolves_sorted_slots() {
        let mut storage: ComponentStorage<Motion> = ComponentStorage::new();
        let mut slots = Vec::new();
        <(Position, Color) as Query<Motion>>::create_defaults(&mut storage, &mut slots);
        assert_eq!(slots, vec![0, 0]);

        *storage.get_data_mut::<Color>(0) = Color(200);
        let mut columns = <(Position, Color) as Query<Motion>>::columns(&mut storage);
        let (position, color) =
            <(Position, Color) as Query<Motion>>::fetch(&mut columns, 0b101, &slots);
        position.0 = 1.5;
        assert_eq!(*color, Color(200));
        assert_eq!(storage.get_data::<Position>(0), &Position(1.5));
    }
}
