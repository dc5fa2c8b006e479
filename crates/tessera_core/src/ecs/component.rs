//! # Component Registry
//!
//! Components are pure data containers with no behavior.
//!
//! A [`Universe`] is the fixed, ordered list of component types a store can
//! hold. It is declared once with [`universe!`](crate::universe), which gives
//! every member type a stable index in `[0, N)`:
//!
//! ```text
//! universe! { pub struct Balls { Transform, Physics, Render } }
//!
//! Transform -> index 0 -> bit 0b001
//! Physics   -> index 1 -> bit 0b010
//! Render    -> index 2 -> bit 0b100
//! ```
//!
//! The index doubles as the bit position in an entity's component mask and as
//! the sort key of the entity's slot list.
//!
//! Malformed declarations are rejected by the compiler. Listing a type twice
//! produces conflicting [`Member`] impls:
//!
//! ```compile_fail
//! #[derive(Clone, Default)]
//! struct Position;
//!
//! tessera_core::universe! {
//!     pub struct Twice { Position, Position }
//! }
//! ```

/// Maximum number of component types in one universe (bits in a `u64` mask).
pub const MAX_COMPONENTS: usize = 64;

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Clone`: entity duplication copies every component into a fresh slot
/// - `Default`: creation and attachment construct the value before the
///   caller's initializer runs
/// - `'static`: columns are stored type-erased and recovered by downcast
///
/// Every type meeting those bounds is a component; membership in a store is
/// decided by [`Member`].
pub trait Component: Clone + Default + 'static {}

impl<T: Clone + Default + 'static> Component for T {}

/// A component type registered in universe `U`.
///
/// Implemented by [`universe!`](crate::universe); never implement it by hand.
/// Naming a type outside the universe in any query fails to compile because
/// this impl is missing.
pub trait Member<U: Universe>: Component {
    /// Position of this type in the universe declaration (0-63).
    const INDEX: u8;

    /// Single-bit mask for this type.
    const BIT: u64 = 1 << Self::INDEX;
}

/// A fixed, compile-time list of component types.
pub trait Universe: Sized + 'static {
    /// Number of member types.
    const LEN: usize;

    /// Invokes `visitor` once per member type, in index order.
    ///
    /// Dispatch is static: each call is monomorphized for its type.
    fn for_each<V: TypeVisitor<Self>>(visitor: &mut V);

    /// Returns the type name registered at `index`, if any.
    #[must_use]
    fn type_name(index: u8) -> Option<&'static str> {
        let mut finder = NameAt { index, name: None };
        Self::for_each(&mut finder);
        finder.name
    }
}

/// Per-type callback driven by [`Universe::for_each`].
pub trait TypeVisitor<U: Universe> {
    /// Called for member type `T` sitting at `index`.
    fn visit<T: Member<U>>(&mut self, index: u8);
}

/// Returns the universe index of `T`.
#[inline]
#[must_use]
pub const fn index_of<U: Universe, T: Member<U>>() -> u8 {
    T::INDEX
}

struct NameAt {
    index: u8,
    name: Option<&'static str>,
}

impl<U: Universe> TypeVisitor<U> for NameAt {
    fn visit<T: Member<U>>(&mut self, index: u8) {
        if index == self.index {
            self.name = Some(std::any::type_name::<T>());
        }
    }
}

/// Declares a component universe.
///
/// Generates a zero-sized marker type implementing [`Universe`] and a
/// [`Member`] impl for each listed component, indexed by declaration order.
///
/// # Example
///
/// ```rust
/// #[derive(Clone, Default)]
/// struct Position { x: f32, y: f32 }
/// #[derive(Clone, Default)]
/// struct Velocity { x: f32, y: f32 }
///
/// tessera_core::universe! {
///     /// Components of the movement demo.
///     pub struct Motion { Position, Velocity }
/// }
///
/// use tessera_core::{Member, Universe};
/// assert_eq!(<Motion as Universe>::LEN, 2);
/// assert_eq!(<Velocity as Member<Motion>>::INDEX, 1);
/// ```
#[macro_export]
macro_rules! universe {
    (@count $head:ty $(, $tail:ty)*) => {
        1usize $(+ $crate::universe!(@one $tail))*
    };
    (@one $component:ty) => {
        1usize
    };
    (@members $name:ident; $index:expr;) => {};
    (@members $name:ident; $index:expr; $head:ty $(, $tail:ty)*) => {
        impl $crate::ecs::Member<$name> for $head {
            const INDEX: u8 = $index;
        }
        $crate::universe!(@members $name; $index + 1u8; $($tail),*);
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident { $($component:ty),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::ecs::Universe for $name {
            const LEN: usize = $crate::universe!(@count $($component),+);

            fn for_each<V: $crate::ecs::TypeVisitor<Self>>(visitor: &mut V) {
                $(
                    visitor.visit::<$component>(
                        <$component as $crate::ecs::Member<$name>>::INDEX,
                    );
                )+
            }
        }

        $crate::universe!(@members $name; 0u8; $($component),+);

        const _: () = assert!(
            <$name as $crate::ecs::Universe>::LEN <= $crate::ecs::MAX_COMPONENTS,
            "a universe holds at most 64 component types"
        );
    };
}
