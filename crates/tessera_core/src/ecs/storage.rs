//! # Component Storage
//!
//! One append-only column per component type of the universe.
//!
//! - Columns only grow; a slot never moves or changes type
//! - Access is O(1) via `(type, slot)`
//! - Iteration is cache-friendly (contiguous memory per type)
//!
//! A `Vec` may reallocate when it grows, so references into a column never
//! outlive the borrow of the storage they were taken from.

use std::any::Any;
use std::marker::PhantomData;

use super::component::{Component, Member, TypeVisitor, Universe};
use super::query::Query;

/// Dense, append-only storage for a single component type.
#[derive(Clone, Debug)]
pub struct Column<C> {
    data: Vec<C>,
}

impl<C: Component> Column<C> {
    /// Creates an empty column.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Number of slots created so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks if no slot was ever created.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Appends `component`, returning its slot.
    #[inline]
    pub fn push(&mut self, component: C) -> usize {
        let slot = self.data.len();
        self.data.push(component);
        slot
    }

    /// Gets the component at `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was never created.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> &C {
        &self.data[slot]
    }

    /// Gets the component at `slot` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was never created.
    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> &mut C {
        &mut self.data[slot]
    }

    /// Returns a slice of all components.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.data
    }
}

impl<C: Component> Default for Column<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a [`Column`], recovered by downcast.
trait ErasedColumn {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn len(&self) -> usize;
}

impl<C: Component> ErasedColumn for Column<C> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

/// Columns for every member type of universe `U`, stored at their index.
pub struct ComponentStorage<U: Universe> {
    columns: Vec<Box<dyn ErasedColumn>>,
    _universe: PhantomData<U>,
}

impl<U: Universe> ComponentStorage<U> {
    /// Creates one empty column per member type.
    #[must_use]
    pub fn new() -> Self {
        let mut builder = BuildColumns {
            columns: Vec::with_capacity(U::LEN),
        };
        U::for_each(&mut builder);
        Self {
            columns: builder.columns,
            _universe: PhantomData,
        }
    }

    /// Constructs a new `T` at the end of its column from `component`.
    ///
    /// Returns the new slot. Growth may reallocate the column.
    #[inline]
    pub fn create_component<T: Member<U>>(&mut self, component: T) -> usize {
        self.column_mut::<T>().push(component)
    }

    /// Constructs a default `T` at the end of its column.
    #[inline]
    pub fn create_default<T: Member<U>>(&mut self) -> usize {
        self.create_component(T::default())
    }

    /// Copies the `T` at `slot` into a new slot, returning the new slot.
    #[inline]
    pub fn clone_component<T: Member<U>>(&mut self, slot: usize) -> usize {
        let column = self.column_mut::<T>();
        let copy = column.get(slot).clone();
        column.push(copy)
    }

    /// Gets the `T` at `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was never created for `T`.
    #[inline]
    #[must_use]
    pub fn get_data<T: Member<U>>(&self, slot: usize) -> &T {
        self.column::<T>().get(slot)
    }

    /// Gets the `T` at `slot` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was never created for `T`.
    #[inline]
    pub fn get_data_mut<T: Member<U>>(&mut self, slot: usize) -> &mut T {
        self.column_mut::<T>().get_mut(slot)
    }

    /// Combined bitmask of the types in `Q`.
    #[inline]
    #[must_use]
    pub const fn mask_of<Q: Query<U>>() -> u64 {
        Q::MASK
    }

    /// Borrows the column of `T`.
    #[must_use]
    pub fn column<T: Member<U>>(&self) -> &Column<T> {
        self.columns[usize::from(T::INDEX)]
            .as_any()
            .downcast_ref::<Column<T>>()
            .expect("column type matches its universe index")
    }

    /// Borrows the column of `T` mutably.
    pub fn column_mut<T: Member<U>>(&mut self) -> &mut Column<T> {
        self.columns[usize::from(T::INDEX)]
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .expect("column type matches its universe index")
    }

    /// Number of slots in the column at `index`.
    #[must_use]
    pub fn len_by_index(&self, index: u8) -> usize {
        self.columns.get(usize::from(index)).map_or(0, |c| c.len())
    }

    /// Total number of component slots across all columns.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.columns.iter().map(|c| c.len()).sum()
    }

    /// Starts a walk that hands out disjoint mutable columns.
    pub(crate) fn split(&mut self) -> ColumnSplit<'_> {
        ColumnSplit {
            rest: &mut self.columns,
            next: 0,
        }
    }
}

impl<U: Universe> Default for ComponentStorage<U> {
    fn default() -> Self {
        Self::new()
    }
}

struct BuildColumns {
    columns: Vec<Box<dyn ErasedColumn>>,
}

impl<U: Universe> TypeVisitor<U> for BuildColumns {
    fn visit<T: Member<U>>(&mut self, index: u8) {
        debug_assert_eq!(usize::from(index), self.columns.len());
        self.columns.push(Box::new(Column::<T>::new()));
    }
}

/// Hands out mutable borrows of distinct columns.
///
/// Indices must be requested in strictly ascending order; each request
/// splits the remaining columns so earlier borrows stay disjoint from later
/// ones. Queries guarantee that order at compile time.
pub(crate) struct ColumnSplit<'s> {
    rest: &'s mut [Box<dyn ErasedColumn>],
    next: usize,
}

impl<'s> ColumnSplit<'s> {
    pub(crate) fn take<T: Component>(&mut self, index: u8) -> &'s mut Column<T> {
        let index = usize::from(index);
        debug_assert!(index >= self.next, "columns requested out of order");

        let rest = std::mem::take(&mut self.rest);
        let (head, tail) = rest.split_at_mut(index - self.next + 1);
        self.rest = tail;
        self.next = index + 1;

        head[head.len() - 1]
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .expect("column type matches its universe index")
    }
}
