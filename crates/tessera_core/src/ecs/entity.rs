//! # Entity Management
//!
//! An entity is a component bitmask plus a list of storage slots, one per
//! set bit, kept sorted by component type index. Because of that ordering the
//! slot for a given type is found by counting mask bits instead of searching:
//!
//! ```text
//! mask  = 0b1011_0100      types 2, 4, 5, 7
//! slots = [s2, s4, s5, s7]
//!
//! slot of type 5: (mask << leading_zeros(1 << 5)).count_ones() - 1 = 2
//! ```

/// Handle to an entity: its position in the manager's entity list.
///
/// Handles are only meaningful for the manager that issued them. They stay
/// valid for the manager's lifetime because entities are never removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a handle from a list position.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in 32 bits.
    #[inline]
    #[must_use]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).expect("entity count exceeds u32 handle space"))
    }

    /// Returns the position of this entity in the entity list.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// A range of consecutively created entities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityRange {
    next: u32,
    end: u32,
}

impl EntityRange {
    pub(crate) fn new(start: usize, end: usize) -> Self {
        Self {
            next: EntityId::from_index(start).index(),
            end: EntityId::from_index(end).index(),
        }
    }

    /// First handle of the range, if it is not empty.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<EntityId> {
        (self.next < self.end).then_some(EntityId(self.next))
    }
}

impl Iterator for EntityRange {
    type Item = EntityId;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.first()?;
        self.next += 1;
        Some(id)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EntityRange {}

/// Per-entity bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Entity {
    /// Bit `i` set when the entity owns a component of type index `i`.
    pub(crate) mask: u64,
    /// Storage slots, one per set bit, ascending by type index.
    pub(crate) slots: Vec<usize>,
    /// Prefab entities are skipped by bulk queries.
    pub(crate) prefab: bool,
}

impl Entity {
    /// Creates an entity with no components.
    #[inline]
    #[must_use]
    pub(crate) fn empty(prefab: bool) -> Self {
        Self {
            mask: 0,
            slots: Vec::new(),
            prefab,
        }
    }

    /// Bitmask of attached component types.
    #[inline]
    #[must_use]
    pub const fn mask(&self) -> u64 {
        self.mask
    }

    /// Storage slots, ordered by component type index.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    /// Whether this entity is a prefab template.
    #[inline]
    #[must_use]
    pub const fn is_prefab(&self) -> bool {
        self.prefab
    }

    /// Checks whether every bit of `mask` is attached.
    #[inline]
    #[must_use]
    pub const fn contains(&self, mask: u64) -> bool {
        self.mask & mask == mask
    }

    /// Storage slot of the component whose single-bit mask is `bit`.
    #[inline]
    #[must_use]
    pub fn slot_of(&self, bit: u64) -> usize {
        self.slots[slot_position(self.mask, bit)]
    }

    /// Iterates attached type indices in ascending order.
    #[inline]
    pub fn type_indices(&self) -> BitIter {
        BitIter::new(self.mask)
    }
}

/// Position of `bit`'s entry within a slot list sorted by type index.
///
/// Equals the number of set bits of `mask` at or below `bit`, minus one.
/// Shifting left by `bit.leading_zeros()` discards every higher bit and
/// leaves `bit` in the top position, so a single popcount suffices.
///
/// `bit` must be a single bit that is set in `mask`.
#[inline]
#[must_use]
pub const fn slot_position(mask: u64, bit: u64) -> usize {
    debug_assert!(bit.is_power_of_two() && mask & bit != 0);
    ((mask << bit.leading_zeros()).count_ones() - 1) as usize
}

/// Iterator over set bit indices, lowest first.
///
/// Uses `trailing_zeros` to skip clear regions.
#[derive(Clone, Debug)]
pub struct BitIter {
    word: u64,
}

impl BitIter {
    /// Iterates the set bits of `word`.
    #[inline]
    #[must_use]
    pub const fn new(word: u64) -> Self {
        Self { word }
    }
}

impl Iterator for BitIter {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.word == 0 {
            return None;
        }
        let bit = self.word.trailing_zeros() as u8;
        // Clear lowest set bit
        self.word &= self.word - 1;
        Some(bit)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.word.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BitIter {}
