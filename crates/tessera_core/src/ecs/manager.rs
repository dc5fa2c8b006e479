//! # Entity Manager
//!
//! The central container for all entities and components of one universe.
//!
//! Entities live in a dense, append-only list; a handle is a list position.
//! Components live in [`ComponentStorage`], one append-only column per type.
//! Structural operations take `&mut self`, so component references handed to
//! callbacks can never outlive a later creation, attachment or duplication.

use super::component::{Member, TypeVisitor, Universe, MAX_COMPONENTS};
use super::entity::{slot_position, BitIter, Entity, EntityId, EntityRange};
use super::query::Query;
use super::storage::ComponentStorage;
use crate::memory::apply_permutation;

/// Owner of the entity list and the component storage.
///
/// # Example
///
/// ```rust
/// use tessera_core::EntityManager;
///
/// #[derive(Clone, Default)]
/// struct Position { x: f32, y: f32 }
/// #[derive(Clone, Default)]
/// struct Velocity { x: f32, y: f32 }
///
/// tessera_core::universe! { pub struct Motion { Position, Velocity } }
///
/// let mut em = EntityManager::<Motion>::new();
/// em.create_entities::<(Position, Velocity)>(3, |i, _id, (pos, vel)| {
///     pos.x = i as f32;
///     vel.x = 1.0;
/// });
///
/// em.for_all_components::<(Position, Velocity)>(|(pos, vel)| {
///     pos.x += vel.x;
///     pos.y += vel.y;
/// });
/// ```
pub struct EntityManager<U: Universe> {
    /// All entities, in creation order.
    entities: Vec<Entity>,
    /// Component columns.
    storage: ComponentStorage<U>,
    /// Entities created while set are prefab templates.
    prefabbing: bool,
}

impl<U: Universe> EntityManager<U> {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty manager with room for `entities` entities.
    #[must_use]
    pub fn with_capacity(entities: usize) -> Self {
        Self {
            entities: Vec::with_capacity(entities),
            storage: ComponentStorage::new(),
            prefabbing: false,
        }
    }

    /// Number of entities, prefabs included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Checks if no entity was created.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities in storage order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Gets an entity's bookkeeping.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this manager.
    #[inline]
    #[must_use]
    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.as_usize()]
    }

    /// Read access to the component columns.
    #[inline]
    #[must_use]
    pub fn storage(&self) -> &ComponentStorage<U> {
        &self.storage
    }

    /// Enables or disables prefab mode.
    ///
    /// Affects only entities created or duplicated afterwards.
    pub fn set_prefabbing(&mut self, prefabbing: bool) {
        tracing::debug!(prefabbing, "prefab mode changed");
        self.prefabbing = prefabbing;
    }

    /// Whether new entities are currently created as prefabs.
    #[inline]
    #[must_use]
    pub fn is_prefabbing(&self) -> bool {
        self.prefabbing
    }

    /// Whether `id` is a prefab template.
    #[inline]
    #[must_use]
    pub fn is_prefab(&self, id: EntityId) -> bool {
        self.entity(id).prefab
    }

    /// Whether `id` owns a `T`.
    #[inline]
    #[must_use]
    pub fn has_component<T: Member<U>>(&self, id: EntityId) -> bool {
        self.entity(id).contains(T::BIT)
    }

    /// Number of non-prefab entities that a bulk query for `Q` visits.
    #[must_use]
    pub fn count_matching<Q: Query<U>>(&self) -> usize {
        let () = Q::ASSERT_ORDERED_SUBSET;
        self.entities
            .iter()
            .filter(|e| !e.prefab && e.contains(Q::MASK))
            .count()
    }

    /// Gets `id`'s `T`.
    ///
    /// # Panics
    ///
    /// Panics if `id` has no `T`.
    #[must_use]
    pub fn component<T: Member<U>>(&self, id: EntityId) -> &T {
        let entity = self.entity(id);
        assert!(entity.contains(T::BIT), "entity {id:?} has no such component");
        self.storage.get_data::<T>(entity.slot_of(T::BIT))
    }

    /// Gets `id`'s `T` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` has no `T`.
    pub fn component_mut<T: Member<U>>(&mut self, id: EntityId) -> &mut T {
        let entity = &self.entities[id.as_usize()];
        assert!(entity.contains(T::BIT), "entity {id:?} has no such component");
        self.storage.get_data_mut::<T>(entity.slot_of(T::BIT))
    }

    /// Creates `count` entities owning exactly the components of `Q`.
    ///
    /// Components are default-constructed, then `init` runs once per entity
    /// with its index within the batch, its handle and its components.
    /// Entities created in prefab mode are prefabs.
    ///
    /// Returns the handles of the new batch.
    pub fn create_entities<Q: Query<U>>(
        &mut self,
        count: usize,
        mut init: impl FnMut(usize, EntityId, Q::Item<'_>),
    ) -> EntityRange {
        let () = Q::ASSERT_ORDERED_SUBSET;

        let first = self.entities.len();
        self.entities.reserve(count);
        for _ in 0..count {
            self.entities.push(Entity::empty(self.prefabbing));
            self.attach_slots::<Q>(self.entities.len() - 1);
        }

        let mut columns = Q::columns(&mut self.storage);
        for (i, entity) in self.entities[first..].iter().enumerate() {
            let id = EntityId::from_index(first + i);
            init(i, id, Q::fetch(&mut columns, entity.mask, &entity.slots));
        }

        tracing::debug!(
            count,
            first,
            mask = Q::MASK,
            prefab = self.prefabbing,
            "created entity batch"
        );
        EntityRange::new(first, self.entities.len())
    }

    /// Runs `f` for every non-prefab entity owning all components of `Q`.
    ///
    /// Entities are visited in storage order. References are passed in the
    /// order of `Q`.
    pub fn for_all_components<Q: Query<U>>(&mut self, mut f: impl FnMut(Q::Item<'_>)) {
        self.for_all_components_with_id::<Q>(|_, item| f(item));
    }

    /// Like [`for_all_components`](Self::for_all_components), also passing
    /// each visited entity's handle.
    pub fn for_all_components_with_id<Q: Query<U>>(
        &mut self,
        mut f: impl FnMut(EntityId, Q::Item<'_>),
    ) {
        let () = Q::ASSERT_ORDERED_SUBSET;

        let mut columns = Q::columns(&mut self.storage);
        for (index, entity) in self.entities.iter().enumerate() {
            if entity.prefab || !entity.contains(Q::MASK) {
                continue;
            }
            f(
                EntityId::from_index(index),
                Q::fetch(&mut columns, entity.mask, &entity.slots),
            );
        }
    }

    /// Runs `f` once on `id`'s components, prefab or not.
    ///
    /// `id` must own every component of `Q`.
    pub fn for_components<Q: Query<U>>(&mut self, id: EntityId, f: impl FnOnce(Q::Item<'_>)) {
        self.for_components_with::<Q, ()>(id, (), |(), item| f(item));
    }

    /// Runs `f` once on `id`'s components, passing `extra` ahead of them.
    ///
    /// `id` must own every component of `Q`.
    pub fn for_components_with<Q: Query<U>, A>(
        &mut self,
        id: EntityId,
        extra: A,
        f: impl FnOnce(A, Q::Item<'_>),
    ) {
        let () = Q::ASSERT_ORDERED_SUBSET;

        let entity = &self.entities[id.as_usize()];
        debug_assert!(
            entity.contains(Q::MASK),
            "entity {id:?} lacks queried components"
        );
        let mut columns = Q::columns(&mut self.storage);
        f(extra, Q::fetch(&mut columns, entity.mask, &entity.slots));
    }

    /// Attaches the components of `Q` to `id`.
    ///
    /// None of them may already be present. The new components are
    /// default-constructed and `init` runs once on them alone.
    pub fn attach_components<Q: Query<U>>(
        &mut self,
        id: EntityId,
        init: impl FnOnce(Q::Item<'_>),
    ) {
        let () = Q::ASSERT_ORDERED_SUBSET;

        let index = id.as_usize();
        let first_new = self.attach_slots::<Q>(index);

        let entity = &self.entities[index];
        tracing::debug!(entity = index, mask = Q::MASK, "attached components");

        // Only the new entries: a sub-mask and the matching slots in order
        let mut new_slots = [0usize; MAX_COMPONENTS];
        let mut k = 0;
        for type_index in BitIter::new(Q::MASK) {
            new_slots[k] = entity.slot_of(1u64 << type_index);
            k += 1;
        }
        debug_assert_eq!(entity.slots.len() - first_new, k);

        let mut columns = Q::columns(&mut self.storage);
        init(Q::fetch(&mut columns, Q::MASK, &new_slots[..k]));
    }

    /// Appends a copy of `source` with its own copies of every component.
    ///
    /// The copy takes the current prefab mode, not the source's flag.
    pub fn duplicate_entity(&mut self, source: EntityId) -> EntityId {
        let src = &self.entities[source.as_usize()];
        let mut copy = Entity {
            mask: src.mask,
            slots: src.slots.clone(),
            prefab: self.prefabbing,
        };

        U::for_each(&mut CloneComponents {
            storage: &mut self.storage,
            entity: &mut copy,
        });

        let id = EntityId::from_index(self.entities.len());
        self.entities.push(copy);
        tracing::debug!(source = ?source, copy = ?id, prefab = self.prefabbing, "duplicated entity");
        id
    }

    /// Creates `Q`'s components for the entity at `index` and merges their
    /// slots into its sorted slot list.
    ///
    /// Returns the slot-list length before the merge.
    fn attach_slots<Q: Query<U>>(&mut self, index: usize) -> usize {
        let entity = &mut self.entities[index];
        debug_assert_eq!(entity.mask & Q::MASK, 0, "component attached twice");

        let old_len = entity.slots.len();
        Q::create_defaults(&mut self.storage, &mut entity.slots);
        let merged = entity.mask | Q::MASK;

        if old_len > 0 {
            // Old entries first, then the appended ones; each moves to the
            // rank of its type in the merged mask.
            let mut perm = [0usize; MAX_COMPONENTS];
            let mut k = 0;
            for type_index in BitIter::new(entity.mask) {
                perm[k] = slot_position(merged, 1u64 << type_index);
                k += 1;
            }
            Q::for_each_index(|type_index| {
                perm[k] = slot_position(merged, 1u64 << type_index);
                k += 1;
            });
            apply_permutation(&mut entity.slots, &mut perm[..k]);
        }

        entity.mask = merged;
        old_len
    }
}

impl<U: Universe> Default for EntityManager<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Universe> std::fmt::Debug for EntityManager<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("entities", &self.entities.len())
            .field("components", &self.storage.total_len())
            .field("prefabbing", &self.prefabbing)
            .finish()
    }
}

/// Gives a duplicated entity fresh copies of its components.
struct CloneComponents<'a, U: Universe> {
    storage: &'a mut ComponentStorage<U>,
    entity: &'a mut Entity,
}

impl<U: Universe> TypeVisitor<U> for CloneComponents<'_, U> {
    fn visit<T: Member<U>>(&mut self, _index: u8) {
        if !self.entity.contains(T::BIT) {
            return;
        }
        let position = slot_position(self.entity.mask, T::BIT);
        let slot = self.entity.slots[position];
        self.entity.slots[position] = self.storage.clone_component::<T>(slot);
    }
}
