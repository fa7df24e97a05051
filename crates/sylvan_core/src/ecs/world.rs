//! # Entity World
//!
//! A slot array holding one value per live entity.
//!
//! Memory is reserved up front for the expected working set. Once the
//! streamed region reaches a steady state, spawns reuse freed slots and the
//! store stops allocating.

use super::entity::EntityId;

/// One entity slot.
#[derive(Clone, Debug)]
struct Slot<T> {
    /// Generation handed to the next (or current) occupant.
    generation: u32,
    /// The entity's data, `None` when the slot is free.
    value: Option<T>,
}

/// Container for all live entities of one kind.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::with_capacity(4096);
///
/// let id = world.spawn(column);
/// assert!(world.is_alive(id));
/// world.despawn(id);
/// assert!(!world.is_alive(id));
/// ```
#[derive(Clone, Debug)]
pub struct World<T> {
    /// All slots, live or free.
    slots: Vec<Slot<T>>,
    /// Free list of slot indices for reuse.
    free_indices: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
}

impl<T> World<T> {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a world with room for `capacity` entities before it must grow.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_indices: Vec::with_capacity(capacity),
            alive_count: 0,
        }
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Returns `true` if no entity is alive.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Returns the number of slots ever allocated (live + free).
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Spawns a new entity holding `value`, returning its ID.
    ///
    /// Reuses a freed slot when one exists.
    ///
    /// # Returns
    ///
    /// The new entity's ID, or `EntityId::NULL` if the index space is exhausted.
    pub fn spawn(&mut self, value: T) -> EntityId {
        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            self.alive_count += 1;
            return EntityId::new(index, slot.generation);
        }

        // u32::MAX is reserved so that no live id can equal NULL.
        let Ok(index) = u32::try_from(self.slots.len()) else {
            return EntityId::NULL;
        };
        if index == u32::MAX {
            return EntityId::NULL;
        }

        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.alive_count += 1;
        EntityId::new(index, 0)
    }

    /// Despawns an entity, freeing its slot for reuse.
    ///
    /// # Returns
    ///
    /// The entity's data, or `None` if it was already dead or the ID is stale.
    pub fn despawn(&mut self, id: EntityId) -> Option<T> {
        if !self.is_alive(id) {
            return None;
        }

        let slot = &mut self.slots[id.index() as usize];
        let value = slot.value.take();
        // Invalidate every outstanding copy of `id`.
        slot.generation = slot.generation.wrapping_add(1);
        self.alive_count -= 1;
        self.free_indices.push(id.index());

        value
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        if id.is_null() {
            return false;
        }

        self.slots
            .get(id.index() as usize)
            .is_some_and(|slot| slot.value.is_some() && slot.generation == id.generation())
    }

    /// Gets an entity's data by ID.
    ///
    /// # Returns
    ///
    /// Reference to the data, or None if not found/dead/stale.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        if !self.is_alive(id) {
            return None;
        }
        self.slots[id.index() as usize].value.as_ref()
    }

    /// Gets an entity's data mutably by ID.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        if !self.is_alive(id) {
            return None;
        }
        self.slots[id.index() as usize].value.as_mut()
    }

    /// Iterates over all alive entities.
    pub fn iter_alive(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            // Slot count never exceeds u32::MAX (see `spawn`).
            #[allow(clippy::cast_possible_truncation)]
            let index = index as u32;
            slot.value
                .as_ref()
                .map(|value| (EntityId::new(index, slot.generation), value))
        })
    }

    /// Despawns every entity for which `keep` returns `false`.
    ///
    /// Each despawned entity is handed to `removed` together with its
    /// (now stale) ID.
    ///
    /// # Returns
    ///
    /// Number of entities despawned.
    pub fn retain<K, R>(&mut self, mut keep: K, mut removed: R) -> usize
    where
        K: FnMut(EntityId, &T) -> bool,
        R: FnMut(EntityId, T),
    {
        let mut count = 0;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let id = EntityId::new(index as u32, slot.generation);

            let Some(value) = slot.value.as_ref() else {
                continue;
            };
            if keep(id, value) {
                continue;
            }

            if let Some(value) = slot.value.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free_indices.push(id.index());
                self.alive_count -= 1;
                count += 1;
                removed(id, value);
            }
        }

        count
    }

    /// Despawns everything. Slots stay allocated for reuse.
    pub fn clear(&mut self) {
        self.retain(|_, _| false, |_, _| {});
    }
}

impl<T> Default for World<T> {
    fn default() -> Self {
        Self::new()
    }
}
