//! Generation-checked slab of engine-owned objects.
//!
//! Every object the engine hands out lives in a [`HandleArena`] slot. The
//! [`Handle`] given to the host encodes the slot and the slot's generation at
//! insertion time; removing an object bumps the generation, so a token kept
//! after release can never reach whatever reuses the slot later.

use thiserror::Error;

use crate::handle::Handle;

/// Errors raised by arena lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// The handle was released, or its slot now belongs to a newer object.
    #[error("stale handle {0}")]
    Stale(Handle),
    /// The arena cannot address any more slots.
    #[error("handle arena exhausted")]
    Full,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slab of `T` addressed by generation-checked [`Handle`]s.
#[derive(Debug)]
pub struct HandleArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for HandleArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleArena<T> {
    /// Creates an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Stores `value` and returns a fresh handle to it.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Full`] once every addressable slot is in use.
    pub fn insert(&mut self, value: T) -> Result<Handle, ArenaError> {
        let slot = if let Some(slot) = self.free.pop() {
            slot
        } else {
            let next = u32::try_from(self.slots.len()).map_err(|_| ArenaError::Full)?;
            if next == u32::MAX {
                return Err(ArenaError::Full);
            }
            self.slots.push(Slot {
                generation: 1,
                value: None,
            });
            next
        };
        let entry = &mut self.slots[slot as usize];
        entry.value = Some(value);
        self.live += 1;
        Ok(Handle::new(slot, entry.generation))
    }

    /// Borrows the object behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Stale`] if the handle was released or outlived
    /// its slot.
    pub fn get(&self, handle: Handle) -> Result<&T, ArenaError> {
        self.slots
            .get(handle.slot() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.value.as_ref())
            .ok_or(ArenaError::Stale(handle))
    }

    /// Mutably borrows the object behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Stale`] if the handle was released or outlived
    /// its slot.
    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T, ArenaError> {
        self.slots
            .get_mut(handle.slot() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.value.as_mut())
            .ok_or(ArenaError::Stale(handle))
    }

    /// Removes and returns the object behind `handle`, retiring the token.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Stale`] if the handle was already removed.
    pub fn remove(&mut self, handle: Handle) -> Result<T, ArenaError> {
        let slot = self
            .slots
            .get_mut(handle.slot() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .ok_or(ArenaError::Stale(handle))?;
        let value = slot.value.take().ok_or(ArenaError::Stale(handle))?;
        // Generation 0 is never issued.
        slot.generation = slot.generation.checked_add(1).unwrap_or(1);
        self.free.push(handle.slot());
        self.live -= 1;
        Ok(value)
    }

    /// Returns `true` if `handle` still addresses a live object.
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_ok()
    }

    /// Number of live objects.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no objects are live.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Removes every live object, returning them.
    pub fn drain(&mut self) -> Vec<T> {
        let mut drained = Vec::with_capacity(self.live);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(value) = slot.value.take() {
                slot.generation = slot.generation.checked_add(1).unwrap_or(1);
                if let Ok(index) = u32::try_from(index) {
                    self.free.push(index);
                }
                drained.push(value);
            }
        }
        self.live = 0;
        drained
    }
}
