//! Opaque handles addressing engine-owned objects.

use std::fmt;
use std::num::NonZeroU64;

/// Opaque token naming one engine-owned object.
///
/// The raw form packs a slot index and a generation:
/// `generation << 32 | (slot + 1)`. Raw `0` is the null handle and is never
/// issued, so a zeroed handle can always be detected locally.
///
/// Two handles comparing equal only means they carry the same token. Once a
/// handle is released its slot may be reused under a newer generation, and
/// the engine rejects the old token instead of aliasing the new occupant.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(NonZeroU64);

impl Handle {
    /// The arena never issues `u32::MAX` as a slot index.
    pub(crate) fn new(slot: u32, generation: u32) -> Self {
        debug_assert!(slot < u32::MAX);
        let raw = (u64::from(generation) << 32) | u64::from(slot.wrapping_add(1));
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// Rebuilds a handle from its raw token. Returns `None` for the null handle.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Returns the raw token, as passed across the foreign boundary.
    #[must_use]
    pub const fn to_raw(self) -> u64 {
        self.0.get()
    }

    /// Slot index inside the engine arena.
    #[must_use]
    pub const fn slot(self) -> u32 {
        // Lower 32 bits hold `slot + 1`; a token whose lower half is zero was
        // never issued and maps to an unreachable slot.
        #[allow(clippy::cast_possible_truncation)]
        let low = self.0.get() as u32;
        low.wrapping_sub(1)
    }

    /// Generation of the slot at the time the handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let high = (self.0.get() >> 32) as u32;
        high
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.slot(), self.generation())
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.to_raw())
    }
}

/// The type of object a [`Handle`] addresses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum HandleKind {
    /// A database engine instance.
    Instance,
    /// An ordered sequence of values.
    Array,
    /// A string-keyed map of values.
    Object,
    /// A record identifier.
    Thing,
    /// A cursor producing values.
    ValueCursor,
    /// A cursor producing key/value entries.
    EntryCursor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip_keeps_slot_and_generation() {
        let handle = Handle::new(7, 3);
        assert_eq!(handle.slot(), 7);
        assert_eq!(handle.generation(), 3);
        assert_eq!(Handle::from_raw(handle.to_raw()), Some(handle));
    }

    #[test]
    fn test_null_handle_is_rejected() {
        assert_eq!(Handle::from_raw(0), None);
    }

    #[test]
    fn test_same_slot_different_generation_differs() {
        assert_ne!(Handle::new(0, 1), Handle::new(0, 2));
        assert_eq!(Handle::new(0, 1).to_raw(), (1 << 32) | 1);
    }

    #[test]
    fn test_kind_display_is_snake_case() {
        assert_eq!(HandleKind::ValueCursor.to_string(), "value_cursor");
        assert_eq!(HandleKind::Thing.to_string(), "thing");
    }
}
