//! Common ID Types
//!
//! Type-safe ID wrappers for domain entities.

use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Generic typed ID wrapper
///
/// Each entity declares its own marker type so IDs of different entities
/// cannot be mixed up:
/// ```
/// use kernel::id::Id;
/// struct AccountMarker;
/// type AccountId = Id<AccountMarker>;
/// let id = AccountId::new();
/// assert_eq!(id.as_uuid().get_version_num(), 4);
/// ```
pub struct Id<T> {
    value: Uuid,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Create a new random ID (UUID v4)
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Create from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            value: uuid,
            _marker: PhantomData,
        }
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.value
    }

    /// Convert to UUID
    pub fn into_uuid(self) -> Uuid {
        self.value
    }
}

// Manual impls: derives would require `T: Clone` etc. on the marker.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<Uuid> for Id<T> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<T> From<Id<T>> for Uuid {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Left;
    struct Right;

    #[test]
    fn test_id_type_safety() {
        let left: Id<Left> = Id::new();
        let right: Id<Right> = Id::new();

        // Different marker types, cannot be mixed
        let _l: Uuid = left.into_uuid();
        let _r: Uuid = right.into_uuid();
    }

    #[test]
    fn test_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id: Id<Left> = Id::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn test_id_copy_and_eq() {
        let id: Id<Left> = Id::new();
        let copied = id;
        assert_eq!(id, copied);
        assert_ne!(id, Id::<Left>::new());
    }
}
