use kernel::id::Id;

/// Marker for user record identifiers
pub struct UserMarker;

/// Opaque unique identifier of a user record
pub type UserId = Id<UserMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_is_uuid_v4() {
        let user_id = UserId::new();
        assert_eq!(user_id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_user_ids_are_unique() {
        assert_ne!(UserId::new(), UserId::new());
    }
}
