//! UUID v7 utilities for time-ordered identifiers.
//!
//! Entity IDs are UUIDv7 (RFC 9562): the first 48 bits embed a
//! millisecond-precision Unix timestamp, so IDs generated later sort
//! lexicographically greater. This makes id order match creation order
//! without a separate sequence.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_v7_is_version_7() {
        let id = new_v7();
        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn test_v7_ids_are_time_ordered() {
        let a = new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_v7();
        assert!(b > a);
    }
}
