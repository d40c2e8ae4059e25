//! Entity identifiers.
//!
//! Ids are UUIDv7: the leading millisecond timestamp makes id order follow
//! creation order, which listings rely on.

use uuid::Uuid;

/// Fresh id for an entity saved without one.
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

pub fn is_v7(id: &Uuid) -> bool {
    id.get_version_num() == 7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_v7() {
        assert!(is_v7(&new_v7()));
        assert!(!is_v7(&Uuid::new_v4()));
        assert!(!is_v7(&Uuid::nil()));
    }

    #[test]
    fn test_ids_sort_in_creation_order() {
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(new_v7());
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
