//! In-memory content store.
//!
//! Behaves like [`crate::PgScopedStore`] (owner filtering, UUIDv7 ids,
//! id-ordered listings, single-field binary loads) without a database.
//! Used by tests and by deployments started with `KBASE_STORE=memory`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use kbase_core::{new_v7, Error, Result, ScopedEntity, ScopedStore};

/// In-memory implementation of [`ScopedStore`].
///
/// Clones share the same underlying map.
pub struct MemoryScopedStore<E> {
    entries: Arc<RwLock<BTreeMap<Uuid, E>>>,
    simulate_write_error: Arc<AtomicBool>,
}

impl<E> Default for MemoryScopedStore<E> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
            simulate_write_error: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<E> Clone for MemoryScopedStore<E> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            simulate_write_error: Arc::clone(&self.simulate_write_error),
        }
    }
}

impl<E: ScopedEntity> MemoryScopedStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, for testing error paths.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Number of stored entities.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(Error::Internal(format!(
                "Simulated write error on {} store",
                E::KIND
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<E: ScopedEntity> ScopedStore<E> for MemoryScopedStore<E> {
    async fn exists_by_owner_and_name(&self, owner: &E::Owner, name: &str) -> Result<bool> {
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .any(|e| e.owner() == owner && e.name() == Some(name)))
    }

    async fn exists_by_owner(&self, owner: &E::Owner) -> Result<bool> {
        let entries = self.entries.read().await;
        Ok(entries.values().any(|e| e.owner() == owner))
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool> {
        Ok(self.entries.read().await.contains_key(&id))
    }

    async fn exists_by_id_and_owner(&self, id: Uuid, owner: &E::Owner) -> Result<bool> {
        let entries = self.entries.read().await;
        Ok(entries.get(&id).is_some_and(|e| e.owner() == owner))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>> {
        Ok(self.entries.read().await.get(&id).cloned())
    }

    async fn find_by_id_and_owner(&self, id: Uuid, owner: &E::Owner) -> Result<Option<E>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&id).filter(|e| e.owner() == owner).cloned())
    }

    async fn find_all_by_owner_projected(&self, owner: &E::Owner) -> Result<Vec<E::Summary>> {
        let entries = self.entries.read().await;
        entries
            .values()
            .filter(|e| e.owner() == owner)
            .map(ScopedEntity::summary)
            .collect()
    }

    async fn find_binary_field_by_id(
        &self,
        id: Uuid,
        field: E::BinaryField,
    ) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&id)
            .and_then(|e| e.binary_field(field))
            .map(<[u8]>::to_vec))
    }

    async fn find_binary_field_by_id_and_owner(
        &self,
        id: Uuid,
        owner: &E::Owner,
        field: E::BinaryField,
    ) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&id)
            .filter(|e| e.owner() == owner)
            .and_then(|e| e.binary_field(field))
            .map(<[u8]>::to_vec))
    }

    async fn save(&self, mut entity: E) -> Result<E> {
        self.check_writable()?;
        let id = match entity.id() {
            Some(id) => id,
            None => {
                let id = new_v7();
                entity.set_id(id);
                id
            }
        };
        self.entries.write().await.insert(id, entity.clone());
        Ok(entity)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<()> {
        self.check_writable()?;
        self.entries.write().await.remove(&id);
        Ok(())
    }

    async fn delete_by_id_and_owner(&self, id: Uuid, owner: &E::Owner) -> Result<()> {
        self.check_writable()?;
        let mut entries = self.entries.write().await;
        if entries.get(&id).is_some_and(|e| e.owner() == owner) {
            entries.remove(&id);
        }
        Ok(())
    }

    async fn delete_all_by_owner(&self, owner: &E::Owner) -> Result<u64> {
        self.check_writable()?;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.owner() != owner);
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbase_core::{
        Doc, DocFile, Global, IndexCard, IndexCardImage, Topic, TopicId, UserId,
    };

    fn user(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_save_assigns_v7_id() {
        let store = MemoryScopedStore::<Topic>::new();
        let saved = store.save(Topic::new("Java")).await.unwrap();
        let id = saved.id.unwrap();
        assert!(kbase_core::is_v7(&id));
        assert!(store.exists_by_id(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_save_with_id_replaces() {
        let store = MemoryScopedStore::<Topic>::new();
        let mut saved = store.save(Topic::new("Java")).await.unwrap();
        saved.name = "Rust".to_string();
        store.save(saved.clone()).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert!(store.exists_by_owner_and_name(&Global, "Rust").await.unwrap());
        assert!(!store.exists_by_owner_and_name(&Global, "Java").await.unwrap());
    }

    #[tokio::test]
    async fn test_names_are_scoped_by_owner() {
        let store = MemoryScopedStore::<Doc<UserId>>::new();
        store
            .save(Doc::new(user("a"), "Guide", vec![1], vec![2]))
            .await
            .unwrap();

        assert!(store
            .exists_by_owner_and_name(&user("a"), "Guide")
            .await
            .unwrap());
        assert!(!store
            .exists_by_owner_and_name(&user("b"), "Guide")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_owner_mismatch_reads_as_absent() {
        let store = MemoryScopedStore::<Doc<UserId>>::new();
        let doc = store
            .save(Doc::new(user("a"), "Guide", vec![1], vec![2]))
            .await
            .unwrap();
        let id = doc.id.unwrap();

        assert!(store.exists_by_id(id).await.unwrap());
        assert!(!store.exists_by_id_and_owner(id, &user("b")).await.unwrap());
        assert!(store.find_by_id_and_owner(id, &user("b")).await.unwrap().is_none());
        assert!(store
            .find_binary_field_by_id_and_owner(id, &user("b"), DocFile::Derived)
            .await
            .unwrap()
            .is_none());

        store.delete_by_id_and_owner(id, &user("b")).await.unwrap();
        assert!(store.exists_by_id(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_listing_is_id_ordered_and_filtered() {
        let store = MemoryScopedStore::<IndexCard>::new();
        let t1 = TopicId(new_v7());
        let t2 = TopicId(new_v7());
        let first = store.save(IndexCard::new(t1, "Q1", "A1", None)).await.unwrap();
        store.save(IndexCard::new(t2, "Q2", "A2", None)).await.unwrap();
        let third = store
            .save(IndexCard::new(t1, "Q3", "A3", Some(vec![9])))
            .await
            .unwrap();

        let listed = store.find_all_by_owner_projected(&t1).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first.id.unwrap(), third.id.unwrap()]);
        assert!(listed[1].has_answer_image);
    }

    #[tokio::test]
    async fn test_binary_field_absent_image() {
        let store = MemoryScopedStore::<IndexCard>::new();
        let card = store
            .save(IndexCard::new(TopicId(new_v7()), "Q", "A", None))
            .await
            .unwrap();
        let image = store
            .find_binary_field_by_id(card.id.unwrap(), IndexCardImage::Answer)
            .await
            .unwrap();
        assert!(image.is_none());
    }

    #[tokio::test]
    async fn test_delete_all_by_owner_counts() {
        let store = MemoryScopedStore::<IndexCard>::new();
        let t1 = TopicId(new_v7());
        let t2 = TopicId(new_v7());
        for q in ["a", "b", "c"] {
            store.save(IndexCard::new(t1, q, "x", None)).await.unwrap();
        }
        store.save(IndexCard::new(t2, "d", "x", None)).await.unwrap();

        assert_eq!(store.delete_all_by_owner(&t1).await.unwrap(), 3);
        assert!(!store.exists_by_owner(&t1).await.unwrap());
        assert!(store.exists_by_owner(&t2).await.unwrap());
    }

    #[tokio::test]
    async fn test_simulated_write_error() {
        let store = MemoryScopedStore::<Topic>::new();
        store.set_simulate_write_error(true);
        let err = store.save(Topic::new("Java")).await.unwrap_err();
        assert_eq!(err.kind(), kbase_core::ErrorKind::Internal);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryScopedStore::<Topic>::new();
        let other = store.clone();
        store.save(Topic::new("Java")).await.unwrap();
        assert_eq!(other.len().await, 1);
    }
}
