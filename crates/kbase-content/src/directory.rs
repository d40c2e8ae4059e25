//! Owner directories.
//!
//! Services ask an [`OwnerDirectory`] whether an owner key refers to
//! something that exists before writing under it. Topics are checked against
//! the topic store; user identities come from the identity provider and are
//! accepted as-is.

use std::sync::Arc;

use async_trait::async_trait;
use kbase_core::{Error, OwnerKey, Result, ScopedStore, Topic, TopicId, UserId};

/// Existence check for owner keys.
#[async_trait]
pub trait OwnerDirectory<O: OwnerKey>: Send + Sync {
    /// `Ok(())` when `owner` exists, otherwise the kind's not-found error.
    async fn ensure_exists(&self, owner: &O) -> Result<()>;
}

/// Accepts every user identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyUser;

#[async_trait]
impl OwnerDirectory<UserId> for AnyUser {
    async fn ensure_exists(&self, _owner: &UserId) -> Result<()> {
        Ok(())
    }
}

/// Resolves topic owner keys against the topic store.
#[derive(Clone)]
pub struct TopicDirectory {
    topics: Arc<dyn ScopedStore<Topic>>,
}

impl TopicDirectory {
    pub fn new(topics: Arc<dyn ScopedStore<Topic>>) -> Self {
        Self { topics }
    }
}

#[async_trait]
impl OwnerDirectory<TopicId> for TopicDirectory {
    async fn ensure_exists(&self, owner: &TopicId) -> Result<()> {
        if self.topics.exists_by_id(owner.0).await? {
            Ok(())
        } else {
            Err(Error::TopicNotFound(owner.0))
        }
    }
}
