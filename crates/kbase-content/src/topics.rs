//! Topic service.

use std::sync::Arc;

use kbase_core::{Error, Global, Result, ScopedEntity, ScopedStore, Topic, TopicId, TopicSummary};
use tracing::info;
use uuid::Uuid;

use crate::guard::ReferentialIntegrityGuard;
use crate::validation::validate_topic_name;

/// Creates, lists, renames and deletes topics.
///
/// Topic names are unique across all topics. Deletion is refused while any
/// dependent registered with the guard still references the topic.
#[derive(Clone)]
pub struct TopicService {
    topics: Arc<dyn ScopedStore<Topic>>,
    guard: ReferentialIntegrityGuard,
}

impl TopicService {
    pub fn new(topics: Arc<dyn ScopedStore<Topic>>, guard: ReferentialIntegrityGuard) -> Self {
        Self { topics, guard }
    }

    pub async fn add_topic(&self, name: &str) -> Result<TopicSummary> {
        validate_topic_name(name)?;
        if self.topics.exists_by_owner_and_name(&Global, name).await? {
            return Err(Error::TopicNameAlreadyTaken(name.to_string()));
        }

        let topic = self.topics.save(Topic::new(name)).await?;
        let summary = topic.summary()?;
        info!(
            subsystem = "content",
            component = "topics",
            op = "add",
            topic_id = %summary.id,
            "Topic created"
        );
        Ok(summary)
    }

    pub async fn list_topics(&self) -> Result<Vec<TopicSummary>> {
        self.topics.find_all_by_owner_projected(&Global).await
    }

    /// Rename a topic. Renaming to the current name is rejected like any
    /// other taken name.
    pub async fn rename_topic(&self, id: Uuid, name: &str) -> Result<TopicSummary> {
        validate_topic_name(name)?;
        if !self.topics.exists_by_id(id).await? {
            return Err(Error::TopicNotFound(id));
        }
        if self.topics.exists_by_owner_and_name(&Global, name).await? {
            return Err(Error::TopicNameAlreadyTaken(name.to_string()));
        }

        let topic = self
            .topics
            .save(Topic {
                id: Some(id),
                name: name.to_string(),
            })
            .await?;
        info!(
            subsystem = "content",
            component = "topics",
            op = "rename",
            topic_id = %id,
            "Topic renamed"
        );
        topic.summary()
    }

    pub async fn delete_topic(&self, id: Uuid) -> Result<()> {
        if !self.topics.exists_by_id(id).await? {
            return Err(Error::TopicNotFound(id));
        }
        self.guard.assert_deletable(&TopicId(id)).await?;
        self.topics.delete_by_id(id).await?;

        info!(
            subsystem = "content",
            component = "topics",
            op = "delete",
            topic_id = %id,
            "Topic deleted"
        );
        Ok(())
    }
}
