//! Referential integrity guard for topic deletion.
//!
//! Nothing in storage links dependents to their topic; the guard asks each
//! registered dependent kind whether anything still references the topic and
//! refuses the deletion if so. The check is advisory: a dependent created
//! between the check and the delete is not detected.

use std::sync::Arc;

use async_trait::async_trait;
use kbase_core::{Error, Result, ScopedEntity, ScopedStore, TopicId};
use tracing::{debug, warn};

/// A kind of entity that may reference a topic.
#[async_trait]
pub trait DependentProbe: Send + Sync {
    /// Plural noun used in the violation message ("documentations").
    fn label(&self) -> &str;

    async fn has_dependents(&self, topic_id: &TopicId) -> Result<bool>;
}

/// Probe backed by a store whose owner key is the topic id.
pub struct StoreProbe<E: ScopedEntity<Owner = TopicId>> {
    label: String,
    store: Arc<dyn ScopedStore<E>>,
}

impl<E: ScopedEntity<Owner = TopicId>> StoreProbe<E> {
    pub fn new(label: impl Into<String>, store: Arc<dyn ScopedStore<E>>) -> Self {
        Self {
            label: label.into(),
            store,
        }
    }
}

#[async_trait]
impl<E: ScopedEntity<Owner = TopicId>> DependentProbe for StoreProbe<E> {
    fn label(&self) -> &str {
        &self.label
    }

    async fn has_dependents(&self, topic_id: &TopicId) -> Result<bool> {
        self.store.exists_by_owner(topic_id).await
    }
}

/// Checks dependents in registration order and reports the first that blocks.
#[derive(Clone, Default)]
pub struct ReferentialIntegrityGuard {
    probes: Vec<Arc<dyn DependentProbe>>,
}

impl ReferentialIntegrityGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dependent kind. Earlier registrations are checked first.
    pub fn with_probe(mut self, probe: impl DependentProbe + 'static) -> Self {
        self.probes.push(Arc::new(probe));
        self
    }

    /// Labels of the registered dependent kinds, in check order.
    pub fn labels(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.label()).collect()
    }

    /// Fail with [`Error::ReferentialIntegrityViolation`] if any dependent
    /// still references `topic_id`.
    pub async fn assert_deletable(&self, topic_id: &TopicId) -> Result<()> {
        for probe in &self.probes {
            if probe.has_dependents(topic_id).await? {
                warn!(
                    subsystem = "content",
                    component = "guard",
                    op = "assert_deletable",
                    topic_id = %topic_id,
                    dependent = probe.label(),
                    "Topic deletion blocked by dependents"
                );
                return Err(Error::ReferentialIntegrityViolation(format!(
                    "Topic with ID {} cannot be deleted as long as {} exist that are linked to this topic",
                    topic_id,
                    probe.label()
                )));
            }
        }

        debug!(
            subsystem = "content",
            component = "guard",
            op = "assert_deletable",
            topic_id = %topic_id,
            "No dependents reference topic"
        );
        Ok(())
    }
}
