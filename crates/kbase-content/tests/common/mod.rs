//! Shared wiring for service tests: in-memory stores and stub converters.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use kbase_content::{
    AnyUser, DocService, IndexCardService, ReferentialIntegrityGuard, StoreProbe,
    TopicDirectory, TopicService, DOCS_DEPENDENT_LABEL, INDEX_CARDS_DEPENDENT_LABEL,
};
use kbase_core::{ConversionBackend, Doc, Error, IndexCard, Result, Topic, TopicId, UserId};
use kbase_db::MemoryScopedStore;
use tokio::sync::Barrier;

/// Prefixes the input with `PDF:` so tests can tell which upload a
/// rendering came from.
#[derive(Default)]
pub struct StubConverter {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ConversionBackend for StubConverter {
    async fn convert(&self, primary: &[u8]) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut derived = b"PDF:".to_vec();
        derived.extend_from_slice(primary);
        Ok(derived)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Always fails.
pub struct FailingConverter;

#[async_trait]
impl ConversionBackend for FailingConverter {
    async fn convert(&self, _primary: &[u8]) -> Result<Vec<u8>> {
        Err(Error::ConversionFailed("converter returned 503".to_string()))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Holds every conversion until `parties` conversions are in flight.
pub struct BarrierConverter {
    barrier: Barrier,
}

impl BarrierConverter {
    pub fn new(parties: usize) -> Self {
        Self {
            barrier: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl ConversionBackend for BarrierConverter {
    async fn convert(&self, primary: &[u8]) -> Result<Vec<u8>> {
        self.barrier.wait().await;
        Ok(primary.to_vec())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "barrier"
    }
}

/// Stores shared by every service in one deployment.
pub struct Stores {
    pub topics: MemoryScopedStore<Topic>,
    pub topic_docs: MemoryScopedStore<Doc<TopicId>>,
    pub user_docs: MemoryScopedStore<Doc<UserId>>,
    pub cards: MemoryScopedStore<IndexCard>,
}

impl Stores {
    pub fn new() -> Self {
        Self {
            topics: MemoryScopedStore::new(),
            topic_docs: MemoryScopedStore::new(),
            user_docs: MemoryScopedStore::new(),
            cards: MemoryScopedStore::new(),
        }
    }

    pub fn topic_directory(&self) -> TopicDirectory {
        TopicDirectory::new(Arc::new(self.topics.clone()))
    }

    /// Topic service for a topic-scoped deployment: docs, then cards.
    pub fn topic_service(&self) -> TopicService {
        let guard = ReferentialIntegrityGuard::new()
            .with_probe(StoreProbe::new(
                DOCS_DEPENDENT_LABEL,
                Arc::new(self.topic_docs.clone()),
            ))
            .with_probe(StoreProbe::new(
                INDEX_CARDS_DEPENDENT_LABEL,
                Arc::new(self.cards.clone()),
            ));
        TopicService::new(Arc::new(self.topics.clone()), guard)
    }

    pub fn topic_doc_service(&self, converter: Arc<dyn ConversionBackend>) -> DocService<TopicId> {
        DocService::new(
            Arc::new(self.topic_docs.clone()),
            converter,
            Arc::new(self.topic_directory()),
        )
    }

    pub fn user_doc_service(&self, converter: Arc<dyn ConversionBackend>) -> DocService<UserId> {
        DocService::new(Arc::new(self.user_docs.clone()), converter, Arc::new(AnyUser))
    }

    pub fn index_card_service(&self) -> IndexCardService {
        IndexCardService::new(Arc::new(self.cards.clone()), self.topic_directory())
    }
}

pub fn user(subject: &str) -> UserId {
    UserId::new(subject).unwrap()
}
