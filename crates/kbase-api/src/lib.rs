//! # kbase-api
//!
//! HTTP surface for the kbase knowledge base.
//!
//! The binary wires the content services to a store (PostgreSQL or in-memory)
//! and a conversion backend, then serves three route groups:
//!
//! - `/topic-api/v1`: topics
//! - `/api/v1/docs`: docs, owned by the bearer's subject or by a topic
//! - `/index-card-api/v1`: index cards
//!
//! plus `GET /health`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod owner;
pub mod params;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use kbase_content::{
    AnyUser, DocService, IndexCardService, ReferentialIntegrityGuard, StoreProbe,
    TopicDirectory, TopicService, DOCS_DEPENDENT_LABEL, INDEX_CARDS_DEPENDENT_LABEL,
};
use kbase_core::{ConversionBackend, Doc, Error, IndexCard, Result, ScopedStore, Topic, TopicId, UserId};
use kbase_db::{Database, MemoryScopedStore};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub use config::{ApiConfig, DocScope, StoreKind};
pub use error::ApiError;

/// Shared state of the topic, index card and health routes.
#[derive(Clone)]
pub struct AppState {
    pub topics: TopicService,
    pub index_cards: IndexCardService,
    pub converter: Arc<dyn ConversionBackend>,
}

/// The doc service of a deployment; exactly one owner model is served.
#[derive(Clone)]
pub enum DocDeployment {
    User(DocService<UserId>),
    Topic(DocService<TopicId>),
}

/// Every store a deployment may use.
#[derive(Clone)]
pub struct Stores {
    pub topics: Arc<dyn ScopedStore<Topic>>,
    pub index_cards: Arc<dyn ScopedStore<IndexCard>>,
    pub user_docs: Arc<dyn ScopedStore<Doc<UserId>>>,
    pub topic_docs: Arc<dyn ScopedStore<Doc<TopicId>>>,
}

impl Stores {
    pub fn postgres(db: &Database) -> Self {
        Self {
            topics: Arc::new(db.topics.clone()),
            index_cards: Arc::new(db.index_cards.clone()),
            user_docs: Arc::new(db.docs::<UserId>()),
            topic_docs: Arc::new(db.docs::<TopicId>()),
        }
    }

    /// Fresh process-local stores.
    pub fn memory() -> Self {
        Self {
            topics: Arc::new(MemoryScopedStore::<Topic>::new()),
            index_cards: Arc::new(MemoryScopedStore::<IndexCard>::new()),
            user_docs: Arc::new(MemoryScopedStore::<Doc<UserId>>::new()),
            topic_docs: Arc::new(MemoryScopedStore::<Doc<TopicId>>::new()),
        }
    }
}

/// Build the services of a deployment.
///
/// Topic deletion checks docs before index cards. User-owned docs never
/// reference a topic, so they only block deletion in topic-scoped
/// deployments.
pub fn services(
    stores: Stores,
    converter: Arc<dyn ConversionBackend>,
    scope: DocScope,
) -> (AppState, DocDeployment) {
    let directory = TopicDirectory::new(Arc::clone(&stores.topics));

    let mut guard = ReferentialIntegrityGuard::new();
    let docs = match scope {
        DocScope::User => DocDeployment::User(DocService::new(
            stores.user_docs,
            Arc::clone(&converter),
            Arc::new(AnyUser),
        )),
        DocScope::Topic => {
            guard = guard.with_probe(StoreProbe::new(
                DOCS_DEPENDENT_LABEL,
                Arc::clone(&stores.topic_docs),
            ));
            DocDeployment::Topic(DocService::new(
                stores.topic_docs,
                Arc::clone(&converter),
                Arc::new(directory.clone()),
            ))
        }
    };
    let guard = guard.with_probe(StoreProbe::new(
        INDEX_CARDS_DEPENDENT_LABEL,
        Arc::clone(&stores.index_cards),
    ));

    let state = AppState {
        topics: TopicService::new(stores.topics, guard),
        index_cards: IndexCardService::new(stores.index_cards, directory),
        converter,
    };
    (state, docs)
}

/// Routes without middleware.
pub fn router(state: AppState, docs: DocDeployment) -> Router {
    let docs = match docs {
        DocDeployment::User(service) => handlers::docs::router(service),
        DocDeployment::Topic(service) => handlers::docs::topic_router(service),
    };

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/topic-api/v1", handlers::topics::router())
        .nest("/index-card-api/v1", handlers::index_cards::router())
        .nest("/api/v1/docs", docs)
        .with_state(state)
}

/// The full application: routes plus tracing, CORS and upload limits.
pub fn app(state: AppState, docs: DocDeployment, config: &ApiConfig) -> Result<Router> {
    let origin = HeaderValue::from_str(&config.cors_allowed_origin).map_err(|_| {
        Error::Config(format!(
            "Invalid CORS origin '{}'",
            config.cors_allowed_origin
        ))
    })?;

    Ok(router(state, docs)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes)))
}
