//! # kbase-content
//!
//! Business rules for topics, docs and index cards.
//!
//! Services are plain structs holding shared stores (`Arc<dyn ScopedStore<_>>`)
//! so the same code runs over PostgreSQL or the in-memory store:
//!
//! - [`TopicService`]: globally unique topic names; deletion guarded by
//!   [`ReferentialIntegrityGuard`]
//! - [`DocService`]: uploads converted through a [`kbase_core::ConversionBackend`],
//!   names unique per owner key
//! - [`IndexCardService`]: cards per topic with an optional answer image
//!
//! Uniqueness and integrity checks are check-then-act; concurrent requests
//! can interleave between the check and the write.

pub mod directory;
pub mod docs;
pub mod guard;
pub mod index_cards;
pub mod topics;
pub mod validation;

pub use directory::{AnyUser, OwnerDirectory, TopicDirectory};
pub use docs::DocService;
pub use guard::{DependentProbe, ReferentialIntegrityGuard, StoreProbe};
pub use index_cards::IndexCardService;
pub use topics::TopicService;

/// Dependent label used when docs block a topic deletion.
pub const DOCS_DEPENDENT_LABEL: &str = "documentations";

/// Dependent label used when index cards block a topic deletion.
pub const INDEX_CARDS_DEPENDENT_LABEL: &str = "index cards";
