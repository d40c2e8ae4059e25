//! Core traits for kbase abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::owner::OwnerKey;

// =============================================================================
// ENTITY TRAITS
// =============================================================================

/// Selector for one binary column of an entity.
pub trait BinaryField: Copy + Debug + Send + Sync + 'static {
    /// Field name used in logs.
    fn label(self) -> &'static str;
}

/// An entity stored in a [`ScopedStore`].
///
/// Entities are partitioned by an owner key; names (when the kind has one)
/// are unique within an owner, not globally.
pub trait ScopedEntity: Clone + Debug + Send + Sync + 'static {
    /// Scope under which names are unique and listings are partitioned.
    type Owner: OwnerKey;
    /// Projection returned by listings; excludes every binary field.
    type Summary: Clone + Debug + Serialize + Send + Sync + 'static;
    /// Selector for the entity's binary columns.
    type BinaryField: BinaryField;

    /// Entity kind label ("topic", "doc", "index_card").
    const KIND: &'static str;

    /// Identifier, absent until the entity is first saved.
    fn id(&self) -> Option<Uuid>;

    fn set_id(&mut self, id: Uuid);

    fn owner(&self) -> &Self::Owner;

    /// Name participating in owner-scoped uniqueness; `None` for unnamed kinds.
    fn name(&self) -> Option<&str>;

    /// Projection of a persisted entity. Fails for entities without an id.
    fn summary(&self) -> Result<Self::Summary>;

    /// Borrow one binary field, `None` when the field is empty/absent.
    fn binary_field(&self, field: Self::BinaryField) -> Option<&[u8]>;
}

// =============================================================================
// SCOPED CONTENT STORE
// =============================================================================

/// Persistence for one entity kind with owner-scoped uniqueness and
/// field-projected reads.
///
/// Absence is never an error: existence checks return `false` and lookups
/// return `None`. Callers decide whether absence is a failure.
///
/// No operation spans more than one statement; checks followed by writes are
/// not atomic with respect to concurrent callers.
#[async_trait]
pub trait ScopedStore<E: ScopedEntity>: Send + Sync {
    /// Whether an entity named `name` exists under `owner`.
    /// Always `false` for unnamed kinds.
    async fn exists_by_owner_and_name(&self, owner: &E::Owner, name: &str) -> Result<bool>;

    /// Whether any entity exists under `owner`.
    async fn exists_by_owner(&self, owner: &E::Owner) -> Result<bool>;

    async fn exists_by_id(&self, id: Uuid) -> Result<bool>;

    async fn exists_by_id_and_owner(&self, id: Uuid, owner: &E::Owner) -> Result<bool>;

    /// Load a full entity including binary fields.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>>;

    async fn find_by_id_and_owner(&self, id: Uuid, owner: &E::Owner) -> Result<Option<E>>;

    /// List every entity under `owner` without loading binary fields.
    async fn find_all_by_owner_projected(&self, owner: &E::Owner) -> Result<Vec<E::Summary>>;

    /// Load exactly one binary field. `None` when the entity does not exist
    /// or the field is absent.
    async fn find_binary_field_by_id(
        &self,
        id: Uuid,
        field: E::BinaryField,
    ) -> Result<Option<Vec<u8>>>;

    async fn find_binary_field_by_id_and_owner(
        &self,
        id: Uuid,
        owner: &E::Owner,
        field: E::BinaryField,
    ) -> Result<Option<Vec<u8>>>;

    /// Upsert by id. An entity without an id is inserted under a new UUIDv7;
    /// the returned entity carries its id.
    async fn save(&self, entity: E) -> Result<E>;

    /// Delete by id. Deleting a missing id is not an error.
    async fn delete_by_id(&self, id: Uuid) -> Result<()>;

    async fn delete_by_id_and_owner(&self, id: Uuid, owner: &E::Owner) -> Result<()>;

    /// Delete every entity under `owner`, returning how many were removed.
    async fn delete_all_by_owner(&self, owner: &E::Owner) -> Result<u64>;
}

// =============================================================================
// CONVERSION BACKEND
// =============================================================================

/// Converts an uploaded primary file into its derived rendering.
///
/// Implementations make a single attempt; every failure mode surfaces as
/// [`crate::Error::ConversionFailed`].
#[async_trait]
pub trait ConversionBackend: Send + Sync {
    /// Convert primary-format bytes into derived-format bytes.
    async fn convert(&self, primary: &[u8]) -> Result<Vec<u8>>;

    /// Check whether the converter is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}
