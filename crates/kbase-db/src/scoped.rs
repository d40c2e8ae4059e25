//! Generic PostgreSQL content store.
//!
//! [`PgScopedStore`] implements [`ScopedStore`] once for every entity kind.
//! Table layout is supplied per kind through [`PgEntity`]: which column holds
//! the owner key, which holds the name, which columns are cheap enough for
//! listings and which hold binary payloads.
//!
//! Listings select [`PgEntity::SUMMARY_COLUMNS`] only, and binary downloads
//! select a single column, so payload bytes never cross the wire unless a
//! full entity or that one field is asked for.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Pool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use kbase_core::{new_v7, BinaryField, Error, OwnerKey, Result, ScopedEntity, ScopedStore};

/// Table metadata and row mapping for an entity stored in PostgreSQL.
pub trait PgEntity: ScopedEntity {
    const TABLE: &'static str;

    /// Column holding [`OwnerKey::to_key`]; `None` for globally scoped kinds.
    const OWNER_COLUMN: Option<&'static str>;

    /// Column participating in owner-scoped uniqueness; `None` for unnamed kinds.
    const NAME_COLUMN: Option<&'static str>;

    /// Every column, as read by [`PgEntity::from_row`].
    const FULL_COLUMNS: &'static str;

    /// Non-binary columns, as read by [`PgEntity::summary_from_row`].
    const SUMMARY_COLUMNS: &'static str;

    /// Column backing one binary field.
    fn binary_column(field: Self::BinaryField) -> &'static str;

    fn from_row(row: &PgRow) -> Result<Self>;

    fn summary_from_row(row: &PgRow) -> Result<Self::Summary>;

    /// `INSERT … ON CONFLICT (id) DO UPDATE` for this entity under `id`.
    fn upsert(&self, id: Uuid) -> Query<'_, Postgres, PgArguments>;
}

/// PostgreSQL implementation of [`ScopedStore`].
pub struct PgScopedStore<E> {
    pool: Pool<Postgres>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgScopedStore<E> {
    /// Create a new store with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

impl<E> Clone for PgScopedStore<E> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<E: PgEntity> PgScopedStore<E> {
    /// `SELECT {columns} FROM {table} WHERE id = $1`
    fn select_by_id(columns: &str, id: Uuid) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(columns)
            .push(" FROM ")
            .push(E::TABLE)
            .push(" WHERE id = ")
            .push_bind(id);
        qb
    }

    /// Append ` AND {owner_column} = $n` when the kind has an owner column.
    fn push_owner(qb: &mut QueryBuilder<'static, Postgres>, owner: &E::Owner) {
        if let Some(column) = E::OWNER_COLUMN {
            qb.push(" AND ")
                .push(column)
                .push(" = ")
                .push_bind(owner.to_key());
        }
    }

    /// Append ` WHERE {owner_column} = $n`, or nothing for global kinds.
    fn push_owner_filter(qb: &mut QueryBuilder<'static, Postgres>, owner: &E::Owner) {
        if let Some(column) = E::OWNER_COLUMN {
            qb.push(" WHERE ")
                .push(column)
                .push(" = ")
                .push_bind(owner.to_key());
        }
    }

    async fn fetch_exists(&self, mut qb: QueryBuilder<'static, Postgres>) -> Result<bool> {
        qb.push(")");
        qb.build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn fetch_entity(&self, mut qb: QueryBuilder<'static, Postgres>) -> Result<Option<E>> {
        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(E::from_row).transpose()
    }

    async fn fetch_binary(
        &self,
        mut qb: QueryBuilder<'static, Postgres>,
        field: E::BinaryField,
    ) -> Result<Option<Vec<u8>>> {
        let bytes = qb
            .build_query_scalar::<Option<Vec<u8>>>()
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .flatten();

        debug!(
            subsystem = "db",
            component = E::TABLE,
            op = "load_binary",
            field = field.label(),
            byte_len = bytes.as_ref().map(Vec::len).unwrap_or(0),
            "Loaded single binary column"
        );
        Ok(bytes)
    }

    async fn execute_delete(&self, mut qb: QueryBuilder<'static, Postgres>) -> Result<u64> {
        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl<E: PgEntity> ScopedStore<E> for PgScopedStore<E> {
    async fn exists_by_owner_and_name(&self, owner: &E::Owner, name: &str) -> Result<bool> {
        let Some(name_column) = E::NAME_COLUMN else {
            return Ok(false);
        };

        let mut qb = QueryBuilder::new("SELECT EXISTS(SELECT 1 FROM ");
        qb.push(E::TABLE)
            .push(" WHERE ")
            .push(name_column)
            .push(" = ")
            .push_bind(name.to_string());
        Self::push_owner(&mut qb, owner);
        self.fetch_exists(qb).await
    }

    async fn exists_by_owner(&self, owner: &E::Owner) -> Result<bool> {
        let mut qb = QueryBuilder::new("SELECT EXISTS(SELECT 1 FROM ");
        qb.push(E::TABLE);
        Self::push_owner_filter(&mut qb, owner);
        self.fetch_exists(qb).await
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool> {
        let mut qb = QueryBuilder::new("SELECT EXISTS(SELECT 1 FROM ");
        qb.push(E::TABLE).push(" WHERE id = ").push_bind(id);
        self.fetch_exists(qb).await
    }

    async fn exists_by_id_and_owner(&self, id: Uuid, owner: &E::Owner) -> Result<bool> {
        let mut qb = QueryBuilder::new("SELECT EXISTS(SELECT 1 FROM ");
        qb.push(E::TABLE).push(" WHERE id = ").push_bind(id);
        Self::push_owner(&mut qb, owner);
        self.fetch_exists(qb).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>> {
        self.fetch_entity(Self::select_by_id(E::FULL_COLUMNS, id))
            .await
    }

    async fn find_by_id_and_owner(&self, id: Uuid, owner: &E::Owner) -> Result<Option<E>> {
        let mut qb = Self::select_by_id(E::FULL_COLUMNS, id);
        Self::push_owner(&mut qb, owner);
        self.fetch_entity(qb).await
    }

    async fn find_all_by_owner_projected(&self, owner: &E::Owner) -> Result<Vec<E::Summary>> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(E::SUMMARY_COLUMNS).push(" FROM ").push(E::TABLE);
        Self::push_owner_filter(&mut qb, owner);
        qb.push(" ORDER BY id");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = E::TABLE,
            op = "list_projected",
            result_count = rows.len(),
            "Listed entities without binary columns"
        );

        rows.iter().map(E::summary_from_row).collect()
    }

    async fn find_binary_field_by_id(
        &self,
        id: Uuid,
        field: E::BinaryField,
    ) -> Result<Option<Vec<u8>>> {
        let qb = Self::select_by_id(E::binary_column(field), id);
        self.fetch_binary(qb, field).await
    }

    async fn find_binary_field_by_id_and_owner(
        &self,
        id: Uuid,
        owner: &E::Owner,
        field: E::BinaryField,
    ) -> Result<Option<Vec<u8>>> {
        let mut qb = Self::select_by_id(E::binary_column(field), id);
        Self::push_owner(&mut qb, owner);
        self.fetch_binary(qb, field).await
    }

    async fn save(&self, mut entity: E) -> Result<E> {
        let id = match entity.id() {
            Some(id) => id,
            None => {
                let id = new_v7();
                entity.set_id(id);
                id
            }
        };

        entity
            .upsert(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = E::TABLE,
            op = "save",
            id = %id,
            "Saved entity"
        );
        Ok(entity)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<()> {
        let mut qb = QueryBuilder::new("DELETE FROM ");
        qb.push(E::TABLE).push(" WHERE id = ").push_bind(id);
        self.execute_delete(qb).await?;
        Ok(())
    }

    async fn delete_by_id_and_owner(&self, id: Uuid, owner: &E::Owner) -> Result<()> {
        let mut qb = QueryBuilder::new("DELETE FROM ");
        qb.push(E::TABLE).push(" WHERE id = ").push_bind(id);
        Self::push_owner(&mut qb, owner);
        self.execute_delete(qb).await?;
        Ok(())
    }

    async fn delete_all_by_owner(&self, owner: &E::Owner) -> Result<u64> {
        let mut qb = QueryBuilder::new("DELETE FROM ");
        qb.push(E::TABLE);
        Self::push_owner_filter(&mut qb, owner);
        let removed = self.execute_delete(qb).await?;

        debug!(
            subsystem = "db",
            component = E::TABLE,
            op = "delete_all_by_owner",
            owner = %owner,
            result_count = removed,
            "Deleted entities by owner"
        );
        Ok(removed)
    }
}
