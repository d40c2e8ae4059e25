//! Table mappings for topics, docs and index cards.

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};
use uuid::Uuid;

use kbase_core::{
    Doc, DocFile, DocSummary, IndexCard, IndexCardImage, IndexCardSummary, NoBinaryField,
    OwnerKey, Result, Topic, TopicId, TopicSummary,
};

use crate::scoped::PgEntity;

fn topic_id_from_row(row: &PgRow) -> Result<TopicId> {
    let key: String = row.try_get("topic_id")?;
    TopicId::from_key(&key)
}

// =============================================================================
// TOPIC
// =============================================================================

impl PgEntity for Topic {
    const TABLE: &'static str = "topic";
    const OWNER_COLUMN: Option<&'static str> = None;
    const NAME_COLUMN: Option<&'static str> = Some("name");
    const FULL_COLUMNS: &'static str = "id, name";
    const SUMMARY_COLUMNS: &'static str = "id, name";

    fn binary_column(field: NoBinaryField) -> &'static str {
        match field {}
    }

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Topic {
            id: Some(row.try_get("id")?),
            name: row.try_get("name")?,
        })
    }

    fn summary_from_row(row: &PgRow) -> Result<TopicSummary> {
        Ok(TopicSummary {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }

    fn upsert(&self, id: Uuid) -> Query<'_, Postgres, PgArguments> {
        sqlx::query(
            "INSERT INTO topic (id, name) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(id)
        .bind(&self.name)
    }
}

// =============================================================================
// DOC
// =============================================================================

impl<O: OwnerKey> PgEntity for Doc<O> {
    const TABLE: &'static str = "doc";
    const OWNER_COLUMN: Option<&'static str> = Some("owner_key");
    const NAME_COLUMN: Option<&'static str> = Some("name");
    const FULL_COLUMNS: &'static str = "id, owner_key, name, primary_file, derived_file";
    const SUMMARY_COLUMNS: &'static str = "id, owner_key, name";

    fn binary_column(field: DocFile) -> &'static str {
        match field {
            DocFile::Primary => "primary_file",
            DocFile::Derived => "derived_file",
        }
    }

    fn from_row(row: &PgRow) -> Result<Self> {
        let owner_key: String = row.try_get("owner_key")?;
        Ok(Doc {
            id: Some(row.try_get("id")?),
            owner: O::from_key(&owner_key)?,
            name: row.try_get("name")?,
            primary_file: row.try_get("primary_file")?,
            derived_file: row.try_get("derived_file")?,
        })
    }

    fn summary_from_row(row: &PgRow) -> Result<DocSummary<O>> {
        let owner_key: String = row.try_get("owner_key")?;
        Ok(DocSummary {
            id: row.try_get("id")?,
            owner_key: O::from_key(&owner_key)?,
            name: row.try_get("name")?,
        })
    }

    fn upsert(&self, id: Uuid) -> Query<'_, Postgres, PgArguments> {
        sqlx::query(
            "INSERT INTO doc (id, owner_key, name, primary_file, derived_file)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE SET
                owner_key = EXCLUDED.owner_key,
                name = EXCLUDED.name,
                primary_file = EXCLUDED.primary_file,
                derived_file = EXCLUDED.derived_file",
        )
        .bind(id)
        .bind(self.owner.to_key())
        .bind(&self.name)
        .bind(&self.primary_file)
        .bind(&self.derived_file)
    }
}

// =============================================================================
// INDEX CARD
// =============================================================================

impl PgEntity for IndexCard {
    const TABLE: &'static str = "index_card";
    const OWNER_COLUMN: Option<&'static str> = Some("topic_id");
    const NAME_COLUMN: Option<&'static str> = None;
    const FULL_COLUMNS: &'static str =
        "id, topic_id, question, answer, answer_image, is_marked";
    const SUMMARY_COLUMNS: &'static str =
        "id, topic_id, question, answer, has_answer_image, is_marked";

    fn binary_column(field: IndexCardImage) -> &'static str {
        match field {
            IndexCardImage::Answer => "answer_image",
        }
    }

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(IndexCard {
            id: Some(row.try_get("id")?),
            topic_id: topic_id_from_row(row)?,
            question: row.try_get("question")?,
            answer: row.try_get("answer")?,
            answer_image: row.try_get("answer_image")?,
            is_marked: row.try_get("is_marked")?,
        })
    }

    fn summary_from_row(row: &PgRow) -> Result<IndexCardSummary> {
        Ok(IndexCardSummary {
            id: row.try_get("id")?,
            topic_id: topic_id_from_row(row)?,
            question: row.try_get("question")?,
            answer: row.try_get("answer")?,
            has_answer_image: row.try_get("has_answer_image")?,
            is_marked: row.try_get("is_marked")?,
        })
    }

    // has_answer_image is written from the same field as the image column.
    fn upsert(&self, id: Uuid) -> Query<'_, Postgres, PgArguments> {
        sqlx::query(
            "INSERT INTO index_card
                (id, topic_id, question, answer, has_answer_image, answer_image, is_marked)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO UPDATE SET
                topic_id = EXCLUDED.topic_id,
                question = EXCLUDED.question,
                answer = EXCLUDED.answer,
                has_answer_image = EXCLUDED.has_answer_image,
                answer_image = EXCLUDED.answer_image,
                is_marked = EXCLUDED.is_marked",
        )
        .bind(id)
        .bind(self.topic_id.to_key())
        .bind(&self.question)
        .bind(&self.answer)
        .bind(self.has_answer_image())
        .bind(&self.answer_image)
        .bind(self.is_marked)
    }
}
