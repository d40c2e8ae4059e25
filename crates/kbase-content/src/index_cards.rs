//! Index card service.

use std::sync::Arc;

use kbase_core::{
    Error, IndexCard, IndexCardImage, IndexCardSummary, Result, ScopedEntity, ScopedStore,
    TopicId,
};
use tracing::info;
use uuid::Uuid;

use crate::directory::{OwnerDirectory, TopicDirectory};
use crate::validation::{validate_answer, validate_answer_image_size, validate_question};

/// Manages question/answer cards belonging to topics.
#[derive(Clone)]
pub struct IndexCardService {
    cards: Arc<dyn ScopedStore<IndexCard>>,
    topics: TopicDirectory,
}

impl IndexCardService {
    pub fn new(cards: Arc<dyn ScopedStore<IndexCard>>, topics: TopicDirectory) -> Self {
        Self { cards, topics }
    }

    /// Load a card, apply `update`, and save it back under the same id.
    async fn modify<F>(&self, id: Uuid, op: &'static str, update: F) -> Result<IndexCardSummary>
    where
        F: FnOnce(&mut IndexCard) + Send,
    {
        let mut card = self
            .cards
            .find_by_id(id)
            .await?
            .ok_or(Error::IndexCardNotFound(id))?;
        update(&mut card);
        let card = self.cards.save(card).await?;

        info!(
            subsystem = "content",
            component = "index_cards",
            op,
            index_card_id = %id,
            "Index card updated"
        );
        card.summary()
    }

    pub async fn add_index_card(
        &self,
        topic_id: TopicId,
        question: &str,
        answer: &str,
        answer_image: Option<Vec<u8>>,
    ) -> Result<IndexCardSummary> {
        validate_question(question)?;
        validate_answer(answer)?;
        if let Some(image) = &answer_image {
            validate_answer_image_size(image)?;
        }
        self.topics.ensure_exists(&topic_id).await?;

        let card = self
            .cards
            .save(IndexCard::new(topic_id, question, answer, answer_image))
            .await?;
        let summary = card.summary()?;

        info!(
            subsystem = "content",
            component = "index_cards",
            op = "add",
            index_card_id = %summary.id,
            topic_id = %topic_id,
            has_answer_image = summary.has_answer_image,
            "Index card created"
        );
        Ok(summary)
    }

    /// Cards of a topic, without image bytes.
    pub async fn list_by_topic(&self, topic_id: TopicId) -> Result<Vec<IndexCardSummary>> {
        self.topics.ensure_exists(&topic_id).await?;
        self.cards.find_all_by_owner_projected(&topic_id).await
    }

    /// PNG bytes of the answer image. Not found when the card is missing or
    /// has no image.
    pub async fn get_answer_image(&self, id: Uuid) -> Result<Vec<u8>> {
        if let Some(image) = self
            .cards
            .find_binary_field_by_id(id, IndexCardImage::Answer)
            .await?
        {
            return Ok(image);
        }
        if self.cards.exists_by_id(id).await? {
            Err(Error::AnswerImageNotFound(id))
        } else {
            Err(Error::IndexCardNotFound(id))
        }
    }

    pub async fn set_question(&self, id: Uuid, question: &str) -> Result<IndexCardSummary> {
        validate_question(question)?;
        let question = question.to_string();
        self.modify(id, "set_question", |card| card.question = question)
            .await
    }

    pub async fn set_answer(&self, id: Uuid, answer: &str) -> Result<IndexCardSummary> {
        validate_answer(answer)?;
        let answer = answer.to_string();
        self.modify(id, "set_answer", |card| card.answer = answer)
            .await
    }

    pub async fn set_answer_image(&self, id: Uuid, image: Vec<u8>) -> Result<IndexCardSummary> {
        validate_answer_image_size(&image)?;
        self.modify(id, "set_answer_image", |card| card.answer_image = Some(image))
            .await
    }

    pub async fn remove_answer_image(&self, id: Uuid) -> Result<IndexCardSummary> {
        self.modify(id, "remove_answer_image", |card| card.answer_image = None)
            .await
    }

    pub async fn set_marked(&self, id: Uuid, is_marked: bool) -> Result<IndexCardSummary> {
        self.modify(id, "set_marked", |card| card.is_marked = is_marked)
            .await
    }

    pub async fn delete_index_card(&self, id: Uuid) -> Result<()> {
        if !self.cards.exists_by_id(id).await? {
            return Err(Error::IndexCardNotFound(id));
        }
        self.cards.delete_by_id(id).await?;
        info!(
            subsystem = "content",
            component = "index_cards",
            op = "delete",
            index_card_id = %id,
            "Index card deleted"
        );
        Ok(())
    }

    /// Delete every card of a topic; succeeds when the topic has none.
    pub async fn delete_all_by_topic(&self, topic_id: TopicId) -> Result<u64> {
        self.topics.ensure_exists(&topic_id).await?;
        let removed = self.cards.delete_all_by_owner(&topic_id).await?;
        info!(
            subsystem = "content",
            component = "index_cards",
            op = "delete_by_topic",
            topic_id = %topic_id,
            result_count = removed,
            "Index cards deleted by topic"
        );
        Ok(removed)
    }
}
