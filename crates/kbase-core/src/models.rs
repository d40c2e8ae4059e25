//! Core data models for kbase.
//!
//! Each stored entity has a full form (including binary payloads) and a
//! summary form used for listings and API responses. Summaries never carry
//! binary payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::owner::{Global, OwnerKey, TopicId};
use crate::traits::{BinaryField, ScopedEntity};

fn unsaved(kind: &str) -> Error {
    Error::Internal(format!("{} has not been persisted yet", kind))
}

// =============================================================================
// TOPIC
// =============================================================================

/// A topic groups docs and index cards. Names are unique across all topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: Option<Uuid>,
    pub name: String,
}

impl Topic {
    /// A new, not yet persisted topic.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

/// API representation of a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub id: Uuid,
    pub name: String,
}

/// Topics carry no binary payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoBinaryField {}

impl BinaryField for NoBinaryField {
    fn label(self) -> &'static str {
        match self {}
    }
}

impl ScopedEntity for Topic {
    type Owner = Global;
    type Summary = TopicSummary;
    type BinaryField = NoBinaryField;

    const KIND: &'static str = "topic";

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }

    fn owner(&self) -> &Global {
        &Global
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn summary(&self) -> Result<TopicSummary> {
        Ok(TopicSummary {
            id: self.id.ok_or_else(|| unsaved(Self::KIND))?,
            name: self.name.clone(),
        })
    }

    fn binary_field(&self, field: NoBinaryField) -> Option<&[u8]> {
        match field {}
    }
}

// =============================================================================
// DOC
// =============================================================================

/// An uploaded document together with its converted rendering.
///
/// `primary_file` is the upload (DOCX), `derived_file` the converter output
/// (PDF). Both are populated before a doc is ever written.
#[derive(Clone, PartialEq, Eq)]
pub struct Doc<O> {
    pub id: Option<Uuid>,
    pub owner: O,
    pub name: String,
    pub primary_file: Vec<u8>,
    pub derived_file: Vec<u8>,
}

impl<O> Doc<O> {
    /// A new, not yet persisted doc.
    pub fn new(
        owner: O,
        name: impl Into<String>,
        primary_file: Vec<u8>,
        derived_file: Vec<u8>,
    ) -> Self {
        Self {
            id: None,
            owner,
            name: name.into(),
            primary_file,
            derived_file,
        }
    }
}

// Payloads can be megabytes; print their sizes only.
impl<O: fmt::Debug> fmt::Debug for Doc<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Doc")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("primary_file_len", &self.primary_file.len())
            .field("derived_file_len", &self.derived_file.len())
            .finish()
    }
}

/// The two binary columns of a doc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFile {
    /// The upload as received.
    Primary,
    /// The converter output.
    Derived,
}

impl BinaryField for DocFile {
    fn label(self) -> &'static str {
        match self {
            DocFile::Primary => "primary_file",
            DocFile::Derived => "derived_file",
        }
    }
}

/// Listing/API representation of a doc (no file payloads).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocSummary<O> {
    pub id: Uuid,
    pub owner_key: O,
    pub name: String,
}

impl<O: OwnerKey> ScopedEntity for Doc<O> {
    type Owner = O;
    type Summary = DocSummary<O>;
    type BinaryField = DocFile;

    const KIND: &'static str = "doc";

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }

    fn owner(&self) -> &O {
        &self.owner
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn summary(&self) -> Result<DocSummary<O>> {
        Ok(DocSummary {
            id: self.id.ok_or_else(|| unsaved(Self::KIND))?,
            owner_key: self.owner.clone(),
            name: self.name.clone(),
        })
    }

    fn binary_field(&self, field: DocFile) -> Option<&[u8]> {
        match field {
            DocFile::Primary => Some(&self.primary_file),
            DocFile::Derived => Some(&self.derived_file),
        }
    }
}

// =============================================================================
// INDEX CARD
// =============================================================================

/// A question/answer flashcard with an optional answer image.
///
/// The image and the "has image" flag are one field here, so they cannot
/// disagree; stores persist both columns from it in the same write.
#[derive(Clone, PartialEq, Eq)]
pub struct IndexCard {
    pub id: Option<Uuid>,
    pub topic_id: TopicId,
    pub question: String,
    pub answer: String,
    pub answer_image: Option<Vec<u8>>,
    pub is_marked: bool,
}

impl IndexCard {
    /// A new, unmarked, not yet persisted card.
    pub fn new(
        topic_id: TopicId,
        question: impl Into<String>,
        answer: impl Into<String>,
        answer_image: Option<Vec<u8>>,
    ) -> Self {
        Self {
            id: None,
            topic_id,
            question: question.into(),
            answer: answer.into(),
            answer_image,
            is_marked: false,
        }
    }

    pub fn has_answer_image(&self) -> bool {
        self.answer_image.is_some()
    }
}

impl fmt::Debug for IndexCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexCard")
            .field("id", &self.id)
            .field("topic_id", &self.topic_id)
            .field("question", &self.question)
            .field("answer", &self.answer)
            .field(
                "answer_image_len",
                &self.answer_image.as_ref().map(Vec::len),
            )
            .field("is_marked", &self.is_marked)
            .finish()
    }
}

/// The binary column of an index card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexCardImage {
    Answer,
}

impl BinaryField for IndexCardImage {
    fn label(self) -> &'static str {
        match self {
            IndexCardImage::Answer => "answer_image",
        }
    }
}

/// Listing/API representation of an index card (no image bytes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexCardSummary {
    pub id: Uuid,
    pub topic_id: TopicId,
    pub question: String,
    pub answer: String,
    pub has_answer_image: bool,
    pub is_marked: bool,
}

impl ScopedEntity for IndexCard {
    type Owner = TopicId;
    type Summary = IndexCardSummary;
    type BinaryField = IndexCardImage;

    const KIND: &'static str = "index_card";

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }

    fn owner(&self) -> &TopicId {
        &self.topic_id
    }

    fn name(&self) -> Option<&str> {
        None
    }

    fn summary(&self) -> Result<IndexCardSummary> {
        Ok(IndexCardSummary {
            id: self.id.ok_or_else(|| unsaved(Self::KIND))?,
            topic_id: self.topic_id,
            question: self.question.clone(),
            answer: self.answer.clone(),
            has_answer_image: self.has_answer_image(),
            is_marked: self.is_marked,
        })
    }

    fn binary_field(&self, field: IndexCardImage) -> Option<&[u8]> {
        match field {
            IndexCardImage::Answer => self.answer_image.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owner::UserId;

    #[test]
    fn test_unsaved_topic_has_no_summary() {
        let err = Topic::new("Java").summary().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Internal);
    }

    #[test]
    fn test_topic_summary_serialization() {
        let mut topic = Topic::new("Java");
        topic.set_id(Uuid::nil());
        let json = serde_json::to_value(topic.summary().unwrap()).unwrap();
        assert_eq!(json["name"], "Java");
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_doc_summary_has_no_payload_fields() {
        let mut doc = Doc::new(
            UserId::new("owner-1").unwrap(),
            "GC Guide",
            vec![1; 4096],
            vec![2; 4096],
        );
        doc.set_id(Uuid::nil());
        let json = serde_json::to_value(doc.summary().unwrap()).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(json["ownerKey"], "owner-1");
        assert_eq!(json["name"], "GC Guide");
    }

    #[test]
    fn test_doc_debug_prints_lengths_not_bytes() {
        let doc = Doc::new(TopicId(Uuid::nil()), "x", vec![7; 10], vec![8; 3]);
        let rendered = format!("{:?}", doc);
        assert!(rendered.contains("primary_file_len: 10"));
        assert!(rendered.contains("derived_file_len: 3"));
    }

    #[test]
    fn test_doc_binary_field_selects_column() {
        let doc = Doc::new(TopicId(Uuid::nil()), "x", b"docx".to_vec(), b"pdf".to_vec());
        assert_eq!(doc.binary_field(DocFile::Primary), Some(&b"docx"[..]));
        assert_eq!(doc.binary_field(DocFile::Derived), Some(&b"pdf"[..]));
    }

    #[test]
    fn test_index_card_image_flag_follows_image() {
        let mut card = IndexCard::new(TopicId(Uuid::nil()), "Q", "A", None);
        assert!(!card.has_answer_image());
        assert_eq!(card.binary_field(IndexCardImage::Answer), None);

        card.answer_image = Some(vec![0x89, b'P', b'N', b'G']);
        assert!(card.has_answer_image());
        assert_eq!(card.binary_field(IndexCardImage::Answer).map(<[u8]>::len), Some(4));
    }

    #[test]
    fn test_index_card_summary_serialization() {
        let mut card = IndexCard::new(TopicId(Uuid::nil()), "Q", "A", Some(vec![1, 2, 3]));
        card.set_id(Uuid::nil());
        let json = serde_json::to_value(card.summary().unwrap()).unwrap();
        assert_eq!(json["hasAnswerImage"], true);
        assert_eq!(json["isMarked"], false);
        assert_eq!(json["topicId"], "00000000-0000-0000-0000-000000000000");
        assert!(json.get("answerImage").is_none());
    }

    #[test]
    fn test_new_index_card_is_unmarked() {
        let card = IndexCard::new(TopicId(Uuid::nil()), "Q", "A", None);
        assert!(!card.is_marked);
        assert!(card.id.is_none());
    }

    #[test]
    fn test_index_cards_are_unnamed() {
        let card = IndexCard::new(TopicId(Uuid::nil()), "Q", "A", None);
        assert_eq!(card.name(), None);
    }
}
