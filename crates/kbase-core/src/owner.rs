//! Owner keys.
//!
//! An owner key partitions name uniqueness and listings. Docs are generic
//! over their owner key so a deployment can scope them either to a topic
//! ([`TopicId`]) or to an authenticated user ([`UserId`]); index cards are
//! always scoped to a topic and topics live in the single [`Global`] scope.

use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A value under which entities are partitioned.
///
/// Owner keys are persisted as text; `to_key`/`from_key` must round-trip.
pub trait OwnerKey:
    Clone + Eq + Hash + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Short label used in logs and messages ("topic", "user", "global").
    const KIND: &'static str;

    /// Text form stored in the owner column.
    fn to_key(&self) -> String;

    /// Parse the stored text form.
    fn from_key(key: &str) -> Result<Self>;
}

/// Topic identifier used as an owner key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub Uuid);

impl From<Uuid> for TopicId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl OwnerKey for TopicId {
    const KIND: &'static str = "topic";

    fn to_key(&self) -> String {
        self.0.to_string()
    }

    fn from_key(key: &str) -> Result<Self> {
        Uuid::parse_str(key)
            .map(Self)
            .map_err(|e| Error::Internal(format!("Stored topic key '{}' is not a UUID: {}", key, e)))
    }
}

/// Opaque user identity (the `sub` claim supplied by the identity provider).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a subject identifier. Empty subjects are rejected.
    pub fn new(subject: impl Into<String>) -> Result<Self> {
        let subject = subject.into();
        if subject.is_empty() {
            return Err(Error::InvalidArgument(
                "User identity cannot be empty".to_string(),
            ));
        }
        Ok(Self(subject))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl OwnerKey for UserId {
    const KIND: &'static str = "user";

    fn to_key(&self) -> String {
        self.0.clone()
    }

    fn from_key(key: &str) -> Result<Self> {
        Self::new(key)
    }
}

/// The single scope shared by every topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Global;

impl fmt::Display for Global {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("global")
    }
}

impl OwnerKey for Global {
    const KIND: &'static str = "global";

    fn to_key(&self) -> String {
        String::new()
    }

    fn from_key(_key: &str) -> Result<Self> {
        Ok(Global)
    }
}
