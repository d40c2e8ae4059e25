//! # kbase-core
//!
//! Core types, traits, and abstractions for the kbase knowledge base.
//!
//! This crate provides the entity models (topics, docs, index cards), the
//! owner-key abstraction that scopes name uniqueness, the generic
//! [`ScopedStore`] persistence trait, the [`ConversionBackend`] trait for the
//! external document converter, and the shared error type.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod owner;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorKind, Result};
pub use models::*;
pub use owner::{Global, OwnerKey, TopicId, UserId};
pub use traits::*;
pub use uuid_utils::{is_v7, new_v7};
