//! Route handlers, one module per resource.

pub mod docs;
pub mod health;
pub mod index_cards;
pub mod topics;
