//! # kbase-convert
//!
//! Document conversion backends for kbase.
//!
//! [`GotenbergBackend`] implements [`kbase_core::ConversionBackend`] against
//! a Gotenberg server's LibreOffice route, turning uploaded DOCX files into
//! the PDF renderings stored alongside them.

pub mod config;
pub mod gotenberg;

pub use config::{ConfigError, ConfigResult, ConverterConfig};
pub use gotenberg::GotenbergBackend;
