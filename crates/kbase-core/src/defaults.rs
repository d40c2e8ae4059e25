//! Centralized default constants for kbase.
//!
//! **This module is the single source of truth** for shared default values and
//! environment variable names. Crates reference these constants instead of
//! defining their own magic numbers.

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP listen host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP listen port.
pub const SERVER_PORT: u16 = 8080;

/// Default frontend origin allowed by CORS.
pub const CORS_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Maximum accepted request body (multipart uploads) in bytes.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

// =============================================================================
// DATABASE
// =============================================================================

/// Default PostgreSQL URL.
pub const DATABASE_URL: &str = "postgres://localhost/kbase";

/// Maximum pooled connections.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Connections kept open while idle.
pub const DB_MIN_CONNECTIONS: u32 = 1;

/// Seconds to wait for a free pooled connection.
pub const DB_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Seconds before an idle connection is closed.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;

/// Seconds before any connection is recycled.
pub const DB_MAX_LIFETIME_SECS: u64 = 1800;

// =============================================================================
// CONVERSION
// =============================================================================

/// Default converter host (Gotenberg).
pub const CONVERTER_HOST: &str = "localhost";

/// Default converter port (Gotenberg).
pub const CONVERTER_PORT: u16 = 3000;

/// Path of the office-to-PDF route on the converter.
pub const CONVERTER_ROUTE: &str = "/forms/libreoffice/convert";

/// Multipart field name carrying the primary file.
pub const CONVERTER_FILE_FIELD: &str = "file";

/// File name sent with the primary file; the converter picks the input
/// format from its extension.
pub const CONVERTER_FILE_NAME: &str = "document.docx";

/// Timeout for a single conversion request in seconds.
pub const CONVERTER_TIMEOUT_SECS: u64 = 60;

/// Timeout for converter health probes in seconds.
pub const CONVERTER_HEALTH_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// CONTENT LIMITS
// =============================================================================

/// Maximum topic/doc name length in characters.
pub const NAME_MAX_CHARS: usize = 50;

/// Maximum index card question length in characters.
pub const QUESTION_MAX_CHARS: usize = 200;

/// Maximum index card answer length in characters.
pub const ANSWER_MAX_CHARS: usize = 1000;

/// Maximum answer image size in bytes.
pub const ANSWER_IMAGE_MAX_BYTES: usize = 1_000_000;

// =============================================================================
// MEDIA TYPES
// =============================================================================

/// Media type of uploaded primary files.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Media type of derived files.
pub const PDF_MIME: &str = "application/pdf";

/// Media type of answer images.
pub const PNG_MIME: &str = "image/png";

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
pub const ENV_DB_ACQUIRE_TIMEOUT_SECS: &str = "DB_ACQUIRE_TIMEOUT_SECS";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";

/// Storage backend: "postgres" (default) or "memory".
pub const ENV_STORE: &str = "KBASE_STORE";

/// Doc ownership model: "user" (default) or "topic".
pub const ENV_DOC_SCOPE: &str = "KBASE_DOC_SCOPE";

/// Full converter base URL; overrides host and port when set.
pub const ENV_CONVERTER_URL: &str = "CONVERTER_URL";
pub const ENV_GOTENBERG_HOST: &str = "GOTENBERG_HOST";
pub const ENV_GOTENBERG_PORT: &str = "GOTENBERG_PORT";
pub const ENV_CONVERTER_TIMEOUT_SECS: &str = "CONVERTER_TIMEOUT_SECS";

pub const ENV_CORS_ALLOWED_ORIGIN: &str = "CORS_ALLOWED_ORIGIN";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";
