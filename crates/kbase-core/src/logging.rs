//! Field names for structured `tracing` events.
//!
//! `tracing` macros take field names as literals, so these constants are the
//! reference list rather than something call sites import. Keep new events
//! on these keys.
//!
//! | Level | Used for |
//! |-------|----------|
//! | ERROR | 5xx responses, store failures |
//! | WARN  | 4xx responses, failed conversions, blocked topic deletions |
//! | INFO  | Startup, successful mutations |
//! | DEBUG | Store reads, guard decisions |

/// "api", "content", "db" or "convert".
pub const SUBSYSTEM: &str = "subsystem";

/// Part of a subsystem, e.g. "docs", "guard", "pool", "gotenberg".
pub const COMPONENT: &str = "component";

pub const OPERATION: &str = "op";

pub const TOPIC_ID: &str = "topic_id";
pub const DOC_ID: &str = "doc_id";
pub const INDEX_CARD_ID: &str = "index_card_id";

/// Owner key of a doc operation.
pub const OWNER: &str = "owner";

/// "topic", "doc" or "index_card".
pub const ENTITY: &str = "entity";

/// Blocking dependent label on a refused topic deletion.
pub const DEPENDENT: &str = "dependent";

pub const DURATION_MS: &str = "duration_ms";

/// Rows returned by a listing or removed by a bulk delete.
pub const RESULT_COUNT: &str = "result_count";

/// Conversion backend name.
pub const BACKEND: &str = "backend";

/// Size of a file payload.
pub const BYTE_LEN: &str = "byte_len";

/// HTTP status of a rejected or failed request.
pub const STATUS: &str = "status";

pub const ERROR: &str = "error";
