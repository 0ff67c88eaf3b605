//! Shared types for the locker shop service
//!
//! Domain models, the unified error type, and response envelopes used by
//! the API surface. DB row derives are gated behind the `db` feature so
//! frontends can depend on this crate without pulling in sqlx.

pub mod error;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use error::{ApiError, ApiResult};
pub use serde::{Deserialize, Serialize};
