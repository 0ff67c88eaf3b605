//! Data models
//!
//! Shared between the shop server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Cosmetic ids are the external provider's stable string ids; user and
//! bundle ids are UUIDs minted locally.

pub mod bundle;
pub mod cosmetic;
pub mod shop_entry;
pub mod shop_view;
pub mod transaction;
pub mod user;

// Re-exports
pub use bundle::*;
pub use cosmetic::*;
pub use shop_entry::*;
pub use shop_view::*;
pub use transaction::*;
pub use user::*;
