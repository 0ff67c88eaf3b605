//! User models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Starting balance granted at registration
pub const STARTING_VBUCKS: i64 = 10_000;

/// Full user row — never serialized to clients (carries the password hash)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub vbucks: i64,
    pub created_at: DateTime<Utc>,
}

/// Client-facing user view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub vbucks: i64,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            vbucks: u.vbucks,
            created_at: u.created_at,
        }
    }
}

/// Ownership record. Soft-deleted on refund: `is_active` flips to false and
/// `refunded_at` is set; the row itself is never removed, so one
/// (user, cosmetic) pair may have multiple historical rows but at most one
/// active one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserCosmetic {
    pub id: i64,
    pub user_id: Uuid,
    pub cosmetic_id: String,
    pub is_active: bool,
    pub acquired_at: DateTime<Utc>,
    pub refunded_at: Option<DateTime<Utc>>,
    /// Set iff the item was acquired as part of a bundle purchase
    pub bundle_id: Option<Uuid>,
}
