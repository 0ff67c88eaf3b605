//! Transaction ledger models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bundle::Bundle;

/// Ledger entry type. The amount is always positive; the sign of the
/// balance movement is implied by the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "transaction_type", rename_all = "UPPERCASE")
)]
pub enum TransactionType {
    Purchase,
    Refund,
}

/// Append-only ledger row. Exactly one of `cosmetic_id`/`bundle_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: i64,
    pub user_id: Uuid,
    pub cosmetic_id: Option<String>,
    pub bundle_id: Option<Uuid>,
    pub amount: i64,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub created_at: DateTime<Utc>,
}

/// Compact item view embedded in transaction history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub rarity: Option<String>,
    pub image: Option<String>,
}

/// Transaction resolved with display data for the purchased item or bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub cosmetic: Option<HistoryItem>,
    pub bundle: Option<Bundle>,
}
