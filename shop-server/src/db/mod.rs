//! Database access layer

pub mod bundles;
pub mod cosmetics;
pub mod ledger;
pub mod shop_entries;
pub mod users;
