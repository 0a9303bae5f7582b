use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::nft_purchases;

/// Append-only fact recording a completed NFT sale.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = nft_purchases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Purchase {
    pub id: i32,
    pub listing_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub price: i64,
    pub tx_digest: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = nft_purchases)]
pub struct NewPurchase {
    pub listing_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub price: i64,
    pub tx_digest: String,
    pub timestamp: DateTime<Utc>,
}
