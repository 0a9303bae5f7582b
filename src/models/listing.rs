// Copyright (c) DVB Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::nft_listings;

/// An offer to sell an NFT at a fixed price.
///
/// Listings are never deleted; a purchase flips `is_active` to false.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = nft_listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Listing {
    pub id: String,
    pub seller_id: String,
    pub nft_type: String,
    pub price: i64,
    pub is_active: bool,
    pub favorite_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = nft_listings)]
pub struct NewListing {
    pub id: String,
    pub seller_id: String,
    pub nft_type: String,
    pub price: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub favorite_count: i32,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}
