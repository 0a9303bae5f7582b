use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::listing::NewListing;

/// Event emitted when an NFT is put up for sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftListedEvent {
    pub listing_id: String,
    pub seller: String,
    #[serde(deserialize_with = "crate::events::move_u64")]
    pub price: u64,
    pub nft_id: Option<String>,
}

impl NftListedEvent {
    /// Convert the event into a NewListing model.
    ///
    /// The contract does not emit a type tag for the listed NFT, so the
    /// generic `"NFT"` marker is written.
    pub fn into_model(&self, seller_id: String, created_at: DateTime<Utc>) -> NewListing {
        NewListing {
            id: self.listing_id.clone(),
            seller_id,
            nft_type: "NFT".to_string(),
            price: self.price as i64,
            is_active: true,
            favorite_count: 0,
            created_at,
        }
    }
}

/// Event emitted when a listed NFT is bought
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftPurchasedEvent {
    pub listing_id: String,
    pub buyer: String,
    pub seller: String,
    #[serde(deserialize_with = "crate::events::move_u64")]
    pub price: u64,
}

/// Event emitted when a user favorites a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingFavoritedEvent {
    pub listing_id: String,
    pub user: String,
}

/// Event emitted when a user removes a favorite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingUnfavoritedEvent {
    pub listing_id: String,
    pub user: String,
}
