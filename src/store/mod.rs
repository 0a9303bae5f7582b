// Copyright (c) DVB Team
// SPDX-License-Identifier: Apache-2.0

mod pg;

pub use pg::PgStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    IndexerState, NewFavorite, NewListing, NewProfile, NewPurchase, NewSubscription,
    UpdateProfile,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row already exists: {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(String),
}

/// Relational store contract used by the event synchronizer.
///
/// Each operation is its own atomic unit; no multi-table transaction spans
/// handler calls. Counter mutations are named remote procedures so they stay
/// independent of the row reads and writes around them.
#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    /// Insert the profile if unseen. On redelivery only the registration
    /// attributes (owner address, creation time) are refreshed, so later
    /// price or detail updates are never clobbered.
    async fn upsert_profile(&self, profile: NewProfile) -> Result<(), StoreError>;

    /// Apply a partial update to a profile row; absent rows are a no-op.
    async fn update_profile(
        &self,
        profile_id: &str,
        changes: UpdateProfile,
    ) -> Result<(), StoreError>;

    /// Resolve a profile id from its unique owner address.
    async fn find_profile_id_by_owner(
        &self,
        owner_address: &str,
    ) -> Result<Option<String>, StoreError>;

    async fn insert_listing(&self, listing: NewListing) -> Result<(), StoreError>;

    async fn deactivate_listing(&self, listing_id: &str) -> Result<(), StoreError>;

    async fn insert_subscription(&self, subscription: NewSubscription) -> Result<(), StoreError>;

    async fn insert_purchase(&self, purchase: NewPurchase) -> Result<(), StoreError>;

    /// Record a favorite membership; re-recording an existing one is a no-op.
    async fn upsert_favorite(&self, favorite: NewFavorite) -> Result<(), StoreError>;

    /// Remove a favorite membership; removing a missing one is a no-op.
    async fn delete_favorite(&self, user_id: &str, listing_id: &str) -> Result<(), StoreError>;

    async fn increment_subscriber_count(&self, profile_id: &str) -> Result<(), StoreError>;

    async fn increment_subscription_count(&self, profile_id: &str) -> Result<(), StoreError>;

    async fn increment_favorite_count(&self, listing_id: &str) -> Result<(), StoreError>;

    async fn decrement_favorite_count(&self, listing_id: &str) -> Result<(), StoreError>;

    /// Read the singleton cursor row; `None` means start of history.
    async fn load_checkpoint(&self) -> Result<Option<IndexerState>, StoreError>;

    /// Replace the singleton cursor row with a new resume token.
    async fn save_checkpoint(&self, token: &str) -> Result<(), StoreError>;
}
