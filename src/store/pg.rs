use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Text;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use std::sync::Arc;

use super::{MarketplaceStore, StoreError};
use crate::db::{Database, DbConnection};
use crate::models::indexer::INDEXER_STATE_ID;
use crate::models::{
    IndexerState, NewFavorite, NewIndexerState, NewListing, NewProfile, NewPurchase,
    NewSubscription, UpdateProfile,
};
use crate::schema::{favorites, indexer_state, nft_listings, user_profiles};

/// Postgres-backed store used by the running service.
pub struct PgStore {
    db: Arc<Database>,
}

impl PgStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn conn(&self) -> Result<DbConnection, StoreError> {
        self.db
            .get_connection()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }

    async fn call_counter_rpc(&self, statement: &str, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;

        diesel::sql_query(statement)
            .bind::<Text, _>(key)
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl MarketplaceStore for PgStore {
    async fn upsert_profile(&self, profile: NewProfile) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;

        diesel::insert_into(user_profiles::table)
            .values(&profile)
            .on_conflict(user_profiles::id)
            .do_update()
            .set((
                user_profiles::owner_address.eq(excluded(user_profiles::owner_address)),
                user_profiles::created_at.eq(excluded(user_profiles::created_at)),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn update_profile(
        &self,
        profile_id: &str,
        changes: UpdateProfile,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;

        diesel::update(user_profiles::table.find(profile_id))
            .set(&changes)
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn find_profile_id_by_owner(
        &self,
        owner_address: &str,
    ) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn().await?;

        let id = user_profiles::table
            .filter(user_profiles::owner_address.eq(owner_address))
            .select(user_profiles::id)
            .first::<String>(&mut conn)
            .await
            .optional()?;

        Ok(id)
    }

    async fn insert_listing(&self, listing: NewListing) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;

        diesel::insert_into(nft_listings::table)
            .values(&listing)
            .execute(&mut conn)
            .await
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    StoreError::Duplicate(listing.id.clone())
                }
                other => StoreError::Database(other),
            })?;

        Ok(())
    }

    async fn deactivate_listing(&self, listing_id: &str) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;

        diesel::update(nft_listings::table.find(listing_id))
            .set(nft_listings::is_active.eq(false))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn insert_subscription(&self, subscription: NewSubscription) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;

        diesel::insert_into(crate::schema::subscriptions::table)
            .values(&subscription)
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn insert_purchase(&self, purchase: NewPurchase) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;

        diesel::insert_into(crate::schema::nft_purchases::table)
            .values(&purchase)
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn upsert_favorite(&self, favorite: NewFavorite) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;

        diesel::insert_into(favorites::table)
            .values(&favorite)
            .on_conflict((favorites::user_id, favorites::listing_id))
            .do_nothing()
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn delete_favorite(&self, user_id: &str, listing_id: &str) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;

        diesel::delete(
            favorites::table
                .filter(favorites::user_id.eq(user_id))
                .filter(favorites::listing_id.eq(listing_id)),
        )
        .execute(&mut conn)
        .await?;

        Ok(())
    }

    async fn increment_subscriber_count(&self, profile_id: &str) -> Result<(), StoreError> {
        self.call_counter_rpc("SELECT increment_subscriber_count($1)", profile_id)
            .await
    }

    async fn increment_subscription_count(&self, profile_id: &str) -> Result<(), StoreError> {
        self.call_counter_rpc("SELECT increment_subscription_count($1)", profile_id)
            .await
    }

    async fn increment_favorite_count(&self, listing_id: &str) -> Result<(), StoreError> {
        self.call_counter_rpc("SELECT increment_favorite_count($1)", listing_id)
            .await
    }

    async fn decrement_favorite_count(&self, listing_id: &str) -> Result<(), StoreError> {
        self.call_counter_rpc("SELECT decrement_favorite_count($1)", listing_id)
            .await
    }

    async fn load_checkpoint(&self) -> Result<Option<IndexerState>, StoreError> {
        let mut conn = self.conn().await?;

        let state = indexer_state::table
            .find(INDEXER_STATE_ID)
            .first::<IndexerState>(&mut conn)
            .await
            .optional()?;

        Ok(state)
    }

    async fn save_checkpoint(&self, token: &str) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;

        let state = NewIndexerState {
            id: INDEXER_STATE_ID,
            last_checkpoint: token.to_string(),
            updated_at: Utc::now(),
        };

        diesel::insert_into(indexer_state::table)
            .values(&state)
            .on_conflict(indexer_state::id)
            .do_update()
            .set(&state)
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}
