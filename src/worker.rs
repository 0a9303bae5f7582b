use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::chain::{ChainEvent, EventId, EventSource, SourceError};
use crate::events::{
    parse_event, ListingFavoritedEvent, ListingUnfavoritedEvent, NftListedEvent,
    NftPurchasedEvent, PriceUpdatedEvent, ProfileCreatedEvent, ProfileUpdatedEvent,
    SubscriptionCompletedEvent,
};
use crate::metrics;
use crate::models::{NewFavorite, NewPurchase, NewSubscription, UpdateProfile};
use crate::store::{MarketplaceStore, StoreError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("event source unavailable: {0}")]
    Source(#[from] SourceError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("invalid checkpoint token: {0}")]
    Checkpoint(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
enum HandlerError {
    #[error("malformed event payload: {0}")]
    Payload(#[from] anyhow::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a completed sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    /// Events whose handler ran to completion.
    pub processed: usize,
    /// Events fetched in this page, recognized or not.
    pub total: usize,
    /// Whether the source has more events beyond this page.
    pub has_more: bool,
}

enum Outcome {
    Applied,
    Ignored,
}

/// Marketplace indexer worker: advances the relational read model by one
/// page of chain events per sync pass.
pub struct IndexerWorker {
    source: Arc<dyn EventSource>,
    store: Arc<dyn MarketplaceStore>,
    page_size: usize,
}

impl IndexerWorker {
    pub fn new(
        source: Arc<dyn EventSource>,
        store: Arc<dyn MarketplaceStore>,
        page_size: usize,
    ) -> Self {
        Self {
            source,
            store,
            page_size,
        }
    }

    /// Run one synchronization pass.
    ///
    /// Events are applied strictly in source order, one at a time; a failing
    /// handler is logged and skipped so a poison event never blocks the rest
    /// of the batch. The checkpoint advances whenever the source returned a
    /// continuation token for a non-empty page, regardless of per-event
    /// outcomes.
    pub async fn run_sync_pass(&self) -> Result<SyncSummary, SyncError> {
        metrics::SYNC_PASSES.inc();

        let cursor = match self.store.load_checkpoint().await? {
            Some(state) => Some(serde_json::from_str::<EventId>(&state.last_checkpoint)?),
            None => None,
        };

        let page = self.source.query_events(cursor, self.page_size).await?;
        let total = page.data.len();
        let mut processed = 0;

        for event in &page.data {
            match self.apply_event(event).await {
                Ok(Outcome::Applied) => {
                    processed += 1;
                    metrics::EVENTS_PROCESSED.inc();
                }
                Ok(Outcome::Ignored) => {
                    debug!("Ignoring unrecognized event type: {}", event.event_type);
                }
                Err(e) => {
                    warn!("Failed to process {} event {}: {}", event.kind(), event.id.tx_digest, e);
                    metrics::EVENTS_FAILED.inc();
                }
            }
        }

        if total > 0 {
            if let Some(next_cursor) = &page.next_cursor {
                let token = serde_json::to_string(next_cursor)?;
                // A failed write here is not fatal: the next pass re-reads
                // the same page from the unchanged checkpoint.
                if let Err(e) = self.store.save_checkpoint(&token).await {
                    error!("Failed to persist checkpoint {}: {}", token, e);
                }
            }
        }

        info!(
            "Sync pass complete: processed {}/{} events, has_more={}",
            processed, total, page.has_next_page
        );

        Ok(SyncSummary {
            processed,
            total,
            has_more: page.has_next_page,
        })
    }

    async fn apply_event(&self, event: &ChainEvent) -> Result<Outcome, HandlerError> {
        match event.kind() {
            "ProfileCreated" => {
                let parsed: ProfileCreatedEvent = parse_event(&event.parsed_json)?;
                self.process_profile_created(&parsed, event).await?;
            }
            "PriceUpdated" => {
                let parsed: PriceUpdatedEvent = parse_event(&event.parsed_json)?;
                self.process_price_updated(&parsed, event).await?;
            }
            "ProfileUpdated" => {
                let parsed: ProfileUpdatedEvent = parse_event(&event.parsed_json)?;
                self.process_profile_updated(&parsed, event).await?;
            }
            "SubscriptionCompleted" => {
                let parsed: SubscriptionCompletedEvent = parse_event(&event.parsed_json)?;
                self.process_subscription_completed(&parsed, event).await?;
            }
            "NftListed" => {
                let parsed: NftListedEvent = parse_event(&event.parsed_json)?;
                self.process_nft_listed(&parsed, event).await?;
            }
            "NftPurchased" => {
                let parsed: NftPurchasedEvent = parse_event(&event.parsed_json)?;
                self.process_nft_purchased(&parsed, event).await?;
            }
            "ListingFavorited" => {
                let parsed: ListingFavoritedEvent = parse_event(&event.parsed_json)?;
                self.process_listing_favorited(&parsed, event).await?;
            }
            "ListingUnfavorited" => {
                let parsed: ListingUnfavoritedEvent = parse_event(&event.parsed_json)?;
                self.process_listing_unfavorited(&parsed, event).await?;
            }
            // Tolerate future contract additions
            _ => return Ok(Outcome::Ignored),
        }

        Ok(Outcome::Applied)
    }

    async fn process_profile_created(
        &self,
        parsed: &ProfileCreatedEvent,
        event: &ChainEvent,
    ) -> Result<(), HandlerError> {
        info!(
            "Processing ProfileCreated: profile_id={}, owner={}",
            parsed.profile_id, parsed.owner
        );

        self.store
            .upsert_profile(parsed.into_model(event.timestamp()))
            .await?;

        Ok(())
    }

    async fn process_price_updated(
        &self,
        parsed: &PriceUpdatedEvent,
        event: &ChainEvent,
    ) -> Result<(), HandlerError> {
        let changes = UpdateProfile {
            subscription_price: Some(parsed.new_price as i64),
            updated_at: Some(event.timestamp()),
            ..Default::default()
        };

        self.store
            .update_profile(&parsed.profile_id, changes)
            .await?;

        Ok(())
    }

    async fn process_profile_updated(
        &self,
        parsed: &ProfileUpdatedEvent,
        event: &ChainEvent,
    ) -> Result<(), HandlerError> {
        self.store
            .update_profile(&parsed.profile_id, parsed.into_changes(event.timestamp()))
            .await?;

        Ok(())
    }

    async fn process_subscription_completed(
        &self,
        parsed: &SubscriptionCompletedEvent,
        event: &ChainEvent,
    ) -> Result<(), HandlerError> {
        let creator = self.store.find_profile_id_by_owner(&parsed.creator).await?;
        let subscriber = self
            .store
            .find_profile_id_by_owner(&parsed.subscriber)
            .await?;

        // Both profiles must already be indexed before the fact is written
        if let (Some(creator_id), Some(subscriber_id)) = (creator, subscriber) {
            self.store
                .insert_subscription(NewSubscription {
                    subscriber_id: subscriber_id.clone(),
                    creator_id: creator_id.clone(),
                    amount_paid: parsed.price_paid as i64,
                    tx_digest: event.id.tx_digest.clone(),
                    timestamp: event.timestamp(),
                })
                .await?;

            self.store.increment_subscriber_count(&creator_id).await?;
            self.store
                .increment_subscription_count(&subscriber_id)
                .await?;
        } else {
            debug!(
                "Skipping SubscriptionCompleted: profile not indexed for {} or {}",
                parsed.creator, parsed.subscriber
            );
        }

        Ok(())
    }

    async fn process_nft_listed(
        &self,
        parsed: &NftListedEvent,
        event: &ChainEvent,
    ) -> Result<(), HandlerError> {
        match self.store.find_profile_id_by_owner(&parsed.seller).await? {
            Some(seller_id) => {
                self.store
                    .insert_listing(parsed.into_model(seller_id, event.timestamp()))
                    .await?;
            }
            None => {
                debug!(
                    "Skipping NftListed {}: seller {} not indexed",
                    parsed.listing_id, parsed.seller
                );
            }
        }

        Ok(())
    }

    async fn process_nft_purchased(
        &self,
        parsed: &NftPurchasedEvent,
        event: &ChainEvent,
    ) -> Result<(), HandlerError> {
        // The listing leaves the market even when a profile is missing
        self.store.deactivate_listing(&parsed.listing_id).await?;

        let buyer = self.store.find_profile_id_by_owner(&parsed.buyer).await?;
        let seller = self.store.find_profile_id_by_owner(&parsed.seller).await?;

        if let (Some(buyer_id), Some(seller_id)) = (buyer, seller) {
            self.store
                .insert_purchase(NewPurchase {
                    listing_id: parsed.listing_id.clone(),
                    buyer_id,
                    seller_id,
                    price: parsed.price as i64,
                    tx_digest: event.id.tx_digest.clone(),
                    timestamp: event.timestamp(),
                })
                .await?;
        } else {
            debug!(
                "Skipping purchase fact for {}: buyer or seller not indexed",
                parsed.listing_id
            );
        }

        Ok(())
    }

    async fn process_listing_favorited(
        &self,
        parsed: &ListingFavoritedEvent,
        event: &ChainEvent,
    ) -> Result<(), HandlerError> {
        if let Some(user_id) = self.store.find_profile_id_by_owner(&parsed.user).await? {
            self.store
                .upsert_favorite(NewFavorite {
                    user_id,
                    listing_id: parsed.listing_id.clone(),
                    created_at: event.timestamp(),
                })
                .await?;

            self.store
                .increment_favorite_count(&parsed.listing_id)
                .await?;
        } else {
            debug!(
                "Skipping ListingFavorited {}: user {} not indexed",
                parsed.listing_id, parsed.user
            );
        }

        Ok(())
    }

    async fn process_listing_unfavorited(
        &self,
        parsed: &ListingUnfavoritedEvent,
        event: &ChainEvent,
    ) -> Result<(), HandlerError> {
        if let Some(user_id) = self.store.find_profile_id_by_owner(&parsed.user).await? {
            self.store
                .delete_favorite(&user_id, &parsed.listing_id)
                .await?;

            self.store
                .decrement_favorite_count(&parsed.listing_id)
                .await?;
        } else {
            debug!(
                "Skipping ListingUnfavorited {}: user {} not indexed",
                parsed.listing_id, parsed.user
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::EventPage;
    use crate::models::{IndexerState, NewListing, NewProfile};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::collections::{BTreeMap, HashSet, VecDeque};
    use std::sync::Mutex;

    /// In-memory stand-in for the relational store, mirroring the Postgres
    /// implementation's per-operation semantics.
    #[derive(Default)]
    struct MemoryStore {
        profiles: Mutex<BTreeMap<String, NewProfile>>,
        listings: Mutex<BTreeMap<String, NewListing>>,
        subscriptions: Mutex<Vec<NewSubscription>>,
        purchases: Mutex<Vec<NewPurchase>>,
        favorites: Mutex<HashSet<(String, String)>>,
        checkpoint: Mutex<Option<IndexerState>>,
    }

    #[async_trait]
    impl MarketplaceStore for MemoryStore {
        async fn upsert_profile(&self, profile: NewProfile) -> Result<(), StoreError> {
            let mut profiles = self.profiles.lock().unwrap();
            match profiles.get_mut(&profile.id) {
                Some(existing) => {
                    existing.owner_address = profile.owner_address;
                    existing.created_at = profile.created_at;
                }
                None => {
                    profiles.insert(profile.id.clone(), profile);
                }
            }
            Ok(())
        }

        async fn update_profile(
            &self,
            profile_id: &str,
            changes: UpdateProfile,
        ) -> Result<(), StoreError> {
            let mut profiles = self.profiles.lock().unwrap();
            if let Some(profile) = profiles.get_mut(profile_id) {
                if let Some(display_name) = changes.display_name {
                    profile.display_name = Some(display_name);
                }
                if let Some(bio) = changes.bio {
                    profile.bio = Some(bio);
                }
                if let Some(price) = changes.subscription_price {
                    profile.subscription_price = price;
                }
                if changes.updated_at.is_some() {
                    profile.updated_at = changes.updated_at;
                }
            }
            Ok(())
        }

        async fn find_profile_id_by_owner(
            &self,
            owner_address: &str,
        ) -> Result<Option<String>, StoreError> {
            let profiles = self.profiles.lock().unwrap();
            Ok(profiles
                .values()
                .find(|p| p.owner_address == owner_address)
                .map(|p| p.id.clone()))
        }

        async fn insert_listing(&self, listing: NewListing) -> Result<(), StoreError> {
            let mut listings = self.listings.lock().unwrap();
            if listings.contains_key(&listing.id) {
                return Err(StoreError::Duplicate(listing.id));
            }
            listings.insert(listing.id.clone(), listing);
            Ok(())
        }

        async fn deactivate_listing(&self, listing_id: &str) -> Result<(), StoreError> {
            if let Some(listing) = self.listings.lock().unwrap().get_mut(listing_id) {
                listing.is_active = false;
            }
            Ok(())
        }

        async fn insert_subscription(
            &self,
            subscription: NewSubscription,
        ) -> Result<(), StoreError> {
            self.subscriptions.lock().unwrap().push(subscription);
            Ok(())
        }

        async fn insert_purchase(&self, purchase: NewPurchase) -> Result<(), StoreError> {
            self.purchases.lock().unwrap().push(purchase);
            Ok(())
        }

        async fn upsert_favorite(&self, favorite: NewFavorite) -> Result<(), StoreError> {
            self.favorites
                .lock()
                .unwrap()
                .insert((favorite.user_id, favorite.listing_id));
            Ok(())
        }

        async fn delete_favorite(
            &self,
            user_id: &str,
            listing_id: &str,
        ) -> Result<(), StoreError> {
            self.favorites
                .lock()
                .unwrap()
                .remove(&(user_id.to_string(), listing_id.to_string()));
            Ok(())
        }

        async fn increment_subscriber_count(&self, profile_id: &str) -> Result<(), StoreError> {
            if let Some(profile) = self.profiles.lock().unwrap().get_mut(profile_id) {
                profile.subscriber_count += 1;
            }
            Ok(())
        }

        async fn increment_subscription_count(&self, profile_id: &str) -> Result<(), StoreError> {
            if let Some(profile) = self.profiles.lock().unwrap().get_mut(profile_id) {
                profile.subscription_count += 1;
            }
            Ok(())
        }

        async fn increment_favorite_count(&self, listing_id: &str) -> Result<(), StoreError> {
            if let Some(listing) = self.listings.lock().unwrap().get_mut(listing_id) {
                listing.favorite_count += 1;
            }
            Ok(())
        }

        async fn decrement_favorite_count(&self, listing_id: &str) -> Result<(), StoreError> {
            if let Some(listing) = self.listings.lock().unwrap().get_mut(listing_id) {
                listing.favorite_count -= 1;
            }
            Ok(())
        }

        async fn load_checkpoint(&self) -> Result<Option<IndexerState>, StoreError> {
            Ok(self.checkpoint.lock().unwrap().clone())
        }

        async fn save_checkpoint(&self, token: &str) -> Result<(), StoreError> {
            *self.checkpoint.lock().unwrap() = Some(IndexerState {
                id: 1,
                last_checkpoint: token.to_string(),
                updated_at: Utc::now(),
            });
            Ok(())
        }
    }

    /// Source that replays a scripted sequence of pages, one per pass.
    struct ScriptedSource {
        pages: Mutex<VecDeque<Result<EventPage, SourceError>>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<EventPage, SourceError>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
            }
        }
    }

    #[async_trait]
    impl EventSource for ScriptedSource {
        async fn query_events(
            &self,
            _cursor: Option<EventId>,
            _limit: usize,
        ) -> Result<EventPage, SourceError> {
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(EventPage::default()))
        }
    }

    fn event(seq: u64, kind: &str, payload: serde_json::Value) -> ChainEvent {
        ChainEvent {
            id: EventId {
                tx_digest: format!("digest-{}", seq),
                event_seq: seq.to_string(),
            },
            event_type: format!("0xabc::DVB_TEAM::{}", kind),
            parsed_json: payload,
            timestamp_ms: Some(1_714_000_000_000 + seq),
            sender: None,
        }
    }

    fn page(events: Vec<ChainEvent>, has_next_page: bool) -> EventPage {
        let next_cursor = events.last().map(|e| e.id.clone());
        EventPage {
            data: events,
            next_cursor,
            has_next_page,
        }
    }

    fn worker_with(
        pages: Vec<Result<EventPage, SourceError>>,
    ) -> (IndexerWorker, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let worker = IndexerWorker::new(
            Arc::new(ScriptedSource::new(pages)),
            store.clone(),
            100,
        );
        (worker, store)
    }

    fn profile_created(seq: u64, profile_id: &str, owner: &str, price: u64) -> ChainEvent {
        event(
            seq,
            "ProfileCreated",
            json!({
                "profile_id": profile_id,
                "owner": owner,
                "subscription_price": price.to_string(),
            }),
        )
    }

    #[tokio::test]
    async fn unrecognized_event_types_are_ignored() {
        let (worker, store) = worker_with(vec![Ok(page(
            vec![
                profile_created(0, "0xp1", "0xa", 0),
                event(1, "StakeChanged", json!({ "pool": "0xdead" })),
            ],
            false,
        ))]);

        let summary = worker.run_sync_pass().await.unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.total, 2);
        assert!(!summary.has_more);
        assert_eq!(store.profiles.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn profile_redelivery_does_not_clobber_price_update() {
        let (worker, store) = worker_with(vec![
            Ok(page(
                vec![
                    profile_created(0, "0xp1", "0xa", 100),
                    event(
                        1,
                        "PriceUpdated",
                        json!({
                            "profile_id": "0xp1",
                            "old_price": "100",
                            "new_price": "250",
                        }),
                    ),
                ],
                false,
            )),
            // The cursor failed to advance and the create event is redelivered
            Ok(page(vec![profile_created(0, "0xp1", "0xa", 100)], false)),
        ]);

        worker.run_sync_pass().await.unwrap();
        worker.run_sync_pass().await.unwrap();

        let profiles = store.profiles.lock().unwrap();
        assert_eq!(profiles.get("0xp1").unwrap().subscription_price, 250);
    }

    #[tokio::test]
    async fn subscription_requires_both_profiles() {
        let (worker, store) = worker_with(vec![Ok(page(
            vec![event(
                0,
                "SubscriptionCompleted",
                json!({
                    "creator": "0xa",
                    "subscriber": "0xb",
                    "price_paid": "1000000000",
                }),
            )],
            false,
        ))]);

        let summary = worker.run_sync_pass().await.unwrap();

        // The handler completes by skipping; the event still counts as processed
        assert_eq!(summary.processed, 1);
        assert!(store.subscriptions.lock().unwrap().is_empty());
        assert!(store.profiles.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn subscription_links_profiles_and_bumps_counters() {
        let (worker, store) = worker_with(vec![Ok(page(
            vec![
                profile_created(0, "0xp1", "0xa", 500),
                profile_created(1, "0xp2", "0xb", 0),
                event(
                    2,
                    "SubscriptionCompleted",
                    json!({
                        "creator": "0xa",
                        "subscriber": "0xb",
                        "price_paid": "500",
                    }),
                ),
            ],
            false,
        ))]);

        let summary = worker.run_sync_pass().await.unwrap();
        assert_eq!(summary.processed, 3);

        let subscriptions = store.subscriptions.lock().unwrap();
        assert_eq!(subscriptions.len(), 1);
        assert_eq!(subscriptions[0].creator_id, "0xp1");
        assert_eq!(subscriptions[0].subscriber_id, "0xp2");
        assert_eq!(subscriptions[0].amount_paid, 500);
        assert_eq!(subscriptions[0].tx_digest, "digest-2");

        let profiles = store.profiles.lock().unwrap();
        assert_eq!(profiles.get("0xp1").unwrap().subscriber_count, 1);
        assert_eq!(profiles.get("0xp2").unwrap().subscription_count, 1);
    }

    #[tokio::test]
    async fn purchase_deactivates_listing_and_records_one_fact() {
        let (worker, store) = worker_with(vec![Ok(page(
            vec![
                profile_created(0, "0xp1", "0xa", 0),
                profile_created(1, "0xp2", "0xb", 0),
                event(
                    2,
                    "NftListed",
                    json!({
                        "listing_id": "0xl1",
                        "seller": "0xa",
                        "price": "1000000000",
                        "nft_id": "0xn1",
                    }),
                ),
                event(
                    3,
                    "NftPurchased",
                    json!({
                        "listing_id": "0xl1",
                        "buyer": "0xb",
                        "seller": "0xa",
                        "price": "1000000000",
                    }),
                ),
            ],
            false,
        ))]);

        let summary = worker.run_sync_pass().await.unwrap();

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.total, 4);

        let listings = store.listings.lock().unwrap();
        let listing = listings.get("0xl1").unwrap();
        assert!(!listing.is_active);
        assert_eq!(listing.seller_id, "0xp1");

        let purchases = store.purchases.lock().unwrap();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].listing_id, "0xl1");
        assert_eq!(purchases[0].buyer_id, "0xp2");
        assert_eq!(purchases[0].seller_id, "0xp1");
        assert_eq!(purchases[0].price, 1_000_000_000);
        assert_eq!(purchases[0].tx_digest, "digest-3");
    }

    // Documents the known at-least-once gap: the membership row is
    // idempotent but the counter delta is not.
    #[tokio::test]
    async fn favorite_redelivery_double_counts_the_counter() {
        let favorited = event(
            2,
            "ListingFavorited",
            json!({ "listing_id": "0xl1", "user": "0xb" }),
        );

        let (worker, store) = worker_with(vec![
            Ok(page(
                vec![
                    profile_created(0, "0xp1", "0xa", 0),
                    profile_created(1, "0xp2", "0xb", 0),
                    event(
                        2,
                        "NftListed",
                        json!({
                            "listing_id": "0xl1",
                            "seller": "0xa",
                            "price": "7",
                            "nft_id": "0xn1",
                        }),
                    ),
                    favorited.clone(),
                ],
                false,
            )),
            // Same favorite event again, as if the cursor never advanced
            Ok(page(vec![favorited], false)),
        ]);

        worker.run_sync_pass().await.unwrap();
        worker.run_sync_pass().await.unwrap();

        assert_eq!(store.favorites.lock().unwrap().len(), 1);
        assert_eq!(
            store
                .listings
                .lock()
                .unwrap()
                .get("0xl1")
                .unwrap()
                .favorite_count,
            2
        );
    }

    #[tokio::test]
    async fn unfavorite_removes_membership_and_decrements() {
        let (worker, store) = worker_with(vec![Ok(page(
            vec![
                profile_created(0, "0xp1", "0xa", 0),
                profile_created(1, "0xp2", "0xb", 0),
                event(
                    2,
                    "NftListed",
                    json!({
                        "listing_id": "0xl1",
                        "seller": "0xa",
                        "price": "7",
                        "nft_id": "0xn1",
                    }),
                ),
                event(
                    3,
                    "ListingFavorited",
                    json!({ "listing_id": "0xl1", "user": "0xb" }),
                ),
                event(
                    4,
                    "ListingUnfavorited",
                    json!({ "listing_id": "0xl1", "user": "0xb" }),
                ),
            ],
            false,
        ))]);

        worker.run_sync_pass().await.unwrap();

        assert!(store.favorites.lock().unwrap().is_empty());
        assert_eq!(
            store
                .listings
                .lock()
                .unwrap()
                .get("0xl1")
                .unwrap()
                .favorite_count,
            0
        );
    }

    #[tokio::test]
    async fn empty_batch_leaves_checkpoint_untouched() {
        let (worker, store) = worker_with(vec![Ok(EventPage::default())]);

        let summary = worker.run_sync_pass().await.unwrap();

        assert_eq!(summary.processed, 0);
        assert_eq!(summary.total, 0);
        assert!(!summary.has_more);
        assert!(store.checkpoint.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn checkpoint_advances_past_a_failing_event() {
        let (worker, store) = worker_with(vec![Ok(page(
            vec![
                // Missing listing_id: the payload fails to parse
                event(0, "NftListed", json!({ "seller": "0xa" })),
                profile_created(1, "0xp1", "0xa", 0),
            ],
            true,
        ))]);

        let summary = worker.run_sync_pass().await.unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.total, 2);
        assert!(summary.has_more);

        let checkpoint = store.checkpoint.lock().unwrap();
        let token = &checkpoint.as_ref().unwrap().last_checkpoint;
        let cursor: EventId = serde_json::from_str(token).unwrap();
        assert_eq!(cursor.tx_digest, "digest-1");
    }

    #[tokio::test]
    async fn duplicate_listing_insert_is_a_per_event_error() {
        let listed = event(
            1,
            "NftListed",
            json!({
                "listing_id": "0xl1",
                "seller": "0xa",
                "price": "7",
                "nft_id": "0xn1",
            }),
        );

        let (worker, store) = worker_with(vec![Ok(page(
            vec![profile_created(0, "0xp1", "0xa", 0), listed.clone(), listed],
            false,
        ))]);

        let summary = worker.run_sync_pass().await.unwrap();

        // The duplicate is dropped, the rest of the batch still lands
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.total, 3);
        assert_eq!(store.listings.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn source_failure_aborts_the_pass() {
        let (worker, store) = worker_with(vec![Err(SourceError::Rpc(
            jsonrpsee::core::Error::Custom("connection refused".to_string()),
        ))]);

        let result = worker.run_sync_pass().await;

        assert!(matches!(result, Err(SyncError::Source(_))));
        assert!(store.checkpoint.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn end_to_end_pass_matches_expected_read_model() {
        let (worker, store) = worker_with(vec![Ok(page(
            vec![
                profile_created(0, "P1", "0xA", 0),
                profile_created(1, "P2", "0xB", 0),
                event(
                    2,
                    "NftListed",
                    json!({
                        "listing_id": "L1",
                        "seller": "0xA",
                        "price": "1000000000",
                        "nft_id": "0xn1",
                    }),
                ),
                event(
                    3,
                    "NftPurchased",
                    json!({
                        "listing_id": "L1",
                        "buyer": "0xB",
                        "seller": "0xA",
                        "price": "1000000000",
                    }),
                ),
            ],
            false,
        ))]);

        let summary = worker.run_sync_pass().await.unwrap();

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.total, 4);

        let profiles = store.profiles.lock().unwrap();
        assert!(profiles.contains_key("P1"));
        assert!(profiles.contains_key("P2"));

        let listings = store.listings.lock().unwrap();
        assert!(!listings.get("L1").unwrap().is_active);

        let purchases = store.purchases.lock().unwrap();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].listing_id, "L1");
        assert_eq!(purchases[0].buyer_id, "P2");
        assert_eq!(purchases[0].seller_id, "P1");
        assert_eq!(purchases[0].price, 1_000_000_000);
    }
}
