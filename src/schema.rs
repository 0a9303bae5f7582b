// Copyright (c) DVB Team
// SPDX-License-Identifier: Apache-2.0

// Import diesel table macros
use diesel::{allow_tables_to_appear_in_same_query, joinable, table};

// Marketplace participant profiles, keyed by the on-chain profile object id
table! {
    user_profiles (id) {
        id -> Varchar,
        owner_address -> Varchar,
        display_name -> Nullable<Varchar>,
        bio -> Nullable<Text>,
        subscription_price -> Int8,
        subscriber_count -> Int4,
        subscription_count -> Int4,
        listing_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
    }
}

// NFT listings, keyed by the on-chain listing object id
table! {
    nft_listings (id) {
        id -> Varchar,
        seller_id -> Varchar,
        nft_type -> Varchar,
        price -> Int8,
        is_active -> Bool,
        favorite_count -> Int4,
        created_at -> Timestamptz,
    }
}

// Append-only subscription facts
table! {
    subscriptions (id) {
        id -> Int4,
        subscriber_id -> Varchar,
        creator_id -> Varchar,
        amount_paid -> Int8,
        tx_digest -> Varchar,
        timestamp -> Timestamptz,
    }
}

// Append-only purchase facts
table! {
    nft_purchases (id) {
        id -> Int4,
        listing_id -> Varchar,
        buyer_id -> Varchar,
        seller_id -> Varchar,
        price -> Int8,
        tx_digest -> Varchar,
        timestamp -> Timestamptz,
    }
}

// Favorite membership facts
table! {
    favorites (user_id, listing_id) {
        user_id -> Varchar,
        listing_id -> Varchar,
        created_at -> Timestamptz,
    }
}

// Singleton resume-position row for the event synchronizer
table! {
    indexer_state (id) {
        id -> Int4,
        last_checkpoint -> Text,
        updated_at -> Timestamptz,
    }
}

joinable!(nft_listings -> user_profiles (seller_id));
joinable!(favorites -> nft_listings (listing_id));
joinable!(nft_purchases -> nft_listings (listing_id));

allow_tables_to_appear_in_same_query!(
    user_profiles,
    nft_listings,
    subscriptions,
    nft_purchases,
    favorites,
    indexer_state,
);
