// Copyright (c) DVB Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;

use crate::db::DbPool;
use crate::models::Listing;
use crate::schema::nft_listings;

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Get listings, newest first, optionally filtered to active ones
pub async fn get_listings(
    State(db_pool): State<DbPool>,
    Query(query): Query<ListingQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let mut conn = match db_pool.get().await {
        Ok(conn) => conn,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Database error: {}", e)
                })),
            )
        }
    };

    let mut listings_query = nft_listings::table.into_boxed();
    if let Some(active) = query.active {
        listings_query = listings_query.filter(nft_listings::is_active.eq(active));
    }

    let listings_result = listings_query
        .order(nft_listings::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load::<Listing>(&mut conn)
        .await;

    match listings_result {
        Ok(listings) => (
            StatusCode::OK,
            Json(serde_json::to_value(listings).unwrap_or_default()),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": format!("Failed to fetch listings: {}", e)
            })),
        ),
    }
}

/// Get a listing by its on-chain id
pub async fn get_listing(
    State(db_pool): State<DbPool>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut conn = match db_pool.get().await {
        Ok(conn) => conn,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Database error: {}", e)
                })),
            )
        }
    };

    let listing_result = nft_listings::table
        .find(id)
        .first::<Listing>(&mut conn)
        .await;

    match listing_result {
        Ok(listing) => (
            StatusCode::OK,
            Json(serde_json::to_value(listing).unwrap_or_default()),
        ),
        Err(diesel::result::Error::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "Listing not found"
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": format!("Failed to fetch listing: {}", e)
            })),
        ),
    }
}
