// Copyright (c) DVB Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::user_profiles;

/// A marketplace participant, created by a `ProfileCreated` event.
///
/// The row is keyed by the on-chain profile object id; the owner address is a
/// unique secondary key used to resolve addresses carried by fact events.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = user_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Profile {
    pub id: String,
    pub owner_address: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub subscription_price: i64,
    pub subscriber_count: i32,
    pub subscription_count: i32,
    pub listing_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = user_profiles)]
pub struct NewProfile {
    pub id: String,
    pub owner_address: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub subscription_price: i64,
    #[serde(default)]
    pub subscriber_count: i32,
    #[serde(default)]
    pub subscription_count: i32,
    #[serde(default)]
    pub listing_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = user_profiles)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub subscription_price: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
}
