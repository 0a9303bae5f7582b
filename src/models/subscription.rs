use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::subscriptions;

/// Append-only fact linking a subscriber profile to a creator profile.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Subscription {
    pub id: i32,
    pub subscriber_id: String,
    pub creator_id: String,
    pub amount_paid: i64,
    pub tx_digest: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = subscriptions)]
pub struct NewSubscription {
    pub subscriber_id: String,
    pub creator_id: String,
    pub amount_paid: i64,
    pub tx_digest: String,
    pub timestamp: DateTime<Utc>,
}
