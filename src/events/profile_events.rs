use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::profile::{NewProfile, UpdateProfile};

/// Event emitted when a new profile is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCreatedEvent {
    pub profile_id: String,
    pub owner: String,
    #[serde(default, deserialize_with = "crate::events::move_u64")]
    pub subscription_price: u64,
}

impl ProfileCreatedEvent {
    /// Convert the event into a NewProfile model
    pub fn into_model(&self, created_at: DateTime<Utc>) -> NewProfile {
        NewProfile {
            id: self.profile_id.clone(),
            owner_address: self.owner.clone(),
            display_name: None,
            bio: None,
            subscription_price: self.subscription_price as i64,
            subscriber_count: 0,
            subscription_count: 0,
            listing_count: 0,
            created_at,
            updated_at: None,
        }
    }
}

/// Event emitted when a creator changes their subscription price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdatedEvent {
    pub profile_id: String,
    #[serde(default, deserialize_with = "crate::events::move_u64")]
    pub old_price: u64,
    #[serde(deserialize_with = "crate::events::move_u64")]
    pub new_price: u64,
}

/// Event emitted when a profile's display fields change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdatedEvent {
    pub profile_id: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

impl ProfileUpdatedEvent {
    pub fn into_changes(&self, updated_at: DateTime<Utc>) -> UpdateProfile {
        UpdateProfile {
            display_name: self.display_name.clone(),
            bio: self.bio.clone(),
            subscription_price: None,
            updated_at: Some(updated_at),
        }
    }
}
