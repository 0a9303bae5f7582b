use serde::{Deserialize, Serialize};

/// Event emitted when a subscriber pays for a creator subscription.
///
/// The payload carries owner addresses; the handler resolves them to profile
/// rows before writing the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionCompletedEvent {
    pub creator: String,
    pub subscriber: String,
    #[serde(deserialize_with = "crate::events::move_u64")]
    pub price_paid: u64,
}
