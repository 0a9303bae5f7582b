// Copyright (c) DVB Team
// SPDX-License-Identifier: Apache-2.0

pub mod listing_events;
pub mod profile_events;
pub mod subscription_events;

pub use listing_events::{
    ListingFavoritedEvent, ListingUnfavoritedEvent, NftListedEvent, NftPurchasedEvent,
};
pub use profile_events::{PriceUpdatedEvent, ProfileCreatedEvent, ProfileUpdatedEvent};
pub use subscription_events::SubscriptionCompletedEvent;

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Deserializer;
use serde_json::Value;

/// Parse a typed event from the payload map attached to a chain event.
///
/// Payloads normally deserialize directly; some node versions wrap Move event
/// fields in a `fields` object, so that nesting is tried as a fallback.
pub fn parse_event<T: DeserializeOwned>(payload: &Value) -> Result<T> {
    match serde_json::from_value(payload.clone()) {
        Ok(event) => Ok(event),
        Err(err) => {
            if let Some(fields) = payload.get("fields") {
                if let Ok(event) = serde_json::from_value(fields.clone()) {
                    return Ok(event);
                }
            }
            Err(anyhow!("failed to parse event payload: {}", err))
        }
    }
}

/// Deserialize a Move u64, which fullnodes encode as a JSON string.
pub(crate) fn move_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde::Deserialize;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().ok_or_else(|| D::Error::custom("not a u64")),
        Value::String(s) => s.parse().map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("unexpected u64 value: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_u64_fields_from_strings_and_numbers() {
        let from_string: ProfileCreatedEvent = parse_event(&json!({
            "profile_id": "0xp1",
            "owner": "0xa11ce",
            "subscription_price": "2000000000"
        }))
        .unwrap();
        assert_eq!(from_string.subscription_price, 2_000_000_000);

        let from_number: ProfileCreatedEvent = parse_event(&json!({
            "profile_id": "0xp1",
            "owner": "0xa11ce",
            "subscription_price": 5
        }))
        .unwrap();
        assert_eq!(from_number.subscription_price, 5);
    }

    #[test]
    fn missing_subscription_price_defaults_to_zero() {
        let event: ProfileCreatedEvent = parse_event(&json!({
            "profile_id": "0xp1",
            "owner": "0xa11ce"
        }))
        .unwrap();
        assert_eq!(event.subscription_price, 0);
    }

    #[test]
    fn unwraps_move_fields_nesting() {
        let event: NftListedEvent = parse_event(&json!({
            "fields": {
                "listing_id": "0xl1",
                "seller": "0xa11ce",
                "price": "1000000000",
                "nft_id": "0xn1"
            }
        }))
        .unwrap();
        assert_eq!(event.listing_id, "0xl1");
        assert_eq!(event.price, 1_000_000_000);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let result: Result<NftPurchasedEvent> = parse_event(&json!({ "buyer": "0xb0b" }));
        assert!(result.is_err());
    }
}
