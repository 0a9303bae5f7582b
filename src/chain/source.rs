// Copyright (c) DVB Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::config::ChainConfig;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("event query failed: {0}")]
    Rpc(#[from] jsonrpsee::core::Error),
}

/// Position of an event in the chain's event log. Doubles as the resume
/// cursor accepted and returned by the event query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    pub tx_digest: String,
    pub event_seq: String,
}

/// A single event as emitted by the tracked contract module.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEvent {
    pub id: EventId,
    /// Fully-qualified dotted Move type, e.g. `0xabc::DVB_TEAM::NftListed`
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub parsed_json: serde_json::Value,
    #[serde(default, deserialize_with = "deserialize_timestamp_ms")]
    pub timestamp_ms: Option<u64>,
    #[serde(default)]
    pub sender: Option<String>,
}

impl ChainEvent {
    /// Trailing segment of the event type string, used for dispatch.
    pub fn kind(&self) -> &str {
        self.event_type
            .rsplit("::")
            .next()
            .unwrap_or(&self.event_type)
    }

    /// Emission timestamp, falling back to the current time when the node
    /// did not report one.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp_ms
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64))
            .unwrap_or_else(Utc::now)
    }
}

/// One page of ascending-ordered events plus the continuation token.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    pub data: Vec<ChainEvent>,
    pub next_cursor: Option<EventId>,
    pub has_next_page: bool,
}

/// Server-side event filter understood by `suix_queryEvents`.
#[derive(Debug, Clone, Serialize)]
pub enum EventFilter {
    MoveEventModule { package: String, module: String },
}

/// Pull-based source of ordered contract events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the next page of events strictly after `cursor`, ascending,
    /// capped at `limit` entries.
    async fn query_events(
        &self,
        cursor: Option<EventId>,
        limit: usize,
    ) -> Result<EventPage, SourceError>;
}

/// Event source backed by a Sui fullnode JSON-RPC endpoint.
pub struct RpcEventSource {
    client: HttpClient,
    filter: EventFilter,
}

impl RpcEventSource {
    pub fn new(config: &ChainConfig) -> Result<Self, SourceError> {
        let client = HttpClientBuilder::default().build(&config.rpc_url)?;

        Ok(Self {
            client,
            filter: EventFilter::MoveEventModule {
                package: config.package_id.clone(),
                module: config.module_name.clone(),
            },
        })
    }
}

#[async_trait]
impl EventSource for RpcEventSource {
    async fn query_events(
        &self,
        cursor: Option<EventId>,
        limit: usize,
    ) -> Result<EventPage, SourceError> {
        // Final `false` requests ascending order
        let page = self
            .client
            .request(
                "suix_queryEvents",
                rpc_params![&self.filter, &cursor, limit, false],
            )
            .await?;

        Ok(page)
    }
}

// Fullnodes encode u64 timestamps as JSON strings
fn deserialize_timestamp_ms<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| D::Error::custom("timestamp is not a u64")),
        Some(serde_json::Value::String(s)) => {
            s.parse().map(Some).map_err(D::Error::custom)
        }
        Some(other) => Err(D::Error::custom(format!(
            "unexpected timestamp value: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_page_deserializes_from_fullnode_response() {
        let raw = json!({
            "data": [
                {
                    "id": { "txDigest": "9vXJ3kDq", "eventSeq": "0" },
                    "packageId": "0xabc",
                    "transactionModule": "DVB_TEAM",
                    "sender": "0xa11ce",
                    "type": "0xabc::DVB_TEAM::ProfileCreated",
                    "parsedJson": {
                        "profile_id": "0xp1",
                        "owner": "0xa11ce",
                        "subscription_price": "1000000000"
                    },
                    "bcs": "AAA=",
                    "timestampMs": "1714000000000"
                }
            ],
            "nextCursor": { "txDigest": "9vXJ3kDq", "eventSeq": "0" },
            "hasNextPage": false
        });

        let page: EventPage = serde_json::from_value(raw).unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(!page.has_next_page);

        let event = &page.data[0];
        assert_eq!(event.kind(), "ProfileCreated");
        assert_eq!(event.timestamp_ms, Some(1_714_000_000_000));
        assert_eq!(event.sender.as_deref(), Some("0xa11ce"));
        assert_eq!(
            page.next_cursor,
            Some(EventId {
                tx_digest: "9vXJ3kDq".to_string(),
                event_seq: "0".to_string(),
            })
        );
    }

    #[test]
    fn event_filter_serializes_to_rpc_shape() {
        let filter = EventFilter::MoveEventModule {
            package: "0xabc".to_string(),
            module: "DVB_TEAM".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "MoveEventModule": { "package": "0xabc", "module": "DVB_TEAM" } })
        );
    }

    #[test]
    fn kind_falls_back_to_whole_type_without_separator() {
        let event = ChainEvent {
            id: EventId {
                tx_digest: "d".to_string(),
                event_seq: "0".to_string(),
            },
            event_type: "Malformed".to_string(),
            parsed_json: json!({}),
            timestamp_ms: None,
            sender: None,
        };

        assert_eq!(event.kind(), "Malformed");
    }
}
