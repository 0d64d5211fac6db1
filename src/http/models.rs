//! HTTP API response models

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::cache::{Cached, SlotStatus};

/// Body of a data route: the payload's own fields plus freshness metadata
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CachedResponse<P> {
    #[serde(flatten)]
    pub payload: P,
    /// Time of the last successful fetch, not of this response
    #[serde(serialize_with = "iso_millis")]
    pub last_updated: DateTime<Utc>,
    /// Only present (as `true`) when a refresh failed and old data is served
    #[serde(skip_serializing_if = "is_false")]
    pub stale: bool,
}

impl<P> From<Cached<P>> for CachedResponse<P> {
    fn from(cached: Cached<P>) -> Self {
        Self {
            payload: cached.payload,
            last_updated: cached.fetched_at,
            stale: cached.stale,
        }
    }
}

/// Per-route cache state reported by `/api/status`
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteStatus {
    pub populated: bool,
    pub last_updated: Option<String>,
    pub stale: bool,
    pub ttl_seconds: i64,
    pub revalidate_seconds: Option<u64>,
}

impl RouteStatus {
    pub fn new(status: SlotStatus, ttl_seconds: i64, revalidate_seconds: Option<u64>) -> Self {
        Self {
            populated: status.fetched_at.is_some(),
            last_updated: status.fetched_at.map(to_iso_millis),
            stale: status.stale,
            ttl_seconds,
            revalidate_seconds,
        }
    }
}

/// Body of `/api/status`, keyed by route name
pub type StatusResponse = BTreeMap<&'static str, RouteStatus>;

/// Formats like JavaScript's `Date.toISOString()`, e.g. `2024-07-15T12:00:00.000Z`
pub fn to_iso_millis(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn iso_millis<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_iso_millis(*time))
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize, Debug, Clone)]
    struct Count {
        count: u32,
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-07-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_fresh_response_omits_stale() {
        let response = CachedResponse::from(Cached {
            payload: Count { count: 5 },
            fetched_at: t0(),
            stale: false,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            json!({"count": 5, "lastUpdated": "2024-07-15T12:00:00.000Z"})
        );
    }

    #[test]
    fn test_stale_response_is_payload_plus_marker() {
        let response = CachedResponse::from(Cached {
            payload: Count { count: 5 },
            fetched_at: t0(),
            stale: true,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            json!({"count": 5, "stale": true, "lastUpdated": "2024-07-15T12:00:00.000Z"})
        );
    }

    #[test]
    fn test_route_status_for_empty_slot() {
        let status = RouteStatus::new(
            SlotStatus {
                fetched_at: None,
                stale: true,
            },
            60,
            None,
        );

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["populated"], false);
        assert_eq!(json["lastUpdated"], serde_json::Value::Null);
        assert_eq!(json["ttlSeconds"], 60);
    }
}
