//! Recent earthquakes from the USGS summary feed

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{usgs, Source, SourceError};

/// Default feed: magnitude 2.5+ over the past day
pub const DEFAULT_EARTHQUAKES_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_day.geojson";

/// A single earthquake event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Earthquake {
    /// USGS event identifier
    pub id: String,
    /// Magnitude, if one has been assigned
    pub magnitude: Option<f64>,
    /// Human-readable location description
    pub place: String,
    /// Origin time
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Hypocenter depth in kilometers
    pub depth_km: f64,
    /// USGS event page
    pub url: Option<String>,
    /// Whether a tsunami flag was raised for the event
    pub tsunami: bool,
}

/// Payload of the earthquakes route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthquakeFeed {
    /// Events, newest first
    pub earthquakes: Vec<Earthquake>,
    pub count: usize,
}

impl EarthquakeFeed {
    /// Builds a feed from events in any order
    pub fn from_events(mut earthquakes: Vec<Earthquake>) -> Self {
        earthquakes.sort_by(|a, b| b.time.cmp(&a.time));
        Self {
            count: earthquakes.len(),
            earthquakes,
        }
    }
}

/// Fetches recent earthquakes from a USGS GeoJSON feed
#[derive(Debug, Clone)]
pub struct EarthquakeSource {
    client: Client,
    url: String,
}

impl EarthquakeSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn fetch_feed(&self) -> Result<EarthquakeFeed, SourceError> {
        let events = usgs::fetch_feed(&self.client, &self.url).await?;
        Ok(EarthquakeFeed::from_events(events))
    }
}

impl Source for EarthquakeSource {
    type Payload = EarthquakeFeed;

    fn name(&self) -> &'static str {
        "earthquakes"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<EarthquakeFeed, SourceError>> {
        Box::pin(self.fetch_feed())
    }
}
