//! Seismic activity summary derived from the USGS all-events feed

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::earthquakes::Earthquake;
use super::{usgs, Source, SourceError};

/// Default feed: all events over the past day
pub const DEFAULT_SEISMIC_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson";

/// Events at or above this magnitude count as significant
const SIGNIFICANT_MAGNITUDE: f64 = 4.5;

/// Event counts per magnitude band
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagnitudeBands {
    /// Below 4.0
    pub minor: u32,
    /// 4.0 to 4.9
    pub light: u32,
    /// 5.0 to 5.9
    pub moderate: u32,
    /// 6.0 to 6.9
    pub strong: u32,
    /// 7.0 and above
    pub major: u32,
}

impl MagnitudeBands {
    fn record(&mut self, magnitude: f64) {
        let band = match magnitude {
            m if m < 4.0 => &mut self.minor,
            m if m < 5.0 => &mut self.light,
            m if m < 6.0 => &mut self.moderate,
            m if m < 7.0 => &mut self.strong,
            _ => &mut self.major,
        };
        *band += 1;
    }
}

/// Payload of the seismic route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicSummary {
    /// All events in the feed, with or without a magnitude
    pub total: u32,
    /// Events of magnitude 4.5 or more
    pub significant: u32,
    pub bands: MagnitudeBands,
    /// Strongest event, if any event has a magnitude
    pub largest: Option<Earthquake>,
}

impl SeismicSummary {
    /// Summarizes a list of events
    pub fn from_events(events: Vec<Earthquake>) -> Self {
        let mut bands = MagnitudeBands::default();
        let mut significant = 0;
        let total = events.len() as u32;
        let mut largest: Option<Earthquake> = None;

        for event in events {
            let Some(magnitude) = event.magnitude else {
                continue;
            };
            bands.record(magnitude);
            if magnitude >= SIGNIFICANT_MAGNITUDE {
                significant += 1;
            }
            let is_larger = largest
                .as_ref()
                .and_then(|l| l.magnitude)
                .map_or(true, |current| magnitude > current);
            if is_larger {
                largest = Some(event);
            }
        }

        Self {
            total,
            significant,
            bands,
            largest,
        }
    }
}

/// Fetches the all-events feed and summarizes it
#[derive(Debug, Clone)]
pub struct SeismicSource {
    client: Client,
    url: String,
}

impl SeismicSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn fetch_summary(&self) -> Result<SeismicSummary, SourceError> {
        let events = usgs::fetch_feed(&self.client, &self.url).await?;
        Ok(SeismicSummary::from_events(events))
    }
}

impl Source for SeismicSource {
    type Payload = SeismicSummary;

    fn name(&self) -> &'static str {
        "seismic"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<SeismicSummary, SourceError>> {
        Box::pin(self.fetch_summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::usgs::{parse_feed, tests::SAMPLE_FEED};
    use chrono::Utc;

    fn quake(id: &str, magnitude: Option<f64>) -> Earthquake {
        Earthquake {
            id: id.to_string(),
            magnitude,
            place: String::new(),
            time: Utc::now(),
            latitude: 0.0,
            longitude: 0.0,
            depth_km: 10.0,
            url: None,
            tsunami: false,
        }
    }

    #[test]
    fn test_summary_from_sample_feed() {
        let summary = SeismicSummary::from_events(parse_feed(SAMPLE_FEED).unwrap());

        assert_eq!(summary.total, 3);
        assert_eq!(summary.significant, 1);
        assert_eq!(summary.bands.minor, 1);
        assert_eq!(summary.bands.moderate, 1);
        assert_eq!(summary.largest.map(|e| e.id), Some("us7000abcd".to_string()));
    }

    #[test]
    fn test_band_boundaries() {
        let events = vec![
            quake("a", Some(3.99)),
            quake("b", Some(4.0)),
            quake("c", Some(4.5)),
            quake("d", Some(5.0)),
            quake("e", Some(6.0)),
            quake("f", Some(6.99)),
            quake("g", Some(7.0)),
        ];

        let summary = SeismicSummary::from_events(events);

        assert_eq!(
            summary.bands,
            MagnitudeBands {
                minor: 1,
                light: 2,
                moderate: 1,
                strong: 2,
                major: 1,
            }
        );
        assert_eq!(summary.significant, 5);
        assert_eq!(summary.largest.unwrap().id, "g");
    }

    #[test]
    fn test_events_without_magnitude_only_count_toward_total() {
        let summary = SeismicSummary::from_events(vec![quake("x", None), quake("y", None)]);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.significant, 0);
        assert_eq!(summary.bands, MagnitudeBands::default());
        assert!(summary.largest.is_none());
    }

    #[test]
    fn test_first_of_equal_magnitudes_is_largest() {
        let summary =
            SeismicSummary::from_events(vec![quake("first", Some(5.5)), quake("second", Some(5.5))]);
        assert_eq!(summary.largest.unwrap().id, "first");
    }
}
