//! USGS earthquake GeoJSON feed decoding
//!
//! Both the earthquake list and the seismic summary are built from USGS
//! summary feeds (https://earthquake.usgs.gov/earthquakes/feed/v1.0/geojson.php).

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::earthquakes::Earthquake;
use super::{get_text, SourceError};

/// Top-level GeoJSON document
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

/// A single event in the feed
#[derive(Debug, Deserialize)]
struct Feature {
    id: Option<String>,
    properties: Properties,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    mag: Option<f64>,
    place: Option<String>,
    /// Origin time in milliseconds since the epoch
    time: Option<i64>,
    url: Option<String>,
    #[serde(default)]
    tsunami: Option<u8>,
}

/// GeoJSON point: `[longitude, latitude, depth_km]`
#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

/// Fetches and decodes a USGS summary feed
pub(crate) async fn fetch_feed(client: &Client, url: &str) -> Result<Vec<Earthquake>, SourceError> {
    let text = get_text(client, url).await?;
    parse_feed(&text)
}

/// Decodes a USGS summary feed body into earthquakes, in feed order
pub(crate) fn parse_feed(text: &str) -> Result<Vec<Earthquake>, SourceError> {
    let collection: FeatureCollection = serde_json::from_str(text).map_err(|err| {
        if err.is_data() {
            SourceError::Malformed(format!("not a GeoJSON feature collection: {}", err))
        } else {
            SourceError::Parse(err)
        }
    })?;
    collection
        .features
        .into_iter()
        .map(feature_to_earthquake)
        .collect()
}

fn feature_to_earthquake(feature: Feature) -> Result<Earthquake, SourceError> {
    let id = feature
        .id
        .ok_or_else(|| SourceError::Malformed("feature without id".to_string()))?;

    let millis = feature
        .properties
        .time
        .ok_or_else(|| SourceError::Malformed(format!("feature {} has no time", id)))?;
    let time = DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| SourceError::Malformed(format!("feature {} has invalid time", id)))?;

    let coordinates = feature.geometry.map(|g| g.coordinates).unwrap_or_default();
    let (longitude, latitude, depth_km) = match coordinates.as_slice() {
        [lon, lat, depth, ..] => (*lon, *lat, *depth),
        _ => {
            return Err(SourceError::Malformed(format!(
                "feature {} has invalid coordinates",
                id
            )))
        }
    };

    Ok(Earthquake {
        id,
        magnitude: feature.properties.mag,
        place: feature.properties.place.unwrap_or_default(),
        time,
        latitude,
        longitude,
        depth_km,
        url: feature.properties.url,
        tsunami: feature.properties.tsunami == Some(1),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Trimmed USGS feed with three events
    pub(crate) const SAMPLE_FEED: &str = r#"{
        "type": "FeatureCollection",
        "metadata": {
            "generated": 1721052000000,
            "url": "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson",
            "title": "USGS All Earthquakes, Past Day",
            "status": 200,
            "api": "1.10.3",
            "count": 3
        },
        "features": [
            {
                "type": "Feature",
                "properties": {
                    "mag": 5.3,
                    "place": "120 km SSE of Sand Point, Alaska",
                    "time": 1721050000000,
                    "url": "https://earthquake.usgs.gov/earthquakes/eventpage/us7000abcd",
                    "tsunami": 1
                },
                "geometry": { "type": "Point", "coordinates": [-159.9, 54.3, 35.2] },
                "id": "us7000abcd"
            },
            {
                "type": "Feature",
                "properties": {
                    "mag": 1.2,
                    "place": "8 km NW of The Geysers, CA",
                    "time": 1721040000000,
                    "url": "https://earthquake.usgs.gov/earthquakes/eventpage/nc7500",
                    "tsunami": 0
                },
                "geometry": { "type": "Point", "coordinates": [-122.8, 38.8, 2.1] },
                "id": "nc7500"
            },
            {
                "type": "Feature",
                "properties": {
                    "mag": null,
                    "place": null,
                    "time": 1721030000000,
                    "url": null,
                    "tsunami": 0
                },
                "geometry": { "type": "Point", "coordinates": [-150.1, 61.2, 40.0] },
                "id": "ak0241"
            }
        ]
    }"#;

    #[test]
    fn test_parse_feed_extracts_events() {
        let quakes = parse_feed(SAMPLE_FEED).expect("Failed to parse feed");

        assert_eq!(quakes.len(), 3);
        let first = &quakes[0];
        assert_eq!(first.id, "us7000abcd");
        assert_eq!(first.magnitude, Some(5.3));
        assert_eq!(first.place, "120 km SSE of Sand Point, Alaska");
        assert_eq!(first.time.timestamp_millis(), 1721050000000);
        assert!((first.latitude - 54.3).abs() < 0.0001);
        assert!((first.longitude - (-159.9)).abs() < 0.0001);
        assert!((first.depth_km - 35.2).abs() < 0.0001);
        assert!(first.tsunami);
    }

    #[test]
    fn test_parse_feed_tolerates_null_magnitude_and_place() {
        let quakes = parse_feed(SAMPLE_FEED).expect("Failed to parse feed");

        let last = &quakes[2];
        assert_eq!(last.magnitude, None);
        assert_eq!(last.place, "");
        assert!(last.url.is_none());
        assert!(!last.tsunami);
    }

    #[test]
    fn test_parse_feed_rejects_non_geojson() {
        let result = parse_feed(r#"{"error": "rate limited"}"#);
        assert!(matches!(result, Err(SourceError::Malformed(_))));

        let result = parse_feed(r#"{"features": "none"}"#);
        assert!(matches!(result, Err(SourceError::Malformed(_))));
    }

    #[test]
    fn test_parse_feed_rejects_non_json() {
        let result = parse_feed("<html>Service Unavailable</html>");
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_parse_feed_rejects_missing_coordinates() {
        let body = r#"{"features": [{
            "id": "x1",
            "properties": {"mag": 3.0, "place": "somewhere", "time": 1721030000000},
            "geometry": {"type": "Point", "coordinates": [1.0]}
        }]}"#;

        let result = parse_feed(body);
        assert!(matches!(result, Err(SourceError::Malformed(_))));
    }

    #[test]
    fn test_parse_feed_rejects_missing_time() {
        let body = r#"{"features": [{
            "id": "x2",
            "properties": {"mag": 3.0, "place": "somewhere"},
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0, 3.0]}
        }]}"#;

        let result = parse_feed(body);
        assert!(matches!(result, Err(SourceError::Malformed(_))));
    }
}
