//! Lightning activity
//!
//! There is no free real-time lightning feed, so this source generates
//! plausible strikes inside a configured bounding box. It still goes through
//! the same cached read path as the upstream-backed routes.

use chrono::{DateTime, Duration, Utc};
use futures::future::BoxFuture;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Source, SourceError};

/// Strikes are spread over this window before the refresh time
const STRIKE_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Fraction of strikes with negative polarity
const NEGATIVE_POLARITY_RATE: f64 = 0.9;

/// Geographic bounding box covered by the lightning widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    /// Display name
    pub name: String,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            name: "Continental US".to_string(),
            min_lat: 24.5,
            max_lat: 49.4,
            min_lon: -124.8,
            max_lon: -66.9,
        }
    }
}

impl Region {
    /// Returns true if the box has a positive extent on both axes
    pub fn is_valid(&self) -> bool {
        self.min_lat < self.max_lat
            && self.min_lon < self.max_lon
            && (-90.0..=90.0).contains(&self.min_lat)
            && (-90.0..=90.0).contains(&self.max_lat)
            && (-180.0..=180.0).contains(&self.min_lon)
            && (-180.0..=180.0).contains(&self.max_lon)
    }

    /// Returns true if the point lies inside the box, edges included
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// A single lightning strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strike {
    pub latitude: f64,
    pub longitude: f64,
    pub time: DateTime<Utc>,
    /// Peak current in kiloamperes; negative for negative polarity
    pub peak_current_ka: f64,
}

/// Payload of the lightning route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightningActivity {
    /// Strikes, newest first
    pub strikes: Vec<Strike>,
    pub count: usize,
    pub region: String,
}

/// Generates strikes for the last few minutes over `region`
pub fn generate_strikes<R: Rng>(
    rng: &mut R,
    region: &Region,
    now: DateTime<Utc>,
) -> LightningActivity {
    let count = rng.random_range(20..=60);
    let mut strikes: Vec<Strike> = (0..count)
        .map(|_| {
            let magnitude = rng.random_range(5.0..=150.0);
            let polarity = if rng.random_bool(NEGATIVE_POLARITY_RATE) {
                -1.0
            } else {
                1.0
            };
            Strike {
                latitude: rng.random_range(region.min_lat..=region.max_lat),
                longitude: rng.random_range(region.min_lon..=region.max_lon),
                time: now - Duration::milliseconds(rng.random_range(0..STRIKE_WINDOW_MS)),
                peak_current_ka: polarity * magnitude,
            }
        })
        .collect();
    strikes.sort_by(|a, b| b.time.cmp(&a.time));

    LightningActivity {
        count: strikes.len(),
        strikes,
        region: region.name.clone(),
    }
}

/// Mock lightning source
#[derive(Debug, Clone, Default)]
pub struct LightningSource {
    region: Region,
}

impl LightningSource {
    pub fn new(region: Region) -> Self {
        Self { region }
    }

    fn generate(&self) -> LightningActivity {
        let mut rng = rand::rng();
        generate_strikes(&mut rng, &self.region, Utc::now())
    }
}

impl Source for LightningSource {
    type Payload = LightningActivity;

    fn name(&self) -> &'static str {
        "lightning"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<LightningActivity, SourceError>> {
        let activity = self.generate();
        Box::pin(async move { Ok(activity) })
    }
}
