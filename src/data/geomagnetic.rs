//! Planetary K-index from NOAA SWPC
//!
//! The SWPC product has been published both as a table (array of arrays with a
//! header row) and as an array of objects; both forms are accepted.

use chrono::{DateTime, NaiveDateTime, Utc};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{get_text, Source, SourceError};

pub const DEFAULT_KP_INDEX_URL: &str =
    "https://services.swpc.noaa.gov/products/noaa-planetary-k-index.json";

/// Number of 3-hour samples kept in the payload (three days)
const READINGS_KEPT: usize = 24;

/// One K-index sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpReading {
    pub time: DateTime<Utc>,
    pub kp: f64,
}

/// NOAA geomagnetic storm scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StormLevel {
    G0,
    G1,
    G2,
    G3,
    G4,
    G5,
}

impl StormLevel {
    /// Maps a Kp value to the G-scale (Kp 5 is G1, up to Kp 9 for G5)
    pub fn from_kp(kp: f64) -> Self {
        match kp.floor() as i64 {
            i64::MIN..=4 => StormLevel::G0,
            5 => StormLevel::G1,
            6 => StormLevel::G2,
            7 => StormLevel::G3,
            8 => StormLevel::G4,
            _ => StormLevel::G5,
        }
    }
}

/// Payload of the geomagnetic route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpIndex {
    /// Most recent sample
    pub current: KpReading,
    /// Recent samples, oldest first
    pub readings: Vec<KpReading>,
    pub storm_level: StormLevel,
}

/// Fetches the planetary K-index
#[derive(Debug, Clone)]
pub struct KpIndexSource {
    client: Client,
    url: String,
}

impl KpIndexSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn fetch_index(&self) -> Result<KpIndex, SourceError> {
        let text = get_text(&self.client, &self.url).await?;
        parse_kp_index(&text)
    }
}

impl Source for KpIndexSource {
    type Payload = KpIndex;

    fn name(&self) -> &'static str {
        "geomagnetic"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<KpIndex, SourceError>> {
        Box::pin(self.fetch_index())
    }
}

/// Parses an SWPC K-index body in either the table or object form
pub fn parse_kp_index(text: &str) -> Result<KpIndex, SourceError> {
    let rows: Vec<Value> = serde_json::from_str(text)?;

    let mut readings = if rows.first().is_some_and(Value::is_array) {
        parse_table(&rows)?
    } else {
        rows.iter().map(parse_object).collect::<Result<Vec<_>, _>>()?
    };

    readings.sort_by(|a, b| a.time.cmp(&b.time));
    if readings.len() > READINGS_KEPT {
        readings.drain(..readings.len() - READINGS_KEPT);
    }

    let current = readings
        .last()
        .cloned()
        .ok_or_else(|| SourceError::Malformed("K-index table has no samples".to_string()))?;

    Ok(KpIndex {
        storm_level: StormLevel::from_kp(current.kp),
        current,
        readings,
    })
}

/// Table form: header row naming the columns, then one row per sample
fn parse_table(rows: &[Value]) -> Result<Vec<KpReading>, SourceError> {
    let header = rows
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Malformed("missing K-index header row".to_string()))?;
    let column = |name: &str| {
        header
            .iter()
            .position(|v| v.as_str() == Some(name))
            .ok_or_else(|| SourceError::Malformed(format!("missing column {}", name)))
    };
    let time_col = column("time_tag")?;
    let kp_col = column("Kp")?;

    rows[1..]
        .iter()
        .map(|row| {
            let cells = row
                .as_array()
                .ok_or_else(|| SourceError::Malformed("K-index row is not an array".to_string()))?;
            let time = cells.get(time_col).ok_or_else(|| short_row(row))?;
            let kp = cells.get(kp_col).ok_or_else(|| short_row(row))?;
            Ok(KpReading {
                time: parse_time_tag(time)?,
                kp: parse_number(kp)?,
            })
        })
        .collect()
}

fn parse_object(row: &Value) -> Result<KpReading, SourceError> {
    let time = row
        .get("time_tag")
        .ok_or_else(|| SourceError::Malformed("K-index sample without time_tag".to_string()))?;
    let kp = row
        .get("Kp")
        .or_else(|| row.get("kp_index"))
        .ok_or_else(|| SourceError::Malformed("K-index sample without Kp".to_string()))?;
    Ok(KpReading {
        time: parse_time_tag(time)?,
        kp: parse_number(kp)?,
    })
}

fn short_row(row: &Value) -> SourceError {
    SourceError::Malformed(format!("K-index row too short: {}", row))
}

/// Accepts JSON numbers and numeric strings within the 0-9 Kp scale
fn parse_number(value: &Value) -> Result<f64, SourceError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|kp| (0.0..=9.0).contains(kp))
        .ok_or_else(|| SourceError::Malformed(format!("invalid Kp value: {}", value)))
}

/// SWPC time tags are UTC, e.g. "2024-07-15 03:00:00.000" or "2024-07-15T03:00:00"
fn parse_time_tag(value: &Value) -> Result<DateTime<Utc>, SourceError> {
    let text = value
        .as_str()
        .ok_or_else(|| SourceError::Malformed(format!("invalid time_tag: {}", value)))?;
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| SourceError::Malformed(format!("invalid time_tag: {}", text)))
}
