//! Upstream data sources for the vital signs routes
//!
//! Each data category has a `Source` that performs one refresh: fetch from
//! the upstream (or generate, for mock categories), decode, and shape the
//! payload served by the route.

pub mod earthquakes;
pub mod geomagnetic;
pub mod lightning;
pub mod seismic;
mod usgs;

pub use earthquakes::{Earthquake, EarthquakeFeed, EarthquakeSource};
pub use geomagnetic::{KpIndex, KpIndexSource, KpReading, StormLevel};
pub use lightning::{LightningActivity, LightningSource, Region, Strike};
pub use seismic::{MagnitudeBands, SeismicSource, SeismicSummary};

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use thiserror::Error;

/// Errors that can occur while refreshing a data source
#[derive(Debug, Error)]
pub enum SourceError {
    /// Upstream unreachable or timed out
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream returned status {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but did not have the expected shape
    #[error("Malformed upstream payload: {0}")]
    Malformed(String),

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

/// A refresh operation producing the payload for one route
///
/// Implementations enforce their own timeouts; callers await `fetch` without
/// any cancellation of their own.
pub trait Source: Send + Sync {
    /// Payload served by the route
    type Payload;

    /// Short route name used in logs and error bodies
    fn name(&self) -> &'static str;

    /// Fetches a fresh payload
    fn fetch(&self) -> BoxFuture<'_, Result<Self::Payload, SourceError>>;
}

/// Builds the HTTP client shared by all upstream sources
///
/// # Arguments
/// * `timeout` - Bound on each upstream request, connect included
/// * `user_agent` - Value of the `User-Agent` header
pub fn http_client(timeout: Duration, user_agent: &str) -> Result<Client, SourceError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(SourceError::Client)
}

/// Issues a GET and returns the body text, rejecting non-success statuses
pub(crate) async fn get_text(client: &Client, url: &str) -> Result<String, SourceError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status(status.as_u16()));
    }
    Ok(response.text().await?)
}
