//! Shared router state
//!
//! Built once per process. Each route's `CachedSource` lives here and is
//! handed to handlers through axum state; nothing is cached in globals.

use std::sync::Arc;

use super::gate::Gate;
use crate::cache::CachedSource;
use crate::config::{Config, RouteConfig};
use crate::data::{
    self, EarthquakeFeed, EarthquakeSource, KpIndex, KpIndexSource, LightningActivity,
    LightningSource, SeismicSource, SeismicSummary, Source, SourceError,
};

/// Refresh operations for every route, injectable for tests
pub struct Sources {
    pub earthquakes: Arc<dyn Source<Payload = EarthquakeFeed>>,
    pub geomagnetic: Arc<dyn Source<Payload = KpIndex>>,
    pub lightning: Arc<dyn Source<Payload = LightningActivity>>,
    pub seismic: Arc<dyn Source<Payload = SeismicSummary>>,
}

impl Sources {
    /// Builds the real upstream sources described by `config`
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let upstream = &config.upstream;
        let client = data::http_client(upstream.timeout(), &upstream.user_agent)?;

        Ok(Self {
            earthquakes: Arc::new(EarthquakeSource::new(
                client.clone(),
                &upstream.earthquakes_url,
            )),
            geomagnetic: Arc::new(KpIndexSource::new(client.clone(), &upstream.kp_index_url)),
            lightning: Arc::new(LightningSource::new(config.lightning.clone())),
            seismic: Arc::new(SeismicSource::new(client, &upstream.seismic_url)),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub earthquakes: Arc<CachedSource<EarthquakeFeed>>,
    pub geomagnetic: Arc<CachedSource<KpIndex>>,
    pub lightning: Arc<CachedSource<LightningActivity>>,
    pub seismic: Arc<CachedSource<SeismicSummary>>,
    pub gate: Gate,
}

impl AppState {
    /// Creates state with the real upstream sources
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Ok(Self::with_sources(config, Sources::from_config(config)?))
    }

    /// Creates state with the given sources and the TTLs and gate from `config`
    pub fn with_sources(config: &Config, sources: Sources) -> Self {
        let routes = &config.routes;
        Self {
            earthquakes: cached(sources.earthquakes, &routes.earthquakes),
            geomagnetic: cached(sources.geomagnetic, &routes.geomagnetic),
            lightning: cached(sources.lightning, &routes.lightning),
            seismic: cached(sources.seismic, &routes.seismic),
            gate: Gate::new(config.gate.password.clone()),
        }
    }
}

fn cached<P: Clone + Send + Sync + 'static>(
    source: Arc<dyn Source<Payload = P>>,
    route: &RouteConfig,
) -> Arc<CachedSource<P>> {
    Arc::new(CachedSource::new(source, route.ttl_secs, route.revalidate_secs))
}
