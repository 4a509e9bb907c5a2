use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::api::FeedClient;
use crate::models::FeedVehicle;
use crate::registry::FleetRegistry;
use crate::routes::RouteDirectory;

/// Source of the two feed snapshots. Production uses the HTTP client;
/// tests drive the poller with canned snapshots instead of network.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_vehicles(&self) -> Result<Vec<FeedVehicle>>;
    async fn fetch_routes(&self) -> Result<HashMap<String, String>>;
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_vehicles(&self) -> Result<Vec<FeedVehicle>> {
        self.fetch_vehicle_snapshot().await
    }

    async fn fetch_routes(&self) -> Result<HashMap<String, String>> {
        self.fetch_route_directory().await
    }
}

/// Registry and route directory behind read/write locks. Each merge and
/// each directory replacement happens under a single write guard, so a
/// whole snapshot lands atomically even if polls overlap.
pub struct FleetState {
    pub registry: RwLock<FleetRegistry>,
    pub routes: RwLock<RouteDirectory>,
}

impl FleetState {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(FleetRegistry::new()),
            routes: RwLock::new(RouteDirectory::new()),
        }
    }
}

impl Default for FleetState {
    fn default() -> Self {
        Self::new()
    }
}

/// One round of fetch-and-merge. The interval driver lives with the
/// caller; this stays timer-free so it can be exercised directly in tests.
pub struct Poller<S> {
    source: S,
}

impl<S: FeedSource> Poller<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch both feeds concurrently and apply whichever succeeded. The
    /// feeds fail and recover independently; on any failure the previous
    /// registry/directory stay authoritative. Never returns an error.
    pub async fn poll_once(&self, state: &FleetState, now_ms: i64) {
        let (vehicles, routes) = tokio::join!(
            self.source.fetch_vehicles(),
            self.source.fetch_routes()
        );

        match vehicles {
            Ok(snapshot) => {
                let total = snapshot.len();
                let reports: Vec<_> = snapshot
                    .into_iter()
                    .filter_map(FeedVehicle::normalize)
                    .collect();
                if reports.len() < total {
                    tracing::warn!(
                        skipped = total - reports.len(),
                        "Dropped vehicle entries with no usable id"
                    );
                }

                let mut registry = state.registry.write().await;
                registry.merge(reports);
                registry.sweep(now_ms);
                tracing::info!(
                    merged = total,
                    fleet = registry.len(),
                    "Merged vehicle snapshot"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Vehicle feed poll failed, keeping previous registry");
            }
        }

        match routes {
            Ok(directory) => {
                let count = directory.len();
                state.routes.write().await.replace(directory);
                tracing::info!(routes = count, "Replaced route directory");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Route feed poll failed, keeping previous directory");
            }
        }
    }
}
