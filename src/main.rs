mod api;
mod config;
mod models;
mod poller;
mod projection;
mod registry;
mod routes;
mod staleness;

use anyhow::Result;
use api::FeedClient;
use config::Config;
use poller::{FleetState, Poller};
use projection::ViewControls;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .init();

    let config = Config::from_env();

    tracing::info!("Fleetwatch vehicle monitor");
    tracing::info!(vehicles = %config.vehicles_url, routes = %config.routes_url, "Feeds");
    tracing::info!(
        interval_ms = config.poll_interval_ms,
        stale_after_ms = config.stale_after_ms,
        "Polling configuration"
    );

    let client = FeedClient::new(config.vehicles_url.clone(), config.routes_url.clone())?;
    let state = Arc::new(FleetState::new());
    let poller = Poller::new(client);

    let controls = ViewControls {
        filter: config.status_filter,
        search: String::new(),
        sort: config.sort,
    };

    let mut interval = tokio::time::interval(config.poll_interval());
    let mut poll_count = 0u64;

    tracing::info!("Starting polling loop");

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested, stopping poll loop");
                break;
            }
        }
        poll_count += 1;

        println!("\n┌─ Poll #{} ─────────────────────────────────────", poll_count);
        println!("│ Time: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
        println!("└────────────────────────────────────────────────────");

        let now_ms = chrono::Utc::now().timestamp_millis();
        poller.poll_once(&state, now_ms).await;

        let registry = state.registry.read().await;
        let directory = state.routes.read().await;

        let counts = projection::counts(&registry, now_ms, config.stale_after_ms);
        println!(
            "\n📊 Fleet: {} vehicles ({} live, {} ghosts)",
            counts.total, counts.live, counts.stale
        );

        let mappable = registry
            .reports()
            .iter()
            .filter(|r| r.has_position())
            .count();
        println!("🗺  {} of {} vehicles carry map positions", mappable, counts.total);

        let listed = projection::project(
            &registry,
            &directory,
            &controls,
            now_ms,
            config.stale_after_ms,
        );
        for report in listed.iter().take(10) {
            let freshness = staleness::classify(report, now_ms, config.stale_after_ms);
            let full = directory.resolve(report.route_id());
            println!(
                "  {:<8} {:<24} [{}]",
                report.display_label(),
                routes::short_label(&full),
                if freshness.is_live() { "live" } else { "ghost" }
            );
        }
        if listed.len() > 10 {
            println!("  ... and {} more vehicles", listed.len() - 10);
        }
    }

    Ok(())
}
