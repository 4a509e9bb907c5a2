use std::str::FromStr;

use crate::models::VehicleReport;
use crate::registry::FleetRegistry;
use crate::routes::RouteDirectory;
use crate::staleness::{classify, Freshness};

/// Status filter applied ahead of search and sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Live,
    Stale,
}

impl FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "live" => Ok(StatusFilter::Live),
            "stale" => Ok(StatusFilter::Stale),
            other => anyhow::bail!("unknown status filter: {other:?}"),
        }
    }
}

/// Sort key for the list projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Ascending by unit number, empty labels first. Compares the raw
    /// label, not the id fallback the list displays: a label-less vehicle
    /// shows its id but still collates ahead of every labeled one.
    #[default]
    ByUnit,
    /// Ascending by resolved full route label, unassigned vehicles last.
    ByRoute,
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "by-unit" | "unit" => Ok(SortKey::ByUnit),
            "by-route" | "route" => Ok(SortKey::ByRoute),
            other => anyhow::bail!("unknown sort key: {other:?}"),
        }
    }
}

/// The three orthogonal list controls. Changing any of them only changes
/// the projection; the registry and counts are untouched.
#[derive(Debug, Clone, Default)]
pub struct ViewControls {
    pub filter: StatusFilter,
    pub search: String,
    pub sort: SortKey,
}

/// Whole-fleet aggregates, always computed over the unfiltered registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetCounts {
    pub total: usize,
    pub live: usize,
    pub stale: usize,
}

pub fn counts(registry: &FleetRegistry, now_ms: i64, threshold_ms: i64) -> FleetCounts {
    let total = registry.len();
    let live = registry
        .reports()
        .iter()
        .filter(|r| classify(r, now_ms, threshold_ms).is_live())
        .count();
    FleetCounts {
        total,
        live,
        stale: total - live,
    }
}

/// Derive the list-facing sequence: status filter, then search, then sort.
/// Pure; recomputed on every registry or control change.
pub fn project<'a>(
    registry: &'a FleetRegistry,
    routes: &RouteDirectory,
    controls: &ViewControls,
    now_ms: i64,
    threshold_ms: i64,
) -> Vec<&'a VehicleReport> {
    let needle = controls.search.trim().to_lowercase();

    let mut keyed: Vec<(SortOrd, &VehicleReport)> = registry
        .reports()
        .iter()
        .filter(|r| match controls.filter {
            StatusFilter::All => true,
            StatusFilter::Live => classify(r, now_ms, threshold_ms) == Freshness::Live,
            StatusFilter::Stale => classify(r, now_ms, threshold_ms) == Freshness::Stale,
        })
        .filter(|r| needle.is_empty() || r.display_label().to_lowercase().contains(&needle))
        .map(|r| (sort_ord(r, routes, controls.sort), r))
        .collect();

    // Stable sort keeps first-seen order for ties.
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, r)| r).collect()
}

/// Precomputed comparison key. The bool collates unassigned routes after
/// every real label; it is always false for the by-unit sort.
type SortOrd = (bool, String);

fn sort_ord(report: &VehicleReport, routes: &RouteDirectory, sort: SortKey) -> SortOrd {
    match sort {
        // Raw label, not the id fallback: label-less vehicles sort first.
        SortKey::ByUnit => (
            false,
            report.label.as_deref().unwrap_or("").trim().to_lowercase(),
        ),
        SortKey::ByRoute => {
            let route_id = report.route_id();
            (
                route_id.is_none(),
                routes.resolve(route_id).to_lowercase(),
            )
        }
    }
}
