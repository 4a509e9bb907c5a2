use crate::models::VehicleReport;

/// Classification of a vehicle's last observation against the configured
/// staleness threshold. Stale vehicles ("ghosts") stay in the registry;
/// this is display classification, not retention policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Live,
    Stale,
}

impl Freshness {
    pub fn is_live(self) -> bool {
        self == Freshness::Live
    }
}

/// Classify a report purely from elapsed time since its capture timestamp.
///
/// The boundary is exclusive on the stale side: a report exactly at the
/// threshold is still live. A missing timestamp classifies as stale, since
/// its age is unbounded and must not pass for live.
///
/// Arithmetic saturates: the feed can hand us any numeric value as a
/// timestamp and classification must not panic or wrap.
pub fn classify(report: &VehicleReport, now_ms: i64, threshold_ms: i64) -> Freshness {
    let Some(ts_secs) = report.last_observed_at else {
        return Freshness::Stale;
    };
    let elapsed_ms = now_ms.saturating_sub(ts_secs.saturating_mul(1000));
    if elapsed_ms > threshold_ms {
        Freshness::Stale
    } else {
        Freshness::Live
    }
}
