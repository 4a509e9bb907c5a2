use std::collections::HashMap;

use crate::models::VehicleReport;

/// Decides which reports survive a sweep. The default never evicts:
/// once a vehicle has been seen it stays for the life of the process,
/// ghost or not. A bounded-memory variant can swap this in without
/// touching merge semantics.
pub trait EvictionPolicy: Send + Sync {
    fn retain(&self, report: &VehicleReport, now_ms: i64) -> bool;
}

/// The stock policy: keep everything forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverEvict;

impl EvictionPolicy for NeverEvict {
    fn retain(&self, _report: &VehicleReport, _now_ms: i64) -> bool {
        true
    }
}

/// Insertion-order-preserving store of the latest report per vehicle.
///
/// Grows monotonically across merges; a vehicle seen once is retained even
/// when later snapshots omit it. Replacement keeps the entry's original
/// position so list order stays stable across polls.
pub struct FleetRegistry {
    entries: Vec<VehicleReport>,
    index: HashMap<String, usize>,
    eviction: Box<dyn EvictionPolicy>,
}

impl Default for FleetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self::with_eviction(Box::new(NeverEvict))
    }

    pub fn with_eviction(eviction: Box<dyn EvictionPolicy>) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            eviction,
        }
    }

    /// Merge one snapshot into the registry. Per incoming report, in
    /// snapshot order: an already-known id replaces its entry in place, a
    /// new id is appended in first-seen order. Ids absent from the snapshot
    /// are untouched; nothing is ever removed here. An empty snapshot is a
    /// no-op, not an error.
    pub fn merge(&mut self, snapshot: Vec<VehicleReport>) {
        for report in snapshot {
            match self.index.get(&report.vehicle_id) {
                Some(&slot) => self.entries[slot] = report,
                None => {
                    self.index
                        .insert(report.vehicle_id.clone(), self.entries.len());
                    self.entries.push(report);
                }
            }
        }
    }

    /// Apply the eviction policy. Separate from `merge` so retention is a
    /// pluggable concern; with `NeverEvict` this keeps every entry.
    pub fn sweep(&mut self, now_ms: i64) {
        let before = self.entries.len();
        let eviction = &self.eviction;
        self.entries.retain(|r| eviction.retain(r, now_ms));
        if self.entries.len() != before {
            self.index = self
                .entries
                .iter()
                .enumerate()
                .map(|(slot, r)| (r.vehicle_id.clone(), slot))
                .collect();
            tracing::debug!(
                evicted = before - self.entries.len(),
                remaining = self.entries.len(),
                "Swept registry"
            );
        }
    }

    /// All reports in first-seen order; the map-facing output.
    pub fn reports(&self) -> &[VehicleReport] {
        &self.entries
    }

    pub fn get(&self, vehicle_id: &str) -> Option<&VehicleReport> {
        self.index.get(vehicle_id).map(|&slot| &self.entries[slot])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(id: &str, label: &str, ts: i64) -> VehicleReport {
        VehicleReport {
            vehicle_id: id.to_string(),
            label: Some(label.to_string()),
            position: None,
            trip_route_id: None,
            last_observed_at: Some(ts),
            distance_to_garage_miles: None,
            movement_trail: Vec::new(),
        }
    }

    #[test]
    fn merge_appends_new_and_replaces_known_in_place() {
        let t = 1_700_000_000;
        let mut registry = FleetRegistry::new();

        registry.merge(vec![report("A", "101", t)]);
        assert_eq!(registry.len(), 1);

        registry.merge(vec![report("B", "202", t + 10)]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("A").unwrap().last_observed_at, Some(t));

        registry.merge(vec![report("A", "101", t + 20)]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("A").unwrap().last_observed_at, Some(t + 20));
        assert_eq!(registry.get("B").unwrap().last_observed_at, Some(t + 10));

        let order: Vec<&str> = registry
            .reports()
            .iter()
            .map(|r| r.vehicle_id.as_str())
            .collect();
        assert_eq!(order, ["A", "B"]);
    }

    #[test]
    fn merge_size_is_monotonically_non_decreasing() {
        let snapshots = vec![
            vec![report("A", "1", 1), report("B", "2", 1)],
            vec![],
            vec![report("B", "2", 2)],
            vec![report("C", "3", 3), report("A", "1", 3)],
        ];

        let mut registry = FleetRegistry::new();
        let mut last_len = 0;
        for snapshot in snapshots {
            registry.merge(snapshot);
            assert!(registry.len() >= last_len);
            last_len = registry.len();
        }
        for id in ["A", "B", "C"] {
            assert!(registry.get(id).is_some());
        }
    }

    #[test]
    fn merging_the_same_snapshot_twice_is_idempotent() {
        let snapshot = vec![report("A", "1", 5), report("B", "2", 5)];

        let mut once = FleetRegistry::new();
        once.merge(snapshot.clone());

        let mut twice = FleetRegistry::new();
        twice.merge(snapshot.clone());
        twice.merge(snapshot);

        assert_eq!(once.len(), twice.len());
        for id in ["A", "B"] {
            assert_eq!(
                once.get(id).unwrap().last_observed_at,
                twice.get(id).unwrap().last_observed_at
            );
        }
    }

    #[test]
    fn absent_ids_survive_unrelated_merges_unchanged() {
        let mut registry = FleetRegistry::new();
        registry.merge(vec![report("A", "101", 7)]);

        registry.merge(vec![]);
        registry.merge(vec![report("X", "900", 8)]);
        registry.merge(vec![]);

        let a = registry.get("A").unwrap();
        assert_eq!(a.label.as_deref(), Some("101"));
        assert_eq!(a.last_observed_at, Some(7));
    }

    #[test]
    fn default_sweep_keeps_ghosts() {
        let mut registry = FleetRegistry::new();
        registry.merge(vec![report("A", "101", 0)]);
        registry.sweep(i64::MAX);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn custom_policy_can_evict_and_reindex() {
        struct DropStale {
            cutoff_secs: i64,
        }
        impl EvictionPolicy for DropStale {
            fn retain(&self, report: &VehicleReport, _now_ms: i64) -> bool {
                report.last_observed_at.unwrap_or(0) >= self.cutoff_secs
            }
        }

        let mut registry = FleetRegistry::with_eviction(Box::new(DropStale { cutoff_secs: 10 }));
        registry.merge(vec![report("A", "1", 5), report("B", "2", 15)]);
        registry.sweep(0);

        assert_eq!(registry.len(), 1);
        assert!(registry.get("A").is_none());
        assert_eq!(registry.get("B").unwrap().label.as_deref(), Some("2"));
    }
}
