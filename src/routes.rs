use std::collections::HashMap;

/// Label used for vehicles with no route assignment. Collates after real
/// route labels in the by-route sort, which is handled by the projection,
/// not by the string itself.
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Current mapping from route id to full display label. Replaced wholesale
/// on every successful route poll; empty before the first one completes,
/// during which resolution falls through to the synthesized label.
#[derive(Debug, Clone, Default)]
pub struct RouteDirectory {
    labels: HashMap<String, String>,
}

impl RouteDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(labels: HashMap<String, String>) -> Self {
        Self { labels }
    }

    /// Swap in a freshly fetched directory; the old one is discarded.
    pub fn replace(&mut self, labels: HashMap<String, String>) {
        self.labels = labels;
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Resolve a raw route id to a display label. Total: every input gets
    /// a label. Empty/absent ids get the unassigned sentinel, unknown ids
    /// get a synthesized "Route <id>" label.
    pub fn resolve(&self, raw_route_id: Option<&str>) -> String {
        let trimmed = raw_route_id.map(str::trim).unwrap_or("");
        if trimmed.is_empty() {
            return UNASSIGNED_LABEL.to_string();
        }
        match self.labels.get(trimmed) {
            Some(label) => label.clone(),
            None => format!("Route {}", trimmed),
        }
    }
}

/// Extract the short form from a full route label. Full labels are
/// conventionally "<short> - <long description>"; labels without the
/// delimiter come back unchanged.
pub fn short_label(full_label: &str) -> &str {
    match full_label.split_once(" - ") {
        Some((short, _)) => short,
        None => full_label,
    }
}
