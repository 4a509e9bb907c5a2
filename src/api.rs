use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::models::FeedVehicle;

/// HTTP client for the vehicle-position and route-metadata feeds.
pub struct FeedClient {
    client: reqwest::Client,
    vehicles_url: String,
    routes_url: String,
}

impl FeedClient {
    pub fn new(vehicles_url: String, routes_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            vehicles_url,
            routes_url,
        })
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        tracing::debug!(url, "Fetching feed");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("Feed returned error status: {}", response.status());
        }

        let value = response
            .json::<Value>()
            .await
            .context("Failed to read feed body as JSON")?;
        Ok(value)
    }

    /// Fetch and decode the vehicle snapshot. HTTP and JSON-level failures
    /// are errors for the poll loop to absorb; a payload that parses but
    /// has an unexpected shape degrades to an empty snapshot instead.
    pub async fn fetch_vehicle_snapshot(&self) -> Result<Vec<FeedVehicle>> {
        let payload = self.fetch_json(&self.vehicles_url).await?;
        let vehicles = parse_vehicle_payload(&payload);
        tracing::debug!(count = vehicles.len(), "Decoded vehicle snapshot");
        Ok(vehicles)
    }

    /// Fetch and decode the route directory snapshot.
    pub async fn fetch_route_directory(&self) -> Result<HashMap<String, String>> {
        let payload = self.fetch_json(&self.routes_url).await?;
        let routes = parse_route_payload(&payload);
        tracing::debug!(count = routes.len(), "Decoded route directory");
        Ok(routes)
    }
}

/// Extract vehicle entries from a decoded payload. Accepts a bare array or
/// an object carrying a `vehicles` array; anything else is an empty
/// snapshot. An entry that fails to decode is skipped on its own, never
/// aborting the rest.
pub(crate) fn parse_vehicle_payload(payload: &Value) -> Vec<FeedVehicle> {
    let entries = payload
        .as_array()
        .or_else(|| payload.get("vehicles").and_then(Value::as_array));

    let Some(entries) = entries else {
        tracing::warn!("Vehicle payload carried no entry list, treating as empty");
        return Vec::new();
    };

    let mut vehicles = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;
    for entry in entries {
        match serde_json::from_value::<FeedVehicle>(entry.clone()) {
            Ok(vehicle) => vehicles.push(vehicle),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, "Skipped malformed vehicle entries");
    }
    vehicles
}

/// Extract the route id -> label mapping. Accepts a bare string-to-string
/// object or one nested under `routes`; non-string values are skipped and
/// any other shape is an empty directory.
pub(crate) fn parse_route_payload(payload: &Value) -> HashMap<String, String> {
    let object = payload
        .as_object()
        .filter(|m| !m.contains_key("routes"))
        .or_else(|| payload.get("routes").and_then(Value::as_object));

    let Some(object) = object else {
        tracing::warn!("Route payload carried no mapping, treating as empty");
        return HashMap::new();
    };

    object
        .iter()
        .filter_map(|(id, label)| label.as_str().map(|l| (id.clone(), l.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn vehicle_payload_accepts_bare_and_wrapped_arrays() {
        let bare = json!([{"vehicleId": "A"}, {"vehicleId": "B"}]);
        assert_eq!(parse_vehicle_payload(&bare).len(), 2);

        let wrapped = json!({"vehicles": [{"vehicleId": "A"}]});
        assert_eq!(parse_vehicle_payload(&wrapped).len(), 1);
    }

    #[test]
    fn vehicle_payload_with_no_list_is_empty() {
        assert!(parse_vehicle_payload(&json!({"status": "ok"})).is_empty());
        assert!(parse_vehicle_payload(&json!(null)).is_empty());
        assert!(parse_vehicle_payload(&json!("oops")).is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped_individually() {
        let payload = json!([
            {"vehicleId": "A", "latitude": 44.9, "longitude": -93.2},
            {"vehicleId": "B", "latitude": "not a number"},
            42
        ]);
        let vehicles = parse_vehicle_payload(&payload);
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].vehicle_id.as_deref(), Some("A"));
    }

    #[test]
    fn route_payload_accepts_bare_and_wrapped_objects() {
        let bare = json!({"12": "12 - Downtown", "4": "4 - Campus Loop"});
        assert_eq!(parse_route_payload(&bare).len(), 2);

        let wrapped = json!({"routes": {"12": "12 - Downtown"}});
        let routes = parse_route_payload(&wrapped);
        assert_eq!(routes.get("12").map(String::as_str), Some("12 - Downtown"));
    }

    #[test]
    fn route_payload_drops_non_string_values() {
        let payload = json!({"12": "12 - Downtown", "13": 13});
        let routes = parse_route_payload(&payload);
        assert_eq!(routes.len(), 1);

        assert!(parse_route_payload(&json!([1, 2, 3])).is_empty());
    }
}
