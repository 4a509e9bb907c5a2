use serde::{Deserialize, Deserializer, Serialize};

/// A latitude/longitude pair as supplied by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

/// Latest known state for one vehicle, normalized for the rest of the crate.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleReport {
    /// Stable identity; the sole merge key in the registry
    pub vehicle_id: String,

    /// Display number painted on the vehicle (may differ from the id)
    pub label: Option<String>,

    /// Position, if the feed supplied one; position-less vehicles stay in
    /// the registry but are not map-displayable
    pub position: Option<LatLon>,

    /// Raw route/trip identifier, whitespace not yet trimmed
    pub trip_route_id: Option<String>,

    /// Producer capture time in epoch seconds; None when the feed omitted
    /// it or sent something non-numeric
    pub last_observed_at: Option<i64>,

    /// Producer-supplied distance to the garage, miles
    pub distance_to_garage_miles: Option<f64>,

    /// Oldest-first movement trail, produced externally and carried verbatim
    pub movement_trail: Vec<LatLon>,
}

impl VehicleReport {
    /// Display label, falling back through an ordered list of candidates:
    /// the label if non-blank, else the id, else empty string.
    pub fn display_label(&self) -> &str {
        [self.label.as_deref(), Some(self.vehicle_id.as_str())]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    /// Trimmed route id; None when absent or blank.
    pub fn route_id(&self) -> Option<&str> {
        self.trip_route_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// One vehicle entry as it appears on the wire. Every field is optional;
/// normalization decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedVehicle {
    pub vehicle_id: Option<String>,
    pub label: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub trip_route_id: Option<String>,
    #[serde(deserialize_with = "lenient_epoch_seconds")]
    pub last_observed_at_epoch_seconds: Option<i64>,
    pub distance_to_garage_miles: Option<f64>,
    pub movement_trail: Option<Vec<TrailPoint>>,
}

/// One trail entry off the wire. Coordinates stay optional so a partial
/// point never fabricates a 0.0; normalization drops incomplete points.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct TrailPoint {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl FeedVehicle {
    /// Normalize into a `VehicleReport`. Returns None when the entry has no
    /// usable id; such records are skipped, never an error for the snapshot.
    pub fn normalize(self) -> Option<VehicleReport> {
        let vehicle_id = self
            .vehicle_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())?
            .to_string();

        let position = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(LatLon {
                latitude,
                longitude,
            }),
            _ => None,
        };

        let movement_trail = self
            .movement_trail
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| match (p.latitude, p.longitude) {
                (Some(latitude), Some(longitude)) => Some(LatLon {
                    latitude,
                    longitude,
                }),
                _ => None,
            })
            .collect();

        Some(VehicleReport {
            vehicle_id,
            label: self.label,
            position,
            trip_route_id: self.trip_route_id,
            last_observed_at: self.last_observed_at_epoch_seconds,
            distance_to_garage_miles: self.distance_to_garage_miles,
            movement_trail,
        })
    }
}

/// Accepts an integer, a float, or a numeric string; anything else becomes
/// None so the classifier can treat the report as maximally stale.
fn lenient_epoch_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }))
}
