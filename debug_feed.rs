use serde_json::Value;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::var("FLEETWATCH_VEHICLES_URL")
        .unwrap_or_else(|_| "https://fleet.example.edu/api/vehicles".to_string());

    println!("Fetching from: {}", url);
    let response = reqwest::get(&url).await?;
    println!("Status: {}", response.status());

    let payload: Value = response.json().await?;

    let entries = payload
        .as_array()
        .or_else(|| payload.get("vehicles").and_then(Value::as_array));

    let Some(entries) = entries else {
        println!("No vehicle list found in payload:");
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    };

    println!("Number of entries: {}", entries.len());

    for (i, entry) in entries.iter().enumerate() {
        println!("\n--- Entry {} ---", i);
        println!("Vehicle ID: {:?}", entry.get("vehicleId"));
        println!("Label: {:?}", entry.get("label"));
        println!(
            "Position: {:?}, {:?}",
            entry.get("latitude"),
            entry.get("longitude")
        );
        println!("Trip route: {:?}", entry.get("tripRouteId"));
        println!("Observed at: {:?}", entry.get("lastObservedAtEpochSeconds"));
        println!("Garage distance: {:?}", entry.get("distanceToGarageMiles"));

        let trail_len = entry
            .get("movementTrail")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);
        println!("Trail points: {}", trail_len);
    }

    Ok(())
}
