use anyhow::{Context, Result};
use homefree::{Coordinate, UpstreamConfig};
use serde_json::json;

pub async fn run(
    upstream: UpstreamConfig,
    lat: f64,
    lon: f64,
    radius: u32,
    json: bool,
) -> Result<()> {
    let center = Coordinate::new(lat, lon).context("Invalid coordinates")?;
    let elements = super::client(upstream)?
        .count_accessibility_features(center, radius)
        .await
        .context("Failed to query Overpass")?;

    if json {
        let response = json!({ "accessible_features_found": elements });
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    match elements.first() {
        Some(count) => {
            println!("{:<10} {:>8}", "KIND", "COUNT");
            println!("{}", "-".repeat(19));
            println!("{:<10} {:>8}", "nodes", count.tags.nodes);
            println!("{:<10} {:>8}", "ways", count.tags.ways);
            println!("{:<10} {:>8}", "relations", count.tags.relations);
            println!("{}", "-".repeat(19));
            println!("{:<10} {:>8}", "total", count.total());
        }
        None => println!("no accessibility features within {} m", radius),
    }

    Ok(())
}
