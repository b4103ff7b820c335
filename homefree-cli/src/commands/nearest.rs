use anyhow::{Context, Result};
use homefree::{nearest_within, Coordinate, UpstreamConfig};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Serialize)]
struct NearestResponse {
    lat: f64,
    lon: f64,
    accessibility_rating: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance_meters: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    building_name: Option<String>,
}

pub async fn run(
    upstream: UpstreamConfig,
    lat: f64,
    lon: f64,
    buildings: Option<PathBuf>,
    radius: f64,
    json: bool,
) -> Result<()> {
    let reference = Coordinate::new(lat, lon).context("Invalid coordinates")?;
    let records = super::buildings(upstream, buildings.as_deref()).await?;

    let nearest = nearest_within(reference, &records, radius);
    let response = NearestResponse {
        lat,
        lon,
        accessibility_rating: nearest.and_then(|n| n.rating()),
        distance_meters: nearest.map(|n| n.distance_meters),
        building_name: nearest
            .and_then(|n| n.record.get("building_name"))
            .and_then(Value::as_str)
            .map(str::to_string),
    };

    // Output result
    if json {
        println!("{}", serde_json::to_string(&response)?);
    } else {
        match (response.accessibility_rating, response.distance_meters) {
            (Some(rating), Some(distance)) => {
                let name = response.building_name.as_deref().unwrap_or("unnamed building");
                println!("{} ({:.1} m): rating {}", name, distance, rating);
            }
            (None, Some(distance)) => {
                println!("nearest building ({:.1} m) has no rating", distance);
            }
            _ => println!("no building within {} m", radius),
        }
    }

    Ok(())
}
