use anyhow::{Context, Result};
use homefree::score::{
    count_accessible_toilets, feature_score, hood_score, mobility_records, mobility_score,
    property_score, total_score, PropertyScore,
};
use homefree::overpass::DEFAULT_SEARCH_RADIUS_METERS;
use homefree::{Coordinate, CountElement, UpstreamConfig};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct ScoreReport {
    features_found: u64,
    accessible_toilets: u64,
    feature_score: u32,
    mobility_score: u32,
    hood_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    property: Option<PropertyScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_score: Option<u32>,
}

pub async fn run(
    upstream: UpstreamConfig,
    lat: f64,
    lon: f64,
    listing: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let center = Coordinate::new(lat, lon).context("Invalid coordinates")?;
    let property = match listing {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read listing {}", path.display()))?;
            Some(property_score(&text))
        }
        None => None,
    };

    let client = super::client(upstream)?;
    let (features, mobility) = tokio::join!(
        client.count_accessibility_features(center, DEFAULT_SEARCH_RADIUS_METERS),
        client.fetch_mobility()
    );

    let features_found = features
        .context("Failed to query Overpass")?
        .first()
        .map(CountElement::total)
        .unwrap_or(0);
    let export = mobility.context("Failed to fetch mobility data")?;
    let accessible_toilets = count_accessible_toilets(&mobility_records(&export));

    let feature = feature_score(features_found);
    let mobility = mobility_score(accessible_toilets);
    let hood = hood_score(feature, mobility);

    let report = ScoreReport {
        features_found,
        accessible_toilets,
        feature_score: feature,
        mobility_score: mobility,
        hood_score: hood,
        total_score: property.as_ref().map(|p| total_score(p.score, hood)),
        property,
    };

    if json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    println!("Features found:      {}", report.features_found);
    println!("Accessible toilets:  {}", report.accessible_toilets);
    println!("Neighbourhood score: {} / 10", report.hood_score);
    if let (Some(property), Some(total)) = (&report.property, report.total_score) {
        println!("Property score:      {}", property.score);
        for feature in &property.features {
            println!("  - {}", feature);
        }
        println!("Total score:         {} / 10", total);
    }

    Ok(())
}
