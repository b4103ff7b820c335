use anyhow::{bail, Context, Result};
use homefree::{Coordinate, ProximityResolver, Record, UpstreamConfig};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const RATING_COLUMN: &str = "accessibility_rating";

pub async fn run(
    upstream: UpstreamConfig,
    input: PathBuf,
    output: Option<PathBuf>,
    lat_col: String,
    lon_col: String,
    buildings: Option<PathBuf>,
    radius: f64,
) -> Result<()> {
    // Detect file format before fetching anything
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !matches!(extension.as_str(), "csv" | "geojson" | "json") {
        bail!(
            "Unsupported file format: {}. Use .csv or .geojson",
            extension
        );
    }

    // Buildings are loaded once and shared by every lookup
    let records = super::buildings(upstream, buildings.as_deref()).await?;
    let lookup = Lookup {
        resolver: ProximityResolver::new(radius),
        records,
    };

    let output_path = match output {
        Some(path) => path,
        None => default_output(&input, &extension)?,
    };

    if extension == "csv" {
        process_csv(&lookup, &input, &output_path, &lat_col, &lon_col)?;
    } else {
        process_geojson(&lookup, &input, &output_path)?;
    }

    println!("Output written to: {}", output_path.display());
    Ok(())
}

struct Lookup {
    resolver: ProximityResolver,
    records: Vec<Record>,
}

impl Lookup {
    /// Rating for a coordinate; invalid coordinates have no rating.
    fn rating(&self, lat: f64, lon: f64) -> Option<i64> {
        let reference = Coordinate::new(lat, lon).ok()?;
        self.resolver.resolve(reference, &self.records).rating()
    }
}

fn default_output(input: &Path, extension: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .context("Input path has no file name")?
        .to_string_lossy();
    let suffix = if extension == "csv" { "csv" } else { "geojson" };
    Ok(input.with_file_name(format!("{}_accessibility.{}", stem, suffix)))
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn process_csv(
    lookup: &Lookup,
    input: &Path,
    output_path: &Path,
    lat_col: &str,
    lon_col: &str,
) -> Result<()> {
    let file = File::open(input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    // Find column indices
    let headers = reader.headers()?.clone();
    let lat_idx = headers
        .iter()
        .position(|h| h == lat_col)
        .with_context(|| format!("Column '{}' not found in CSV", lat_col))?;
    let lon_idx = headers
        .iter()
        .position(|h| h == lon_col)
        .with_context(|| format!("Column '{}' not found in CSV", lon_col))?;

    // Collect records for progress bar
    let rows: Vec<_> = reader.records().collect::<Result<_, _>>()?;
    let pb = progress_bar(rows.len() as u64)?;

    let output_file = File::create(output_path).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));

    let mut new_headers: Vec<&str> = headers.iter().collect();
    new_headers.push(RATING_COLUMN);
    writer.write_record(&new_headers)?;

    for row in &rows {
        let lat: f64 = row
            .get(lat_idx)
            .context("Missing latitude")?
            .trim()
            .parse()
            .context("Invalid latitude")?;
        let lon: f64 = row
            .get(lon_idx)
            .context("Missing longitude")?
            .trim()
            .parse()
            .context("Invalid longitude")?;

        let rating = lookup
            .rating(lat, lon)
            .map(|r| r.to_string())
            .unwrap_or_default();

        let mut new_row: Vec<&str> = row.iter().collect();
        new_row.push(&rating);
        writer.write_record(&new_row)?;

        pb.inc(1);
    }

    pb.finish_with_message("done");
    writer.flush()?;
    Ok(())
}

fn process_geojson(lookup: &Lookup, input: &Path, output_path: &Path) -> Result<()> {
    let file = File::open(input).context("Failed to open input file")?;
    let geojson: geojson::GeoJson =
        serde_json::from_reader(BufReader::new(file)).context("Failed to parse GeoJSON")?;

    let result = match geojson {
        geojson::GeoJson::Feature(mut feature) => {
            rate_feature(lookup, &mut feature);
            geojson::GeoJson::Feature(feature)
        }
        geojson::GeoJson::FeatureCollection(mut fc) => {
            let pb = progress_bar(fc.features.len() as u64)?;
            for feature in &mut fc.features {
                rate_feature(lookup, feature);
                pb.inc(1);
            }
            pb.finish_with_message("done");
            geojson::GeoJson::FeatureCollection(fc)
        }
        geojson::GeoJson::Geometry(_) => {
            bail!("GeoJSON input must be a Feature or FeatureCollection")
        }
    };

    let output_file = File::create(output_path).context("Failed to create output file")?;
    let mut writer = BufWriter::new(output_file);
    serde_json::to_writer_pretty(&mut writer, &result)?;
    writer.flush()?;
    Ok(())
}

/// Set the `accessibility_rating` property of a Point feature.
///
/// Features without a Point geometry get a null rating.
fn rate_feature(lookup: &Lookup, feature: &mut geojson::Feature) {
    let rating = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(geojson::Value::Point(position)) if position.len() >= 2 => {
            // GeoJSON positions are [lon, lat]
            lookup.rating(position[1], position[0])
        }
        _ => None,
    };

    feature.set_property(RATING_COLUMN, rating.map_or(Value::Null, Value::from));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn lookup() -> Lookup {
        let records: Vec<Record> = serde_json::from_value(json!([
            {"latitude": -33.8688, "longitude": 151.2093, "accessibility_rating": 2},
            {"latitude": "-37.8136", "longitude": "144.9631", "accessibility_rating": "1"}
        ]))
        .unwrap();
        Lookup {
            resolver: ProximityResolver::default(),
            records,
        }
    }

    #[test]
    fn test_process_csv() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("points.csv");
        std::fs::write(
            &input,
            "id,lat,lon\n1,-33.8688,151.2093\n2,-37.8136,144.9631\n3,0.0,0.0\n",
        )
        .unwrap();
        let output = dir.path().join("out.csv");

        process_csv(&lookup(), &input, &output, "lat", "lon").unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "id,lat,lon,accessibility_rating");
        assert_eq!(lines[1], "1,-33.8688,151.2093,2");
        assert_eq!(lines[2], "2,-37.8136,144.9631,1");
        assert_eq!(lines[3], "3,0.0,0.0,");
    }

    #[test]
    fn test_process_csv_missing_column() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("points.csv");
        std::fs::write(&input, "latitude,longitude\n1,2\n").unwrap();
        let output = dir.path().join("out.csv");

        assert!(process_csv(&lookup(), &input, &output, "lat", "lon").is_err());
    }

    #[test]
    fn test_process_geojson() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("points.geojson");
        let collection = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"id": 1}, "geometry": {"type": "Point", "coordinates": [151.2093, -33.8688]}},
                {"type": "Feature", "properties": {"id": 2}, "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}}
            ]
        });
        std::fs::write(&input, collection.to_string()).unwrap();
        let output = dir.path().join("out.geojson");

        process_geojson(&lookup(), &input, &output).unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["features"][0]["properties"]["accessibility_rating"], 2);
        assert_eq!(written["features"][0]["properties"]["id"], 1);
        assert!(written["features"][1]["properties"]["accessibility_rating"].is_null());
    }

    #[test]
    fn test_default_output() {
        let path = default_output(Path::new("/tmp/points.csv"), "csv").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/points_accessibility.csv"));
        let path = default_output(Path::new("/tmp/points.json"), "json").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/points_accessibility.geojson"));
    }
}
