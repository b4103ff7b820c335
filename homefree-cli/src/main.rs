use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use homefree::config::{DEFAULT_BUILDINGS_URL, DEFAULT_MOBILITY_URL};
use homefree::overpass::DEFAULT_OVERPASS_URL;
use homefree::UpstreamConfig;
use std::path::PathBuf;

mod commands;

/// Accessibility lookups over OpenStreetMap and Melbourne open data
#[derive(Parser)]
#[command(name = "homefree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    upstream: UpstreamArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Upstream endpoints, shared by every command.
#[derive(Args)]
struct UpstreamArgs {
    /// Overpass interpreter URL
    #[arg(long, env = "HOMEFREE_OVERPASS_URL", default_value = DEFAULT_OVERPASS_URL, global = true)]
    overpass_url: String,

    /// Public toilets export URL
    #[arg(long, env = "HOMEFREE_MOBILITY_URL", default_value = DEFAULT_MOBILITY_URL, global = true)]
    mobility_url: String,

    /// Buildings dataset records URL
    #[arg(long, env = "HOMEFREE_BUILDINGS_URL", default_value = DEFAULT_BUILDINGS_URL, global = true)]
    buildings_url: String,

    /// Maximum building records fetched
    #[arg(long, env = "HOMEFREE_BUILDING_LIMIT", default_value = "500", global = true)]
    building_limit: u32,

    /// Upstream request timeout in seconds
    #[arg(long, env = "HOMEFREE_TIMEOUT_SECS", default_value = "30", global = true)]
    timeout: u64,
}

impl UpstreamArgs {
    fn into_config(self) -> UpstreamConfig {
        UpstreamConfig {
            overpass_url: self.overpass_url,
            mobility_url: self.mobility_url,
            buildings_url: self.buildings_url,
            building_limit: self.building_limit,
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Accessibility rating of the nearest building to a coordinate
    Nearest {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Local buildings file (JSON or CSV) instead of the open-data API
        #[arg(short, long)]
        buildings: Option<PathBuf>,

        /// Search radius in meters
        #[arg(short, long, default_value = "200")]
        radius: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Resolve building ratings for many coordinates from a file
    Batch {
        /// Input file (CSV or GeoJSON)
        input: PathBuf,

        /// Output file (same format as input if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column name for latitude (CSV only)
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude (CSV only)
        #[arg(long, default_value = "lon")]
        lon_col: String,

        /// Local buildings file (JSON or CSV) instead of the open-data API
        #[arg(short, long)]
        buildings: Option<PathBuf>,

        /// Search radius in meters
        #[arg(short, long, default_value = "200")]
        radius: f64,
    },

    /// Count accessibility features near a coordinate
    Accessibility {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Search radius in meters
        #[arg(short, long, default_value = "500")]
        radius: u32,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List public toilets from the open-data catalog
    Mobility {
        /// Output the raw dataset as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Neighbourhood (and optionally property) accessibility score
    Score {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Text file with a property listing description
        #[arg(short, long)]
        listing: Option<PathBuf>,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let upstream = cli.upstream.into_config();

    match cli.command {
        Commands::Nearest {
            lat,
            lon,
            buildings,
            radius,
            json,
        } => commands::nearest::run(upstream, lat, lon, buildings, radius, json).await,
        Commands::Batch {
            input,
            output,
            lat_col,
            lon_col,
            buildings,
            radius,
        } => {
            commands::batch::run(upstream, input, output, lat_col, lon_col, buildings, radius)
                .await
        }
        Commands::Accessibility {
            lat,
            lon,
            radius,
            json,
        } => commands::accessibility::run(upstream, lat, lon, radius, json).await,
        Commands::Mobility { json } => commands::mobility::run(upstream, json).await,
        Commands::Score {
            lat,
            lon,
            listing,
            json,
        } => commands::score::run(upstream, lat, lon, listing, json).await,
    }
}
