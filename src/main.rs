//! CLI entry point for the OC Transpo client.
//!
//! Credentials come from `OC_TRANSPO_API_KEY` and `OC_TRANSPO_APP_ID`
//! (a `.env` file is honoured). Results are printed to stdout as JSON.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use oc_transpo::model::{QueryOptions, RouteDirection};
use oc_transpo::output::{print_json, print_pretty};
use oc_transpo::parser::{require_route_number, require_stop_number};
use oc_transpo::{Config, OcTranspo, OneOrMany, ReconcileOptions};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "oc_transpo")]
#[command(about = "Query OC Transpo stop and trip information", long_about = None)]
struct Cli {
    /// Override the API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Routes and directions served by a stop
    Summary {
        #[arg(short, long)]
        stop: String,

        /// Include the raw upstream payload
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
    /// Next trips for one route at a stop, with direction ids
    Route {
        #[arg(short, long)]
        stop: String,

        #[arg(short, long)]
        route: String,

        /// Include the raw upstream payload
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
    /// Next trips for every route at a stop
    Stop {
        #[arg(short, long)]
        stop: String,

        /// Include the raw upstream payload
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
    /// Resolve the direction identifier for a route and direction name
    Directions {
        #[arg(short, long)]
        stop: String,

        #[arg(short, long)]
        route: String,

        /// Direction name, e.g. "Eastbound"
        #[arg(short, long)]
        direction: String,

        /// Do not write the identifier into the returned route
        #[arg(long, default_value_t = false)]
        no_insert: bool,

        /// Keep an identifier the route already has
        #[arg(long, default_value_t = false)]
        no_overwrite: bool,
    },
}

fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/oc_transpo.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("oc_transpo.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_logging()?;

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    let client = OcTranspo::new(config)?;
    info!(base_url = %client.config().base_url, "Client ready");

    match cli.command {
        Commands::Summary { stop, raw } => {
            let stop = require_stop_number(&stop)?;
            let summary = client
                .get_stop_summary(stop, QueryOptions { include_raw: raw })
                .await?;
            print_pretty(&summary);
            print_json(&summary)?;
        }
        Commands::Route { stop, route, raw } => {
            let stop = require_stop_number(&stop)?;
            let route = require_route_number(&route)?;
            let trips = client
                .get_route_information(stop, route, QueryOptions { include_raw: raw })
                .await?;
            print_pretty(&trips);
            print_json(&trips)?;
        }
        Commands::Stop { stop, raw } => {
            let stop = require_stop_number(&stop)?;
            let trips = client
                .get_stop_information(stop, QueryOptions { include_raw: raw })
                .await?;
            print_pretty(&trips);
            print_json(&trips)?;
        }
        Commands::Directions {
            stop,
            route,
            direction,
            no_insert,
            no_overwrite,
        } => {
            let stop = require_stop_number(&stop)?;
            let route = require_route_number(&route)?;
            let options = ReconcileOptions {
                insert: !no_insert,
                overwrite: !no_overwrite,
            };

            let routes = OneOrMany::One(RouteDirection::new(route, direction));
            let resolved = client
                .get_route_direction_identifiers(stop, &routes, options)
                .await?;

            info!(identifiers = ?resolved.identifiers, "Directions resolved");
            print_json(&resolved)?;
        }
    }

    Ok(())
}
