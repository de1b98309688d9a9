use std::{fs::OpenOptions, net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use scanboard::{
    ApiClient, AppState, PaginationConfig, build_router, get_local_offset, graceful_shutdown,
    logging_middleware,
};

/// The web server for Scanboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The base URL of the scan API, e.g. "http://localhost:8080".
    #[arg(long, env = "SCANBOARD_API_URL")]
    api_url: String,

    /// File path to the SQLite database that stores UI preferences.
    #[arg(long, default_value = "scanboard.db")]
    db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// The number of rows per page when no page size has been picked.
    #[arg(long, default_value_t = 20)]
    page_size: u64,

    /// How long to wait for the scan API before giving up, in seconds.
    #[arg(long, default_value_t = 10)]
    api_timeout_secs: u64,

    /// Log the headers and bodies of every request and response.
    #[arg(long)]
    log_bodies: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    if get_local_offset(&args.timezone).is_none() {
        tracing::error!("\"{}\" is not a valid canonical timezone name", args.timezone);
        return ExitCode::FAILURE;
    }

    if args.page_size == 0 {
        tracing::error!("The page size must be at least 1");
        return ExitCode::FAILURE;
    }

    let api = match ApiClient::new(&args.api_url, Duration::from_secs(args.api_timeout_secs)) {
        Ok(api) => api,
        Err(error) => {
            tracing::error!("Could not create the API client: {error}");
            return ExitCode::FAILURE;
        }
    };

    let connection = match Connection::open(&args.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not open the database {}: {error}", args.db_path);
            return ExitCode::FAILURE;
        }
    };

    let pagination_config = PaginationConfig {
        default_page_size: args.page_size,
        ..Default::default()
    };

    let state = match AppState::new(connection, api, &args.timezone, pagination_config) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the app state: {error}");
            return ExitCode::FAILURE;
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state);
    let router = if args.log_bodies {
        router.layer(middleware::from_fn(logging_middleware))
    } else {
        router
    };
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!(
        "HTTP server listening on {addr}, using the scan API at {}",
        args.api_url
    );

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let debug_log = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .map(|log_file| {
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(Arc::new(log_file))
                .with_filter(filter::LevelFilter::DEBUG)
        })
        .inspect_err(|error| eprintln!("Could not open debug.log, file logging is off: {error}"))
        .ok();

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
