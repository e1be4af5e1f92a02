use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cmd_finder::cache::CacheStats;
use cmd_finder::constants::{DEFAULT_CATALOG_PATH, SERVER_ADDR, SERVER_MAX_LIMIT};
use cmd_finder::{EngineConfig, ScoredResult, SearchEngine, SearchOptions};

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    #[serde(default)]
    limit: usize,
    platform: Option<String>,
    #[serde(default)]
    fuzzy: bool,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<ScoredResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    did_you_mean: Vec<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    suggestions: Vec<String>,
}

type AppState = Arc<SearchEngine>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,cmd_finder=info,server=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let catalog = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH));

    let engine = SearchEngine::open(&catalog, None, EngineConfig::default()).unwrap_or_else(|e| {
        error!("{e}");
        for hint in e.suggestions() {
            error!("  {hint}");
        }
        std::process::exit(1);
    });
    info!(commands = engine.catalog().len(), "catalog loaded");

    let state = Arc::new(engine);

    let app = Router::new()
        .route("/api/search", get(search_api))
        .route("/api/stats", get(stats_api))
        .with_state(state);

    let listener = match TcpListener::bind(SERVER_ADDR).await {
        Ok(l) => l,
        Err(e) => {
            error!("cannot bind {SERVER_ADDR}: {e}");
            std::process::exit(1);
        }
    };
    info!("server running at http://{SERVER_ADDR}");

    if let Err(e) = axum::serve(listener, app).await {
        error!("server stopped: {e}");
    }
}

async fn search_api(
    State(engine): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Response {
    let mut opts = SearchOptions {
        limit: params.limit.min(SERVER_MAX_LIMIT),
        use_fuzzy: params.fuzzy,
        ..SearchOptions::default()
    };
    opts.platforms.extend(params.platform);

    // Scoring is CPU-bound; keep it off the async workers.
    let worker = Arc::clone(&engine);
    let query = params.q.clone();
    let outcome = tokio::task::spawn_blocking(move || worker.search(&query, &opts)).await;

    match outcome {
        Ok(Ok(results)) => {
            let did_you_mean = if results.is_empty() {
                engine.suggest(&params.q, 3)
            } else {
                Vec::new()
            };
            Json(SearchResponse {
                results,
                did_you_mean,
            })
            .into_response()
        }
        Ok(Err(e)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                suggestions: e.suggestions(),
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("search task failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn stats_api(State(engine): State<AppState>) -> Json<Option<CacheStats>> {
    Json(engine.cache_stats())
}
