// WasteWise - Web Server
// List page, item detail page and a JSON API with Axum

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use wastewise::render::{self, ListView};
use wastewise::{
    category_counts, confusing_items, logging, parse_item_id, query, Advice, AdviceBook,
    CatalogueArgs, CatalogueSource, CategoryKey, Item,
};

#[derive(Parser)]
#[command(name = "wastewise-server", version, about = "Serve the WasteWise list and detail pages")]
struct ServerCli {
    #[command(flatten)]
    catalogue: CatalogueArgs,

    /// Address to listen on
    #[arg(long, env = "WASTEWISE_BIND", default_value = "0.0.0.0:3000")]
    bind: String,

    /// Directory served under /static
    #[arg(long, env = "WASTEWISE_STATIC_DIR", default_value = "web")]
    static_dir: PathBuf,
}

/// Shared application state. The catalogue itself is loaded per page view.
#[derive(Clone)]
struct AppState {
    source: Arc<CatalogueSource>,
    advice: Arc<AdviceBook>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn fail(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// `?q=...&category=...`
#[derive(Debug, Default, Deserialize)]
struct ListParams {
    q: Option<String>,
    category: Option<String>,
}

impl ListParams {
    fn search(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }

    fn key(&self) -> CategoryKey {
        self.category
            .as_deref()
            .map(CategoryKey::parse)
            .unwrap_or_default()
    }
}

/// `?id=...`
#[derive(Debug, Default, Deserialize)]
struct ItemParams {
    id: Option<String>,
}

/// Item response with resolved advice
#[derive(Serialize)]
struct ItemDetail<'a> {
    item: &'a Item,
    advice: Advice,
}

fn load_failed(e: impl std::fmt::Display) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(ApiResponse::<()>::fail(e.to_string())),
    )
        .into_response()
}

// ============================================================================
// Page Handlers
// ============================================================================

/// GET / - Searchable list
async fn serve_index(State(state): State<AppState>, Query(params): Query<ListParams>) -> Html<String> {
    let key = params.key();

    match state.source.load().await {
        Ok(catalogue) => {
            let view = ListView::build(&catalogue, params.search(), key);
            Html(render::list_page(&view))
        }
        Err(e) => {
            tracing::error!(error = %e, "could not load catalogue for list page");
            Html(render::list_error_page(params.search(), &key))
        }
    }
}

/// GET /item?id= - Item detail
async fn serve_item(State(state): State<AppState>, Query(params): Query<ItemParams>) -> Response {
    let id = parse_item_id(params.id.as_deref());

    let catalogue = match state.source.load().await {
        Ok(catalogue) => catalogue,
        Err(e) => {
            tracing::error!(error = %e, "could not load catalogue for item page");
            return (StatusCode::BAD_GATEWAY, Html(render::item_error_page())).into_response();
        }
    };

    match catalogue.find(id) {
        Ok(it) => Html(render::item_page(it, &state.advice.resolve(it))).into_response(),
        Err(e) => {
            tracing::info!(error = %e, "item page lookup failed");
            (StatusCode::NOT_FOUND, Html(render::not_found_page())).into_response()
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/items?q=&category= - Query results
async fn get_items(State(state): State<AppState>, Query(params): Query<ListParams>) -> Response {
    match state.source.load().await {
        Ok(catalogue) => {
            let results = query(&catalogue, params.search(), &params.key());
            Json(ApiResponse::ok(results)).into_response()
        }
        Err(e) => load_failed(e),
    }
}

/// GET /api/items/:id - One item with advice
async fn get_item(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let catalogue = match state.source.load().await {
        Ok(catalogue) => catalogue,
        Err(e) => return load_failed(e),
    };

    match catalogue.find(parse_item_id(Some(&raw_id))) {
        Ok(it) => {
            let detail = ItemDetail {
                item: it,
                advice: state.advice.resolve(it),
            };
            Json(ApiResponse::ok(detail)).into_response()
        }
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::fail(e.to_string())),
        )
            .into_response(),
    }
}

/// GET /api/counts - Items per category tab
async fn get_counts(State(state): State<AppState>) -> Response {
    match state.source.load().await {
        Ok(catalogue) => Json(ApiResponse::ok(category_counts(&catalogue))).into_response(),
        Err(e) => load_failed(e),
    }
}

/// GET /api/confusing - Commonly misclassified items
async fn get_confusing(State(state): State<AppState>) -> Response {
    match state.source.load().await {
        Ok(catalogue) => Json(ApiResponse::ok(confusing_items(&catalogue))).into_response(),
        Err(e) => load_failed(e),
    }
}

/// GET /items.json - The raw catalogue
async fn get_catalogue(State(state): State<AppState>) -> Response {
    match state.source.load().await {
        Ok(catalogue) => Json(catalogue).into_response(),
        Err(e) => load_failed(e),
    }
}

fn build_router(state: AppState, static_dir: PathBuf) -> Router {
    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/items", get(get_items))
        .route("/items/:id", get(get_item))
        .route("/counts", get(get_counts))
        .route("/confusing", get(get_confusing))
        .with_state(state.clone());

    // Build main router
    Router::new()
        .route("/", get(serve_index))
        .route("/item", get(serve_item))
        .route("/items.json", get(get_catalogue))
        .with_state(state)
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ServerCli::parse();
    logging::init("info,tower_http=warn")?;

    let source = cli.catalogue.source();
    let advice = cli.catalogue.advice_book()?;
    tracing::info!(catalogue = %source, "WasteWise web server starting");

    let state = AppState {
        source: Arc::new(source),
        advice: Arc::new(advice),
    };

    let app = build_router(state, cli.static_dir);

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind to address {}", cli.bind))?;

    tracing::info!("Server running on http://{}", cli.bind);
    tracing::info!("API: http://{}/api/items", cli.bind);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
