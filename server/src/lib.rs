use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pantry_core::persist::{load_index, IndexPaths};
use pantry_core::{
    Catalog, IndexHandle, InventoryModel, InventorySource, MatchResult, Need, RankingConfig, Recommender,
    RelevanceMatcher, TextIndex,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
}

#[derive(Deserialize, Default)]
pub struct NeedsRequest {
    /// Candidate needs; every tracked inventory item when omitted.
    #[serde(default)]
    pub needs: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct MatchHit {
    pub doc_id: u32,
    pub relevance: f64,
    pub name: String,
    pub price: String,
    pub category: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

impl From<MatchResult<'_>> for MatchHit {
    fn from(m: MatchResult<'_>) -> Self {
        Self {
            doc_id: m.doc_id,
            relevance: m.relevance,
            name: m.product.name.clone(),
            price: m.product.price.clone(),
            category: m.product.category.clone(),
            url: m.product.url.clone(),
            image_url: m.product.image_url.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub results: Vec<MatchHit>,
}

#[derive(Serialize)]
pub struct RecommendResponse {
    pub need: Need,
    pub matches: Vec<MatchHit>,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub num_docs: usize,
    pub num_terms: usize,
}

/// Error surfaced to HTTP clients as `{ "error": ... }`.
#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub String);

impl From<pantry_core::Error> for ApiError {
    fn from(err: pantry_core::Error) -> Self {
        let status = match &err {
            pantry_core::Error::NoCandidates => StatusCode::UNPROCESSABLE_ENTITY,
            pantry_core::Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            pantry_core::Error::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<IndexHandle>,
    pub inventory: Arc<InventoryModel>,
    pub config: Arc<RankingConfig>,
    pub catalog_path: Option<PathBuf>,
    pub admin_token: Option<String>,
}

/// Where the server gets its data at startup. A prebuilt index wins over a
/// catalog; with neither, the server runs on an empty index.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub catalog: Option<String>,
    pub index: Option<String>,
    pub inventory: Option<String>,
    pub config: Option<String>,
}

pub fn build_app(opts: AppOptions) -> Result<Router> {
    let index = match (&opts.index, &opts.catalog) {
        (Some(dir), _) => load_index(&IndexPaths::new(dir))?,
        (None, Some(path)) => TextIndex::build(&Catalog::load_or_empty(path)),
        (None, None) => TextIndex::new(),
    };
    let inventory = match &opts.inventory {
        Some(path) => InventoryModel::from_path(path)?,
        None => InventoryModel::default(),
    };
    let config = match &opts.config {
        Some(path) => RankingConfig::from_path(path)?,
        None => RankingConfig::default(),
    };
    let state = AppState {
        index: Arc::new(IndexHandle::new(index)),
        inventory: Arc::new(inventory),
        config: Arc::new(config),
        catalog_path: opts.catalog.map(PathBuf::from),
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
    };
    Ok(build_router(state))
}

pub fn build_router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/rank", post(rank_handler))
        .route("/recommend", post(recommend_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn candidates(state: &AppState, req: NeedsRequest) -> Vec<String> {
    req.needs.unwrap_or_else(|| state.inventory.names())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let index = state.index.current();
    let matcher = RelevanceMatcher::new(state.config.relevance_threshold)?;
    let k = params.k.unwrap_or(state.config.top_n);
    let results = matcher.find(&index, &params.q, k)?.into_iter().map(MatchHit::from).collect();
    Ok(Json(SearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), results }))
}

pub async fn rank_handler(
    State(state): State<AppState>,
    Json(req): Json<NeedsRequest>,
) -> Result<Json<Vec<Need>>, ApiError> {
    let index = state.index.current();
    let recommender = Recommender::new(&index, state.inventory.as_ref(), &state.config)?;
    Ok(Json(recommender.prioritize(candidates(&state, req))))
}

pub async fn recommend_handler(
    State(state): State<AppState>,
    Json(req): Json<NeedsRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let index = state.index.current();
    let recommender = Recommender::new(&index, state.inventory.as_ref(), &state.config)?;
    let rec = recommender.recommend(candidates(&state, req))?;
    Ok(Json(RecommendResponse { need: rec.need, matches: rec.matches.into_iter().map(MatchHit::from).collect() }))
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<ReloadResponse>, ApiError> {
    authorize(&state, &headers)?;
    let path = state
        .catalog_path
        .clone()
        .ok_or_else(|| ApiError(StatusCode::CONFLICT, "server was started without a catalog path".into()))?;
    let index = tokio::task::spawn_blocking(move || Catalog::load(path).map(|catalog| TextIndex::build(&catalog)))
        .await
        .map_err(|e| ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    let response = ReloadResponse { num_docs: index.num_docs(), num_terms: index.num_terms() };
    state.index.replace(index);
    Ok(Json(response))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(ApiError(StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError(StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
