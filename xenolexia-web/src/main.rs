use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use xenolexia::dictionary::DictionaryProvider;
use xenolexia::models::ForeignWordRecord;
use xenolexia::vocabulary::VocabularyRepository;
use xenolexia::{
    AppConfig, ConfigError, ContentProcessor, ProcessingOptions, ProcessingStats, ProficiencyLevel,
    RenderMode, ReviewError, StorageError, VocabularyItem, VocabularyService, VocabularyStats,
};

const DEFAULT_DUE_LIMIT: usize = 20;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub content: String,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    pub proficiency_level: Option<ProficiencyLevel>,
    pub density: Option<f64>,
    pub render_mode: Option<RenderMode>,
}

impl ProcessRequest {
    /// Request fields layered over the server defaults
    fn options(&self, defaults: &ProcessingOptions) -> ProcessingOptions {
        ProcessingOptions {
            source_language: self.source_language.clone().unwrap_or_else(|| defaults.source_language.clone()),
            target_language: self.target_language.clone().unwrap_or_else(|| defaults.target_language.clone()),
            proficiency_level: self.proficiency_level.unwrap_or(defaults.proficiency_level),
            density: self.density.unwrap_or(defaults.density),
            render_mode: self.render_mode.unwrap_or(defaults.render_mode),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub content: String,
    pub foreign_words: Vec<ForeignWordRecord>,
    pub stats: ProcessingStats,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWordRequest {
    pub record: ForeignWordRecord,
    pub context_sentence: Option<String>,
    pub book_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    /// Wide enough that out-of-range grades reach validation instead of failing to parse
    pub quality: i64,
}

#[derive(Deserialize)]
pub struct DueQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error mapped onto an HTTP status with a JSON body
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorResponse { error: self.1 })).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        let status = match error {
            StorageError::NotFound(_) => StatusCode::NOT_FOUND,
            StorageError::Duplicate(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, error.to_string())
    }
}

impl From<ReviewError> for ApiError {
    fn from(error: ReviewError) -> Self {
        match error {
            ReviewError::InvalidQuality(_) => ApiError(StatusCode::BAD_REQUEST, error.to_string()),
            ReviewError::Storage(storage) => storage.into(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(error: ConfigError) -> Self {
        ApiError(StatusCode::BAD_REQUEST, error.to_string())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub dictionary: Arc<dyn DictionaryProvider>,
    pub defaults: ProcessingOptions,
    pub vocabulary: Arc<VocabularyService<Arc<dyn VocabularyRepository>>>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/process", post(process_content))
        .route("/api/vocabulary", post(save_word))
        .route("/api/vocabulary/due", get(due_for_review))
        .route("/api/vocabulary/stats", get(vocabulary_stats))
        .route("/api/vocabulary/{id}/review", post(record_review))
        .route("/api/vocabulary/{id}", delete(delete_word))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::var("XENOLEXIA_CONFIG").unwrap_or_else(|_| "xenolexia.json".to_string());
    let config = AppConfig::load(Some(std::path::Path::new(&config_path)))
        .map_err(|e| format!("Failed to load configuration: {}", e))?;

    let dictionary = config
        .build_dictionary()
        .await
        .map_err(|e| format!("Failed to initialize dictionary: {}", e))?;
    let vocabulary = config
        .open_vocabulary()
        .await
        .map_err(|e| format!("Failed to open vocabulary: {}", e))?;

    let state = AppState {
        dictionary,
        defaults: config.processing.clone(),
        vocabulary: Arc::new(VocabularyService::new(vocabulary)),
    };

    info!("📖 Starting xenolexia web server");

    let addr = std::env::var("XENOLEXIA_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server running at http://{}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

async fn process_content(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let options = request.options(&state.defaults);
    let processor = ContentProcessor::new(state.dictionary.clone(), &options)?;

    let outcome = processor.process_content(&request.content).await;
    let reason = outcome.degradation_reason().map(|e| e.to_string());
    if let Some(reason) = &reason {
        warn!("Serving unprocessed content: {}", reason);
    }

    let degraded = outcome.is_degraded();
    let processed = outcome.into_processed();
    Ok(Json(ProcessResponse {
        content: processed.content,
        foreign_words: processed.foreign_words,
        stats: processed.stats,
        degraded,
        reason,
    }))
}

async fn save_word(
    State(state): State<AppState>,
    Json(request): Json<SaveWordRequest>,
) -> Result<(StatusCode, Json<VocabularyItem>), ApiError> {
    let item = state
        .vocabulary
        .save_word(&request.record, request.context_sentence, request.book_id)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn due_for_review(
    State(state): State<AppState>,
    Query(query): Query<DueQuery>,
) -> Result<Json<Vec<VocabularyItem>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_DUE_LIMIT);
    Ok(Json(state.vocabulary.due_for_review(limit).await?))
}

async fn record_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<VocabularyItem>, ApiError> {
    let item = state.vocabulary.record_review(&id, request.quality).await?;
    info!("Reviewed {} ({}): now {}", item.source_word, id, item.status);
    Ok(Json(item))
}

async fn vocabulary_stats(State(state): State<AppState>) -> Result<Json<VocabularyStats>, ApiError> {
    Ok(Json(state.vocabulary.stats().await?))
}

async fn delete_word(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state.vocabulary.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
