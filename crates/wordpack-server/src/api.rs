//! HTTP API for the learning operations, image upload, health and metrics.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};
use wordpack_learning::{
    ExplanationRequest, ExplanationResult, GeneratedPassage, GenerationRequest, ImageResult,
    LearningError, LearningService, QuestionItem, QuestionRequest,
};
use wordpack_ocr::OcrExtractor;

use crate::metrics::ServerMetrics;
use crate::upload::{self, UploadError, MAX_UPLOAD_BYTES};

/// Multipart framing allowance on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across handlers
pub struct AppState {
    pub learning: LearningService,
    pub ocr: OcrExtractor,
    pub uploads_dir: PathBuf,
    pub metrics: ServerMetrics,
}

type ApiError = (StatusCode, String);

/// Build the full router: learning routes under `/v1/api/learning`, plus
/// `/health` and `/metrics`.
pub fn router(state: Arc<AppState>) -> Router {
    let learning = Router::new()
        .route("/word2passage", post(word2passage))
        .route("/passage2question", post(passage2question))
        .route("/passage2explanation", post(passage2explanation))
        .route(
            "/upload_image",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD)),
        );

    Router::new()
        .nest("/v1/api/learning", learning)
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    state.metrics.encode().map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", e),
        )
    })
}

/// Map a service failure to a response and count it.
fn learning_failure(state: &AppState, operation: &'static str, err: LearningError) -> ApiError {
    match err {
        LearningError::Validation(msg) => {
            warn!("Rejected {} request: {}", operation, msg);
            (StatusCode::BAD_REQUEST, msg)
        }
        LearningError::Llm(e) => {
            error!("{} generation failed: {}", operation, e);
            state.metrics.record_generation(operation, "error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate {}: {}", operation, e),
            )
        }
    }
}

// POST /v1/api/learning/word2passage
async fn word2passage(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerationRequest>,
) -> Result<Json<GeneratedPassage>, ApiError> {
    let generated = state
        .learning
        .generate_passage(&req)
        .await
        .map_err(|e| learning_failure(&state, "passage", e))?;

    state
        .metrics
        .record_generation("passage", generated.outcome.as_str());
    Ok(Json(generated.value))
}

// POST /v1/api/learning/passage2question
async fn passage2question(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<Vec<QuestionItem>>, ApiError> {
    let generated = state
        .learning
        .generate_questions(&req)
        .await
        .map_err(|e| learning_failure(&state, "questions", e))?;

    if generated.value.is_empty() {
        state.metrics.record_generation("questions", "error");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate questions, please retry".to_string(),
        ));
    }

    state
        .metrics
        .record_generation("questions", generated.outcome.as_str());
    Ok(Json(generated.value))
}

// POST /v1/api/learning/passage2explanation
async fn passage2explanation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExplanationRequest>,
) -> Result<Json<ExplanationResult>, ApiError> {
    let generated = state
        .learning
        .generate_explanation(&req)
        .await
        .map_err(|e| learning_failure(&state, "explanation", e))?;

    state
        .metrics
        .record_generation("explanation", generated.outcome.as_str());
    Ok(Json(generated.value))
}

fn upload_failure(state: &AppState, err: UploadError) -> ApiError {
    let status = match err {
        UploadError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        UploadError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    if status.is_server_error() {
        error!("Upload failed: {}", err);
        state.metrics.record_upload("error");
    } else {
        warn!("Upload rejected: {}", err);
        state.metrics.record_upload("rejected");
    }
    (status, err.to_string())
}

// POST /v1/api/learning/upload_image (multipart field `image`)
async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ImageResult>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (e.status(), e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let stored_name = upload::validate_upload(field.file_name(), field.content_type())
            .map_err(|e| upload_failure(&state, e))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (e.status(), e.body_text()))?;
        upload = Some((stored_name, bytes));
        break;
    }

    let (stored_name, bytes) = upload
        .ok_or(UploadError::MissingFile)
        .map_err(|e| upload_failure(&state, e))?;

    let path = upload::persist(&state.uploads_dir, &stored_name, &bytes)
        .await
        .map_err(|e| upload_failure(&state, e))?;

    let words = state.ocr.extract_text(&path).await.map_err(|e| {
        error!("Text extraction failed for {}: {}", path.display(), e);
        state.metrics.record_upload("error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to read text from image: {}", e),
        )
    })?;

    state.metrics.record_upload("ok");
    Ok(Json(ImageResult {
        image_path: path.display().to_string(),
        words,
    }))
}
