use crate::{
    error::AppError,
    mapper,
    models::{DownloadLinkRequest, FormatsQuery, HealthResponse},
    orchestrator::{self, Workflow},
    AppState,
};
use axum::{
    extract::{FromRequest, FromRequestParts, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

// ===================================================================
//                          HEALTH HANDLER
// ===================================================================

/// # GET /health - Static liveness payload.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Video download link service is running".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

// ===================================================================
//                          FORMATS HANDLER
// ===================================================================

/// # GET /formats - All video formats plus the best audio for a video URL.
pub async fn list_formats(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<FormatsQuery>,
) -> Result<Response, AppError> {
    validate_url(&state, &params.url)?;
    tracing::info!("Fetching formats for URL: {}", params.url);

    let options = state.extract_options(None);
    let (meta, selection) =
        orchestrator::run(state.extractor.as_ref(), &params.url, &options, Workflow::ListAll).await?;

    if params.legacy {
        let body = mapper::map_simplified(&meta, &selection.formats, params.max_quality);
        return Ok((StatusCode::OK, Json(body)).into_response());
    }
    Ok((StatusCode::OK, Json(mapper::map_response(&meta, &selection))).into_response())
}

// ===================================================================
//                          DOWNLOAD LINK HANDLERS
// ===================================================================

/// # POST /download-link - Selected download link(s) for a video URL.
pub async fn download_link(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<DownloadLinkRequest>,
) -> Result<impl IntoResponse, AppError> {
    resolve_download_link(&state, payload).await
}

/// # GET /download-link - Same as the POST variant, with query parameters.
pub async fn download_link_query(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<DownloadLinkRequest>,
) -> Result<impl IntoResponse, AppError> {
    resolve_download_link(&state, params).await
}

async fn resolve_download_link(
    state: &AppState,
    request: DownloadLinkRequest,
) -> Result<impl IntoResponse, AppError> {
    validate_url(state, &request.url)?;
    tracing::info!(
        "Resolving download link for URL: {}, format: {:?}, max quality: {:?}",
        request.url,
        request.format_id,
        request.max_quality
    );

    let options = state.extract_options(request.enable_remote);
    let workflow = Workflow::download(request.format_id.as_deref(), request.max_quality);
    let (meta, selection) =
        orchestrator::run(state.extractor.as_ref(), &request.url, &options, workflow).await?;

    if selection.is_empty() && state.config.empty_selection_not_found {
        return Err(AppError::NotFound(match workflow {
            Workflow::Explicit { format_id } => format!("Format '{}' is not available", format_id),
            _ => "No format matches the requested quality".to_string(),
        }));
    }

    Ok((StatusCode::OK, Json(mapper::map_response(&meta, &selection))))
}

// ===================================================================
//                          HELPER FUNCTIONS
// ===================================================================

/// `Query` that reports malformed parameters in the JSON error envelope.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// `Json` that reports malformed bodies in the JSON error envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Rejects empty URLs and hosts outside the allow-list before extraction.
fn validate_url(state: &AppState, url: &str) -> Result<(), AppError> {
    if url.trim().is_empty() {
        return Err(AppError::BadRequest("URL parameter cannot be empty".to_string()));
    }
    if !state.domains.is_supported(url) {
        tracing::warn!("Rejected unsupported URL: {}", url);
        return Err(AppError::UnsupportedUrl(url.to_string()));
    }
    Ok(())
}
