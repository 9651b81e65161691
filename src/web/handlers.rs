use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use super::{ApiError, SharedState};
use crate::commands::{self, APP_IMAGE_NOTICE, Options, SubmitResult};
use crate::errors::AppError;
use crate::models::LearningSettings;
use crate::session::SessionView;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

#[derive(Debug, Deserialize)]
pub struct ExampleBody {
    pub phrase: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub text: Option<String>,
}

/// Parses a body that may be left out. An empty body means "not given",
/// anything else must be valid JSON for `T`.
fn optional_json<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AppError::InvalidInput(format!("malformed request body: {}", e)).into())
}

pub async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "language-tutor" }))
}

pub async fn options(State(state): State<SharedState>) -> Json<Options> {
    Json(commands::get_options(&state.config).await)
}

pub async fn app_image(State(state): State<SharedState>) -> Result<Response, ApiError> {
    match commands::load_app_image(&state.config).await? {
        Some(bytes) => Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response()),
        None => Err(ApiError::not_found(APP_IMAGE_NOTICE)),
    }
}

pub async fn create_session(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let settings = optional_json::<LearningSettings>(&body)?;
    let view = commands::create_session(&state, settings).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(commands::get_session(&state, id).await?))
}

pub async fn update_settings(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    settings: Result<Json<LearningSettings>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let Json(settings) = settings?;
    Ok(Json(commands::update_settings(&state, id, settings).await?))
}

pub async fn select_example(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    body: Result<Json<ExampleBody>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let Json(body) = body?;
    Ok(Json(commands::select_example(&state, id, &body.phrase).await?))
}

pub async fn submit_message(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<SubmitResult>, ApiError> {
    let text = optional_json::<MessageBody>(&body)?.and_then(|body| body.text);
    Ok(Json(
        commands::submit_message(&state, id, text.as_deref()).await?,
    ))
}

pub async fn clear_chat(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(commands::clear_chat(&state, id).await?))
}

pub async fn save_chat(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let transcript = commands::save_chat(&state, id).await?;
    let headers = [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", transcript.file_name),
        ),
    ];
    Ok((headers, transcript.content).into_response())
}

pub async fn end_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    commands::end_session(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
