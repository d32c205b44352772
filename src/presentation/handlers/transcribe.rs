use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::services::{PipelineError, UploadRequest, ValidationError};
use crate::domain::Transcription;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct TranscribeResponse {
    pub success: bool,
    pub language: String,
    pub language_probability: f64,
    pub segments: Vec<SegmentDto>,
    pub full_text: String,
    pub processing_time: f64,
}

#[derive(Serialize)]
pub struct SegmentDto {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl From<Transcription> for TranscribeResponse {
    fn from(transcription: Transcription) -> Self {
        Self {
            success: true,
            language: transcription.language,
            language_probability: transcription.language_probability,
            segments: transcription
                .segments
                .into_iter()
                .map(|s| SegmentDto {
                    start: s.start,
                    end: s.end,
                    text: s.text,
                })
                .collect(),
            full_text: transcription.full_text,
            processing_time: transcription.processing_time,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut field = match multipart.next_field().await {
        Ok(Some(f)) => f,
        Ok(None) => return validation_response(ValidationError::MissingFile),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read multipart body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to read upload: {}", e),
                }),
            )
                .into_response();
        }
    };

    let filename = field.file_name().unwrap_or_default().to_string();
    tracing::debug!(filename = %filename, "processing file upload");

    // Collect the field in chunks, stopping as soon as the size limit is
    // crossed so an oversized body is never buffered whole.
    let limit = state.pipeline.max_upload_bytes();
    let mut chunks = Vec::new();
    let mut received: u64 = 0;
    let mut limit_exceeded = false;
    loop {
        match field.chunk().await {
            Ok(Some(bytes)) => {
                received += bytes.len() as u64;
                if received > limit {
                    limit_exceeded = true;
                    chunks.clear();
                    break;
                }
                chunks.push(bytes);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read upload body");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Failed to read upload: {}", e),
                    }),
                )
                    .into_response();
            }
        }
    }

    let upload = UploadRequest {
        filename,
        received_bytes: received,
        limit_exceeded,
        chunks,
    };

    match state.pipeline.handle(upload).await {
        Ok(transcription) => {
            (StatusCode::OK, Json(TranscribeResponse::from(transcription))).into_response()
        }
        Err(PipelineError::Validation(err)) => validation_response(err),
        Err(err) => {
            tracing::error!(error = %err, "transcription request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Processing failed: {}", err),
                }),
            )
                .into_response()
        }
    }
}

fn validation_response(err: ValidationError) -> Response {
    tracing::warn!(error = %err, "upload rejected");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}
