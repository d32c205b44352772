use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use sonoscribe::application::ports::{
    AsrEngine, AsrError, AudioCodec, AudioCodecError, ScratchStore, SegmentStream,
    TranscriptionConfig,
};
use sonoscribe::application::services::{
    PipelineConfig, Preprocessor, TranscriptionService, UploadPipeline,
};
use sonoscribe::domain::{AudioFormat, DetectionInfo, RawSegment};
use sonoscribe::infrastructure::storage::ScratchDir;
use sonoscribe::presentation::{create_router, AppState};

struct FixedEngine {
    segments: Vec<(f64, f64, &'static str)>,
    language: &'static str,
    probability: f32,
}

#[async_trait::async_trait]
impl AsrEngine for FixedEngine {
    async fn transcribe(
        &self,
        _audio: &Path,
        _config: &TranscriptionConfig,
    ) -> Result<(SegmentStream, DetectionInfo), AsrError> {
        let segments = self
            .segments
            .iter()
            .map(|(start, end, text)| RawSegment {
                start_secs: *start,
                end_secs: *end,
                text: (*text).to_string(),
            })
            .collect();
        Ok((
            SegmentStream::from_segments(segments),
            DetectionInfo {
                language: self.language.to_string(),
                probability: self.probability,
            },
        ))
    }
}

struct FailingEngine;

#[async_trait::async_trait]
impl AsrEngine for FailingEngine {
    async fn transcribe(
        &self,
        _audio: &Path,
        _config: &TranscriptionConfig,
    ) -> Result<(SegmentStream, DetectionInfo), AsrError> {
        Err(AsrError::InferenceFailed(
            "staged file unreadable".to_string(),
        ))
    }
}

/// Copies the staged file to the canonical path without touching the
/// audio, standing in for the real codec.
struct PassthroughCodec;

#[async_trait::async_trait]
impl AudioCodec for PassthroughCodec {
    async fn canonicalize(&self, input: &Path) -> Result<PathBuf, AudioCodecError> {
        let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("audio");
        let output = input.with_file_name(format!("{stem}_preprocessed.wav"));
        tokio::fs::copy(input, &output).await?;
        Ok(output)
    }

    async fn duration_secs(&self, _input: &Path) -> Result<f64, AudioCodecError> {
        Ok(60.0)
    }

    async fn slice(
        &self,
        _input: &Path,
        start_secs: f64,
        end_secs: f64,
        _output: &Path,
    ) -> Result<f64, AudioCodecError> {
        Ok(end_secs - start_secs)
    }
}

struct FailingCodec;

#[async_trait::async_trait]
impl AudioCodec for FailingCodec {
    async fn canonicalize(&self, _input: &Path) -> Result<PathBuf, AudioCodecError> {
        Err(AudioCodecError::DecodingFailed(
            "unsupported stream".to_string(),
        ))
    }

    async fn duration_secs(&self, _input: &Path) -> Result<f64, AudioCodecError> {
        Err(AudioCodecError::DecodingFailed(
            "unsupported stream".to_string(),
        ))
    }

    async fn slice(
        &self,
        _input: &Path,
        _start_secs: f64,
        _end_secs: f64,
        _output: &Path,
    ) -> Result<f64, AudioCodecError> {
        Err(AudioCodecError::DecodingFailed(
            "unsupported stream".to_string(),
        ))
    }
}

fn build_router(
    engine: Arc<dyn AsrEngine>,
    codec: Arc<dyn AudioCodec>,
    scratch: &Path,
    max_upload_bytes: u64,
) -> Router {
    let store: Arc<dyn ScratchStore> = Arc::new(ScratchDir::new(scratch).unwrap());
    let pipeline = UploadPipeline::new(
        store,
        Preprocessor::new(codec, true),
        TranscriptionService::new(engine),
        PipelineConfig {
            max_upload_bytes,
            transcription: TranscriptionConfig::default(),
        },
    );
    create_router(AppState {
        pipeline: Arc::new(pipeline),
    })
}

fn default_engine() -> Arc<dyn AsrEngine> {
    Arc::new(FixedEngine {
        segments: vec![(0.0, 1.2, "  xin chào "), (1.2, 2.4, "các bạn")],
        language: "vi",
        probability: 0.93,
    })
}

const BOUNDARY: &str = "sonoscribe-test-boundary";

fn multipart_upload(filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn empty_multipart() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(format!("--{BOUNDARY}--\r\n")))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn scratch_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[tokio::test]
async fn given_valid_upload_when_transcribing_then_returns_the_result_shape() {
    let scratch = tempfile::tempdir().unwrap();
    let router = build_router(
        default_engine(),
        Arc::new(PassthroughCodec),
        scratch.path(),
        1024 * 1024,
    );

    let response = router
        .oneshot(multipart_upload("greeting.wav", b"fake-wav-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["language"], "vi");
    assert_eq!(body["language_probability"], 0.93);
    assert_eq!(body["full_text"], "xin chào các bạn");
    let segments = body["segments"].as_array().unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0]["text"], "xin chào");
    assert_eq!(segments[0]["start"], 0.0);
    assert_eq!(segments[0]["end"], 1.2);
    assert!(body["processing_time"].as_f64().unwrap() >= 0.0);

    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn given_any_allowed_extension_when_uploading_then_the_request_succeeds() {
    for format in AudioFormat::ALL {
        let scratch = tempfile::tempdir().unwrap();
        let router = build_router(
            default_engine(),
            Arc::new(PassthroughCodec),
            scratch.path(),
            1024 * 1024,
        );

        let filename = format!("speech.{}", format.extension());
        let response = router
            .oneshot(multipart_upload(&filename, b"audio-bytes"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{filename}");
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert!(!body["segments"].as_array().unwrap().is_empty());
        assert!(scratch_is_empty(scratch.path()));
    }
}

#[tokio::test]
async fn given_no_file_part_when_uploading_then_returns_bad_request() {
    let scratch = tempfile::tempdir().unwrap();
    let router = build_router(
        default_engine(),
        Arc::new(PassthroughCodec),
        scratch.path(),
        1024 * 1024,
    );

    let response = router.oneshot(empty_multipart()).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "No file provided");
    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn given_an_empty_filename_when_uploading_then_returns_bad_request() {
    let scratch = tempfile::tempdir().unwrap();
    let router = build_router(
        default_engine(),
        Arc::new(PassthroughCodec),
        scratch.path(),
        1024 * 1024,
    );

    let response = router.oneshot(multipart_upload("", b"data")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "No file selected");
}

#[tokio::test]
async fn given_a_text_file_when_uploading_then_the_error_names_allowed_extensions() {
    let scratch = tempfile::tempdir().unwrap();
    let router = build_router(
        default_engine(),
        Arc::new(PassthroughCodec),
        scratch.path(),
        1024 * 1024,
    );

    let response = router
        .oneshot(multipart_upload("notes.txt", b"not audio"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    let message = body["error"].as_str().unwrap().to_string();
    for extension in ["mp3", "wav", "m4a", "ogg", "flac", "aac"] {
        assert!(message.contains(extension), "{message}");
    }
    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn given_an_oversized_upload_when_uploading_then_rejects_and_leaves_no_file() {
    let scratch = tempfile::tempdir().unwrap();
    let router = build_router(
        default_engine(),
        Arc::new(PassthroughCodec),
        scratch.path(),
        1024,
    );

    let oversized = vec![0u8; 8 * 1024];
    let response = router
        .oneshot(multipart_upload("big.mp3", &oversized))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("too large"));
    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn given_an_engine_failure_when_uploading_then_responds_500_after_cleanup() {
    let scratch = tempfile::tempdir().unwrap();
    let router = build_router(
        Arc::new(FailingEngine),
        Arc::new(PassthroughCodec),
        scratch.path(),
        1024 * 1024,
    );

    let response = router
        .oneshot(multipart_upload("speech.flac", b"audio-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Processing failed"));
    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn given_a_codec_failure_when_uploading_then_falls_back_and_still_succeeds() {
    let scratch = tempfile::tempdir().unwrap();
    let router = build_router(
        default_engine(),
        Arc::new(FailingCodec),
        scratch.path(),
        1024 * 1024,
    );

    let response = router
        .oneshot(multipart_upload("speech.ogg", b"audio-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn given_a_health_check_then_reports_healthy() {
    let scratch = tempfile::tempdir().unwrap();
    let router = build_router(
        default_engine(),
        Arc::new(PassthroughCodec),
        scratch.path(),
        1024 * 1024,
    );

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}
