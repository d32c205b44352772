use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use sonoscribe::application::ports::{AsrEngine, AudioCodec, ScratchStore};
use sonoscribe::application::services::{
    PipelineConfig, Preprocessor, TranscriptionService, UploadPipeline,
};
use sonoscribe::infrastructure::asr::{load_engine, BackendPreference};
use sonoscribe::infrastructure::audio::SymphoniaCodec;
use sonoscribe::infrastructure::observability::{init_tracing, TracingConfig};
use sonoscribe::infrastructure::storage::ScratchDir;
use sonoscribe::presentation::{create_router, AppState, BackendSetting, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(TracingConfig::default());

    let settings = Settings::load().context("failed to load settings")?;

    // The model is process-wide immutable state: loaded once here, before
    // the serving loop, shared read-only by every request after.
    let preference = match settings.asr.backend {
        BackendSetting::Auto => BackendPreference::Auto,
        BackendSetting::Accelerated => BackendPreference::Accelerated,
        BackendSetting::Cpu => BackendPreference::Cpu,
    };
    let engine = load_engine(&settings.asr.model_path, preference, settings.asr.threads)
        .context("failed to load the speech recognition model")?;
    let engine: Arc<dyn AsrEngine> = Arc::new(engine);

    let codec: Arc<dyn AudioCodec> = Arc::new(SymphoniaCodec::new());
    let store: Arc<dyn ScratchStore> = Arc::new(
        ScratchDir::new(&settings.scratch.dir).context("failed to prepare scratch storage")?,
    );

    let pipeline = UploadPipeline::new(
        store,
        Preprocessor::new(Arc::clone(&codec), settings.preprocessing.enabled),
        TranscriptionService::new(engine),
        PipelineConfig {
            max_upload_bytes: settings.scratch.max_upload_bytes(),
            transcription: settings.asr.transcription_config(),
        },
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    let router = create_router(state);

    let host: IpAddr = settings
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server host: {}", settings.server.host))?;
    let addr = SocketAddr::from((host, settings.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
