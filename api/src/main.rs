//! Video upload and caption backend.

use std::sync::Arc;

use clipcap_api::config::VideoServerConfig;
use clipcap_api::domain::InMemoryVideoStore;
use clipcap_api::router::build_video_app;
use clipcap_api::services::captions::TemplateCaptionSource;
use clipcap_api::state::VideoState;
use clipcap_api::storage::UploadStorage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    clipcap_api::init_tracing("clipcap_api=debug,tower_http=info");

    let config = VideoServerConfig::from_env()?;

    let storage = UploadStorage::new(&config.upload_dir);
    storage.ensure_dir().await?;

    let state = Arc::new(VideoState {
        store: Arc::new(InMemoryVideoStore::new()),
        captions: Arc::new(TemplateCaptionSource::new()),
        storage,
        public_base_url: config.public_base_url.clone(),
        caption_delay: config.caption_delay,
    });

    let app = build_video_app(state, &config.cors_origins);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        upload_dir = %config.upload_dir.display(),
        caption_delay_ms = config.caption_delay.as_millis() as u64,
        "Video backend listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(clipcap_api::shutdown_signal())
        .await?;
    Ok(())
}
