//! `ApiClient` against the real backends, each served on an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tempfile::TempDir;
use tokio::net::TcpListener;

use clipcap::api::ApiClient;
use clipcap::chat::ChatController;
use clipcap::memory::MemorySync;
use clipcap_api::domain::{CreatorMemory, InMemoryVideoStore};
use clipcap_api::router::{build_assistant_app, build_memory_app, build_video_app};
use clipcap_api::services::assistant::Assistant;
use clipcap_api::services::captions::TemplateCaptionSource;
use clipcap_api::state::{AssistantState, MemoryState, VideoState};
use clipcap_api::storage::UploadStorage;

async fn serve(app: impl FnOnce(&str) -> Router) -> ApiClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));
    let app = app(&base);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    ApiClient::with_candidates(vec![base]).expect("client")
}

async fn video_backend(dir: &TempDir) -> ApiClient {
    let uploads = dir.path().join("uploads");
    serve(|base| {
        build_video_app(
            Arc::new(VideoState {
                store: Arc::new(InMemoryVideoStore::new()),
                captions: Arc::new(TemplateCaptionSource::new()),
                storage: UploadStorage::new(uploads),
                public_base_url: base.to_string(),
                caption_delay: Duration::ZERO,
            }),
            &[],
        )
    })
    .await
}

#[tokio::test]
async fn video_round_trip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let api = video_backend(&dir).await;
    let data = b"fake mp4 bytes".to_vec();

    let uploaded = api
        .upload_video("clip.mp4", "video/mp4", data.clone())
        .await
        .expect("upload");
    assert!(uploaded.filename.ends_with("clip.mp4"));

    let generated = api.generate_captions(&uploaded.video_id).await.expect("captions");
    assert_eq!(generated.captions.len(), 3);

    let video = api.video(&uploaded.video_id).await.expect("video");
    assert_eq!(video.id, uploaded.video_id);
    assert_eq!(video.original_name, "clip.mp4");
    assert_eq!(video.size, data.len() as u64);
    assert_eq!(video.captions.map(|c| c.len()), Some(3));

    let downloaded = api.download_video(&uploaded.video_id).await.expect("download");
    assert_eq!(downloaded.as_ref(), data.as_slice());
}

#[tokio::test]
async fn unknown_video_surfaces_the_server_message() {
    let dir = tempfile::tempdir().expect("temp dir");
    let api = video_backend(&dir).await;

    let err = api.video("doesnotexist").await.expect_err("missing video");
    assert_eq!(err.server_message().as_deref(), Some("Video not found"));
}

#[tokio::test]
async fn offline_assistant_drafts_and_trends() {
    let api = serve(|_| {
        build_assistant_app(
            Arc::new(AssistantState {
                assistant: Assistant::new(None),
            }),
            &[],
        )
    })
    .await;

    let drafts = api
        .generate_caption("cooking pasta", "funny", true)
        .await
        .expect("caption");
    assert!(!drafts.using_ai);
    assert!(drafts.include_hashtags);
    assert_eq!(drafts.captions.len(), 1);
    assert_eq!(drafts.captions[0].hashtags, vec!["#ai", "#generated", "#content"]);
    assert_eq!(drafts.captions[0].alternatives.len(), 2);

    let food = api.trends(Some("food & drink")).await.expect("trends");
    assert_eq!(food.category, "food & drink");
    assert!(!food.hashtags.is_empty());

    let general = api.trends(None).await.expect("trends");
    assert_eq!(general.category, "general");
}

#[tokio::test]
async fn approved_suggestions_become_creator_memories() {
    let api = Arc::new(
        serve(|_| {
            build_memory_app(
                Arc::new(MemoryState {
                    memory: CreatorMemory::new(),
                }),
                &[],
            )
        })
        .await,
    );

    let creator = api.upsert_creator("creator_123", Some("@coolkid")).await.expect("creator");
    assert_eq!(creator.locale, "en");

    let (sync, task) = MemorySync::spawn(api.clone(), "creator_123");
    let mut chat = ChatController::new(Arc::new(sync));
    let request = chat.submit("ramen video").expect("request");
    assert!(chat.receive_reply(request.request_id, "Budget ramen hack 🍜 #ramen #budget!"));
    chat.approve().expect("approved");
    drop(chat);

    assert_eq!(task.await.expect("sync task"), 1);

    let profile = api.personalize("creator_123").await.expect("personalize");
    assert_eq!(profile.examples.len(), 1);
    assert_eq!(profile.examples[0].caption, "Budget ramen hack 🍜 #ramen #budget!");
    assert_eq!(profile.hints.preferred_hashtags, vec!["#ramen", "#budget"]);
    assert_eq!(profile.guardrails.tone, "friendly");
}

#[tokio::test]
async fn memories_for_unknown_creator_are_not_stored() {
    let api = Arc::new(
        serve(|_| {
            build_memory_app(
                Arc::new(MemoryState {
                    memory: CreatorMemory::new(),
                }),
                &[],
            )
        })
        .await,
    );

    let (sync, task) = MemorySync::spawn(api.clone(), "ghost");
    let mut chat = ChatController::new(Arc::new(sync));
    let request = chat.submit("hi").expect("request");
    chat.receive_reply(request.request_id, "hello #there");
    chat.approve();
    drop(chat);

    assert_eq!(task.await.expect("sync task"), 0);
}
