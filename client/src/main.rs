//! Terminal front-end for clipcap.
//!
//! ```text
//! clipcap upload <video>   upload a video and pick a caption
//! clipcap mock <video>     same flow against the offline mock pipeline
//! clipcap chat             chat with the caption assistant
//! ```

use std::env;
use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use clipcap::api::ApiClient;
use clipcap::chat::{
    ChatController, NoopObserver, RemoteReplySource, ReplySource, SuggestionObserver,
};
use clipcap::config::ClientConfig;
use clipcap::flow::{FlowState, UploadFlow, VideoSelection};
use clipcap::logging;
use clipcap::memory::MemorySync;
use clipcap::models::Sender;
use clipcap::pipeline::{CaptionPipeline, MockPipeline, RemotePipeline, run_upload};

type Input = Lines<BufReader<Stdin>>;

const USAGE: &str = "usage: clipcap <upload <video> | mock <video> | chat>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();
    logging::init();

    let config = ClientConfig::from_env()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["upload", path] => {
            let api = Arc::new(ApiClient::new(&config.video_api, &config.fallback_hosts)?);
            let pipeline = RemotePipeline::new(api.clone());
            upload(&pipeline, Some(api), path, &mut input).await
        }
        ["mock", path] => {
            let pipeline = MockPipeline::new(config.mock_delay, &config.video_api);
            upload(&pipeline, None, path, &mut input).await
        }
        ["chat"] => {
            let api = Arc::new(ApiClient::new(&config.assistant_api, &config.fallback_hosts)?);
            let memory = match &config.creator_id {
                Some(id) => Some((
                    Arc::new(ApiClient::new(&config.memory_api, &config.fallback_hosts)?),
                    id.clone(),
                )),
                None => None,
            };
            chat(RemoteReplySource::new(api), memory, &mut input).await
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}

async fn upload(
    pipeline: &dyn CaptionPipeline,
    api: Option<Arc<ApiClient>>,
    path: &str,
    input: &mut Input,
) -> Result<(), Box<dyn Error>> {
    let flow = Mutex::new(UploadFlow::new());
    let mut selection = VideoSelection::from_path(path);

    loop {
        println!("Processing {} ({})...", selection.file_name, selection.mime_type);
        let state = run_upload(&flow, pipeline, selection).await?;
        let restarted = if state == FlowState::Preview {
            review(&flow, api.as_deref(), input).await?
        } else {
            let mut flow = flow.lock().unwrap_or_else(PoisonError::into_inner);
            println!("{}", flow.last_error().unwrap_or("Processing failed."));
            flow.restart();
            true
        };
        if !restarted {
            return Ok(());
        }

        println!("Path to next video (blank to quit):");
        let Some(next) = input.next_line().await? else {
            return Ok(());
        };
        let next = next.trim();
        if next.is_empty() {
            return Ok(());
        }
        selection = VideoSelection::from_path(next);
    }
}

/// Caption browsing loop. Returns true when the creator asked to start over.
async fn review(
    flow: &Mutex<UploadFlow>,
    api: Option<&ApiClient>,
    input: &mut Input,
) -> Result<bool, Box<dyn Error>> {
    loop {
        {
            let flow = flow.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(caption) = flow.current_caption() {
                println!(
                    "\n[{}/{}] {}\n  {} | {} | {}% match",
                    flow.current_index() + 1,
                    flow.captions().len(),
                    caption.caption,
                    caption.trend,
                    caption.engagement,
                    caption.confidence
                );
            }
        }
        println!("(n)ext (p)revious (c)hoose (r)estart (q)uit");

        let Some(line) = input.next_line().await? else {
            return Ok(false);
        };
        let mut flow = flow.lock().unwrap_or_else(PoisonError::into_inner);
        match line.trim() {
            "n" => {
                if !flow.next() {
                    println!("Already at the last caption.");
                }
            }
            "p" => {
                if !flow.previous() {
                    println!("Already at the first caption.");
                }
            }
            "c" => {
                let caption = flow.choose_current()?.caption.clone();
                println!("Chosen caption:\n  {caption}");
                let (Some(id), Some(name)) =
                    (flow.video_id().map(str::to_string), flow.download_file_name())
                else {
                    return Ok(false);
                };
                drop(flow);
                match api {
                    Some(api) => {
                        let data = api.download_video(&id).await?;
                        tokio::fs::write(&name, &data).await?;
                        println!("Saved {} ({} bytes)", name, data.len());
                    }
                    None => println!("Mock video, nothing to download ({name})."),
                }
                return Ok(false);
            }
            "r" => {
                flow.restart();
                println!("Flow restarted.");
                return Ok(true);
            }
            "q" => return Ok(false),
            other => println!("Unknown command: {other}"),
        }
    }
}

/// Chat session. Approved suggestions are remembered for `creator_id` when set.
async fn chat(
    source: impl ReplySource,
    memory: Option<(Arc<ApiClient>, String)>,
    input: &mut Input,
) -> Result<(), Box<dyn Error>> {
    let (observer, sync) = match &memory {
        Some((api, creator_id)) => {
            if let Err(e) = api.upsert_creator(creator_id, None).await {
                tracing::warn!(error = %e, creator_id = %creator_id, "Could not register creator");
            }
            let (sync, task) = MemorySync::spawn(api.clone(), creator_id.clone());
            (Arc::new(sync) as Arc<dyn SuggestionObserver>, Some(task))
        }
        None => (Arc::new(NoopObserver) as Arc<dyn SuggestionObserver>, None),
    };
    let mut controller = ChatController::new(observer);
    for message in controller.messages() {
        println!("bot> {}", message.text);
    }
    println!("Type a message, or /quit to leave.");

    loop {
        let Some(line) = input.next_line().await? else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }
        controller.set_input(line.clone());
        let Some(request) = controller.submit(&line) else {
            continue;
        };

        let reply = source.reply(&request).await;
        if !controller.receive_reply(request.request_id, reply) {
            continue;
        }
        println!("suggestion> {}", controller.pending().unwrap_or_default());
        println!("(a)pprove (e)dit (r)eject");

        let Some(choice) = input.next_line().await? else {
            break;
        };
        match choice.trim() {
            "a" => {
                if let Some(message) = controller.approve() {
                    println!("bot> {}", message.text);
                }
            }
            "e" => {
                controller.edit();
                println!("edit> {}", controller.input());
                println!("(submit the edited text as your next message)");
            }
            _ => {
                controller.reject();
            }
        }
    }

    let sent = controller
        .messages()
        .iter()
        .filter(|m| m.sender == Sender::User)
        .count();
    // The sync task ends once the controller drops its observer.
    drop(controller);
    let remembered = match sync {
        Some(task) => task.await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Memory sync task failed");
            0
        }),
        None => 0,
    };
    tracing::info!(sent, remembered, "Chat session ended");

    if let Some((api, creator_id)) = memory {
        match api.personalize(&creator_id).await {
            Ok(profile) => {
                if !profile.hints.preferred_hashtags.is_empty() {
                    println!("Your go-to hashtags: {}", profile.hints.preferred_hashtags.join(" "));
                }
                if let Some(niche) = profile.hints.niche {
                    println!("Niche: {niche}");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Could not load personalization"),
        }
    }
    Ok(())
}
