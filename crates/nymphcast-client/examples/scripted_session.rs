//! Drive a full session against a simulated native binding.
//!
//! Run with: cargo run --example scripted_session -- [config.toml] [uri]
//! Example: cargo run --example scripted_session -- nymphcast.toml file:///sdcard/Music/song.mp3

use nymphcast_client::{
    BlockingTransport, CallbackHandler, ContentProvider, ContentReference, ControllerBuilder,
    ControllerEvent, Cursor, NativeBinding, ProviderError, Query, RemoteId,
};
use std::thread;
use std::time::Duration;

/// Stand-in for the JNI binding: every call blocks for a moment.
struct SimulatedBinding;

impl NativeBinding for SimulatedBinding {
    fn find_servers(&self) -> Vec<String> {
        thread::sleep(Duration::from_millis(300));
        vec!["192.168.1.20".to_string(), "192.168.1.21".to_string()]
    }

    fn set_client_id(&self, id: &str) {
        println!("[native] client id = {}", id);
    }

    fn connect_server(&self, id: RemoteId) -> bool {
        thread::sleep(Duration::from_millis(100));
        println!("[native] connected to {}", id);
        true
    }

    fn disconnect_server(&self, id: RemoteId) -> bool {
        println!("[native] disconnected from {}", id);
        true
    }

    fn cast_file(&self, path: &str) -> bool {
        println!("[native] streaming {}", path);
        true
    }

    fn cast_url(&self, url: &str) -> bool {
        println!("[native] casting {}", url);
        true
    }

    fn playback_start(&self) -> bool {
        true
    }

    fn playback_stop(&self) -> bool {
        true
    }

    fn list_applications(&self) -> String {
        "SoundCloud\nYouTube".to_string()
    }

    fn send_app_message(&self, app_id: &str, payload: &str) -> String {
        format!("{} acknowledged '{}'", app_id, payload)
    }
}

/// No content-provider backing outside the platform; only `file://` casts.
struct NoContentProvider;

impl ContentProvider for NoContentProvider {
    fn query(&self, _query: &Query) -> Result<Option<Box<dyn Cursor>>, ProviderError> {
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(true)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let builder = match args.get(1) {
        Some(path) if path.ends_with(".toml") => ControllerBuilder::from_config_file(path)?,
        _ => ControllerBuilder::new().client_id("scripted-session"),
    };
    let uri = args
        .iter()
        .skip(1)
        .find(|a| !a.ends_with(".toml"))
        .cloned()
        .unwrap_or_else(|| "file:///storage/emulated/0/Music/demo.mp3".to_string());

    let controller = builder
        .transport(BlockingTransport::new(SimulatedBinding))
        .content_provider(NoContentProvider)
        .event_handler(CallbackHandler::new(|event| match event {
            ControllerEvent::RemotesUpdated(remotes) => println!("* {} remotes", remotes.len()),
            ControllerEvent::ConnectionChanged { remote, state } => println!("* {} is {}", remote, state),
            ControllerEvent::CommandSent { command, accepted } => {
                println!("* {:?} {}", command, if accepted { "accepted" } else { "rejected" })
            }
            ControllerEvent::StatusUpdated(status) => println!("* status {:?}", status),
        }))
        .build()?;

    controller.start();

    let remotes = controller.discover().await?;
    for remote in &remotes {
        println!("  {} {}", remote.id, remote.display_name);
    }
    let Some(first) = remotes.first() else {
        println!("No receivers found");
        return Ok(());
    };

    controller.try_connect(first.id).await?;

    let reference = ContentReference::parse(&uri)?;
    println!("Cast result: {:?}", controller.cast_selected(&reference).await);

    println!("Applications:\n{}", controller.list_applications().await?);
    println!("{}", controller.send_app_message("soundcloud", "play").await?);

    tokio::time::sleep(Duration::from_millis(500)).await;
    controller.playback_stop().await;
    controller.shutdown().await;

    Ok(())
}
