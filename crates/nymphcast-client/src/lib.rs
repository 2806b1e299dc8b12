//! # nymphcast-client
//!
//! Remote discovery and cast session controller for NymphCast receivers.
//!
//! This crate provides:
//! - A registry of discovered remotes with a single-active-connection rule
//! - Connect/disconnect sequencing against an abstract transport
//! - Casting of locally selected media and URLs
//! - Request/response messaging to receiver applications
//!
//! ## Example
//!
//! ```ignore
//! use nymphcast_client::{Controller, BlockingTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = Controller::builder()
//!         .transport(BlockingTransport::new(binding))
//!         .content_provider(provider)
//!         .build()?;
//!     controller.start();
//!
//!     let remotes = controller.discover().await?;
//!     if let Some(remote) = remotes.first() {
//!         controller.try_connect(remote.id).await?;
//!         controller.cast_selected(&selected_item).await;
//!     }
//!
//!     controller.shutdown().await;
//!     Ok(())
//! }
//! ```

mod builder;
mod channel;
mod connection;
mod controller;
mod discovery;
mod dispatcher;
mod events;
mod registry;
mod shared;
mod transport;

pub use builder::ControllerBuilder;
pub use controller::{Controller, StatusSink};
pub use discovery::{DiscoveryHandle, DiscoverySink};
pub use events::{CallbackHandler, ChannelHandler, ControllerEvent, EventHandler, NoOpHandler};
pub use registry::RemoteRegistry;
pub use transport::{BlockingTransport, NativeBinding, Transport};

// Re-export commonly used types
pub use nymphcast_content::{ContentProvider, ContentResolver, Cursor, MediaItem, MediaLibrary, ProviderError, Query};
pub use nymphcast_core::{
    CastCommand, CastOutcome, CastSession, ChannelError, ConnectionFailure, ConnectionState,
    ContentReference, ControllerConfig, DiscoveryError, Error, PlaybackStatus, RemoteDescriptor,
    RemoteEntry, RemoteId, ResolutionError, Result,
};
