//! # nymphcast-core
//!
//! Core types, configuration, and error definitions shared across the
//! NymphCast remote crates.
//!
//! This crate provides:
//! - Remote receiver descriptors and connection states
//! - Content references and authority classification
//! - Cast commands, outcomes, and playback status
//! - Controller configuration
//! - Common error types

pub mod cast;
pub mod config;
pub mod content;
pub mod error;
pub mod remote;

pub use cast::{CastCommand, CastOutcome, CastSession, PlaybackStatus};
pub use config::ControllerConfig;
pub use content::{AuthorityKind, ContentReference, DocumentInfo, MediaType, ResolvedMedia, Scheme};
pub use error::{
    ChannelError, ConfigError, ConnectionFailure, DiscoveryError, Error, ParseError,
    ResolutionError, Result,
};
pub use remote::{ConnectionState, RemoteDescriptor, RemoteEntry, RemoteId};
