//! # nymphcast-content
//!
//! Resolution of platform content references into castable file paths.
//!
//! This crate provides:
//! - The content-provider collaborator traits (query + cursor)
//! - Scoped cursor release
//! - The content resolver and its data-column lookup
//! - Audio library listing
//!
//! ## Example
//!
//! ```ignore
//! use nymphcast_content::ContentResolver;
//! use nymphcast_core::ContentReference;
//!
//! let resolver = ContentResolver::new(provider, "/storage/emulated/0");
//! let reference = ContentReference::parse(uri)?;
//! let media = resolver.resolve(&reference)?;
//! println!("cast {}", media.absolute_path);
//! ```

mod cursor;
mod library;
mod resolver;
mod traits;

pub use cursor::CursorGuard;
pub use library::{MediaItem, MediaLibrary};
pub use resolver::{ContentResolver, DATA_COLUMN};
pub use traits::{ContentProvider, Cursor, ProviderError, Query};
