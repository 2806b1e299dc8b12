//! Listing of the device's local audio library.

use crate::cursor::CursorGuard;
use crate::traits::{ContentProvider, Query};
use nymphcast_core::{ContentReference, MediaType, ResolutionError};
use std::sync::Arc;
use tracing::{debug, warn};

/// A castable item from the local media library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub title: String,
    pub album: String,
    pub artist: String,
    /// Row reference; resolves through the data-column lookup.
    pub reference: ContentReference,
}

/// Queries the platform media store.
pub struct MediaLibrary {
    provider: Arc<dyn ContentProvider>,
}

impl MediaLibrary {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self { provider }
    }

    /// List music tracks, ordered by title.
    pub fn load_audio(&self) -> Result<Vec<MediaItem>, ResolutionError> {
        let collection = MediaType::Audio.external_collection();
        let query = Query::new(collection.clone())
            .projection(["_id", "title", "album", "artist"])
            .selection("is_music != 0", Vec::<String>::new())
            .sort_order("title ASC");

        let Some(cursor) = self
            .provider
            .query(&query)
            .map_err(|e| ResolutionError::Provider(e.to_string()))?
        else {
            debug!("Media store returned no cursor");
            return Ok(Vec::new());
        };

        let mut cursor = CursorGuard::new(cursor);
        let mut items = Vec::new();
        while cursor.move_to_next() {
            let Some(id) = cursor.long_column("_id").and_then(|id| u64::try_from(id).ok()) else {
                warn!("Skipping media row without a valid id");
                continue;
            };

            items.push(MediaItem {
                title: cursor.string_column("title").unwrap_or_default(),
                album: cursor.string_column("album").unwrap_or_default(),
                artist: cursor.string_column("artist").unwrap_or_default(),
                reference: collection.with_appended_id(id),
            });
        }

        debug!("Loaded {} audio items", items.len());
        Ok(items)
    }
}
