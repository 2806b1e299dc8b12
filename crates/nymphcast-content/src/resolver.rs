//! Content reference → castable path resolution.

use crate::cursor::CursorGuard;
use crate::traits::{ContentProvider, Query};
use nymphcast_core::content::DOWNLOADS_COLLECTION_AUTHORITY;
use nymphcast_core::{
    AuthorityKind, ContentReference, DocumentInfo, MediaType, ResolutionError, ResolvedMedia,
    Scheme,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// Column holding the file path of a content-provider row.
pub const DATA_COLUMN: &str = "_data";

const PRIMARY_VOLUME: &str = "primary";

/// Resolves content references into absolute file paths.
///
/// Stateless apart from its collaborators; every call queries the provider
/// afresh.
#[derive(Clone)]
pub struct ContentResolver {
    provider: Arc<dyn ContentProvider>,
    external_storage_root: String,
}

impl ContentResolver {
    pub fn new(provider: Arc<dyn ContentProvider>, external_storage_root: impl Into<String>) -> Self {
        Self {
            provider,
            external_storage_root: external_storage_root.into(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn ContentProvider> {
        &self.provider
    }

    pub fn external_storage_root(&self) -> &str {
        &self.external_storage_root
    }

    /// Resolve a reference to an absolute path.
    pub fn resolve(&self, reference: &ContentReference) -> Result<ResolvedMedia, ResolutionError> {
        trace!("Resolving {}", reference);

        match reference.scheme() {
            Scheme::File => Ok(ResolvedMedia::new(reference.path())),
            Scheme::Content => match self.provider.document_info(reference) {
                Some(document) => self.resolve_document(&document),
                None => self.data_column(Query::new(reference.clone())),
            },
            Scheme::Other(name) => Err(ResolutionError::UnsupportedScheme(name.clone())),
        }
    }

    fn resolve_document(&self, document: &DocumentInfo) -> Result<ResolvedMedia, ResolutionError> {
        debug!(
            "Resolving document {} from {}",
            document.document_id, document.authority
        );

        match AuthorityKind::from_authority(&document.authority) {
            AuthorityKind::ExternalStorage => self.resolve_external_storage(&document.document_id),
            AuthorityKind::Downloads => {
                let id: u64 = document
                    .document_id
                    .parse()
                    .map_err(|_| ResolutionError::MalformedDocumentId(document.document_id.clone()))?;
                let downloads =
                    ContentReference::content(DOWNLOADS_COLLECTION_AUTHORITY, "/public_downloads");
                self.data_column(Query::new(downloads.with_appended_id(id)))
            }
            AuthorityKind::Media => {
                let (tag, row) = document
                    .document_id
                    .split_once(':')
                    .ok_or_else(|| ResolutionError::MalformedDocumentId(document.document_id.clone()))?;
                let media_type = MediaType::from_tag(tag)
                    .ok_or_else(|| ResolutionError::UnsupportedMediaType(tag.to_string()))?;
                self.data_column(
                    Query::new(media_type.external_collection()).selection("_id=?", [row]),
                )
            }
            AuthorityKind::Other(authority) => Err(ResolutionError::UnsupportedAuthority(authority)),
        }
    }

    fn resolve_external_storage(&self, document_id: &str) -> Result<ResolvedMedia, ResolutionError> {
        let (volume, relative) = match document_id.split_once(':') {
            Some((volume, relative)) => (volume, relative),
            None => (document_id, ""),
        };

        // Non-primary volumes have no portable mount point.
        if !volume.eq_ignore_ascii_case(PRIMARY_VOLUME) {
            return Err(ResolutionError::UnsupportedVolume(volume.to_string()));
        }

        let root = self.external_storage_root.trim_end_matches('/');
        if relative.is_empty() {
            Ok(ResolvedMedia::new(root))
        } else {
            Ok(ResolvedMedia::new(format!("{}/{}", root, relative)))
        }
    }

    /// Read the data column of the first row matching `query`.
    fn data_column(&self, query: Query) -> Result<ResolvedMedia, ResolutionError> {
        let query = query.projection([DATA_COLUMN]);
        let cursor = self
            .provider
            .query(&query)
            .map_err(|e| ResolutionError::Provider(e.to_string()))?
            .ok_or(ResolutionError::NotFound)?;

        let mut cursor = CursorGuard::new(cursor);
        if !cursor.move_to_next() {
            return Err(ResolutionError::NotFound);
        }

        cursor
            .string_column(DATA_COLUMN)
            .map(ResolvedMedia::new)
            .ok_or(ResolutionError::NotFound)
    }
}
