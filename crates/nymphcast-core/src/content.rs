//! Content references handed over by the platform's content-provider layer.

use crate::error::ParseError;
use std::fmt;
use url::Url;

/// Authority of the external-storage document provider.
pub const EXTERNAL_STORAGE_AUTHORITY: &str = "com.android.externalstorage.documents";

/// Authority of the downloads document provider.
pub const DOWNLOADS_AUTHORITY: &str = "com.android.providers.downloads.documents";

/// Authority of the media document provider.
pub const MEDIA_AUTHORITY: &str = "com.android.providers.media.documents";

/// Authority of the plain media store collections.
pub const MEDIA_STORE_AUTHORITY: &str = "media";

/// Authority of the public downloads collection.
pub const DOWNLOADS_COLLECTION_AUTHORITY: &str = "downloads";

/// URI scheme of a content reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    File,
    Content,
    Other(String),
}

impl Scheme {
    /// Classify a scheme name (case-insensitive).
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("file") {
            Scheme::File
        } else if name.eq_ignore_ascii_case("content") {
            Scheme::Content
        } else {
            Scheme::Other(name.to_ascii_lowercase())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Scheme::File => "file",
            Scheme::Content => "content",
            Scheme::Other(name) => name,
        }
    }
}

/// Document providers the resolver knows how to dispatch on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityKind {
    ExternalStorage,
    Downloads,
    Media,
    Other(String),
}

impl AuthorityKind {
    pub fn from_authority(authority: &str) -> Self {
        match authority {
            EXTERNAL_STORAGE_AUTHORITY => AuthorityKind::ExternalStorage,
            DOWNLOADS_AUTHORITY => AuthorityKind::Downloads,
            MEDIA_AUTHORITY => AuthorityKind::Media,
            other => AuthorityKind::Other(other.to_string()),
        }
    }
}

/// Media collections addressable through the media document provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    /// Parse the type prefix of a media document id (`"audio:42"` → `Audio`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            "audio" => Some(MediaType::Audio),
            _ => None,
        }
    }

    /// Reference to the external collection holding this media type.
    pub fn external_collection(&self) -> ContentReference {
        let path = match self {
            MediaType::Image => "/external/images/media",
            MediaType::Video => "/external/video/media",
            MediaType::Audio => "/external/audio/media",
        };
        ContentReference::content(MEDIA_STORE_AUTHORITY, path)
    }
}

/// Opaque handle to a user-selected media item.
///
/// Holds the decoded path plus the decoded individual segments, since
/// document ids may themselves contain `/` once percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentReference {
    scheme: Scheme,
    authority: Option<String>,
    path: String,
    segments: Vec<String>,
}

impl ContentReference {
    /// Parse a URI string such as `content://media/external/audio/media/12`
    /// or `file:///sdcard/Music/song.mp3`.
    pub fn parse(uri: &str) -> Result<Self, ParseError> {
        let url = Url::parse(uri).map_err(|e| ParseError::InvalidUri(format!("{}: {}", uri, e)))?;

        let authority = url
            .host_str()
            .filter(|host| !host.is_empty())
            .map(str::to_string);

        let raw_path = url.path();
        let path = decode(raw_path)?;
        let segments = raw_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(decode)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            scheme: Scheme::from_name(url.scheme()),
            authority,
            path,
            segments,
        })
    }

    /// A raw file reference.
    pub fn file(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            scheme: Scheme::File,
            authority: None,
            segments: split_segments(&path),
            path,
        }
    }

    /// A plain content-provider reference.
    pub fn content(authority: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            scheme: Scheme::Content,
            authority: Some(authority.into()),
            segments: split_segments(&path),
            path,
        }
    }

    /// A document reference (`content://<authority>/document/<id>`).
    pub fn document(authority: impl Into<String>, document_id: impl Into<String>) -> Self {
        let document_id = document_id.into();
        Self {
            scheme: Scheme::Content,
            authority: Some(authority.into()),
            path: format!("/document/{}", document_id),
            segments: vec!["document".to_string(), document_id],
        }
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Decoded path component.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decoded, non-empty path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Append a numeric row id, as done for collection URIs.
    pub fn with_appended_id(&self, id: u64) -> Self {
        let id = id.to_string();
        let mut segments = self.segments.clone();
        segments.push(id.clone());
        Self {
            scheme: self.scheme.clone(),
            authority: self.authority.clone(),
            path: format!("{}/{}", self.path.trim_end_matches('/'), id),
            segments,
        }
    }
}

impl fmt::Display for ContentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}{}",
            self.scheme.as_str(),
            self.authority.as_deref().unwrap_or(""),
            self.path
        )
    }
}

fn decode(raw: &str) -> Result<String, ParseError> {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ParseError::InvalidEncoding(format!("{}: {}", raw, e)))
}

fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Document classification reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub authority: String,
    pub document_id: String,
}

impl DocumentInfo {
    /// Recognise the standard document path layouts:
    /// `/document/<id>` and `/tree/<tree-id>/document/<id>`.
    pub fn from_reference(reference: &ContentReference) -> Option<Self> {
        if reference.scheme() != &Scheme::Content {
            return None;
        }
        let authority = reference.authority()?;

        let document_id = match reference.segments() {
            [doc, id] if doc == "document" => id,
            [tree, _, doc, id] if tree == "tree" && doc == "document" => id,
            _ => return None,
        };

        Some(Self {
            authority: authority.to_string(),
            document_id: document_id.clone(),
        })
    }
}

/// A content reference resolved to a castable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub absolute_path: String,
}

impl ResolvedMedia {
    pub fn new(absolute_path: impl Into<String>) -> Self {
        Self {
            absolute_path: absolute_path.into(),
        }
    }
}
