//! Content-provider collaborator traits (supplied by the host platform).

use nymphcast_core::{ContentReference, DocumentInfo};
use thiserror::Error;

/// Failure reported by the platform's content provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// A content-provider query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub reference: ContentReference,
    pub projection: Vec<String>,
    pub selection: Option<String>,
    pub selection_args: Vec<String>,
    pub sort_order: Option<String>,
}

impl Query {
    pub fn new(reference: ContentReference) -> Self {
        Self {
            reference,
            projection: Vec::new(),
            selection: None,
            selection_args: Vec::new(),
            sort_order: None,
        }
    }

    pub fn projection<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn selection<I, S>(mut self, clause: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = Some(clause.into());
        self.selection_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn sort_order(mut self, order: impl Into<String>) -> Self {
        self.sort_order = Some(order.into());
        self
    }
}

/// Row cursor over a query result. Positioned before the first row.
pub trait Cursor {
    /// Advance to the next row; false once exhausted.
    fn move_to_next(&mut self) -> bool;

    fn column_index(&self, column: &str) -> Option<usize>;

    fn get_string(&self, index: usize) -> Option<String>;

    fn get_long(&self, index: usize) -> Option<i64>;

    /// Release the underlying platform handle.
    fn close(&mut self);
}

/// Platform content provider.
pub trait ContentProvider: Send + Sync {
    /// Run a query. `Ok(None)` is the platform's null cursor.
    fn query(&self, query: &Query) -> Result<Option<Box<dyn Cursor>>, ProviderError>;

    /// Classify a reference as a document, if it is one.
    fn document_info(&self, reference: &ContentReference) -> Option<DocumentInfo> {
        DocumentInfo::from_reference(reference)
    }
}
