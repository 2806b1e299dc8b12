//! Scoped ownership of provider cursors.

use crate::traits::Cursor;
use std::ops::{Deref, DerefMut};
use tracing::trace;

/// Owns a cursor and closes it when dropped, on every exit path.
pub struct CursorGuard {
    cursor: Box<dyn Cursor>,
}

impl CursorGuard {
    pub fn new(cursor: Box<dyn Cursor>) -> Self {
        Self { cursor }
    }

    /// Read a string column of the current row by name.
    pub fn string_column(&self, column: &str) -> Option<String> {
        let index = self.cursor.column_index(column)?;
        self.cursor.get_string(index)
    }

    /// Read an integer column of the current row by name.
    pub fn long_column(&self, column: &str) -> Option<i64> {
        let index = self.cursor.column_index(column)?;
        self.cursor.get_long(index)
    }
}

impl Deref for CursorGuard {
    type Target = dyn Cursor;

    fn deref(&self) -> &Self::Target {
        self.cursor.as_ref()
    }
}

impl DerefMut for CursorGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cursor.as_mut()
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        trace!("Closing content cursor");
        self.cursor.close();
    }
}
