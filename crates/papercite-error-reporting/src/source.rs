//! Source locations for diagnostics.
//!
//! A [`SourceSpan`] is a byte range into a named document. The document text
//! itself lives in a [`SourceContext`], which is only needed when rendering
//! a diagnostic with source context.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A byte range in a named source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    /// File name as given by the caller (usually a path).
    pub file: String,
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl SourceSpan {
    pub fn new(file: impl Into<String>, range: Range<usize>) -> Self {
        Self {
            file: file.into(),
            start: range.start,
            end: range.end,
        }
    }

    /// The span as a byte range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A file registered with a [`SourceContext`].
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

impl SourceFile {
    /// Convert a byte offset to a 0-indexed (row, column) pair.
    ///
    /// Columns count characters, not bytes. Offsets past the end clamp to the
    /// end of the file.
    pub fn offset_to_row_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.content.len());
        let before = &self.content[..floor_char_boundary(&self.content, offset)];
        let row = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count();
        (row, column)
    }
}

fn floor_char_boundary(s: &str, mut offset: usize) -> usize {
    while offset > 0 && !s.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Registry of source files that diagnostics may point into.
#[derive(Debug, Clone, Default)]
pub struct SourceContext {
    files: Vec<SourceFile>,
}

impl SourceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file. A later registration under the same name replaces
    /// the earlier content.
    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        if let Some(existing) = self.files.iter_mut().find(|f| f.name == name) {
            existing.content = content;
        } else {
            self.files.push(SourceFile { name, content });
        }
    }

    pub fn get_file(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
