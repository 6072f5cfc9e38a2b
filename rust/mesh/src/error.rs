// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for mesh ingestion.

/// Result type alias for mesh operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a mesh.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The binary STL header declares more triangles than the data holds.
    #[error("binary STL truncated: expected {expected} bytes, got {actual}")]
    TruncatedBinary { expected: usize, actual: usize },

    /// The ASCII STL body could not be parsed.
    #[error("malformed ASCII STL near: {0:?}")]
    MalformedAscii(String),

    /// ASCII STL is not valid UTF-8.
    #[error("invalid UTF-8 in ASCII STL: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The file parsed but contained no facets.
    #[error("STL contains no triangles")]
    Empty,
}
