//! Namespace paths
//!
//! Absolute, slash-delimited paths parsed into NFC-normalized segments.
//! Resolution against the entity store lives in [`resolver`].

pub mod resolver;

use crate::error::NamespaceError;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

pub use resolver::Resolver;

pub const DELIMITER: char = '/';

/// A parsed absolute path. The empty segment list is the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespacePath {
    segments: Vec<String>,
}

impl NamespacePath {
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse an absolute path.
    ///
    /// `""` and `"/"` are the root. Repeated and trailing delimiters are
    /// ignored. Relative paths, `.`/`..` segments and NUL bytes are rejected.
    pub fn parse(raw: &str) -> Result<Self, NamespaceError> {
        if raw.is_empty() {
            return Ok(Self::root());
        }
        if !raw.starts_with(DELIMITER) {
            return Err(invalid(raw, "path must be absolute"));
        }

        let mut segments = Vec::new();
        for segment in raw.split(DELIMITER).filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(invalid(raw, "relative segments are not supported"));
            }
            if segment.contains('\0') {
                return Err(invalid(raw, "segment contains a NUL byte"));
            }
            segments.push(segment.nfc().collect::<String>());
        }
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Final segment; None for the root.
    pub fn basename(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Containing path; None for the root.
    pub fn parent(&self) -> Option<NamespacePath> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    /// Append one segment, validated the same way `parse` validates.
    pub fn join(&self, segment: &str) -> Result<NamespacePath, NamespaceError> {
        let tail = Self::parse(&format!("{}{}", DELIMITER, segment))?;
        if tail.depth() != 1 {
            return Err(invalid(segment, "join takes exactly one segment"));
        }
        let mut segments = self.segments.clone();
        segments.extend(tail.segments);
        Ok(Self { segments })
    }

    /// Rendering of the first `len` segments, used in error messages.
    pub(crate) fn prefix_string(&self, len: usize) -> String {
        if len == 0 {
            return DELIMITER.to_string();
        }
        let mut out = String::new();
        for segment in &self.segments[..len.min(self.segments.len())] {
            out.push(DELIMITER);
            out.push_str(segment);
        }
        out
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix_string(self.segments.len()))
    }
}

fn invalid(path: &str, reason: &str) -> NamespaceError {
    NamespaceError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
