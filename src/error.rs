// ABOUTME: Error types for MessagePack decoding.
// ABOUTME: Every error carries the coding path (field names / indices) to the failure point.

use std::fmt;

/// The result type for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// One step of a coding path: a keyed field or a positional index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_owned())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// The sequence of field names and array indices leading to a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CodingPath {
    segments: Vec<PathSegment>,
}

impl CodingPath {
    /// The empty path, denoting the root value.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Errors bubble up from the innermost value outward, so each enclosing
    /// container adds its segment in front.
    fn prepend(&mut self, segment: PathSegment) {
        self.segments.insert(0, segment);
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for CodingPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CodingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Reasons a byte sequence is not valid MessagePack (or exceeds configured limits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Corruption {
    #[error("unexpected end of input")]
    Truncated,

    #[error("trailing bytes after document")]
    TrailingBytes,

    #[error("unassigned marker byte: 0x{0:02x}")]
    InvalidMarker(u8),

    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,

    /// A container declared more elements than the remaining input could hold.
    #[error("declared length {declared} exceeds the {available} bytes remaining")]
    LengthExceedsInput { declared: usize, available: usize },

    #[error("maximum nesting depth exceeded")]
    DepthLimitExceeded,

    #[error("maximum document size exceeded")]
    DocumentTooLarge,

    /// Timestamp extension with an unsupported payload length or nanoseconds >= 10^9.
    #[error("malformed timestamp extension")]
    InvalidTimestamp,
}

/// Errors that can occur while decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The encoded value cannot be decoded as the requested type under the
    /// active numeric strategy, or a container view was requested over an
    /// incompatible value.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        path: CodingPath,
    },

    /// A required field was absent from a keyed container.
    #[error("key not found at {path}: `{key}`")]
    KeyNotFound { key: String, path: CodingPath },

    /// The input is malformed.
    #[error("data corrupted at {path}: {reason}")]
    DataCorrupted { reason: Corruption, path: CodingPath },

    /// Message raised by a target type (serde integration).
    #[error("{message} (at {path})")]
    Custom { message: String, path: CodingPath },
}

impl Error {
    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
            path: CodingPath::root(),
        }
    }

    pub(crate) fn key_not_found(key: impl Into<String>) -> Self {
        Error::KeyNotFound {
            key: key.into(),
            path: CodingPath::root(),
        }
    }

    /// Attach an enclosing path segment; called as the error leaves each container.
    #[must_use]
    pub(crate) fn at(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path_mut().prepend(segment.into());
        self
    }

    /// Returns the standardized error type name.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::TypeMismatch { .. } => "type_mismatch",
            Error::KeyNotFound { .. } => "key_not_found",
            Error::DataCorrupted { .. } => "data_corrupted",
            Error::Custom { .. } => "custom",
        }
    }

    /// The coding path at which the error occurred.
    #[must_use]
    pub fn path(&self) -> &CodingPath {
        match self {
            Error::TypeMismatch { path, .. }
            | Error::KeyNotFound { path, .. }
            | Error::DataCorrupted { path, .. }
            | Error::Custom { path, .. } => path,
        }
    }

    /// The corruption reason, if this is a `DataCorrupted` error.
    #[must_use]
    pub fn corruption(&self) -> Option<Corruption> {
        match self {
            Error::DataCorrupted { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    fn path_mut(&mut self) -> &mut CodingPath {
        match self {
            Error::TypeMismatch { path, .. }
            | Error::KeyNotFound { path, .. }
            | Error::DataCorrupted { path, .. }
            | Error::Custom { path, .. } => path,
        }
    }
}

impl From<Corruption> for Error {
    fn from(reason: Corruption) -> Self {
        Error::DataCorrupted {
            reason,
            path: CodingPath::root(),
        }
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Corruption::InvalidUtf8.into()
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom {
            message: msg.to_string(),
            path: CodingPath::root(),
        }
    }

    fn invalid_type(unexp: serde::de::Unexpected<'_>, exp: &dyn serde::de::Expected) -> Self {
        Error::mismatch(exp.to_string(), unexp.to_string())
    }

    fn missing_field(field: &'static str) -> Self {
        Error::key_not_found(field)
    }
}
