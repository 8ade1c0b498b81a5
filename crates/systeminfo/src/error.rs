use core::fmt;
use std::io;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    path: Option<PathBuf>,
    source: ErrorSource,
    kind: ErrorKind,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, source: ErrorSource, path: Option<PathBuf>) -> Self {
        Self { kind, source, path }
    }

    pub(crate) fn with_path(
        kind: ErrorKind,
        source: impl Into<ErrorSource>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::new(kind, source.into(), Some(path.into()))
    }

    pub(crate) fn without_path(kind: ErrorKind, source: impl Into<ErrorSource>) -> Self {
        Self::new(kind, source.into(), None)
    }

    pub(crate) fn unreadable(error: io::Error, path: impl AsRef<Path>) -> Self {
        Self::with_path(ErrorKind::Unreadable, error, path.as_ref())
    }

    pub(crate) fn unparseable(error: ParseIntError, path: impl AsRef<Path>) -> Self {
        Self::with_path(ErrorKind::Unparseable, error, path.as_ref())
    }

    pub(crate) fn unparseable_text(path: impl AsRef<Path>) -> Self {
        Self::with_path(ErrorKind::Unparseable, ErrorSource::None, path.as_ref())
    }

    pub(crate) fn empty(path: impl AsRef<Path>) -> Self {
        Self::with_path(ErrorKind::Empty, ErrorSource::None, path.as_ref())
    }

    pub(crate) fn invalid_interface_name() -> Self {
        Self::without_path(ErrorKind::InvalidName, ErrorSource::None)
    }

    pub(crate) fn invalid_block_name() -> Self {
        Self::without_path(ErrorKind::InvalidName, ErrorSource::None)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.kind == ErrorKind::Empty
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.source {
            ErrorSource::Io(e) => Some(e),
            ErrorSource::Parse(e) => Some(e),
            ErrorSource::None => None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum ErrorSource {
    Io(io::Error),
    Parse(ParseIntError),
    None,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ErrorKind {
    Unreadable,
    Unparseable,
    Empty,
    InvalidName,
}

impl From<io::Error> for ErrorSource {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ParseIntError> for ErrorSource {
    fn from(value: ParseIntError) -> Self {
        Self::Parse(value)
    }
}

impl fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => e.fmt(f),
            Self::Parse(e) => e.fmt(f),
            Self::None => f.write_str("<no source error>"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());

        match self.kind {
            ErrorKind::Unreadable => write!(f, "unable to read {path}: {}", self.source),
            ErrorKind::Unparseable => write!(f, "unable to parse {path}: {}", self.source),
            ErrorKind::Empty => write!(f, "no value present in {path}"),
            ErrorKind::InvalidName => f.write_str("device name is not valid utf-8"),
        }
    }
}
