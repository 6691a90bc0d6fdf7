use std::fmt;
use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("path already exists: {0}")]
    FileAlreadyExists(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Generic storage-system failure reported by the client.
    #[error("alluxio error: {0}")]
    Alluxio(String),

    #[error("directory is not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("path does not exist: {0}")]
    FileDoesNotExist(String),

    // Caller-side misuse, outside the client's failure taxonomy.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Maps a local `io::Error` onto the typed variants where the kind is known.
    pub fn from_io(err: io::Error, path: &str) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
                Error::FileDoesNotExist(path.to_string())
            }
            io::ErrorKind::AlreadyExists => Error::FileAlreadyExists(path.to_string()),
            io::ErrorKind::DirectoryNotEmpty => Error::DirectoryNotEmpty(path.to_string()),
            _ => Error::Io(err),
        }
    }

    /// Folds any failure into `Error::Io`, keeping the wrapped error as its source.
    pub fn into_io(self) -> Self {
        match self {
            Error::Io(_) => self,
            other => Error::Io(io::Error::other(other)),
        }
    }
}

/// Failure categories recognised at the facade boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    AlreadyExists,
    InvalidPath,
    Io,
    StorageSystem,
    DirectoryNotEmpty,
    DoesNotExist,
}

impl ErrorCategory {
    pub fn message(self) -> &'static str {
        match self {
            ErrorCategory::AlreadyExists => "the alluxio path already exists",
            ErrorCategory::InvalidPath => "the alluxio path is invalid",
            ErrorCategory::Io => "got an IO failure",
            ErrorCategory::StorageSystem => "got an alluxio failure",
            ErrorCategory::DirectoryNotEmpty => "the directory is not empty",
            ErrorCategory::DoesNotExist => "the file does not exist",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub fn classify(err: &Error) -> Option<ErrorCategory> {
    match err {
        Error::FileAlreadyExists(_) => Some(ErrorCategory::AlreadyExists),
        Error::InvalidPath(_) => Some(ErrorCategory::InvalidPath),
        Error::Io(_) => Some(ErrorCategory::Io),
        Error::Alluxio(_) => Some(ErrorCategory::StorageSystem),
        Error::DirectoryNotEmpty(_) => Some(ErrorCategory::DirectoryNotEmpty),
        Error::FileDoesNotExist(_) => Some(ErrorCategory::DoesNotExist),
        Error::InvalidArgument(_) => None,
    }
}

/// Logs `err` once at error level when it falls into a known category.
///
/// Returns the matched category; unrecognised failures are left to the caller.
pub fn report(err: &Error) -> Option<ErrorCategory> {
    let category = classify(err)?;
    tracing::error!(error = %err, "{category}");
    Some(category)
}


#[cfg(test)]
mod tests {
    use super::capture::ErrorEvents;
    use super::*;

    #[test]
    fn test_every_known_failure_maps_to_one_category() {
        let cases = vec![
            (
                Error::FileAlreadyExists("/a".into()),
                ErrorCategory::AlreadyExists,
            ),
            (Error::InvalidPath("a".into()), ErrorCategory::InvalidPath),
            (Error::Io(io::Error::other("boom")), ErrorCategory::Io),
            (Error::Alluxio("master down".into()), ErrorCategory::StorageSystem),
            (
                Error::DirectoryNotEmpty("/d".into()),
                ErrorCategory::DirectoryNotEmpty,
            ),
            (
                Error::FileDoesNotExist("/x".into()),
                ErrorCategory::DoesNotExist,
            ),
        ];
        for (err, expected) in cases {
            let events = ErrorEvents::default();
            let category =
                tracing::subscriber::with_default(events.subscriber(), || report(&err));
            assert_eq!(category, Some(expected), "{err}");
            assert_eq!(events.messages(), vec![expected.message().to_string()], "{err}");
        }
    }

    #[test]
    fn test_unrecognised_failure_is_not_reported() {
        let err = Error::InvalidArgument("no host".into());
        assert_eq!(classify(&err), None);
        let events = ErrorEvents::default();
        let category = tracing::subscriber::with_default(events.subscriber(), || report(&err));
        assert_eq!(category, None);
        assert!(events.messages().is_empty());
    }

    #[test]
    fn test_from_io_maps_known_kinds() {
        let e = Error::from_io(io::Error::from(io::ErrorKind::NotFound), "/p");
        assert!(matches!(e, Error::FileDoesNotExist(p) if p == "/p"));

        let e = Error::from_io(io::Error::from(io::ErrorKind::AlreadyExists), "/p");
        assert!(matches!(e, Error::FileAlreadyExists(_)));

        let e = Error::from_io(io::Error::from(io::ErrorKind::NotADirectory), "/f/child");
        assert!(matches!(e, Error::FileDoesNotExist(p) if p == "/f/child"));

        let e = Error::from_io(io::Error::from(io::ErrorKind::PermissionDenied), "/p");
        assert!(matches!(e, Error::Io(_)));
    }

    #[test]
    fn test_into_io_keeps_source() {
        let e = Error::FileDoesNotExist("/gone".into()).into_io();
        match e {
            Error::Io(inner) => assert!(inner.to_string().contains("/gone")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
