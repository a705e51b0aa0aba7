use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

/// Diagnostic emitted whenever an unavailable descriptor is suppressed.
pub const ACCESS_ERROR: &str = "file access error: closed or does not exist";

pub type Result<T> = std::result::Result<T, FileError>;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("invalid {field}: {value:?}")]
    TypeConstraint { field: &'static str, value: String },

    #[error("{op} failed on {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: Errno,
    },

    #[error("descriptor for {} is already released", .path.display())]
    Closed { path: PathBuf },

    #[error("content of {} is not valid {encoding}", .path.display())]
    Decode {
        encoding: &'static str,
        path: PathBuf,
    },

    #[error("text for {} is not representable in {encoding}", .path.display())]
    Encode {
        encoding: &'static str,
        path: PathBuf,
    },

    #[error("line {index} is out of range, file has {available} lines")]
    OutOfRange { index: usize, available: usize },
}

/// Coarse classification of [`FileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TypeConstraint,
    Io,
    Decode,
    Encode,
    OutOfRange,
}

impl FileError {
    pub(crate) fn type_constraint(field: &'static str, value: impl Into<String>) -> Self {
        FileError::TypeConstraint {
            field,
            value: value.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FileError::TypeConstraint { .. } => ErrorKind::TypeConstraint,
            FileError::Io { .. } | FileError::Closed { .. } => ErrorKind::Io,
            FileError::Decode { .. } => ErrorKind::Decode,
            FileError::Encode { .. } => ErrorKind::Encode,
            FileError::OutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }

    /// True when the failure came from the descriptor itself (released,
    /// vanished, permission revoked) rather than from the caller's input.
    pub fn is_unavailable(&self) -> bool {
        self.kind() == ErrorKind::Io
    }
}

/// Opt-in error boundary.
///
/// Handle operations always report typed errors. A call site that only
/// wants "a value or nothing" chains `.suppress()`: unavailable failures
/// are logged with [`ACCESS_ERROR`] and become `Ok(None)`, everything else
/// (type constraints, codec failures, out-of-range lines) still propagates.
pub trait Suppress<T> {
    fn suppress(self) -> Result<Option<T>>;
}

impl<T> Suppress<T> for Result<T> {
    fn suppress(self) -> Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_unavailable() => {
                error!("{ACCESS_ERROR} ({e})");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed() -> FileError {
        FileError::Closed {
            path: PathBuf::from("/tmp/x"),
        }
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(closed().kind(), ErrorKind::Io);
        assert_eq!(
            FileError::type_constraint("mode", "").kind(),
            ErrorKind::TypeConstraint
        );
        assert_eq!(
            FileError::OutOfRange {
                index: 3,
                available: 3
            }
            .kind(),
            ErrorKind::OutOfRange
        );
        let io = FileError::Io {
            op: "open",
            path: PathBuf::from("/nope"),
            source: Errno::EACCES,
        };
        assert!(io.is_unavailable());
        assert!(io.to_string().contains("/nope"));
    }

    #[test]
    fn test_suppress_only_unavailable() {
        let ok: Result<u8> = Ok(7);
        assert_eq!(ok.suppress().unwrap(), Some(7));

        let gone: Result<u8> = Err(closed());
        assert_eq!(gone.suppress().unwrap(), None);

        let decode: Result<u8> = Err(FileError::Decode {
            encoding: "UTF-8",
            path: PathBuf::from("/tmp/x"),
        });
        let err = decode.suppress().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let range: Result<u8> = Err(FileError::OutOfRange {
            index: 1,
            available: 1,
        });
        assert!(range.suppress().is_err());
    }
}
