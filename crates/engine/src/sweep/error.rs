use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit code for source selection failures, matching upstream rsync's
/// RERR_FILESELECT.
const FILE_SELECT_EXIT_CODE: i32 = 3;
/// Exit code for unsupported requests, matching RERR_UNSUPPORTED.
const UNSUPPORTED_EXIT_CODE: i32 = 4;
/// Exit code for file I/O failures, matching RERR_FILEIO.
const FILE_IO_EXIT_CODE: i32 = 11;

/// Error produced when a synchronization sweep fails.
#[derive(Debug)]
pub struct SweepError {
    kind: SweepErrorKind,
}

impl SweepError {
    fn new(kind: SweepErrorKind) -> Self {
        Self { kind }
    }

    /// Constructs an error for a source root that is missing or not a
    /// directory.
    #[must_use]
    pub fn source_not_directory(path: PathBuf) -> Self {
        Self::new(SweepErrorKind::SourceNotDirectory { path })
    }

    /// Constructs an error for a source entry kind the mirror cannot
    /// represent (symbolic links, FIFOs, devices, sockets).
    #[must_use]
    pub fn unsupported_entry(path: PathBuf) -> Self {
        Self::new(SweepErrorKind::UnsupportedEntryKind { path })
    }

    /// Constructs an I/O error with action context.
    #[must_use]
    pub fn io(action: &'static str, path: PathBuf, source: io::Error) -> Self {
        Self::new(SweepErrorKind::Io {
            action,
            path,
            source,
        })
    }

    /// Returns the process exit code mirroring upstream rsync's behaviour.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self.kind {
            SweepErrorKind::SourceNotDirectory { .. } => FILE_SELECT_EXIT_CODE,
            SweepErrorKind::UnsupportedEntryKind { .. } => UNSUPPORTED_EXIT_CODE,
            SweepErrorKind::Io { .. } => FILE_IO_EXIT_CODE,
        }
    }

    /// Provides access to the underlying error kind.
    #[must_use]
    pub fn kind(&self) -> &SweepErrorKind {
        &self.kind
    }

    /// Consumes the error and returns its kind.
    #[must_use]
    pub fn into_kind(self) -> SweepErrorKind {
        self.kind
    }
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SweepErrorKind::SourceNotDirectory { path } => {
                write!(
                    f,
                    "source '{}' is not an accessible directory",
                    path.display()
                )
            }
            SweepErrorKind::UnsupportedEntryKind { path } => {
                write!(
                    f,
                    "unsupported entry kind at '{}': only regular files and directories are mirrored",
                    path.display()
                )
            }
            SweepErrorKind::Io {
                action,
                path,
                source,
            } => {
                write!(f, "failed to {action} '{}': {source}", path.display())
            }
        }
    }
}

impl Error for SweepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            SweepErrorKind::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Classification of sweep failures.
#[derive(Debug)]
pub enum SweepErrorKind {
    /// The source root is missing or not a directory.
    SourceNotDirectory {
        /// Path supplied as the source root.
        path: PathBuf,
    },
    /// A source entry is neither a regular file nor a directory.
    UnsupportedEntryKind {
        /// Path of the unsupported entry.
        path: PathBuf,
    },
    /// Filesystem interaction failed.
    Io {
        /// Action being performed.
        action: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}
