//! One full synchronization pass: removal sweep, then copy sweep.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::Path;

use logging::ActionLog;

mod comparison;
mod copy;
mod error;
mod permissions;
mod removal;

pub use copy::{CopyDecision, classify_entry};
pub use error::{SweepError, SweepErrorKind};
pub use permissions::clear_write_protection;
pub use removal::{RemovalDisposition, remove_entry};

/// Counters describing the work performed by a single synchronization pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PassSummary {
    created: u64,
    overwritten: u64,
    removed: u64,
    unchanged: u64,
    retained: u64,
}

impl PassSummary {
    /// Number of entries materialized in the replica for the first time.
    #[must_use]
    pub const fn created(&self) -> u64 {
        self.created
    }

    /// Number of replica entries overwritten with source content.
    #[must_use]
    pub const fn overwritten(&self) -> u64 {
        self.overwritten
    }

    /// Number of replica entries deleted (subtrees count as one).
    #[must_use]
    pub const fn removed(&self) -> u64 {
        self.removed
    }

    /// Number of byte-identical files left untouched.
    #[must_use]
    pub const fn unchanged(&self) -> u64 {
        self.unchanged
    }

    /// Number of entries that survived removal behind a tolerated
    /// permission error and remain until a later pass.
    #[must_use]
    pub const fn retained(&self) -> u64 {
        self.retained
    }

    /// Reports whether the pass mutated the replica at all.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.created == 0 && self.overwritten == 0 && self.removed == 0
    }

    pub(crate) fn record_created(&mut self) {
        self.created = self.created.saturating_add(1);
    }

    pub(crate) fn record_overwritten(&mut self) {
        self.overwritten = self.overwritten.saturating_add(1);
    }

    pub(crate) fn record_removed(&mut self) {
        self.removed = self.removed.saturating_add(1);
    }

    pub(crate) fn record_unchanged(&mut self) {
        self.unchanged = self.unchanged.saturating_add(1);
    }

    pub(crate) fn record_retained(&mut self) {
        self.retained = self.retained.saturating_add(1);
    }
}

/// Runs exactly one full synchronization pass over the pair of trees.
///
/// The removal sweep runs to completion first, then the copy sweep; both
/// write their mutating decisions through `log` as they happen. Nothing is
/// cached between invocations, so repeated calls converge the replica even
/// after a crash or external interference. Returns the pass counters, or
/// the first fatal failure.
pub fn run_pass<D, C>(
    source: &Path,
    replica: &Path,
    log: &mut ActionLog<D, C>,
) -> Result<PassSummary, SweepError>
where
    D: Write,
    C: Write,
{
    if !source.is_dir() {
        return Err(SweepError::source_not_directory(source.to_path_buf()));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        source = %source.display(),
        replica = %replica.display(),
        "starting synchronization pass"
    );

    let mut summary = PassSummary::default();
    removal::remove_extraneous(source, replica, log, &mut summary)?;
    copy::mirror_tree(source, replica, log, &mut summary)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        created = summary.created(),
        overwritten = summary.overwritten(),
        removed = summary.removed(),
        unchanged = summary.unchanged(),
        retained = summary.retained(),
        "synchronization pass complete"
    );

    Ok(summary)
}

/// Reads a directory and returns its entry names in lexicographic order.
///
/// Sorting keeps the sweeps deterministic regardless of the underlying
/// filesystem's iteration order.
pub(crate) fn sorted_entry_names(directory: &Path) -> Result<Vec<OsString>, SweepError> {
    let entries = fs::read_dir(directory)
        .map_err(|error| SweepError::io("read directory", directory.to_path_buf(), error))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|error| SweepError::io("read directory entry", directory.to_path_buf(), error))?;
        names.push(entry.file_name());
    }
    names.sort();
    Ok(names)
}

/// Maps an action-log write failure onto a fatal sweep error.
pub(crate) fn log_failure(path: &Path, error: std::io::Error) -> SweepError {
    SweepError::io("append action log record", path.to_path_buf(), error)
}
