#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` provides the action log shared by the removal and copy sweeps of
//! the replica synchronizer. Every mutating decision the sweeps take is
//! recorded as a single timestamped line so an operator can audit a pass
//! after the fact from the durable sink or watch it live on the console sink.
//! Decisions that change nothing (unchanged files left in place) are
//! deliberately never recorded.
//!
//! # Design
//!
//! The crate exposes [`ActionLog`], a pair of [`std::io::Write`] implementors
//! owned together: a durable sink (normally an append-mode file) and a live
//! sink (normally standard output). Each record is rendered once and written
//! to both sinks, then both sinks are flushed, so neither sink lags the
//! filesystem mutations it describes. The log handle is passed explicitly
//! into the sweeps as a capability; no process-global logger state exists,
//! and independent synchronizer instances never interfere.
//!
//! # Invariants
//!
//! - One record is exactly one line; records never span lines or batch
//!   across a pass boundary.
//! - Both sinks observe identical bytes in identical order.
//! - Timestamps render as `YYYY/MM/DD HH:MM:SS` in UTC; if formatting ever
//!   fails a fixed epoch placeholder is emitted instead of dropping the
//!   record.
//!
//! # Errors
//!
//! Write and flush failures surface unchanged as [`std::io::Error`]. The
//! audit trail is part of the synchronizer's external contract, so callers
//! treat a failed record as fatal to the pass rather than continuing
//! unaudited.
//!
//! # Examples
//!
//! Record an action into in-memory sinks and inspect the rendered line:
//!
//! ```
//! use logging::{Action, ActionLog};
//! use std::path::Path;
//!
//! let mut log = ActionLog::new(Vec::new(), Vec::new());
//! log.record(Action::Create, Path::new("a.txt")).unwrap();
//!
//! let (durable, console) = log.into_parts();
//! assert_eq!(durable, console);
//! let line = String::from_utf8(durable).unwrap();
//! assert!(line.ends_with("- CREATE a.txt\n"));
//! ```

use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

/// Render format for the timestamp prefixing every record.
const RECORD_TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]/[month padding:zero]/[day padding:zero] [hour padding:zero]:[minute padding:zero]:[second padding:zero]"
);

/// Placeholder emitted when timestamp formatting fails.
const TIMESTAMP_FALLBACK: &str = "1970/01/01 00:00:00";

/// Mutating decision recorded by the synchronization sweeps.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Action {
    /// A source entry was materialized in the replica for the first time.
    Create,
    /// An existing replica entry was overwritten with source content.
    Copy,
    /// A replica entry absent from the source tree was deleted.
    Remove,
}

impl Action {
    /// Returns the stable label used verbatim in log records.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Copy => "COPY",
            Self::Remove => "REMOVE",
        }
    }
}

/// Dual-sink action log recording one timestamped line per mutation.
#[derive(Debug)]
pub struct ActionLog<D, C>
where
    D: Write,
    C: Write,
{
    durable: D,
    console: C,
}

impl<D, C> ActionLog<D, C>
where
    D: Write,
    C: Write,
{
    /// Creates a log writing every record to both sinks.
    pub fn new(durable: D, console: C) -> Self {
        Self { durable, console }
    }

    /// Records a mutating decision against `path`.
    ///
    /// The rendered line is `<timestamp> - <ACTION> <path>`; the caller
    /// chooses whether `path` is a bare name or a relative path, matching
    /// the sweep that produced the decision.
    pub fn record(&mut self, action: Action, path: &Path) -> io::Result<()> {
        let line = format!(
            "{} - {} {}",
            current_timestamp(),
            action.label(),
            path.display()
        );
        self.write_line(&line)
    }

    /// Records a tolerated removal failure as a warning line.
    ///
    /// Emitted when a replica entry scheduled for removal survives a pass
    /// because of a permission error the normalizer could not clear.
    pub fn removal_warning(&mut self, path: &Path, reason: &io::Error) -> io::Result<()> {
        let line = format!(
            "{} - Unable to remove {}. Reason: {}",
            current_timestamp(),
            path.display(),
            reason
        );
        self.write_line(&line)
    }

    /// Consumes the log and returns the underlying sinks.
    #[must_use]
    pub fn into_parts(self) -> (D, C) {
        (self.durable, self.console)
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.durable.write_all(line.as_bytes())?;
        self.durable.write_all(b"\n")?;
        self.durable.flush()?;
        self.console.write_all(line.as_bytes())?;
        self.console.write_all(b"\n")?;
        self.console.flush()
    }
}

fn current_timestamp() -> String {
    let now = OffsetDateTime::from(SystemTime::now());
    now.format(RECORD_TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| TIMESTAMP_FALLBACK.to_string())
}
