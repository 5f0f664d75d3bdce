#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` implements the synchronization core of the replica mirroring
//! daemon: given a source tree and a replica tree, one call to [`run_pass`]
//! makes the replica filesystem-content-identical to the source. A pass is
//! two sweeps run back to back — a removal sweep that deletes replica
//! entries absent from the source, then a copy sweep that creates or
//! overwrites everything the source holds while skipping files that are
//! already byte-identical.
//!
//! # Design
//!
//! - Classification is decoupled from execution: [`classify_entry`] turns a
//!   (source path, replica path) pair into a [`CopyDecision`] without
//!   mutating anything, and the executor acts on the decision afterwards.
//! - Removal failures caused by permissions are a typed per-entry result
//!   ([`RemovalDisposition`]), not a blanket catch: a blocked entry is
//!   logged as a warning and retried on a later pass, while every other
//!   filesystem failure aborts the pass as a [`SweepError`].
//! - Write-protected replica entries are normalized with
//!   [`clear_write_protection`] immediately before the delete or overwrite
//!   that targets them.
//! - No state survives between passes. Each pass re-derives every decision
//!   from the live trees, which makes the daemon self-healing after crashes
//!   or external interference.
//!
//! # Invariants
//!
//! - After an error-free pass the replica's relative path set equals the
//!   source's, and files present on both sides are byte-identical.
//! - A byte-identical replica file is never rewritten; not even its
//!   timestamps or permissions are refreshed.
//! - Directory entries are visited in lexicographic order, keeping log
//!   output deterministic across platforms.
//! - Descendants of a directory scheduled for removal are never visited or
//!   logged individually.
//!
//! # Errors
//!
//! Fatal failures surface as [`SweepError`]; [`SweepError::exit_code`] maps
//! them onto rsync-compatible process exit codes. The only tolerated
//! failure in the whole engine is a permission error during removal.
//!
//! # Examples
//!
//! Mirror a freshly created source tree into an empty replica:
//!
//! ```
//! use engine::run_pass;
//! use logging::ActionLog;
//! use std::fs;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let source = temp.path().join("source");
//! let replica = temp.path().join("replica");
//! fs::create_dir(&source)?;
//! fs::write(source.join("payload.txt"), b"data")?;
//!
//! let mut log = ActionLog::new(Vec::new(), Vec::new());
//! let summary = run_pass(&source, &replica, &mut log)?;
//!
//! assert_eq!(summary.created(), 1);
//! assert_eq!(fs::read(replica.join("payload.txt"))?, b"data");
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod sweep;

pub use sweep::{
    CopyDecision, PassSummary, RemovalDisposition, SweepError, SweepErrorKind, classify_entry,
    clear_write_protection, remove_entry, run_pass,
};
