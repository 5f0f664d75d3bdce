use std::fs;
use std::io::{self, Write};
use std::path::Path;

use logging::{Action, ActionLog};

use super::error::SweepError;
use super::permissions::clear_write_protection;
use super::{PassSummary, log_failure, sorted_entry_names};

/// Outcome of attempting to delete a single extraneous replica entry.
#[derive(Debug)]
pub enum RemovalDisposition {
    /// The entry, including any subtree, was deleted.
    Removed,
    /// Deletion was blocked by a permission error the normalizer could not
    /// clear; the entry stays in the replica until a later pass succeeds.
    RetryNextPass(io::Error),
}

/// Deletes every replica entry whose path does not exist under the source
/// root.
///
/// A replica root that does not exist yet is an empty tree: nothing to
/// remove. Entries are visited in lexicographic order; a directory absent
/// from the source is deleted as a whole and its descendants are never
/// visited or logged individually.
pub(crate) fn remove_extraneous<D, C>(
    source: &Path,
    replica: &Path,
    log: &mut ActionLog<D, C>,
    summary: &mut PassSummary,
) -> Result<(), SweepError>
where
    D: Write,
    C: Write,
{
    match fs::symlink_metadata(replica) {
        Ok(metadata) if metadata.file_type().is_dir() => {}
        Ok(_) => return Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(error) => {
            return Err(SweepError::io(
                "inspect replica root",
                replica.to_path_buf(),
                error,
            ));
        }
    }

    sweep_directory(source, replica, Path::new(""), log, summary)
}

fn sweep_directory<D, C>(
    source_dir: &Path,
    replica_dir: &Path,
    prefix: &Path,
    log: &mut ActionLog<D, C>,
    summary: &mut PassSummary,
) -> Result<(), SweepError>
where
    D: Write,
    C: Write,
{
    for name in sorted_entry_names(replica_dir)? {
        let replica_child = replica_dir.join(&name);
        let source_child = source_dir.join(&name);
        let relative = prefix.join(&name);

        let source_metadata = match fs::symlink_metadata(&source_child) {
            Ok(metadata) => Some(metadata),
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => {
                return Err(SweepError::io(
                    "inspect source entry",
                    source_child.clone(),
                    error,
                ));
            }
        };

        if let Some(source_metadata) = source_metadata {
            // Present on both sides: descend only when both are
            // directories. Kind mismatches are replaced wholesale by the
            // copy sweep, so their contents are not worth visiting here.
            let replica_is_dir = fs::symlink_metadata(&replica_child)
                .map_err(|error| {
                    SweepError::io("inspect replica entry", replica_child.clone(), error)
                })?
                .file_type()
                .is_dir();
            if replica_is_dir && source_metadata.file_type().is_dir() {
                sweep_directory(&source_child, &replica_child, &relative, log, summary)?;
            }
            continue;
        }

        log.record(Action::Remove, &relative)
            .map_err(|error| log_failure(&relative, error))?;
        match remove_entry(&replica_child)? {
            RemovalDisposition::Removed => summary.record_removed(),
            RemovalDisposition::RetryNextPass(reason) => {
                log.removal_warning(&relative, &reason)
                    .map_err(|error| log_failure(&relative, error))?;
                summary.record_retained();
            }
        }
    }
    Ok(())
}

/// Deletes one replica entry with tolerated-permission semantics.
///
/// Write protection is cleared first, then the entry is unlinked (regular
/// files and special entries) or removed as a subtree (directories). A
/// [`io::ErrorKind::PermissionDenied`] failure from either step yields
/// [`RemovalDisposition::RetryNextPass`]; every other failure is fatal.
pub fn remove_entry(path: &Path) -> Result<RemovalDisposition, SweepError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        // The entry vanished between discovery and deletion; the goal
        // state is already reached.
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Ok(RemovalDisposition::Removed);
        }
        Err(error) => {
            return Err(SweepError::io(
                "inspect replica entry",
                path.to_path_buf(),
                error,
            ));
        }
    };

    let attempt = clear_write_protection(path).and_then(|()| {
        if metadata.file_type().is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    });

    match attempt {
        Ok(()) => Ok(RemovalDisposition::Removed),
        Err(error) if error.kind() == io::ErrorKind::PermissionDenied => {
            Ok(RemovalDisposition::RetryNextPass(error))
        }
        Err(error) => Err(SweepError::io(
            "remove replica entry",
            path.to_path_buf(),
            error,
        )),
    }
}
