use std::fs;
use std::io::{self, Write};
use std::path::Path;

use logging::{Action, ActionLog};

use super::comparison::files_differ;
use super::error::SweepError;
use super::permissions::clear_write_protection;
use super::{PassSummary, log_failure, sorted_entry_names};

/// Classification of a single source entry against its replica counterpart.
///
/// Computed before any mutation so the decision policy stays independent of
/// the copy primitive that executes it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CopyDecision {
    /// No replica entry exists at the relative path yet.
    Create,
    /// A replica entry exists but must be replaced with source content.
    Overwrite,
    /// Both sides are byte-identical regular files; leave the replica
    /// entry completely untouched.
    SkipUnchanged,
    /// Both sides are directories; recurse into the children without
    /// recording anything for the directory itself.
    Descend,
}

/// Classifies the source entry at `source` against the replica entry at
/// `replica`.
///
/// `source` must name a regular file or directory; any other entry kind is
/// an explicit unsupported case. Replica-side entries of other kinds are
/// ordinary non-directories and classify as [`CopyDecision::Overwrite`]
/// whenever the sides cannot be byte-identical.
pub fn classify_entry(source: &Path, replica: &Path) -> Result<CopyDecision, SweepError> {
    let source_type = fs::symlink_metadata(source)
        .map_err(|error| SweepError::io("inspect source entry", source.to_path_buf(), error))?
        .file_type();
    if !source_type.is_file() && !source_type.is_dir() {
        return Err(SweepError::unsupported_entry(source.to_path_buf()));
    }

    let replica_type = match fs::symlink_metadata(replica) {
        Ok(metadata) => metadata.file_type(),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Ok(CopyDecision::Create);
        }
        Err(error) => {
            return Err(SweepError::io(
                "inspect replica entry",
                replica.to_path_buf(),
                error,
            ));
        }
    };

    if source_type.is_file() || replica_type.is_file() {
        if source_type.is_file() && replica_type.is_file() && !files_differ(source, replica)? {
            return Ok(CopyDecision::SkipUnchanged);
        }
        return Ok(CopyDecision::Overwrite);
    }

    if replica_type.is_dir() {
        return Ok(CopyDecision::Descend);
    }

    // Replica holds a symlink or special file where the source has a
    // directory; replace it like any other mismatched entry.
    Ok(CopyDecision::Overwrite)
}

/// Mirrors everything under `source` into `replica`, creating the replica
/// root when absent.
pub(crate) fn mirror_tree<D, C>(
    source: &Path,
    replica: &Path,
    log: &mut ActionLog<D, C>,
    summary: &mut PassSummary,
) -> Result<(), SweepError>
where
    D: Write,
    C: Write,
{
    fs::create_dir_all(replica)
        .map_err(|error| SweepError::io("create replica directory", replica.to_path_buf(), error))?;
    copy_children(source, replica, log, summary)
}

fn copy_children<D, C>(
    source_dir: &Path,
    replica_dir: &Path,
    log: &mut ActionLog<D, C>,
    summary: &mut PassSummary,
) -> Result<(), SweepError>
where
    D: Write,
    C: Write,
{
    for name in sorted_entry_names(source_dir)? {
        let source_child = source_dir.join(&name);
        let replica_child = replica_dir.join(&name);

        match classify_entry(&source_child, &replica_child)? {
            CopyDecision::Create => {
                log.record(Action::Create, Path::new(&name))
                    .map_err(|error| log_failure(Path::new(&name), error))?;
                summary.record_created();
                create_entry(&source_child, &replica_child, log, summary)?;
            }
            CopyDecision::Overwrite => {
                log.record(Action::Copy, Path::new(&name))
                    .map_err(|error| log_failure(Path::new(&name), error))?;
                summary.record_overwritten();
                clear_write_protection(&replica_child).map_err(|error| {
                    SweepError::io("clear write protection", replica_child.clone(), error)
                })?;
                replace_entry(&source_child, &replica_child, log, summary)?;
            }
            CopyDecision::SkipUnchanged => summary.record_unchanged(),
            CopyDecision::Descend => copy_children(&source_child, &replica_child, log, summary)?,
        }
    }
    Ok(())
}

/// Materializes a source entry at a replica path that holds nothing yet.
///
/// Directories recurse so every descendant produces its own record.
fn create_entry<D, C>(
    source: &Path,
    replica: &Path,
    log: &mut ActionLog<D, C>,
    summary: &mut PassSummary,
) -> Result<(), SweepError>
where
    D: Write,
    C: Write,
{
    let source_is_dir = fs::symlink_metadata(source)
        .map_err(|error| SweepError::io("inspect source entry", source.to_path_buf(), error))?
        .file_type()
        .is_dir();

    if source_is_dir {
        fs::create_dir(replica).map_err(|error| {
            SweepError::io("create replica directory", replica.to_path_buf(), error)
        })?;
        return copy_children(source, replica, log, summary);
    }

    fs::copy(source, replica)
        .map_err(|error| SweepError::io("copy file contents", replica.to_path_buf(), error))?;
    Ok(())
}

/// Replaces an existing replica entry with the source entry's content.
///
/// Kind mismatches remove the stale replica entry first (recursively for
/// directories); write protection has already been cleared by the caller.
fn replace_entry<D, C>(
    source: &Path,
    replica: &Path,
    log: &mut ActionLog<D, C>,
    summary: &mut PassSummary,
) -> Result<(), SweepError>
where
    D: Write,
    C: Write,
{
    let source_is_dir = fs::symlink_metadata(source)
        .map_err(|error| SweepError::io("inspect source entry", source.to_path_buf(), error))?
        .file_type()
        .is_dir();
    let replica_type = fs::symlink_metadata(replica)
        .map_err(|error| SweepError::io("inspect replica entry", replica.to_path_buf(), error))?
        .file_type();

    if source_is_dir {
        fs::remove_file(replica).map_err(|error| {
            SweepError::io("remove mismatched replica entry", replica.to_path_buf(), error)
        })?;
        fs::create_dir(replica).map_err(|error| {
            SweepError::io("create replica directory", replica.to_path_buf(), error)
        })?;
        return copy_children(source, replica, log, summary);
    }

    if replica_type.is_dir() {
        fs::remove_dir_all(replica).map_err(|error| {
            SweepError::io("remove mismatched replica entry", replica.to_path_buf(), error)
        })?;
    } else if !replica_type.is_file() {
        fs::remove_file(replica).map_err(|error| {
            SweepError::io("remove mismatched replica entry", replica.to_path_buf(), error)
        })?;
    }

    fs::copy(source, replica)
        .map_err(|error| SweepError::io("copy file contents", replica.to_path_buf(), error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_replica_entry_classifies_as_create() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("a.txt");
        fs::write(&source, b"X").expect("write source");

        let decision =
            classify_entry(&source, &temp.path().join("absent.txt")).expect("classify");
        assert_eq!(decision, CopyDecision::Create);
    }

    #[test]
    fn differing_files_classify_as_overwrite() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("a.txt");
        let replica = temp.path().join("b.txt");
        fs::write(&source, b"X").expect("write source");
        fs::write(&replica, b"Y").expect("write replica");

        assert_eq!(
            classify_entry(&source, &replica).expect("classify"),
            CopyDecision::Overwrite
        );
    }

    #[test]
    fn identical_files_classify_as_skip() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("a.txt");
        let replica = temp.path().join("b.txt");
        fs::write(&source, b"X").expect("write source");
        fs::write(&replica, b"X").expect("write replica");

        assert_eq!(
            classify_entry(&source, &replica).expect("classify"),
            CopyDecision::SkipUnchanged
        );
    }

    #[test]
    fn directory_pairs_classify_as_descend() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("src_dir");
        let replica = temp.path().join("dst_dir");
        fs::create_dir(&source).expect("create source dir");
        fs::create_dir(&replica).expect("create replica dir");

        assert_eq!(
            classify_entry(&source, &replica).expect("classify"),
            CopyDecision::Descend
        );
    }

    #[test]
    fn kind_mismatch_classifies_as_overwrite() {
        let temp = tempdir().expect("tempdir");
        let source_file = temp.path().join("entry_a");
        let replica_dir = temp.path().join("entry_b");
        fs::write(&source_file, b"X").expect("write source");
        fs::create_dir(&replica_dir).expect("create replica dir");

        assert_eq!(
            classify_entry(&source_file, &replica_dir).expect("classify"),
            CopyDecision::Overwrite
        );

        let source_dir = temp.path().join("entry_c");
        let replica_file = temp.path().join("entry_d");
        fs::create_dir(&source_dir).expect("create source dir");
        fs::write(&replica_file, b"Y").expect("write replica");

        assert_eq!(
            classify_entry(&source_dir, &replica_file).expect("classify"),
            CopyDecision::Overwrite
        );
    }

    #[cfg(unix)]
    #[test]
    fn source_symlink_is_an_unsupported_entry() {
        use crate::sweep::SweepErrorKind;
        use std::os::unix::fs::symlink;

        let temp = tempdir().expect("tempdir");
        let target = temp.path().join("target.txt");
        let link = temp.path().join("link");
        fs::write(&target, b"X").expect("write target");
        symlink(&target, &link).expect("create symlink");

        let error = classify_entry(&link, &temp.path().join("absent"))
            .expect_err("symlink must be rejected");
        assert!(matches!(
            error.kind(),
            SweepErrorKind::UnsupportedEntryKind { .. }
        ));
    }
}
