use std::fs;
use std::io::Read;
use std::path::Path;

use super::error::SweepError;

/// Buffer size for lockstep content comparison reads.
const COMPARE_BUFFER_SIZE: usize = 64 * 1024;

/// Reports whether two regular files differ.
///
/// The check is a full byte-for-byte comparison, short-circuited by a
/// length check first: unequal lengths imply unequal bytes without reading
/// either file. Equal-length files are read in lockstep with fixed-size
/// buffers until the first divergent chunk or end of file.
pub(crate) fn files_differ(source: &Path, replica: &Path) -> Result<bool, SweepError> {
    let source_len = fs::metadata(source)
        .map_err(|error| SweepError::io("inspect source file", source.to_path_buf(), error))?
        .len();
    let replica_len = fs::metadata(replica)
        .map_err(|error| SweepError::io("inspect replica file", replica.to_path_buf(), error))?
        .len();
    if source_len != replica_len {
        return Ok(true);
    }

    let mut source_file = fs::File::open(source)
        .map_err(|error| SweepError::io("read source file", source.to_path_buf(), error))?;
    let mut replica_file = fs::File::open(replica)
        .map_err(|error| SweepError::io("read replica file", replica.to_path_buf(), error))?;
    let mut source_buffer = vec![0u8; COMPARE_BUFFER_SIZE];
    let mut replica_buffer = vec![0u8; COMPARE_BUFFER_SIZE];

    loop {
        let source_read = source_file
            .read(&mut source_buffer)
            .map_err(|error| SweepError::io("read source file", source.to_path_buf(), error))?;
        let replica_read = replica_file
            .read(&mut replica_buffer)
            .map_err(|error| SweepError::io("read replica file", replica.to_path_buf(), error))?;

        if source_read != replica_read {
            return Ok(true);
        }
        if source_read == 0 {
            return Ok(false);
        }
        if source_buffer[..source_read] != replica_buffer[..replica_read] {
            return Ok(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn identical_files_do_not_differ() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("source.txt");
        let replica = temp.path().join("replica.txt");
        fs::write(&source, b"same payload").expect("write source");
        fs::write(&replica, b"same payload").expect("write replica");

        assert!(!files_differ(&source, &replica).expect("compare"));
    }

    #[test]
    fn different_content_of_equal_length_differs() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("source.txt");
        let replica = temp.path().join("replica.txt");
        fs::write(&source, b"payload-a").expect("write source");
        fs::write(&replica, b"payload-b").expect("write replica");

        assert!(files_differ(&source, &replica).expect("compare"));
    }

    #[test]
    fn length_mismatch_differs_without_content_reads() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("source.txt");
        let replica = temp.path().join("replica.txt");
        fs::write(&source, b"short").expect("write source");
        fs::write(&replica, b"considerably longer").expect("write replica");

        assert!(files_differ(&source, &replica).expect("compare"));
    }

    #[test]
    fn empty_files_are_equal() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("source.txt");
        let replica = temp.path().join("replica.txt");
        fs::write(&source, b"").expect("write source");
        fs::write(&replica, b"").expect("write replica");

        assert!(!files_differ(&source, &replica).expect("compare"));
    }

    #[test]
    fn divergence_past_one_buffer_is_detected() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("source.bin");
        let replica = temp.path().join("replica.bin");

        let mut source_bytes = vec![0u8; COMPARE_BUFFER_SIZE + 17];
        let mut replica_bytes = source_bytes.clone();
        source_bytes[COMPARE_BUFFER_SIZE + 5] = 1;
        replica_bytes[COMPARE_BUFFER_SIZE + 5] = 2;
        fs::write(&source, &source_bytes).expect("write source");
        fs::write(&replica, &replica_bytes).expect("write replica");

        assert!(files_differ(&source, &replica).expect("compare"));
    }

    #[test]
    fn missing_replica_surfaces_an_error() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("source.txt");
        fs::write(&source, b"payload").expect("write source");

        let error = files_differ(&source, &temp.path().join("absent.txt"))
            .expect_err("missing replica must fail");
        assert!(error.to_string().contains("inspect replica file"));
    }
}
