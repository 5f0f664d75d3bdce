use std::fs;
use std::io;
use std::path::Path;

/// Clears the write-protection attribute on a single path.
///
/// Called immediately before a delete or overwrite targets `path` so the
/// mutation is not blocked by a read-only bit. Idempotent: a path that is
/// already writable costs one metadata query and nothing else. Applies to
/// files and directories alike and never recurses into directory contents.
///
/// On Unix the existing mode is preserved and only the owner-write bit is
/// added; elsewhere the platform read-only flag is cleared.
pub fn clear_write_protection(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    let mut permissions = metadata.permissions();
    if !permissions.readonly() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = permissions.mode();
        permissions.set_mode(mode | 0o200);
    }
    #[cfg(not(unix))]
    permissions.set_readonly(false);

    fs::set_permissions(path, permissions)
}
