//! Recursive scanner for host credential paths.
//!
//! Walks a scan root below a fixed prefix and turns every regular file and
//! directory into a [`SecretFile`] record. The prefix is stripped from every
//! recorded path, so the records name what the container will see, not where
//! the host keeps it.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, ScanError};
use crate::types::SecretFile;

/// Recursively scan `prefix/rel` into secret records.
///
/// Emits one record per directory (own owner and mode, empty content) and
/// one per regular file (content plus metadata), in sorted directory order.
/// Symlinks are followed. A missing root yields zero records; a dangling
/// symlink is skipped with a warning and scanning continues with its
/// siblings.
///
/// # Errors
///
/// Any other filesystem failure aborts the scan and is propagated unchanged.
pub fn scan_path(prefix: &Path, rel: &Path) -> Result<Vec<SecretFile>> {
    let root = prefix.join(rel);
    let mut records = Vec::new();

    for entry in WalkDir::new(&root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if is_not_found(&err) => {
                warn!(
                    path = %err.path().unwrap_or(&root).display(),
                    "missing path or dangling symlink, skipping"
                );
                continue;
            }
            Err(err) => {
                let path = err.path().unwrap_or(&root).to_path_buf();
                return Err(ScanError::Walk { path, source: err });
            }
        };

        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(err) if is_not_found(&err) => {
                warn!(path = %entry.path().display(), "entry vanished during scan, skipping");
                continue;
            }
            Err(err) => {
                return Err(ScanError::Walk {
                    path: entry.path().to_path_buf(),
                    source: err,
                });
            }
        };

        let path = entry
            .path()
            .strip_prefix(prefix)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .into_owned();
        let (uid, gid) = owner_ids(&meta, entry.path());
        let mode = mode_bits(&meta);

        if meta.is_dir() {
            records.push(SecretFile {
                path,
                uid,
                gid,
                mode,
                data: Vec::new(),
            });
        } else if meta.is_file() {
            let data = fs::read(entry.path()).map_err(|source| ScanError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            records.push(SecretFile {
                path,
                uid,
                gid,
                mode,
                data,
            });
        } else {
            // Sockets, fifos and devices are not credentials.
            debug!(path = %entry.path().display(), "skipping special file");
        }
    }

    Ok(records)
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|io| io.kind() == io::ErrorKind::NotFound)
}

#[cfg(unix)]
fn owner_ids(meta: &fs::Metadata, _path: &Path) -> (u32, u32) {
    use std::os::unix::fs::MetadataExt;
    (meta.uid(), meta.gid())
}

#[cfg(not(unix))]
fn owner_ids(_meta: &fs::Metadata, path: &Path) -> (u32, u32) {
    warn!(
        path = %path.display(),
        "no numeric ownership on this platform, defaulting to root:root"
    );
    (0, 0)
}

#[cfg(unix)]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn write_file(dir: &Path, name: &str, contents: &[u8], mode: u32) {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }

    /// prefix/credentials.d with one file, one subdirectory and one nested file.
    fn fixture() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let creds = tmp.path().join("credentials.d");
        fs::create_dir(&creds).unwrap();
        write_file(&creds, "SCCcredentials", b"username=SCC_foo\npassword=bar\n", 0o600);
        let sub = creds.join("services");
        fs::create_dir(&sub).unwrap();
        write_file(&sub, "base", b"token=abc\n", 0o640);
        tmp
    }

    #[test]
    fn test_scan_emits_directory_and_file_records_in_sorted_order() {
        let tmp = fixture();
        let records = scan_path(tmp.path(), Path::new("credentials.d")).unwrap();

        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "credentials.d",
                "credentials.d/SCCcredentials",
                "credentials.d/services",
                "credentials.d/services/base",
            ]
        );

        // Directory records carry no content, file records carry the bytes.
        assert!(records[0].data.is_empty());
        assert_eq!(records[1].data, b"username=SCC_foo\npassword=bar\n");
        assert_eq!(records[3].data, b"token=abc\n");
    }

    #[test]
    fn test_scan_preserves_mode_and_ownership() {
        let tmp = fixture();
        let records = scan_path(tmp.path(), Path::new("credentials.d")).unwrap();

        let creds = &records[1];
        assert_eq!(creds.mode, 0o600);
        let nested = &records[3];
        assert_eq!(nested.mode, 0o640);

        // Fixture files belong to whoever runs the tests.
        use std::os::unix::fs::MetadataExt;
        let meta = fs::metadata(tmp.path().join("credentials.d/SCCcredentials")).unwrap();
        assert_eq!(creds.uid, meta.uid());
        assert_eq!(creds.gid, meta.gid());
    }

    #[test]
    fn test_scan_missing_root_yields_zero_records() {
        let tmp = tempfile::tempdir().unwrap();
        let records = scan_path(tmp.path(), Path::new("credentials.d")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_scan_single_file_root() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "SUSEConnect", b"url: https://scc.example.com\n", 0o644);

        let records = scan_path(tmp.path(), Path::new("SUSEConnect")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "SUSEConnect");
        assert_eq!(records[0].mode, 0o644);
        assert_eq!(records[0].data, b"url: https://scc.example.com\n");
    }

    #[test]
    fn test_scan_skips_dangling_symlink_but_keeps_siblings() {
        let tmp = fixture();
        let creds = tmp.path().join("credentials.d");
        std::os::unix::fs::symlink(creds.join("does-not-exist"), creds.join("broken")).unwrap();

        let records = scan_path(tmp.path(), Path::new("credentials.d")).unwrap();
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert!(!paths.contains(&"credentials.d/broken"));
        assert!(paths.contains(&"credentials.d/SCCcredentials"));
        assert!(paths.contains(&"credentials.d/services/base"));
    }

    #[test]
    fn test_scan_follows_live_symlinks() {
        let tmp = fixture();
        let creds = tmp.path().join("credentials.d");
        std::os::unix::fs::symlink(creds.join("SCCcredentials"), creds.join("alias")).unwrap();

        let records = scan_path(tmp.path(), Path::new("credentials.d")).unwrap();
        let alias = records
            .iter()
            .find(|r| r.path == "credentials.d/alias")
            .unwrap();
        assert_eq!(alias.data, b"username=SCC_foo\npassword=bar\n");
    }

    #[test]
    fn test_scan_is_idempotent() {
        let tmp = fixture();
        let first = scan_path(tmp.path(), Path::new("credentials.d")).unwrap();
        let second = scan_path(tmp.path(), Path::new("credentials.d")).unwrap();
        assert_eq!(first, second);

        let first_ids: Vec<String> = first.iter().map(SecretFile::secret_id).collect();
        let second_ids: Vec<String> = second.iter().map(SecretFile::secret_id).collect();
        assert_eq!(first_ids, second_ids);
    }
}
