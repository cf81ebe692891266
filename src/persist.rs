//! Disk I/O helpers: atomic write, document read, listing and removal.
//!
//! Record files are replaced by rename, which is atomic on POSIX filesystems.
//! Network shares and FAT32 give no such guarantee.

use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Extension of every record file.
pub const RECORD_EXT: &str = "json";

/// Suffix appended to the record path while a write is in flight.
pub const TMP_SUFFIX: &str = "tmp";

/// Collapse `.` components and redundant separators. `..` is kept as-is since
/// resolving it needs the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Temp sibling used while writing `path`: `<key>.json` becomes `<key>.json.tmp`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or(RECORD_EXT);
    path.with_extension(format!("{ext}.{TMP_SUFFIX}"))
}

/// Write `bytes` to `<path>.tmp` and then rename over `path`. This avoids
/// leaving a half-written file if the process crashes mid-write.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    std::fs::write(&tmp, bytes).map_err(|e| Error::Io(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| Error::Io(e.to_string()))?;
    Ok(())
}

/// Read a whole file, turning a missing file into [`Error::NotFound`].
pub fn read_document(path: &Path) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(b) => Ok(b),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(Error::NotFound(path.display().to_string()))
        }
        Err(e) => Err(Error::Io(e.to_string())),
    }
}

/// Record files in `dir` as `(key, path)` pairs, sorted by key. Temp files and
/// subdirectories are skipped.
pub fn list_records(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(it) => it,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::NotFound(dir.display().to_string()))
        }
        Err(e) => return Err(Error::Io(e.to_string())),
    };

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_type = match entry.file_type() {
            Ok(t) => t,
            // removed since the directory was opened
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(Error::Io(e.to_string())),
        };
        if !file_type.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
            continue;
        }
        if let Some(key) = path.file_stem().and_then(|s| s.to_str()) {
            out.push((key.to_owned(), path.clone()));
        }
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

/// Names of the subdirectories of `dir`, sorted.
pub fn list_dirs(dir: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            out.push(name.to_owned());
        }
    }
    out.sort();
    Ok(out)
}

/// Outcome of [`remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removed {
    /// A directory tree was removed.
    Dir,
    /// A single file was removed.
    File,
    /// Nothing existed at the path.
    Nothing,
}

/// Remove whatever sits at `path`: directories recursively, files directly.
/// A missing path is not an error.
pub fn remove(path: &Path) -> Result<Removed> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Removed::Nothing),
        Err(e) => return Err(Error::Io(e.to_string())),
    };
    let res = if meta.is_dir() {
        std::fs::remove_dir_all(path).map(|()| Removed::Dir)
    } else {
        std::fs::remove_file(path).map(|()| Removed::File)
    };
    match res {
        Ok(r) => Ok(r),
        // lost a race with another remover
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Removed::Nothing),
        Err(e) => Err(Error::Io(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_cur_dir_and_extra_separators() {
        assert_eq!(normalize(Path::new("./data//db/./")), PathBuf::from("data/db"));
        assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
        assert_eq!(normalize(Path::new("/srv/../db")), PathBuf::from("/srv/../db"));
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("users/bob.json")),
            PathBuf::from("users/bob.json.tmp")
        );
    }

    #[test]
    fn read_document_of_vanished_file_is_not_found() {
        let dir = std::env::temp_dir().join("json_docstore_persist_vanished");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("gone.json");
        std::fs::write(&path, b"1\n").unwrap();
        assert_eq!(list_records(&dir).unwrap().len(), 1);

        std::fs::remove_file(&path).unwrap();
        assert!(read_document(&path).unwrap_err().is_not_found());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn remove_missing_is_nothing() {
        let dir = std::env::temp_dir().join("json_docstore_persist_remove_missing");
        let _ = std::fs::remove_dir_all(&dir);
        assert_eq!(remove(&dir).unwrap(), Removed::Nothing);
    }
}
