//! Locating structure files on disk.

use std::path::{Path, PathBuf};

use strucdev_core::{Result, StrucdevError};

/// Whether `path` has a `.pdb` extension (any case).
pub fn is_pdb_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdb"))
}

/// Regular `.pdb` files directly inside `dir`, sorted by file name.
///
/// Sorting keeps report rows and pair order stable across platforms.
pub fn list_pdb_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|e| {
        StrucdevError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", dir.display(), e),
        ))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && is_pdb_path(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// `path` itself when it is a file, otherwise the `.pdb` files inside it.
pub fn expand_input(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    if path.is_dir() {
        list_pdb_files(path)
    } else if path.is_file() {
        Ok(vec![path.to_path_buf()])
    } else {
        Err(StrucdevError::InvalidInput(format!(
            "{} is neither a file nor a directory",
            path.display()
        )))
    }
}
