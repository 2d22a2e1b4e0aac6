//! Shared CLI support for the nand2tetris translators.
//!
//! Both `jackc` and `vmc` accept exactly one positional argument -- a path to
//! either a single source file or a directory of source files -- and need to
//! resolve that argument into a concrete, deterministically-ordered list of
//! inputs before translation starts. This crate is that one shared sliver;
//! it knows nothing about Jack, VM code, or Hack assembly.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while resolving a CLI path argument into inputs.
#[derive(Debug)]
pub enum N2tError {
    /// The given path does not exist.
    NotFound(PathBuf),
    /// An I/O error occurred while reading the path or its directory entries.
    Io(io::Error),
}

impl fmt::Display for N2tError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            N2tError::NotFound(path) => write!(f, "no such file or directory: {}", path.display()),
            N2tError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for N2tError {}

impl From<io::Error> for N2tError {
    fn from(e: io::Error) -> Self {
        N2tError::Io(e)
    }
}

/// Resolve a CLI path argument into the concrete list of files to translate.
///
/// If `path` is a single file, it is returned as-is (its extension is not
/// checked -- single-file mode translates whatever was named). If `path` is
/// a directory, every entry whose extension matches `extension` is
/// returned, sorted by file name for a deterministic iteration order.
pub fn discover_inputs(path: &Path, extension: &str) -> Result<Vec<PathBuf>, N2tError> {
    if !path.exists() {
        return Err(N2tError::NotFound(path.to_path_buf()));
    }

    if path.is_dir() {
        let mut entries: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(extension))
            .collect();
        entries.sort();
        Ok(entries)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

/// Replace a path's extension, returning a new sibling path.
///
/// `with_extension("Foo.jack", "vm")` -> `"Foo.vm"`.
pub fn sibling_with_extension(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

/// The directory-mode output path: `<dir>/<dirname>.<extension>`.
pub fn directory_output_path(dir: &Path, extension: &str) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    dir.join(format!("{name}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn discover_inputs_single_file_ignores_extension() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("Main.jack");
        fs::write(&file, "").unwrap();

        let found = discover_inputs(&file, "vm").unwrap();
        assert_eq!(found, vec![file]);
    }

    #[test]
    fn discover_inputs_directory_filters_and_sorts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Zebra.jack"), "").unwrap();
        fs::write(dir.path().join("Alpha.jack"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = discover_inputs(dir.path(), "jack").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Alpha.jack", "Zebra.jack"]);
    }

    #[test]
    fn discover_inputs_missing_path_is_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.jack");
        let err = discover_inputs(&missing, "jack").unwrap_err();
        assert!(matches!(err, N2tError::NotFound(_)));
    }

    #[test]
    fn sibling_with_extension_replaces_suffix() {
        let p = PathBuf::from("/tmp/Main.jack");
        assert_eq!(sibling_with_extension(&p, "vm"), PathBuf::from("/tmp/Main.vm"));
    }

    #[test]
    fn directory_output_path_uses_basename() {
        let p = PathBuf::from("/tmp/MyProgram");
        assert_eq!(
            directory_output_path(&p, "asm"),
            PathBuf::from("/tmp/MyProgram/MyProgram.asm")
        );
    }
}
