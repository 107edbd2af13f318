//! Directory of generated table files.
//!
//! Artifacts are written whole: the content goes to a hidden temporary
//! file which is then renamed over the target, so a listing or an export
//! never sees a half-written table. Concurrent writers of the same name
//! still race, the last rename wins.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

/// Suffix of in-progress writes.
const TEMP_SUFFIX: &str = ".tmp";

/// Errors of the artifact store.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid artifact name: '{0}'")]
    InvalidName(String),

    #[error("Artifact not found: '{0}'")]
    NotFound(String),
}

/// Result type for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ArtifactError + '_ {
    move |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// The directory holding generated artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Opens the store, creating its directory if needed.
    pub fn open<P: Into<PathBuf>>(dir: P) -> ArtifactResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        Ok(Self { dir })
    }

    /// Returns the store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes an artifact, replacing any previous one with the same name.
    pub fn save(&self, name: &str, content: &[u8]) -> ArtifactResult<PathBuf> {
        validate_name(name)?;
        let target = self.dir.join(name);
        let temp = self
            .dir
            .join(format!(".{}.{:08x}{}", name, rand::random::<u32>(), TEMP_SUFFIX));

        let write = || -> io::Result<()> {
            let mut file = File::create(&temp)?;
            file.write_all(content)?;
            file.sync_all()
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&temp);
            return Err(io_error(&temp)(e));
        }
        fs::rename(&temp, &target).map_err(io_error(&target))?;

        info!("Saved {} ({} bytes)", target.display(), content.len());
        Ok(target)
    }

    /// Lists artifact names in sorted order.
    pub fn list(&self) -> ArtifactResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_error(&self.dir))? {
            let path = entry.map_err(io_error(&self.dir))?.path();
            if !path.is_file() {
                continue;
            }
            match path.file_name().and_then(OsStr::to_str) {
                Some(name) if !is_temporary(name) => names.push(name.to_string()),
                Some(_) => {}
                None => debug!("Skipping non UTF-8 file name {}", path.display()),
            }
        }
        names.sort();
        Ok(names)
    }

    /// Resolves the path of an existing artifact.
    pub fn path_of(&self, name: &str) -> ArtifactResult<PathBuf> {
        validate_name(name)?;
        if is_temporary(name) {
            return Err(ArtifactError::NotFound(name.to_string()));
        }
        let path = self.dir.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ArtifactError::NotFound(name.to_string()))
        }
    }

    /// Copies an artifact to a writer, returning the number of bytes written.
    pub fn export<W: Write>(&self, name: &str, writer: &mut W) -> ArtifactResult<u64> {
        let path = self.path_of(name)?;
        let mut file = File::open(&path).map_err(io_error(&path))?;
        io::copy(&mut file, writer).map_err(io_error(&path))
    }
}

fn is_temporary(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(TEMP_SUFFIX)
}

/// Accepts plain file names only: no separators, not empty, not `.` or `..`.
fn validate_name(name: &str) -> ArtifactResult<()> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if plain {
        Ok(())
    } else {
        Err(ArtifactError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("generated");
        let store = ArtifactStore::open(&dir).unwrap();
        assert!(store.dir().is_dir());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_list() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = ArtifactStore::open(temp.path()).unwrap();

        store.save("b.json", b"{}").unwrap();
        store.save("a.json", b"{}").unwrap();
        assert_eq!(store.list().unwrap(), vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_save_replaces_content() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = ArtifactStore::open(temp.path()).unwrap();

        store.save("t.json", b"first").unwrap();
        let path = store.save("t.json", b"second").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "second");
        assert_eq!(store.list().unwrap(), vec!["t.json"]);
    }

    #[test]
    fn test_export() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = ArtifactStore::open(temp.path()).unwrap();
        store.save("t.json", b"content").unwrap();

        let mut out = Vec::new();
        let written = store.export("t.json", &mut out).unwrap();
        assert_eq!(written, 7);
        assert_eq!(out, b"content");
    }

    #[test]
    fn test_export_missing() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = ArtifactStore::open(temp.path()).unwrap();
        let result = store.export("missing.json", &mut Vec::new());
        assert!(matches!(result, Err(ArtifactError::NotFound(_))));
    }

    #[test]
    fn test_invalid_names() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = ArtifactStore::open(temp.path()).unwrap();

        for name in ["", ".", "../secret", "a/b.json", "a\\b.json", ".."] {
            assert!(
                matches!(store.path_of(name), Err(ArtifactError::InvalidName(_))),
                "name {:?} should be rejected",
                name
            );
        }
        assert!(matches!(store.save("../x", b""), Err(ArtifactError::InvalidName(_))));
    }

    #[test]
    fn test_dots_inside_name_are_allowed() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = ArtifactStore::open(temp.path()).unwrap();

        let path = store.save("Strain_A..B.json", b"{}").unwrap();
        assert_eq!(path, temp.path().join("Strain_A..B.json"));
        assert_eq!(store.list().unwrap(), vec!["Strain_A..B.json"]);
        assert_eq!(store.path_of("Strain_A..B.json").unwrap(), path);
    }

    #[test]
    fn test_temporary_files_are_hidden() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = ArtifactStore::open(temp.path()).unwrap();
        fs::write(temp.path().join(".t.json.0000abcd.tmp"), "partial").unwrap();

        assert!(store.list().unwrap().is_empty());
        assert!(matches!(
            store.path_of(".t.json.0000abcd.tmp"),
            Err(ArtifactError::NotFound(_))
        ));
    }
}
