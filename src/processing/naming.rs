//! Collision-safe output naming

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ShrinkError};

/// Hands out `{base}_{index}.{ext}` names inside a single output directory.
///
/// Each candidate is opened with `create_new`, so the existence check and the
/// creation are one atomic step. Concurrent workers asking for the same base
/// name always end up with different files, and nothing that already exists
/// is ever truncated.
#[derive(Debug, Clone)]
pub struct UniqueNamer {
    output_dir: PathBuf,
}

/// An output file that has been created empty and now belongs to the caller
#[derive(Debug)]
pub struct Reservation {
    pub path: PathBuf,
    pub file: File,
}

impl UniqueNamer {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path for a given index, without touching the filesystem
    pub fn candidate(&self, base: &str, extension: &str, index: u64) -> PathBuf {
        let file_name = if extension.is_empty() {
            format!("{base}_{index}")
        } else {
            format!("{base}_{index}.{extension}")
        };
        self.output_dir.join(file_name)
    }

    /// Claim the first free name, starting at index 1
    pub fn reserve(&self, base: &str, extension: &str) -> Result<Reservation> {
        let mut index = 1u64;
        loop {
            let path = self.candidate(base, extension, index);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    debug!("Reserved output name {:?}", path);
                    return Ok(Reservation { path, file });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => index += 1,
                Err(e) => return Err(ShrinkError::naming(&self.output_dir, e)),
            }
        }
    }
}

impl Reservation {
    /// Give the name back after a failed write
    pub fn abandon(self) {
        let Reservation { path, file } = self;
        drop(file);
        if let Err(e) = std::fs::remove_file(&path) {
            debug!("Could not remove abandoned output {:?}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_first_reservation_uses_index_one() {
        let dir = TempDir::new().unwrap();
        let namer = UniqueNamer::new(dir.path());

        let reservation = namer.reserve("photo", "jpg").unwrap();
        assert_eq!(reservation.path, dir.path().join("photo_1.jpg"));
        assert!(reservation.path.exists());
    }

    #[test]
    fn test_skips_existing_variants() {
        let dir = TempDir::new().unwrap();
        for i in 1..=3 {
            std::fs::write(dir.path().join(format!("photo_{i}.png")), b"taken").unwrap();
        }
        let namer = UniqueNamer::new(dir.path());

        let reservation = namer.reserve("photo", "png").unwrap();
        assert_eq!(reservation.path, dir.path().join("photo_4.png"));

        // Existing files are left untouched
        assert_eq!(std::fs::read(dir.path().join("photo_3.png")).unwrap(), b"taken");
    }

    #[test]
    fn test_extension_case_is_preserved() {
        let namer = UniqueNamer::new("/out");
        assert_eq!(
            namer.candidate("IMG_0001", "JPG", 2),
            PathBuf::from("/out/IMG_0001_2.JPG")
        );
        assert_eq!(namer.candidate("noext", "", 1), PathBuf::from("/out/noext_1"));
    }

    #[test]
    fn test_concurrent_reservations_are_distinct() {
        let dir = TempDir::new().unwrap();
        let namer = Arc::new(UniqueNamer::new(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let namer = Arc::clone(&namer);
                std::thread::spawn(move || {
                    (0..5)
                        .map(|_| namer.reserve("same", "gif").unwrap().path)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let paths: HashSet<PathBuf> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(paths.len(), 40);
        for i in 1..=40 {
            assert!(paths.contains(&dir.path().join(format!("same_{i}.gif"))));
        }
    }

    #[test]
    fn test_abandon_frees_the_name() {
        let dir = TempDir::new().unwrap();
        let namer = UniqueNamer::new(dir.path());

        let reservation = namer.reserve("retry", "bmp").unwrap();
        reservation.abandon();

        let again = namer.reserve("retry", "bmp").unwrap();
        assert_eq!(again.path, dir.path().join("retry_1.bmp"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let namer = UniqueNamer::new(dir.path().join("does-not-exist"));

        let err = namer.reserve("photo", "jpg").unwrap_err();
        assert!(matches!(err, ShrinkError::Naming { .. }));
    }
}
