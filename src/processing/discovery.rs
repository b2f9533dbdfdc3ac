//! Input discovery

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::ShrinkError;
use crate::processing::formats::is_supported_path;

/// Collect every supported image below `root`.
///
/// Unreadable directories are logged and skipped; the walk carries on with
/// whatever else it can reach. Results come back in walk order.
///
/// Symlinked directories are not entered, but symlinks to files are
/// collected. A root that is not a directory yields nothing.
pub fn collect_image_paths<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let root = root.as_ref();
    let mut paths = Vec::new();

    if !root.is_dir() {
        warn!("{:?} is not a directory, nothing to collect", root);
        return paths;
    }

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let path = source.path().unwrap_or(root).to_path_buf();
                let err = ShrinkError::Traversal { path, source };
                warn!("{}", err);
                continue;
            }
        };

        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());

        if is_file && is_supported_path(entry.path()) {
            paths.push(entry.into_path());
        }
    }

    debug!("Collected {} image paths under {:?}", paths.len(), root);
    paths
}
