//! Sequential directory walker.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};

use cleanout_core::{EntryWarning, WarningKind};

/// One entry yielded by a walk.
#[derive(Debug)]
pub struct WalkItem {
    /// Path of the entry.
    pub path: PathBuf,
    /// Depth below the walk root (the root itself is 0).
    pub depth: usize,
    /// Entry metadata (symlinks are not followed), or why it could not be read.
    pub outcome: Result<Metadata, EntryWarning>,
}

impl WalkItem {
    fn from_jwalk(result: Result<jwalk::DirEntry<((), ())>, jwalk::Error>) -> Self {
        match result {
            Ok(entry) => {
                let path = entry.path();
                let outcome = entry
                    .metadata()
                    .map_err(|err| warning_for(&path, &err, WarningKind::MetadataError));
                Self {
                    path,
                    depth: entry.depth(),
                    outcome,
                }
            }
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                Self {
                    outcome: Err(warning_for(&path, &err, WarningKind::ReadError)),
                    depth: 0,
                    path,
                }
            }
        }
    }

    /// Whether the entry could be inspected.
    pub fn is_readable(&self) -> bool {
        self.outcome.is_ok()
    }
}

fn warning_for(path: &Path, err: &jwalk::Error, fallback: WarningKind) -> EntryWarning {
    match err.io_error() {
        Some(io) => EntryWarning::from_io(path, io, fallback),
        None => EntryWarning::new(path, err.to_string(), fallback),
    }
}

/// Walks every entry beneath a root, one at a time, on the calling thread.
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
}

impl Walker {
    /// Create a walker rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Start a fresh traversal.
    ///
    /// The returned iterator is lazy: directories are read as it advances.
    /// The root is yielded first; siblings come in name order. Hidden
    /// entries are included and symbolic links are not followed.
    pub fn entries(&self) -> impl Iterator<Item = WalkItem> + use<> {
        WalkDir::new(&self.root)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false)
            .follow_links(false)
            .sort(true)
            .min_depth(0)
            .into_iter()
            .map(WalkItem::from_jwalk)
    }
}
