//! Asset copying: mirror a bundle's asset folder into the output tree.
//!
//! The destination is a [`ContentPath`] resolved by the caller from the
//! section, item or page path, optionally prefixed by the configured
//! `target_folder`. The *contents* of the source folder land directly in the
//! destination, preserving their relative layout.
//!
//! ## Concurrency
//!
//! Copies for different bundles run concurrently on the walker's rayon pool.
//! The copier holds no lock and does no conflict detection: callers keep
//! destinations disjoint. Files that already exist at the destination are
//! overwritten, so when two bundles do resolve to the same place the last
//! writer wins.

use crate::types::ContentPath;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read asset folder: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Copies asset folders below a fixed output root.
#[derive(Debug, Clone)]
pub struct AssetCopier {
    output_root: PathBuf,
    target_folder: Option<ContentPath>,
    dry_run: bool,
}

impl AssetCopier {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            target_folder: None,
            dry_run: false,
        }
    }

    /// Prefix every destination with `target_folder`.
    pub fn with_target_folder(mut self, target_folder: Option<ContentPath>) -> Self {
        self.target_folder = target_folder.filter(|p| !p.is_root());
        self
    }

    /// Count files instead of copying them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Filesystem location of a logical destination.
    pub fn output_path(&self, destination: &ContentPath) -> PathBuf {
        let logical = match &self.target_folder {
            Some(prefix) => prefix.append(destination.as_str()),
            None => destination.clone(),
        };
        logical
            .as_str()
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.output_root.clone(), |path, segment| path.join(segment))
    }

    /// Recursively copy the contents of `source` into `destination`.
    ///
    /// Returns the number of files copied.
    pub fn copy_folder(&self, source: &Path, destination: &ContentPath) -> Result<usize, AssetError> {
        let target = self.output_path(destination);
        let mut copied = 0;

        for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .unwrap_or_else(|_| entry.path());
            let to = target.join(relative);

            if entry.file_type().is_dir() {
                if !self.dry_run {
                    fs::create_dir_all(&to).map_err(|error| AssetError::Copy {
                        from: entry.path().to_path_buf(),
                        to: to.clone(),
                        source: error,
                    })?;
                }
                continue;
            }

            if !self.dry_run {
                copy_file(entry.path(), &to)?;
            }
            copied += 1;
        }

        debug!(
            source = %source.display(),
            destination = %target.display(),
            files = copied,
            dry_run = self.dry_run,
            "copied assets"
        );
        Ok(copied)
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<(), AssetError> {
    let wrap = |source| AssetError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::copy(from, to).map_err(wrap)?;
    Ok(())
}
