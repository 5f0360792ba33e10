//! The changed-files list consumed by the partial load step.

use std::path::{Path, PathBuf};

/// Ordered, duplicate-free list of files written by a merge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangedFiles {
    paths: Vec<PathBuf>,
}

impl ChangedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a path. A path already listed keeps its first position.
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// One path per line, newline-joined, no trailing newline.
    pub fn render(&self) -> String {
        self.paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
