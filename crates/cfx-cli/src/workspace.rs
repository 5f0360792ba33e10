//! Working-copy housekeeping: cloning a base export and clearing work
//! directories.

use std::fs;
use std::path::Path;

use anyhow::Context;
use walkdir::WalkDir;

const KEEP_FILE: &str = ".gitkeep";

/// Replaces `to` with a copy of `from`. Returns the number of files copied.
pub fn clone_tree(from: &Path, to: &Path) -> anyhow::Result<usize> {
    if to.exists() {
        fs::remove_dir_all(to).with_context(|| format!("failed to remove {}", to.display()))?;
    }
    let mut files = 0;
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", from.display()))?;
        let relative = entry.path().strip_prefix(from)?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("failed to create {}", target.display()))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("failed to copy {}", entry.path().display()))?;
            files += 1;
        }
    }
    Ok(files)
}

/// Removes everything under `dir` except `.gitkeep` files and the
/// directories holding them. Returns the number of entries removed.
pub fn clear_dir(dir: &Path) -> anyhow::Result<usize> {
    let mut removed = 0;
    for entry in WalkDir::new(dir).min_depth(1).contents_first(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_dir() {
            let empty = fs::read_dir(path)
                .with_context(|| format!("failed to read {}", path.display()))?
                .next()
                .is_none();
            if empty {
                fs::remove_dir(path).with_context(|| format!("failed to remove {}", path.display()))?;
                removed += 1;
            }
        } else if entry.file_name() != KEEP_FILE {
            fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    #[test]
    fn clone_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("base");
        let to = dir.path().join("work/base");
        write(&from, "Configuration.xml");
        write(&from, "Catalogs/A/Ext/ManagerModule.bsl");
        write(&to, "stale.txt");

        assert_eq!(clone_tree(&from, &to).unwrap(), 2);
        assert!(to.join("Catalogs/A/Ext/ManagerModule.bsl").is_file());
        assert!(!to.join("stale.txt").exists());
    }

    #[test]
    fn clear_keeps_gitkeep() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, ".gitkeep");
        write(root, "Fixes_changed_files.lst");
        write(root, "Fixes/base/Configuration.xml");
        write(root, "logs/.gitkeep");
        write(root, "logs/run.log");

        assert_eq!(clear_dir(root).unwrap(), 5);
        assert!(root.join(".gitkeep").is_file());
        assert!(root.join("logs/.gitkeep").is_file());
        assert!(!root.join("logs/run.log").exists());
        assert!(!root.join("Fixes").exists());
        assert!(!root.join("Fixes_changed_files.lst").exists());
    }
}
