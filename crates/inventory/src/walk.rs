//! Recursive directory traversal shared by the counting and visiting passes.

use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use delve_config::ScanConfig;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, ErrorKind};

/// One step of a [`TreeScanner::visit`] pass.
#[derive(Debug)]
pub enum Visit<'a> {
    /// A regular file, or a symbolic link to one.
    File(&'a Path),
    /// A directory that could not be listed. Only its branch is skipped.
    Unreadable(Error),
}

enum WalkEntry {
    File(PathBuf),
    Unreadable(Error),
    Skip,
}

/// Walks a tree applying the symlink, depth and ordering policy from
/// [`ScanConfig`].
#[derive(Debug, Clone, Default)]
pub struct TreeScanner {
    follow_symlinks: bool,
    max_depth: Option<usize>,
    sort_entries: bool,
}

impl TreeScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self { follow_symlinks: config.follow_symlinks, max_depth: config.max_depth, sort_entries: config.sort_entries }
    }

    fn walk(&self, root: &Path) -> impl Iterator<Item = WalkEntry> + use<> {
        let mut walker = WalkDir::new(root).follow_links(self.follow_symlinks);
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }
        if self.sort_entries {
            walker = walker.sort_by_file_name();
        }
        walker.into_iter().map(|entry| match entry {
            Ok(entry) => classify(&entry),
            Err(err) => classify_error(err),
        })
    }

    /// Counts the files a [`visit`](Self::visit) of `root` would report.
    /// Unreadable branches contribute nothing.
    pub fn count_files(&self, root: &Path) -> u64 {
        self.walk(root).filter(|entry| matches!(entry, WalkEntry::File(_))).count() as u64
    }

    /// Calls `on_visit` for every file under `root` in depth-first order, and
    /// for every branch that couldn't be read. Returning
    /// [`ControlFlow::Break`] stops the walk.
    pub fn visit<F>(&self, root: &Path, mut on_visit: F) -> ControlFlow<()>
    where
        F: FnMut(Visit<'_>) -> ControlFlow<()>,
    {
        for entry in self.walk(root) {
            match entry {
                WalkEntry::File(path) => on_visit(Visit::File(&path))?,
                WalkEntry::Unreadable(err) => on_visit(Visit::Unreadable(err))?,
                WalkEntry::Skip => {},
            }
        }
        ControlFlow::Continue(())
    }
}

fn classify(entry: &DirEntry) -> WalkEntry {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return WalkEntry::File(entry.path().to_path_buf());
    }
    if file_type.is_symlink() {
        // Only reached when links aren't followed.
        return match fs::metadata(entry.path()) {
            Ok(target) if target.is_file() => WalkEntry::File(entry.path().to_path_buf()),
            Ok(_) => {
                debug!(path = %entry.path().display(), "Skipping symbolic link to a directory");
                WalkEntry::Skip
            },
            Err(err) => {
                debug!(path = %entry.path().display(), error = %err, "Skipping dangling symbolic link");
                WalkEntry::Skip
            },
        };
    }
    if !file_type.is_dir() {
        debug!(path = %entry.path().display(), "Skipping special file");
    }
    WalkEntry::Skip
}

fn classify_error(err: walkdir::Error) -> WalkEntry {
    let path = err.path().map(|path| path.display().to_string()).unwrap_or_default();
    if let Some(ancestor) = err.loop_ancestor() {
        warn!(path, ancestor = %ancestor.display(), "Not descending into filesystem loop");
        return WalkEntry::Unreadable(exn::Exn::from(err).raise(ErrorKind::Loop(path)));
    }
    if let Some(link) = err.path()
        && fs::symlink_metadata(link).is_ok_and(|meta| meta.file_type().is_symlink())
        && fs::metadata(link).is_err()
    {
        debug!(path, "Skipping dangling symbolic link");
        return WalkEntry::Skip;
    }
    warn!(path, error = %err, "Unable to read directory");
    WalkEntry::Unreadable(exn::Exn::from(err).raise(ErrorKind::Unreadable(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs::{create_dir_all, write};
    use tempfile::TempDir;

    fn tree(files: &[&str], dirs: &[&str]) -> TempDir {
        let root = tempfile::tempdir().unwrap();
        for dir in dirs {
            create_dir_all(root.path().join(dir)).unwrap();
        }
        for file in files {
            let path = root.path().join(file);
            create_dir_all(path.parent().unwrap()).unwrap();
            write(path, file.as_bytes()).unwrap();
        }
        root
    }

    fn visited(scanner: &TreeScanner, root: &Path) -> Vec<String> {
        let mut seen = Vec::new();
        let flow = scanner.visit(root, |visit| {
            if let Visit::File(path) = visit {
                seen.push(path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"));
            }
            ControlFlow::Continue(())
        });
        assert_eq!(flow, ControlFlow::Continue(()));
        seen
    }

    #[rstest]
    #[case(&[], &[], 0)]
    #[case(&[], &["a", "a/b", "c"], 0)]
    #[case(&["one.txt"], &[], 1)]
    #[case(&["one.txt", "a/two.txt", "a/b/three.txt"], &["empty"], 3)]
    fn counts_non_directory_leaves(#[case] files: &[&str], #[case] dirs: &[&str], #[case] expected: u64) {
        let root = tree(files, dirs);
        let scanner = TreeScanner::default();
        assert_eq!(scanner.count_files(root.path()), expected);
        assert_eq!(visited(&scanner, root.path()).len() as u64, expected);
    }

    #[test]
    fn sorted_depth_first() {
        let root = tree(&["b.txt", "a/z.txt", "a/y/x.txt", "c/w.txt"], &[]);
        let scanner = TreeScanner::new(&ScanConfig { sort_entries: true, ..ScanConfig::default() });
        assert_eq!(visited(&scanner, root.path()), vec!["a/y/x.txt", "a/z.txt", "b.txt", "c/w.txt"]);
    }

    #[test]
    fn max_depth_bounds_recursion() {
        let root = tree(&["top.txt", "a/mid.txt", "a/b/deep.txt"], &[]);
        let scanner = TreeScanner::new(&ScanConfig { max_depth: Some(2), ..ScanConfig::default() });
        assert_eq!(scanner.count_files(root.path()), 2);
    }

    #[test]
    fn break_stops_the_walk() {
        let root = tree(&["a.txt", "b.txt", "c.txt"], &[]);
        let mut calls = 0;
        let flow = TreeScanner::default().visit(root.path(), |_| {
            calls += 1;
            ControlFlow::Break(())
        });
        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(calls, 1);
    }

    #[test]
    fn missing_root_is_unreadable() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("gone");
        let mut errors = Vec::new();
        let _ = TreeScanner::default().visit(&missing, |visit| {
            if let Visit::Unreadable(err) = visit {
                errors.push(err);
            }
            ControlFlow::Continue(())
        });
        assert_eq!(errors.len(), 1);
        assert!(matches!(&*errors[0], ErrorKind::Unreadable(_)));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::{PermissionsExt, symlink};

        #[test]
        fn symlinks_are_not_followed_by_default() {
            let root = tree(&["real/file.txt"], &[]);
            symlink(root.path().join("real/file.txt"), root.path().join("link.txt")).unwrap();
            symlink(root.path().join("real"), root.path().join("dirlink")).unwrap();
            symlink(root.path().join("nowhere"), root.path().join("dangling")).unwrap();
            let scanner = TreeScanner::new(&ScanConfig { sort_entries: true, ..ScanConfig::default() });
            assert_eq!(visited(&scanner, root.path()), vec!["link.txt", "real/file.txt"]);
            assert_eq!(scanner.count_files(root.path()), 2);
        }

        #[test]
        fn followed_symlinks() {
            let root = tree(&["real/file.txt"], &[]);
            symlink(root.path().join("real"), root.path().join("dirlink")).unwrap();
            symlink(root.path().join("nowhere"), root.path().join("dangling")).unwrap();
            let scanner = TreeScanner::new(&ScanConfig { follow_symlinks: true, sort_entries: true, ..ScanConfig::default() });
            assert_eq!(visited(&scanner, root.path()), vec!["dirlink/file.txt", "real/file.txt"]);
        }

        #[test]
        fn loops_are_reported_once_per_branch() {
            let root = tree(&["a/file.txt"], &[]);
            symlink(root.path(), root.path().join("a/back")).unwrap();
            let scanner = TreeScanner::new(&ScanConfig { follow_symlinks: true, ..ScanConfig::default() });
            let mut loops = 0;
            let mut files = 0;
            let _ = scanner.visit(root.path(), |visit| {
                match visit {
                    Visit::File(_) => files += 1,
                    Visit::Unreadable(err) => {
                        assert!(matches!(&*err, ErrorKind::Loop(_)));
                        loops += 1;
                    },
                }
                ControlFlow::Continue(())
            });
            assert_eq!((files, loops), (1, 1));
        }

        #[test]
        fn unreadable_directory_skips_only_its_branch() {
            let root = tree(&["open/a.txt", "locked/b.txt"], &[]);
            let locked = root.path().join("locked");
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
            // Permission bits don't bind a privileged user.
            if fs::read_dir(&locked).is_ok() {
                fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
                return;
            }
            let mut files = Vec::new();
            let mut unreadable = 0;
            let _ = TreeScanner::default().visit(root.path(), |visit| {
                match visit {
                    Visit::File(path) => files.push(path.to_path_buf()),
                    Visit::Unreadable(_) => unreadable += 1,
                }
                ControlFlow::Continue(())
            });
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            assert_eq!(files, vec![root.path().join("open/a.txt")]);
            assert_eq!(unreadable, 1);
        }

        #[test]
        fn fifos_are_skipped() {
            let root = tree(&["a.txt"], &[]);
            let status = std::process::Command::new("mkfifo").arg(root.path().join("pipe")).status();
            if !status.is_ok_and(|status| status.success()) {
                return;
            }
            assert_eq!(TreeScanner::default().count_files(root.path()), 1);
        }
    }
}
