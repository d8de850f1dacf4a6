//! Directory walker producing file descriptors for a manifest run.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use same_file::is_same_file;

use crate::models::FileDescriptor;

/// Collect descriptors for every entry below `root`, depth first in name order.
///
/// Directories yield content-less descriptors, files are read into memory. Symlinked
/// files are read through the link; symlinked directories are not descended into.
/// Hidden entries are ignored, as are the files in `skip` (typically the manifest
/// being regenerated and its options file).
pub fn scan_directory(root: &Path, skip: &[&Path]) -> Result<Vec<FileDescriptor>> {
  let mut files = Vec::new();
  collect_recursively(root, root, skip, &mut files)?;
  Ok(files)
}

fn collect_recursively(
  root: &Path,
  dir: &Path,
  skip: &[&Path],
  files: &mut Vec<FileDescriptor>,
) -> Result<()> {
  let mut entries = fs::read_dir(dir)
    .with_context(|| format!("failed to read directory {}", dir.display()))?
    .collect::<std::io::Result<Vec<_>>>()
    .with_context(|| format!("failed to list {}", dir.display()))?;
  entries.sort_by_key(|entry| entry.file_name());

  for entry in entries {
    if entry.file_name().to_string_lossy().starts_with('.') {
      continue;
    }

    let path = entry.path();
    let file_type = entry
      .file_type()
      .with_context(|| format!("failed to stat {}", path.display()))?;

    if file_type.is_dir() {
      files.push(FileDescriptor::null(&path, root));
      collect_recursively(root, &path, skip, files)?;
    } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
      if is_skipped(&path, skip) {
        continue;
      }
      let contents =
        fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
      files.push(FileDescriptor::buffered(&path, root, contents));
    }
  }

  Ok(())
}

fn is_skipped(path: &Path, skip: &[&Path]) -> bool {
  skip
    .iter()
    .any(|skipped| is_same_file(path, skipped).unwrap_or(false))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::FileContents;
  use tempfile::tempdir;

  #[test]
  fn walks_tree_in_sorted_order() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("js")).unwrap();
    fs::write(dir.path().join("b.css"), "b").unwrap();
    fs::write(dir.path().join("a.html"), "a").unwrap();
    fs::write(dir.path().join("js").join("app.js"), "js").unwrap();
    fs::write(dir.path().join(".hidden"), "secret").unwrap();

    let files = scan_directory(dir.path(), &[]).unwrap();
    let relatives: Vec<_> = files
      .iter()
      .map(|file| file.relative().to_string_lossy().replace('\\', "/"))
      .collect();

    assert_eq!(relatives, vec!["a.html", "b.css", "js", "js/app.js"]);
    assert_eq!(files[2].contents, FileContents::Null);
    assert_eq!(files[3].contents, FileContents::Buffered(b"js".to_vec()));
  }

  #[test]
  fn skips_the_manifest_output() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("app.manifest");
    fs::write(&manifest, "CACHE MANIFEST\n").unwrap();
    fs::write(dir.path().join("index.html"), "<html>").unwrap();

    let files = scan_directory(dir.path(), &[manifest.as_path()]).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].relative(), Path::new("index.html"));
  }

  #[cfg(unix)]
  #[test]
  fn does_not_follow_directory_symlink_cycles() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::write(dir.path().join("a").join("app.js"), "run()").unwrap();
    fs::write(dir.path().join("shared.css"), "body {}").unwrap();
    symlink(dir.path(), dir.path().join("a").join("loop")).unwrap();
    symlink(dir.path().join("shared.css"), dir.path().join("a").join("linked.css")).unwrap();

    let files = scan_directory(dir.path(), &[]).unwrap();
    let relatives: Vec<_> = files
      .iter()
      .map(|file| file.relative().to_string_lossy().replace('\\', "/"))
      .collect();

    assert_eq!(relatives, vec!["a", "a/app.js", "a/linked.css", "shared.css"]);
    assert_eq!(files[2].contents, FileContents::Buffered(b"body {}".to_vec()));
  }
}
