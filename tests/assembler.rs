use std::fs;
use std::thread;

use appcache_manifest::scan::scan_directory;
use appcache_manifest::{
  FileDescriptor, ManifestAssembler, ManifestError, ManifestOptions, ManifestWarning, assemble,
};
use tempfile::tempdir;

fn fixture(relative: &str, contents: &str) -> FileDescriptor {
  FileDescriptor::buffered(
    format!("./test/fixture/{relative}"),
    "./test/fixture/",
    contents,
  )
}

fn hash_line(text: &str) -> &str {
  text
    .lines()
    .last()
    .and_then(|line| line.strip_prefix("# hash: "))
    .expect("manifest should end with a hash trailer")
}

#[test]
fn generates_a_manifest_file() {
  let options = ManifestOptions::default()
    .with_filename("cache.manifest")
    .with_hash(true)
    .with_network(["http://*", "https://*", "*"])
    .with_prefer_online(true);
  let files = [
    fixture("file1.js", "notimportant"),
    fixture("file2.js", "notimportant"),
    fixture("file3.js", "notimportant"),
  ];

  let artifact = assemble(options, &files).unwrap();
  let text = artifact.contents();

  assert_eq!(artifact.filename, "cache.manifest");
  assert!(text.starts_with("CACHE MANIFEST\n"));
  assert!(text.contains("CACHE:\nfile1.js\nfile2.js\nfile3.js\n"));
  assert!(text.contains("NETWORK:\nhttp://*\nhttps://*\n*\n"));
  assert!(text.contains("SETTINGS:\nprefer-online\n"));
  assert_eq!(hash_line(&text).len(), 64);
}

#[test]
fn excluded_files_are_left_out_and_hash_trails() {
  let options = ManifestOptions::default()
    .with_exclude(["b.js"])
    .with_hash(true);
  let artifact = assemble(options, &[fixture("a.js", "a"), fixture("b.js", "b")]).unwrap();
  let text = artifact.contents();

  assert!(text.starts_with("CACHE MANIFEST"));
  assert!(text.contains("CACHE:\na.js\n"));
  assert!(!text.contains("b.js"));

  let digest = hash_line(&text);
  assert_eq!(digest.len(), 64);
  assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn cache_lists_each_accepted_path_once_in_arrival_order() {
  let options = ManifestOptions::default().with_exclude(["dir/**", "file2.js"]);
  let files = [
    fixture("zeta.js", "z"),
    fixture("file2.js", "excluded"),
    fixture("sub/file2.js", "kept"),
    fixture("dir/deep/x.js", "excluded"),
    fixture("alpha.js", "a"),
  ];

  let artifact = assemble(options, &files).unwrap();
  assert_eq!(artifact.document.cache_entries(), [
    "zeta.js".to_string(),
    "sub/file2.js".to_string(),
    "alpha.js".to_string(),
  ]);
}

#[test]
fn hashing_is_deterministic_and_content_sensitive() {
  let options = ManifestOptions::default().with_hash(true);
  let run = |second: &str| {
    let files = [fixture("a.js", "first"), fixture("b.js", second)];
    assemble(options.clone(), &files)
      .unwrap()
      .document
      .hash()
      .map(str::to_string)
  };

  assert_eq!(run("second"), run("second"));
  assert_ne!(run("second"), run("secone"));
}

#[test]
fn concurrent_runs_do_not_share_digest_state() {
  let left_files: Vec<_> = (0..50)
    .map(|i| fixture(&format!("left/{i}.js"), &format!("left {i}")))
    .collect();
  let right_files: Vec<_> = (0..50)
    .map(|i| fixture(&format!("right/{i}.css"), &format!("right {i}")))
    .collect();
  let options = ManifestOptions::default().with_hash(true);

  let expected_left = assemble(options.clone(), &left_files).unwrap().contents();
  let expected_right = assemble(options.clone(), &right_files).unwrap().contents();

  let (left, right) = thread::scope(|scope| {
    let left = scope.spawn(|| assemble(options.clone(), &left_files).unwrap().contents());
    let right = scope.spawn(|| assemble(options.clone(), &right_files).unwrap().contents());
    (left.join().unwrap(), right.join().unwrap())
  });

  assert_eq!(left, expected_left);
  assert_eq!(right, expected_right);
  assert_ne!(hash_line(&left), hash_line(&right));
}

#[test]
fn fallback_entries_render_and_malformed_ones_are_dropped() {
  let options = ManifestOptions::default().with_fallback(["/ /offline.html", "badentry"]);
  let artifact = assemble(options, std::iter::empty()).unwrap();
  let text = artifact.contents();

  assert!(text.contains("FALLBACK:\n/ /offline.html"));
  assert!(!text.contains("badentry"));
  assert_eq!(artifact.warnings, vec![ManifestWarning::InvalidFallbackFormat {
    entry: "badentry".into()
  }]);
}

#[test]
fn default_network_is_wildcard_and_settings_absent() {
  let text = assemble(ManifestOptions::default(), std::iter::empty()).unwrap().contents();

  assert!(text.contains("NETWORK:\n*"));
  assert!(!text.contains("SETTINGS:"));
  assert!(!text.contains("FALLBACK:"));
  assert!(!text.contains("# hash:"));
}

#[test]
fn streamed_input_fails_without_an_artifact() {
  let mut assembler = ManifestAssembler::new(ManifestOptions::default()).unwrap();
  assembler.accept(&fixture("a.js", "a")).unwrap();

  let result = assembler.accept(&FileDescriptor::stream("./test/fixture/b.js", "./test/fixture/"));
  assert!(matches!(result, Err(ManifestError::UnsupportedInputKind { .. })));
  assert!(assembler.finish().is_err());
}

#[test]
fn directory_scan_feeds_the_assembler() {
  let dir = tempdir().unwrap();
  fs::create_dir_all(dir.path().join("js")).unwrap();
  fs::create_dir_all(dir.path().join("maps")).unwrap();
  fs::write(dir.path().join("index.html"), "<html>").unwrap();
  fs::write(dir.path().join("js").join("my app.js"), "run()").unwrap();
  fs::write(dir.path().join("maps").join("app.js.map"), "{}").unwrap();

  let files = scan_directory(dir.path(), &[]).unwrap();
  let options = ManifestOptions::default()
    .with_include(["index.html"])
    .with_exclude(["maps/**"])
    .with_prefix("/");
  let artifact = assemble(options, &files).unwrap();

  assert_eq!(artifact.document.cache_entries(), [
    "index.html".to_string(),
    "/js/my%20app.js".to_string(),
  ]);
}
