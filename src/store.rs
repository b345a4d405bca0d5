//! Content-file discovery and persistence.
//!
//! Module files live flat in the content directory under a handful of known
//! grade-prefix naming schemes. Discovery de-duplicates and sorts the list so
//! seeded batch runs are reproducible (same order in → same exercises out).

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::domain::ModuleFile;

/// Filename patterns of the module generations currently in production.
const MODULE_PATTERNS: &[&str] = &[
  "module-*.json",
  "grade4-lower-mod-*.json",
  "grade4-upper-mod-*.json",
  "grade5-lower-mod-*.json",
  "grade5-upper-mod-*.json",
  "grade6-lower-mod-*.json",
  "grade6-upper-mod-*.json",
];

pub struct ContentStore {
  content_dir: PathBuf,
}

impl ContentStore {
  pub fn new(content_dir: impl Into<PathBuf>) -> Self {
    Self { content_dir: content_dir.into() }
  }

  /// Discover module files. With an explicit name-stem pattern (e.g.
  /// `grade5-lower-*`) only that pattern is used; otherwise all known module
  /// naming schemes are scanned. Returns sorted, de-duplicated paths.
  pub fn discover(&self, pattern: Option<&str>) -> Result<Vec<PathBuf>, String> {
    if !self.content_dir.is_dir() {
      return Err(format!("content directory does not exist: {}", self.content_dir.display()));
    }
    let custom;
    let patterns: Vec<&str> = match pattern {
      Some(p) => {
        custom = format!("{}.json", p.trim_end_matches(".json"));
        vec![custom.as_str()]
      }
      None => MODULE_PATTERNS.to_vec(),
    };

    let mut names = BTreeSet::new();
    let entries = fs::read_dir(&self.content_dir)
      .map_err(|e| format!("cannot read {}: {}", self.content_dir.display(), e))?;
    for entry in entries.flatten() {
      let name = entry.file_name().to_string_lossy().to_string();
      if patterns.iter().any(|p| glob_match(&name, p)) {
        names.insert(name);
      }
    }

    debug!(target: "quest_tools", count = names.len(), "Discovered module files");
    Ok(names.into_iter().map(|n| self.content_dir.join(n)).collect())
  }

  pub fn load(&self, path: &Path) -> Result<ModuleFile, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("parse {}: {}", path.display(), e))
  }

  /// Write the module back (pretty-printed, UTF-8 as-is). When `backup` is
  /// set and the file already exists, a timestamped copy is left beside it.
  pub fn save(&self, path: &Path, module: &ModuleFile, backup: bool) -> Result<(), String> {
    if backup && path.exists() {
      let stamp = Local::now().format("%Y%m%d-%H%M%S");
      let backup_path = PathBuf::from(format!("{}.backup-{}", path.display(), stamp));
      fs::copy(path, &backup_path).map_err(|e| format!("backup {}: {}", path.display(), e))?;
      info!(target: "quest_tools", backup = %backup_path.display(), "Backed up module file");
    }
    let text =
      serde_json::to_string_pretty(module).map_err(|e| format!("serialize {}: {}", path.display(), e))?;
    fs::write(path, text).map_err(|e| format!("write {}: {}", path.display(), e))
  }
}

/// Filenames of every `.mp3` under `dir` (recursive: tts/ and sfx/ both
/// live under the audio root).
pub fn existing_audio_files(dir: &Path) -> HashSet<String> {
  let mut files = HashSet::new();
  for entry in WalkDir::new(dir).into_iter().flatten() {
    if entry.file_type().is_file() {
      let name = entry.file_name().to_string_lossy();
      if name.ends_with(".mp3") {
        files.insert(name.to_string());
      }
    }
  }
  files
}

/// Basename of an audio reference like `/audio/tts/stamp.mp3`.
pub fn audio_basename(reference: &str) -> String {
  reference.rsplit('/').next().unwrap_or(reference).to_string()
}

/// Minimal name-stem glob: `*` matches any run of characters.
fn glob_match(name: &str, pattern: &str) -> bool {
  let parts: Vec<&str> = pattern.split('*').collect();
  if parts.len() == 1 {
    return name == pattern;
  }
  let mut rest = name;
  for (i, part) in parts.iter().enumerate() {
    if part.is_empty() {
      continue;
    }
    if i == 0 {
      match rest.strip_prefix(part) {
        Some(r) => rest = r,
        None => return false,
      }
    } else if i == parts.len() - 1 {
      return rest.ends_with(part);
    } else {
      match rest.find(part) {
        Some(pos) => rest = &rest[pos + part.len()..],
        None => return false,
      }
    }
  }
  // pattern ended with '*'
  true
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::fs;
  use tempfile::tempdir;

  #[test]
  fn glob_match_basics() {
    assert!(glob_match("module-01-how-long.json", "module-*.json"));
    assert!(glob_match("grade5-lower-mod-03.json", "grade5-lower-*.json"));
    assert!(!glob_match("grade5-upper-mod-03.json", "grade5-lower-*.json"));
    assert!(glob_match("anything.json", "*.json"));
    assert!(!glob_match("anything.txt", "*.json"));
    assert!(glob_match("exact.json", "exact.json"));
  }

  #[test]
  fn discover_is_sorted_and_filtered() {
    let dir = tempdir().unwrap();
    for name in [
      "module-02-chinatown.json",
      "module-01-how-long.json",
      "grade5-lower-mod-01-driver.json",
      "notes.txt",
      "README.json",
    ] {
      fs::write(dir.path().join(name), "{}").unwrap();
    }
    let store = ContentStore::new(dir.path());

    let all = store.discover(None).unwrap();
    let names: Vec<_> = all.iter().map(|p| p.file_name().unwrap().to_string_lossy().to_string()).collect();
    assert_eq!(
      names,
      vec!["grade5-lower-mod-01-driver.json", "module-01-how-long.json", "module-02-chinatown.json"]
    );

    let only = store.discover(Some("module-*")).unwrap();
    assert_eq!(only.len(), 2);
  }

  #[test]
  fn discover_missing_dir_is_an_error() {
    let store = ContentStore::new("/definitely/not/here");
    assert!(store.discover(None).is_err());
  }

  #[test]
  fn save_round_trips_and_backs_up() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("module-01-test.json");
    fs::write(
      &path,
      serde_json::to_string(&json!({
        "moduleId": "module-01",
        "words": [{"en": "stamp", "zh": "邮票"}],
        "custom": {"keep": true}
      }))
      .unwrap(),
    )
    .unwrap();

    let store = ContentStore::new(dir.path());
    let module = store.load(&path).unwrap();
    store.save(&path, &module, true).unwrap();

    let reloaded = store.load(&path).unwrap();
    assert_eq!(reloaded.module_id.as_deref(), Some("module-01"));
    assert!(reloaded.extra.contains_key("custom"));

    let backups: Vec<_> = fs::read_dir(dir.path())
      .unwrap()
      .flatten()
      .filter(|e| e.file_name().to_string_lossy().contains(".backup-"))
      .collect();
    assert_eq!(backups.len(), 1);
  }

  #[test]
  fn audio_basename_strips_prefix() {
    assert_eq!(audio_basename("/audio/tts/stamp.mp3"), "stamp.mp3");
    assert_eq!(audio_basename("stamp.mp3"), "stamp.mp3");
  }

  #[test]
  fn existing_audio_files_recurses() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("tts")).unwrap();
    fs::create_dir_all(dir.path().join("sfx")).unwrap();
    fs::write(dir.path().join("tts/stamp.mp3"), b"x").unwrap();
    fs::write(dir.path().join("sfx/correct.mp3"), b"x").unwrap();
    fs::write(dir.path().join("tts/readme.txt"), b"x").unwrap();
    let files = existing_audio_files(dir.path());
    assert!(files.contains("stamp.mp3"));
    assert!(files.contains("correct.mp3"));
    assert_eq!(files.len(), 2);
  }
}
