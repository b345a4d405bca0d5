//! Regenerate the four practice quests for every matching module file.

use tracing::{error, info, warn};

use crate::commands::CommandArgs;
use crate::config::ToolConfig;
use crate::lexicon::Lexicon;
use crate::quests::QuestBuilder;
use crate::shuffle::seeded_rng;
use crate::store::ContentStore;

pub fn run(cfg: &ToolConfig, args: &CommandArgs) -> Result<(), String> {
  let store = ContentStore::new(&cfg.paths.content_dir);
  let files = store.discover(args.file_pattern().as_deref())?;
  if files.is_empty() {
    warn!(target: "quests", content_dir = %cfg.paths.content_dir, "No module files matched");
    return Ok(());
  }

  let mut lexicon = Lexicon::curated();
  lexicon.extend(cfg.lexicon.extra_words.iter().cloned());
  info!(target: "quests", files = files.len(), lexicon_entries = lexicon.entry_count(), "Generating quests");
  let builder = QuestBuilder::new(&lexicon, &cfg.paths.audio_url_prefix);

  // One seeded generator for the whole (sorted) batch keeps reruns
  // byte-identical.
  let mut rng = seeded_rng(cfg.shuffle.seed);

  let mut updated = 0usize;
  let mut skipped = 0usize;
  let mut failed = 0usize;

  for path in &files {
    let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let mut module = match store.load(path) {
      Ok(m) => m,
      Err(e) => {
        error!(target: "quests", %name, error = %e, "Failed to load module; skipping");
        failed += 1;
        continue;
      }
    };

    let quests = builder.build_all(&module, &mut rng);
    if quests.is_empty() {
      warn!(target: "quests", %name, "Not enough source content; skipping");
      skipped += 1;
      continue;
    }
    let quest_count = quests.len();
    module.quests = quests;

    if args.dry_run {
      info!(target: "quests", %name, quest_count, "Dry run: would update");
      updated += 1;
      continue;
    }

    match store.save(path, &module, true) {
      Ok(()) => {
        info!(target: "quests", %name, quest_count, "Updated");
        updated += 1;
      }
      Err(e) => {
        error!(target: "quests", %name, error = %e, "Failed to save module");
        failed += 1;
      }
    }
  }

  info!(
    target: "quests",
    updated, skipped, failed,
    dry_run = args.dry_run,
    "Quest generation finished"
  );
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ToolConfig;
  use serde_json::{json, Value};
  use std::fs;
  use tempfile::tempdir;

  fn write_module(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("module-01-how-long.json");
    fs::write(
      &path,
      serde_json::to_string_pretty(&json!({
        "moduleId": "module-01-how-long",
        "title": "How long?",
        "words": [
          {"en": "near", "zh": "在附近", "audio": "/audio/tts/near.mp3"},
          {"en": "along", "zh": "沿着"},
          {"en": "more than", "zh": "超过"}
        ],
        "phrases": [
          {"en": "the Great Wall", "zh": "长城", "audio": "/audio/tts/the-great-wall.mp3"}
        ],
        "patterns": [
          {"q": "How long is the Great Wall?", "a": "长城有多长？"},
          {"q": "It's more than two thousand years old.", "a": "它有两千多年历史了。"}
        ],
        "quests": []
      }))
      .unwrap(),
    )
    .unwrap();
    path
  }

  fn config_for(dir: &std::path::Path) -> ToolConfig {
    let mut cfg = ToolConfig::default();
    cfg.paths.content_dir = dir.to_string_lossy().to_string();
    cfg
  }

  #[test]
  fn writes_quests_and_backup() {
    let dir = tempdir().unwrap();
    let path = write_module(dir.path());
    let cfg = config_for(dir.path());

    run(&cfg, &CommandArgs::default()).unwrap();

    let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let quests = raw["quests"].as_array().unwrap();
    assert!(!quests.is_empty());
    assert_eq!(raw["title"], "How long?");

    let backups = fs::read_dir(dir.path())
      .unwrap()
      .flatten()
      .filter(|e| e.file_name().to_string_lossy().contains(".backup-"))
      .count();
    assert_eq!(backups, 1);
  }

  #[test]
  fn dry_run_leaves_files_alone() {
    let dir = tempdir().unwrap();
    let path = write_module(dir.path());
    let before = fs::read_to_string(&path).unwrap();
    let cfg = config_for(dir.path());

    let args = CommandArgs { dry_run: true, ..Default::default() };
    run(&cfg, &args).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
  }

  #[test]
  fn reruns_are_deterministic() {
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();
    let path_a = write_module(dir_a.path());
    let path_b = write_module(dir_b.path());

    run(&config_for(dir_a.path()), &CommandArgs::default()).unwrap();
    run(&config_for(dir_b.path()), &CommandArgs::default()).unwrap();

    let a: Value = serde_json::from_str(&fs::read_to_string(&path_a).unwrap()).unwrap();
    let b: Value = serde_json::from_str(&fs::read_to_string(&path_b).unwrap()).unwrap();
    assert_eq!(a["quests"], b["quests"]);
  }

  #[test]
  fn missing_content_dir_errors() {
    let mut cfg = ToolConfig::default();
    cfg.paths.content_dir = "/no/such/dir".into();
    assert!(run(&cfg, &CommandArgs::default()).is_err());
  }
}
