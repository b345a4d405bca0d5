//! Synthesize missing TTS audio for every matching module, and optionally
//! the feedback sound effects.

use std::collections::HashSet;
use std::path::Path;

use tracing::{error, info, warn};

use crate::commands::{collect_audio_items, AudioItem, CommandArgs};
use crate::config::ToolConfig;
use crate::store::ContentStore;
use crate::tts::{tone, TtsCascade};
use crate::util::trunc_for_log;

pub async fn run(cfg: &ToolConfig, args: &CommandArgs) -> Result<(), String> {
  let store = ContentStore::new(&cfg.paths.content_dir);
  let files = store.discover(args.file_pattern().as_deref())?;

  let audio_root = Path::new(&cfg.paths.audio_dir);
  let tts_dir = audio_root.join("tts");
  if !args.dry_run {
    std::fs::create_dir_all(&tts_dir).map_err(|e| format!("create {}: {}", tts_dir.display(), e))?;
  }

  // First reference wins when several sections point at the same filename.
  let mut seen = HashSet::new();
  let mut items: Vec<AudioItem> = Vec::new();
  for path in &files {
    let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    match store.load(path) {
      Ok(module) => {
        for item in collect_audio_items(&module, &name) {
          if seen.insert(item.filename.clone()) {
            items.push(item);
          }
        }
      }
      Err(e) => {
        error!(target: "audio", %name, error = %e, "Failed to load module; skipping");
      }
    }
  }
  info!(target: "audio", total = items.len(), "Collected audio work items");

  let cascade = TtsCascade::from_config(&cfg.tts);

  let mut generated = 0usize;
  let mut existing = 0usize;
  let mut failed = 0usize;

  for item in &items {
    let out_path = tts_dir.join(&item.filename);
    if out_path.exists() {
      existing += 1;
      continue;
    }
    if args.dry_run {
      info!(target: "audio", filename = %item.filename, text = %trunc_for_log(&item.text, 60), "Dry run: would synthesize");
      generated += 1;
      continue;
    }
    match cascade.synthesize_to_mp3(&item.text, &out_path).await {
      Ok(engine) => {
        info!(target: "audio", filename = %item.filename, engine, "Synthesized");
        generated += 1;
      }
      Err(e) => {
        error!(target: "audio", filename = %item.filename, error = %e, "All engines failed for item");
        failed += 1;
      }
    }
  }

  if args.sfx {
    generate_sfx(cfg, &cascade, args.dry_run).await;
  }

  info!(
    target: "audio",
    generated, existing, failed,
    dry_run = args.dry_run,
    "Audio generation finished"
  );
  Ok(())
}

/// Render the four feedback sounds into `<audio-dir>/sfx`. These are cheap
/// and deterministic, so they are re-rendered unconditionally.
async fn generate_sfx(cfg: &ToolConfig, cascade: &TtsCascade, dry_run: bool) {
  let sfx_dir = Path::new(&cfg.paths.audio_dir).join("sfx");
  if dry_run {
    info!(target: "audio", dir = %sfx_dir.display(), "Dry run: would render sfx");
    return;
  }
  if let Err(e) = std::fs::create_dir_all(&sfx_dir) {
    error!(target: "audio", error = %e, "Cannot create sfx dir");
    return;
  }

  for (name, samples) in tone::sfx_sounds() {
    let wav_path = std::env::temp_dir().join(format!("quest-sfx-{}.wav", name));
    let mp3_path = sfx_dir.join(format!("{}.mp3", name));
    let result = tone::write_wav(&wav_path, &samples);
    let result = match result {
      Ok(()) => cascade.finish_mp3(&wav_path, &mp3_path).await,
      Err(e) => Err(e),
    };
    let _ = std::fs::remove_file(&wav_path);
    match result {
      Ok(()) => info!(target: "audio", sfx = name, "Rendered"),
      Err(e) => warn!(target: "audio", sfx = name, error = %e, "Failed to render"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::fs;
  use tempfile::tempdir;

  #[tokio::test]
  async fn dry_run_only_counts() {
    let content = tempdir().unwrap();
    let audio = tempdir().unwrap();
    fs::write(
      content.path().join("module-01-test.json"),
      serde_json::to_string(&json!({
        "words": [{"en": "stamp", "zh": "邮票", "audio": "/audio/tts/stamp.mp3"}],
        "patterns": [{"q": "What are you doing?", "a": "你在做什么？"}]
      }))
      .unwrap(),
    )
    .unwrap();

    let mut cfg = ToolConfig::default();
    cfg.paths.content_dir = content.path().to_string_lossy().to_string();
    cfg.paths.audio_dir = audio.path().to_string_lossy().to_string();

    let args = CommandArgs { dry_run: true, ..Default::default() };
    run(&cfg, &args).await.unwrap();

    // nothing may be written in dry-run mode
    assert!(!audio.path().join("tts").exists());
  }

  #[tokio::test]
  async fn existing_files_are_skipped() {
    let content = tempdir().unwrap();
    let audio = tempdir().unwrap();
    fs::write(
      content.path().join("module-01-test.json"),
      serde_json::to_string(&json!({
        "words": [{"en": "stamp", "zh": "邮票", "audio": "/audio/tts/stamp.mp3"}]
      }))
      .unwrap(),
    )
    .unwrap();
    let tts_dir = audio.path().join("tts");
    fs::create_dir_all(&tts_dir).unwrap();
    fs::write(tts_dir.join("stamp.mp3"), b"already here").unwrap();

    let mut cfg = ToolConfig::default();
    cfg.paths.content_dir = content.path().to_string_lossy().to_string();
    cfg.paths.audio_dir = audio.path().to_string_lossy().to_string();

    run(&cfg, &CommandArgs::default()).await.unwrap();

    assert_eq!(fs::read(tts_dir.join("stamp.mp3")).unwrap(), b"already here");
  }
}
