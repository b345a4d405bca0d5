//! Inventory check: every audio file the content references versus the
//! files actually present under `<audio-dir>/tts`.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::commands::{collect_audio_items, CommandArgs};
use crate::config::ToolConfig;
use crate::report::Report;
use crate::store::{existing_audio_files, ContentStore};

#[derive(Serialize)]
struct MissingAudio {
  filename: String,
  text: String,
  source: String,
  kind: String,
}

#[derive(Serialize)]
struct Body {
  referenced_files: usize,
  existing_files: usize,
  missing_files: usize,
  missing: Vec<MissingAudio>,
}

pub fn run(cfg: &ToolConfig, args: &CommandArgs) -> Result<(), String> {
  let store = ContentStore::new(&cfg.paths.content_dir);
  let files = store.discover(args.file_pattern().as_deref())?;

  let tts_dir = Path::new(&cfg.paths.audio_dir).join("tts");
  let existing = existing_audio_files(&tts_dir);
  info!(target: "audio", existing = existing.len(), dir = %tts_dir.display(), "Scanned audio directory");

  let mut referenced = BTreeSet::new();
  // BTreeSet keyed by filename keeps the report ordered and de-duplicated.
  let mut missing: BTreeSet<(String, String, String, String)> = BTreeSet::new();

  for path in &files {
    let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let module = match store.load(path) {
      Ok(m) => m,
      Err(e) => {
        error!(target: "audio", %name, error = %e, "Failed to load module; skipping");
        continue;
      }
    };
    for item in collect_audio_items(&module, &name) {
      // patterns carry derived names, not stored references
      if item.kind == "pattern" {
        continue;
      }
      referenced.insert(item.filename.clone());
      if !existing.contains(&item.filename) {
        missing.insert((item.filename, item.text, item.source, item.kind.to_string()));
      }
    }
  }

  let body = Body {
    referenced_files: referenced.len(),
    existing_files: existing.len(),
    missing_files: missing.len(),
    missing: missing
      .into_iter()
      .map(|(filename, text, source, kind)| MissingAudio { filename, text, source, kind })
      .collect(),
  };

  info!(
    target: "audio",
    referenced = body.referenced_files,
    existing = body.existing_files,
    missing = body.missing_files,
    "Missing-audio check finished"
  );
  for item in body.missing.iter().take(20) {
    warn!(target: "audio", filename = %item.filename, text = %item.text, source = %item.source, kind = %item.kind, "Missing audio");
  }
  if body.missing.len() > 20 {
    warn!(target: "audio", more = body.missing.len() - 20, "Further missing files omitted from log (see report)");
  }

  Report::new("check-missing-audio", body).save(Path::new("."))?;
  Ok(())
}
