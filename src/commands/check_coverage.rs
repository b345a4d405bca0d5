//! Verify that every sentence pattern is covered by the en-to-zh and
//! zh-to-en quests, and optionally repair modules that fall short by
//! regenerating their quests.

use std::path::Path;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::commands::CommandArgs;
use crate::config::ToolConfig;
use crate::domain::normalize_pattern;
use crate::lexicon::Lexicon;
use crate::quests::{covered_pairs, pattern_key, QuestBuilder};
use crate::report::Report;
use crate::shuffle::seeded_rng;
use crate::store::ContentStore;

#[derive(Serialize)]
struct MissingPattern {
  q: String,
  a: String,
}

#[derive(Serialize)]
struct FileDetail {
  file: String,
  patterns: usize,
  covered: usize,
  missing: Vec<MissingPattern>,
  status: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  action: Option<&'static str>,
}

#[derive(Serialize)]
struct Body {
  total_files: usize,
  files_with_patterns: usize,
  complete_coverage: usize,
  incomplete_coverage: usize,
  repaired: usize,
  details: Vec<FileDetail>,
}

pub fn run(cfg: &ToolConfig, args: &CommandArgs) -> Result<(), String> {
  let store = ContentStore::new(&cfg.paths.content_dir);
  let files = store.discover(args.file_pattern().as_deref())?;

  let mut lexicon = Lexicon::curated();
  lexicon.extend(cfg.lexicon.extra_words.iter().cloned());
  let builder = QuestBuilder::new(&lexicon, &cfg.paths.audio_url_prefix);
  let mut rng = seeded_rng(cfg.shuffle.seed);

  let mut details: Vec<FileDetail> = Vec::new();
  let mut with_patterns = 0usize;
  let mut complete = 0usize;
  let mut incomplete = 0usize;
  let mut repaired = 0usize;

  for path in &files {
    let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let mut module = match store.load(path) {
      Ok(m) => m,
      Err(e) => {
        error!(target: "quests", %name, error = %e, "Failed to load module; skipping");
        details.push(FileDetail {
          file: name,
          patterns: 0,
          covered: 0,
          missing: Vec::new(),
          status: "error",
          action: None,
        });
        continue;
      }
    };

    let patterns: Vec<_> = module.patterns.iter().filter_map(normalize_pattern).collect();
    if patterns.is_empty() {
      details.push(FileDetail {
        file: name,
        patterns: 0,
        covered: 0,
        missing: Vec::new(),
        status: "no_patterns",
        action: None,
      });
      continue;
    }
    with_patterns += 1;

    let covered = covered_pairs(&module.quests);
    let missing: Vec<MissingPattern> = patterns
      .iter()
      .filter(|p| !covered.contains(&pattern_key(p)))
      .map(|p| MissingPattern { q: p.q.clone(), a: p.a.clone() })
      .collect();

    if missing.is_empty() {
      complete += 1;
      details.push(FileDetail {
        file: name,
        patterns: patterns.len(),
        covered: patterns.len(),
        missing,
        status: "complete_coverage",
        action: None,
      });
      continue;
    }

    incomplete += 1;
    warn!(target: "quests", %name, missing = missing.len(), total = patterns.len(), "Incomplete pattern coverage");

    let action = if !args.fix {
      None
    } else if args.dry_run {
      Some("would_repair")
    } else {
      module.quests = builder.build_all(&module, &mut rng);
      match store.save(path, &module, true) {
        Ok(()) => {
          info!(target: "quests", %name, "Regenerated quests for full coverage");
          repaired += 1;
          Some("repaired")
        }
        Err(e) => {
          error!(target: "quests", %name, error = %e, "Failed to save repaired module");
          Some("repair_failed")
        }
      }
    };

    details.push(FileDetail {
      file: name,
      patterns: patterns.len(),
      covered: patterns.len() - missing.len(),
      missing,
      status: "incomplete_coverage",
      action,
    });
  }

  info!(
    target: "quests",
    total = files.len(),
    with_patterns,
    complete,
    incomplete,
    repaired,
    fix = args.fix,
    dry_run = args.dry_run,
    "Coverage check finished"
  );

  let body = Body {
    total_files: files.len(),
    files_with_patterns: with_patterns,
    complete_coverage: complete,
    incomplete_coverage: incomplete,
    repaired,
    details,
  };
  Report::new("check-coverage", body).save(Path::new("."))?;
  Ok(())
}
