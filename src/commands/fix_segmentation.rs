//! Repair en-to-zh steps whose Chinese side was split per character (or with
//! stale word boundaries): re-segment the joined sentence and re-scramble.

use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::commands::CommandArgs;
use crate::config::ToolConfig;
use crate::lexicon::Lexicon;
use crate::pinyin::readings;
use crate::segment::tokenize_zh;
use crate::shuffle::{scramble, seeded_rng};
use crate::store::ContentStore;
use crate::util::is_cjk;

pub fn run(cfg: &ToolConfig, args: &CommandArgs) -> Result<(), String> {
  let store = ContentStore::new(&cfg.paths.content_dir);
  let files = store.discover(args.file_pattern().as_deref())?;

  let mut lexicon = Lexicon::curated();
  lexicon.extend(cfg.lexicon.extra_words.iter().cloned());
  let mut rng = seeded_rng(cfg.shuffle.seed);

  let mut fixed_files = 0usize;
  let mut fixed_steps = 0usize;

  for path in &files {
    let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let mut module = match store.load(path) {
      Ok(m) => m,
      Err(e) => {
        error!(target: "segment", %name, error = %e, "Failed to load module; skipping");
        continue;
      }
    };

    let mut changed = 0usize;
    for quest in module.quests.iter_mut().filter(|q| q.id == "en-to-zh") {
      for step in quest.steps.iter_mut() {
        let Some(obj) = step.as_object_mut() else { continue };
        if obj.get("type").and_then(Value::as_str) != Some("entozh") {
          continue;
        }
        let Some(correct) = string_array(obj.get("correctChinese")) else { continue };

        let sentence = correct.concat();
        if !sentence.chars().any(is_cjk) {
          continue;
        }
        let new_correct = tokenize_zh(&sentence, &lexicon);
        if new_correct.is_empty() || new_correct == correct {
          continue;
        }
        let new_scrambled = scramble(&new_correct, &mut rng);
        let english = obj.get("english").and_then(Value::as_str).unwrap_or_default().to_string();

        info!(
          target: "segment",
          %name,
          %english,
          old = ?correct,
          new = ?new_correct,
          pinyin = %readings(&new_correct).join(" | "),
          "Re-segmented step"
        );

        obj.insert("correctChinese".into(), json!(new_correct));
        obj.insert("scrambledChinese".into(), json!(new_scrambled));
        changed += 1;
      }
    }

    if changed == 0 {
      continue;
    }
    fixed_steps += changed;

    if args.dry_run {
      info!(target: "segment", %name, steps = changed, "Dry run: would rewrite");
      fixed_files += 1;
      continue;
    }
    match store.save(path, &module, true) {
      Ok(()) => {
        info!(target: "segment", %name, steps = changed, "Rewrote module");
        fixed_files += 1;
      }
      Err(e) => error!(target: "segment", %name, error = %e, "Failed to save module"),
    }
  }

  if fixed_steps == 0 {
    warn!(target: "segment", "No steps needed re-segmentation");
  }
  info!(
    target: "segment",
    files = fixed_files,
    steps = fixed_steps,
    dry_run = args.dry_run,
    "Segmentation repair finished"
  );
  Ok(())
}

fn string_array(value: Option<&Value>) -> Option<Vec<String>> {
  let arr = value?.as_array()?;
  let strings: Vec<String> = arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect();
  if strings.len() == arr.len() {
    Some(strings)
  } else {
    None
  }
}
