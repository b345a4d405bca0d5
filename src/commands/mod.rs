//! One module per subcommand, plus the bits they share: parsed flags and the
//! audio work-item collector every audio command walks the content with.

pub mod check_coverage;
pub mod check_missing;
pub mod check_quality;
pub mod fix_segmentation;
pub mod generate_audio;
pub mod generate_quests;

use serde_json::Value;

use crate::domain::{normalize_pattern, ModuleFile};
use crate::store::audio_basename;
use crate::util::pattern_filename;

/// Flags shared across subcommands, parsed in `main`.
#[derive(Clone, Debug, Default)]
pub struct CommandArgs {
  pub pattern: Option<String>,
  pub grade: Option<String>,
  pub dry_run: bool,
  pub fix: bool,
  pub sfx: bool,
  pub limit: Option<usize>,
}

impl CommandArgs {
  /// Explicit `--pattern` wins; otherwise `--grade g5` becomes `g5*`;
  /// otherwise None (all known module naming schemes).
  pub fn file_pattern(&self) -> Option<String> {
    self
      .pattern
      .clone()
      .or_else(|| self.grade.as_ref().map(|g| format!("{}*", g)))
  }
}

/// One audio file some piece of content expects to exist.
#[derive(Clone, Debug)]
pub struct AudioItem {
  pub text: String,
  pub filename: String,
  pub source: String,
  pub kind: &'static str,
}

/// Collect every audio expectation in a module: words and phrases that carry
/// an `audio` reference, pattern questions (derived filename), and quest
/// steps with an `audio` field.
pub fn collect_audio_items(module: &ModuleFile, source: &str) -> Vec<AudioItem> {
  let mut items = Vec::new();

  for (kind, entries) in [("word", &module.words), ("phrase", &module.phrases)] {
    for raw in entries.iter() {
      let Some(obj) = raw.as_object() else { continue };
      let (Some(en), Some(audio)) = (
        obj.get("en").and_then(Value::as_str),
        obj.get("audio").and_then(Value::as_str),
      ) else {
        continue;
      };
      items.push(AudioItem {
        text: en.to_string(),
        filename: audio_basename(audio),
        source: source.to_string(),
        kind,
      });
    }
  }

  for (i, raw) in module.patterns.iter().enumerate() {
    if let Some(pattern) = normalize_pattern(raw) {
      items.push(AudioItem {
        filename: pattern_filename(&pattern.q, i),
        text: pattern.q,
        source: source.to_string(),
        kind: "pattern",
      });
    }
  }

  for quest in &module.quests {
    for step in &quest.steps {
      let Some(obj) = step.as_object() else { continue };
      let Some(audio) = obj.get("audio").and_then(Value::as_str) else { continue };
      let Some(text) = step_audio_text(obj) else { continue };
      items.push(AudioItem {
        text,
        filename: audio_basename(audio),
        source: source.to_string(),
        kind: "quest",
      });
    }
  }

  items
}

/// What a quest step's audio should actually say: the sentence being
/// exercised, not the instruction line.
fn step_audio_text(obj: &serde_json::Map<String, Value>) -> Option<String> {
  let step_type = obj.get("type").and_then(Value::as_str).unwrap_or_default();
  match step_type {
    "fillblank" => match obj.get("answer") {
      Some(Value::Array(answers)) => answers.first().and_then(Value::as_str).map(str::to_string),
      Some(Value::String(s)) => Some(s.clone()),
      _ => obj.get("text").and_then(Value::as_str).map(str::to_string),
    },
    "sentencesorting" => match obj.get("correct") {
      Some(Value::Array(words)) => {
        let words: Vec<&str> = words.iter().filter_map(Value::as_str).collect();
        if words.is_empty() {
          None
        } else {
          Some(words.join(" "))
        }
      }
      _ => obj.get("text").and_then(Value::as_str).map(str::to_string),
    },
    "entozh" => obj
      .get("english")
      .and_then(Value::as_str)
      .or_else(|| obj.get("text").and_then(Value::as_str))
      .map(str::to_string),
    _ => obj.get("text").and_then(Value::as_str).map(str::to_string),
  }
}
