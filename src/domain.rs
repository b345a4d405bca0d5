//! Domain models for curriculum module files: vocabulary entries, sentence
//! patterns, and the quests generated from them.
//!
//! Content files come in two generations (with and without `id` fields, and
//! with a few legacy names for pattern fields), so `words`/`phrases`/
//! `patterns` are kept as raw JSON values and normalized on access; quests
//! are typed because the tools create and repair them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::util::audio_filename;

/// One curriculum module file. Unknown top-level fields ride along in
/// `extra` so a rewrite never loses data the tools don't understand.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModuleFile {
  #[serde(default, rename = "moduleId", skip_serializing_if = "Option::is_none")]
  pub module_id: Option<String>,
  #[serde(default)]
  pub words: Vec<Value>,
  #[serde(default)]
  pub phrases: Vec<Value>,
  #[serde(default)]
  pub patterns: Vec<Value>,
  #[serde(default)]
  pub quests: Vec<Quest>,
  #[serde(flatten)]
  pub extra: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Quest {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub steps: Vec<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reward: Option<Reward>,
  #[serde(flatten)]
  pub extra: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Reward {
  #[serde(default)]
  pub badge: String,
  #[serde(default)]
  pub xp: u32,
}

/// An English/Chinese pairing used by the matching exercise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
  pub en: String,
  pub zh: String,
}

/// Exercise steps the tools generate or inspect. Steps of other types are
/// left as raw values wherever they appear.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Step {
  Wordmatching {
    text: String,
    pairs: Vec<Pair>,
    #[serde(default)]
    options: Vec<Pair>,
  },
  Sentencesorting {
    text: String,
    audio: String,
    scrambled: Vec<String>,
    correct: Vec<String>,
  },
  Entozh {
    text: String,
    english: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio: Option<String>,
    #[serde(rename = "scrambledChinese")]
    scrambled_chinese: Vec<String>,
    #[serde(rename = "correctChinese")]
    correct_chinese: Vec<String>,
  },
  Zhtoen {
    text: String,
    chinese: String,
    #[serde(rename = "scrambledEnglish")]
    scrambled_english: Vec<String>,
    #[serde(rename = "correctEnglish")]
    correct_english: Vec<String>,
  },
  Fillblank {
    #[serde(default)]
    text: String,
    #[serde(default)]
    answer: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio: Option<String>,
  },
}

impl Step {
  /// Parse a raw quest step if it is one of the known types.
  pub fn from_value(value: &Value) -> Option<Step> {
    serde_json::from_value(value.clone()).ok()
  }

  pub fn to_value(&self) -> Value {
    serde_json::to_value(self).unwrap_or(Value::Null)
  }
}

/// A vocabulary entry (word or phrase) normalized from either file format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VocabEntry {
  pub id: String,
  pub en: String,
  pub zh: String,
  pub audio: Option<String>,
}

/// Normalize a raw `words`/`phrases` element. Entries without both `en` and
/// `zh` are not usable and yield None; missing ids are derived from the
/// audio-filename stem of the English text, which is stable across runs.
pub fn normalize_vocab(value: &Value) -> Option<VocabEntry> {
  let obj = value.as_object()?;
  let en = obj.get("en")?.as_str()?.to_string();
  let zh = obj.get("zh")?.as_str()?.to_string();
  let id = match obj.get("id").and_then(Value::as_str) {
    Some(id) => id.to_string(),
    None => audio_filename(&en).trim_end_matches(".mp3").to_string(),
  };
  let audio = obj.get("audio").and_then(Value::as_str).map(str::to_string);
  Some(VocabEntry { id, en, zh, audio })
}

/// A sentence pattern normalized to its `(question, answer)` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternPair {
  pub q: String,
  pub a: String,
}

/// Normalize a raw `patterns` element, accepting the legacy field names.
pub fn normalize_pattern(value: &Value) -> Option<PatternPair> {
  let obj = value.as_object()?;
  for (qk, ak) in [("q", "a"), ("question", "answer"), ("example", "translation")] {
    if let (Some(q), Some(a)) = (
      obj.get(qk).and_then(Value::as_str),
      obj.get(ak).and_then(Value::as_str),
    ) {
      return Some(PatternPair { q: q.to_string(), a: a.to_string() });
    }
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn vocab_normalization_accepts_both_formats() {
    let new_format = json!({"id": "w1", "en": "stamp", "zh": "邮票", "audio": "/audio/tts/stamp.mp3"});
    let old_format = json!({"en": "lion dance", "zh": "舞狮"});
    let entry = normalize_vocab(&new_format).unwrap();
    assert_eq!(entry.id, "w1");
    assert_eq!(entry.audio.as_deref(), Some("/audio/tts/stamp.mp3"));
    let entry = normalize_vocab(&old_format).unwrap();
    assert_eq!(entry.id, "lion-dance");
    assert!(entry.audio.is_none());
    assert!(normalize_vocab(&json!({"en": "orphan"})).is_none());
    assert!(normalize_vocab(&json!("just a string")).is_none());
  }

  #[test]
  fn pattern_normalization_accepts_legacy_names() {
    for raw in [
      json!({"q": "What are you doing?", "a": "你在做什么？"}),
      json!({"question": "What are you doing?", "answer": "你在做什么？"}),
      json!({"example": "What are you doing?", "translation": "你在做什么？"}),
    ] {
      let p = normalize_pattern(&raw).unwrap();
      assert_eq!(p.q, "What are you doing?");
      assert_eq!(p.a, "你在做什么？");
    }
    assert!(normalize_pattern(&json!({"q": "lonely"})).is_none());
  }

  #[test]
  fn step_round_trips_through_json() {
    let step = Step::Entozh {
      text: "将英语句子翻译成正确的中文顺序".into(),
      english: "What are you doing?".into(),
      audio: Some("/audio/tts/what-are-you-doing.mp3".into()),
      scrambled_chinese: vec!["做什么".into(), "你".into(), "在".into(), "？".into()],
      correct_chinese: vec!["你".into(), "在".into(), "做什么".into(), "？".into()],
    };
    let value = step.to_value();
    assert_eq!(value["type"], "entozh");
    assert_eq!(value["scrambledChinese"][0], "做什么");
    assert_eq!(Step::from_value(&value), Some(step));
  }

  #[test]
  fn unknown_step_types_are_ignored() {
    let raw = json!({"type": "listening", "audio": "/audio/tts/x.mp3"});
    assert!(Step::from_value(&raw).is_none());
  }

  #[test]
  fn module_file_preserves_unknown_fields() {
    let raw = json!({
      "moduleId": "module-03",
      "title": "Stamps and Hobbies",
      "words": [{"en": "stamp", "zh": "邮票"}],
      "quests": []
    });
    let module: ModuleFile = serde_json::from_value(raw).unwrap();
    assert_eq!(module.module_id.as_deref(), Some("module-03"));
    assert_eq!(module.extra.get("title").and_then(Value::as_str), Some("Stamps and Hobbies"));
    let back = serde_json::to_value(&module).unwrap();
    assert_eq!(back["title"], "Stamps and Hobbies");
  }
}
