//! Quest assembly: builds the four practice-exercise types from a module's
//! `words`, `phrases` and `patterns` source fields.
//!
//! All scrambling goes through the seeded Shuffler and all sentence splitting
//! through the Segmenter, so every call site produces the same shapes and the
//! same reproducible output for a given seed.

use std::collections::HashSet;

use rand::Rng;
use serde_json::Value;
use tracing::warn;

use crate::domain::{normalize_pattern, normalize_vocab, ModuleFile, Pair, PatternPair, Quest, Reward, Step, VocabEntry};
use crate::lexicon::Lexicon;
use crate::segment::{tokenize, Lang};
use crate::shuffle::scramble;
use crate::util::{audio_filename, pattern_filename};

const MATCHING_TEXT: &str = "将英语单词与中文意思配对";
const SORTING_TEXT: &str = "听句子并按正确顺序排列单词";
const EN_TO_ZH_TEXT: &str = "将英语句子翻译成正确的中文顺序";
const ZH_TO_EN_TEXT: &str = "将中文句子翻译成正确的英文单词顺序";

/// Pairs per word-matching step.
const MATCHING_CHUNK: usize = 6;
/// Sorting steps per module.
const SORTING_LIMIT: usize = 3;
/// Minimum translation steps before phrases are pulled in as filler.
const TRANSLATION_FLOOR: usize = 4;

pub struct QuestBuilder<'a> {
  lexicon: &'a Lexicon,
  audio_url_prefix: &'a str,
}

impl<'a> QuestBuilder<'a> {
  pub fn new(lexicon: &'a Lexicon, audio_url_prefix: &'a str) -> Self {
    Self { lexicon, audio_url_prefix }
  }

  fn tokens(&self, sentence: &str, lang: Lang) -> Vec<String> {
    tokenize(sentence, lang, self.lexicon)
  }

  /// Build all four quests for a module. Quests without enough source
  /// content are skipped (logged), not errors.
  pub fn build_all<R: Rng>(&self, module: &ModuleFile, rng: &mut R) -> Vec<Quest> {
    let words = normalize_all(&module.words);
    let phrases = normalize_all(&module.phrases);
    let patterns: Vec<PatternPair> = module.patterns.iter().filter_map(normalize_pattern).collect();

    [
      self.vocabulary_matching(&words, &phrases),
      self.sentence_sorting(&phrases, &patterns, rng),
      self.en_to_zh(&patterns, &phrases, rng),
      self.zh_to_en(&patterns, &phrases, rng),
    ]
    .into_iter()
    .flatten()
    .collect()
  }

  /// Word/phrase matching: pairs chunked into steps, with two distractor
  /// options taken from unused words or, failing that, swapped pairs.
  pub fn vocabulary_matching(&self, words: &[VocabEntry], phrases: &[VocabEntry]) -> Option<Quest> {
    let pairs: Vec<Pair> = words
      .iter()
      .chain(phrases.iter())
      .map(|e| Pair { en: e.en.clone(), zh: e.zh.clone() })
      .collect();

    if pairs.len() < 2 {
      warn!(target: "quests", "Not enough vocabulary for a matching quest (need at least 2 pairs)");
      return None;
    }

    let remaining = words.get(MATCHING_CHUNK..).unwrap_or_default();
    let options: Vec<Pair> = if remaining.len() >= 2 {
      remaining.iter().take(2).map(|e| Pair { en: e.en.clone(), zh: e.zh.clone() }).collect()
    } else if pairs.len() >= 4 {
      // swap sides so the distractor reads wrong by construction
      pairs.iter().take(2).map(|p| Pair { en: p.zh.clone(), zh: p.en.clone() }).collect()
    } else {
      Vec::new()
    };

    let chunks: Vec<&[Pair]> = pairs.chunks(MATCHING_CHUNK).filter(|c| c.len() >= 2).collect();
    let multi = chunks.len() > 1;
    let steps: Vec<Value> = chunks
      .iter()
      .enumerate()
      .map(|(i, chunk)| {
        let text = if multi {
          format!("{}（第{}部分）", MATCHING_TEXT, i + 1)
        } else {
          MATCHING_TEXT.to_string()
        };
        Step::Wordmatching { text, pairs: chunk.to_vec(), options: options.clone() }.to_value()
      })
      .collect();

    Some(Quest {
      id: "vocabulary-matching".into(),
      title: "词语配对练习".into(),
      steps,
      reward: Some(Reward { badge: "/images/rewards/badge-vocab.png".into(), xp: 10 }),
      extra: Default::default(),
    })
  }

  /// Listening + word-order sorting: phrases first, pattern questions as
  /// filler, sentences of at least three words only.
  pub fn sentence_sorting<R: Rng>(
    &self,
    phrases: &[VocabEntry],
    patterns: &[PatternPair],
    rng: &mut R,
  ) -> Option<Quest> {
    let mut steps: Vec<Value> = Vec::new();

    for phrase in phrases.iter().take(SORTING_LIMIT) {
      let correct = self.tokens(&phrase.en, Lang::En);
      if correct.len() < SORTING_LIMIT {
        continue;
      }
      let audio = phrase
        .audio
        .clone()
        .unwrap_or_else(|| format!("{}{}", self.audio_url_prefix, audio_filename(&phrase.en)));
      steps.push(
        Step::Sentencesorting {
          text: SORTING_TEXT.into(),
          audio,
          scrambled: scramble(&correct, rng),
          correct,
        }
        .to_value(),
      );
    }

    if steps.len() < SORTING_LIMIT {
      for (i, pattern) in patterns.iter().enumerate() {
        if steps.len() >= SORTING_LIMIT {
          break;
        }
        let correct = self.tokens(&pattern.q, Lang::En);
        if correct.len() < 3 {
          continue;
        }
        let audio = format!("{}{}", self.audio_url_prefix, pattern_filename(&pattern.q, i));
        steps.push(
          Step::Sentencesorting {
            text: SORTING_TEXT.into(),
            audio,
            scrambled: scramble(&correct, rng),
            correct,
          }
          .to_value(),
        );
      }
    }

    if steps.is_empty() {
      warn!(target: "quests", "Not enough sentences for a sorting quest");
      return None;
    }

    Some(Quest {
      id: "sentence-sorting".into(),
      title: "句子排序练习".into(),
      steps,
      reward: Some(Reward { badge: "/images/rewards/badge-sentence.png".into(), xp: 15 }),
      extra: Default::default(),
    })
  }

  /// English → Chinese word-order drill. Covers every pattern (the coverage
  /// checker depends on this), topping up from phrases when there are few.
  pub fn en_to_zh<R: Rng>(
    &self,
    patterns: &[PatternPair],
    phrases: &[VocabEntry],
    rng: &mut R,
  ) -> Option<Quest> {
    let mut steps: Vec<Value> = Vec::new();

    for (i, pattern) in patterns.iter().enumerate() {
      let correct = self.tokens(&pattern.a, Lang::Zh);
      if correct.len() < 2 {
        continue;
      }
      let audio = format!("{}{}", self.audio_url_prefix, pattern_filename(&pattern.q, i));
      steps.push(self.entozh_step(&pattern.q, Some(audio), correct, rng));
    }

    if steps.len() < TRANSLATION_FLOOR {
      for phrase in phrases {
        if steps.len() >= TRANSLATION_FLOOR {
          break;
        }
        let correct = self.tokens(&phrase.zh, Lang::Zh);
        if correct.len() < 2 {
          continue;
        }
        let audio = phrase
          .audio
          .clone()
          .unwrap_or_else(|| format!("{}{}", self.audio_url_prefix, audio_filename(&phrase.en)));
        steps.push(self.entozh_step(&phrase.en, Some(audio), correct, rng));
      }
    }

    if steps.is_empty() {
      warn!(target: "quests", "Not enough sentences for an en-to-zh quest");
      return None;
    }

    Some(Quest {
      id: "en-to-zh".into(),
      title: "英翻中练习".into(),
      steps,
      reward: Some(Reward { badge: "/images/rewards/badge-translate.png".into(), xp: 12 }),
      extra: Default::default(),
    })
  }

  /// Chinese → English word-order drill, mirroring `en_to_zh`.
  pub fn zh_to_en<R: Rng>(
    &self,
    patterns: &[PatternPair],
    phrases: &[VocabEntry],
    rng: &mut R,
  ) -> Option<Quest> {
    let mut steps: Vec<Value> = Vec::new();

    for pattern in patterns {
      let correct = self.tokens(&pattern.q, Lang::En);
      if correct.len() < 2 {
        continue;
      }
      steps.push(self.zhtoen_step(&pattern.a, correct, rng));
    }

    if steps.len() < TRANSLATION_FLOOR {
      for phrase in phrases {
        if steps.len() >= TRANSLATION_FLOOR {
          break;
        }
        let correct = self.tokens(&phrase.en, Lang::En);
        if correct.len() < 2 {
          continue;
        }
        steps.push(self.zhtoen_step(&phrase.zh, correct, rng));
      }
    }

    if steps.is_empty() {
      warn!(target: "quests", "Not enough sentences for a zh-to-en quest");
      return None;
    }

    Some(Quest {
      id: "zh-to-en".into(),
      title: "中翻英练习".into(),
      steps,
      reward: Some(Reward { badge: "/images/rewards/badge-language.png".into(), xp: 12 }),
      extra: Default::default(),
    })
  }

  fn entozh_step<R: Rng>(
    &self,
    english: &str,
    audio: Option<String>,
    correct: Vec<String>,
    rng: &mut R,
  ) -> Value {
    Step::Entozh {
      text: EN_TO_ZH_TEXT.into(),
      english: english.to_string(),
      audio,
      scrambled_chinese: scramble(&correct, rng),
      correct_chinese: correct,
    }
    .to_value()
  }

  fn zhtoen_step<R: Rng>(&self, chinese: &str, correct: Vec<String>, rng: &mut R) -> Value {
    Step::Zhtoen {
      text: ZH_TO_EN_TEXT.into(),
      chinese: chinese.to_string(),
      scrambled_english: scramble(&correct, rng),
      correct_english: correct,
    }
    .to_value()
  }
}

fn normalize_all(raw: &[Value]) -> Vec<VocabEntry> {
  raw.iter().filter_map(normalize_vocab).collect()
}

/// `(english, whitespace-free chinese)` pairs already covered by the
/// translation quests. Whitespace is ignored on the Chinese side because
/// token joins and source sentences differ only in spacing.
pub fn covered_pairs(quests: &[Quest]) -> HashSet<(String, String)> {
  let mut covered = HashSet::new();
  for quest in quests {
    for raw in &quest.steps {
      match Step::from_value(raw) {
        Some(Step::Entozh { english, correct_chinese, .. }) => {
          covered.insert((english, strip_whitespace(&correct_chinese.concat())));
        }
        Some(Step::Zhtoen { chinese, correct_english, .. }) => {
          covered.insert((correct_english.join(" "), strip_whitespace(&chinese)));
        }
        _ => {}
      }
    }
  }
  covered
}

/// The coverage key of a source pattern, matching `covered_pairs`.
pub fn pattern_key(pattern: &PatternPair) -> (String, String) {
  (pattern.q.clone(), strip_whitespace(&pattern.a))
}

fn strip_whitespace(s: &str) -> String {
  s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shuffle::seeded_rng;
  use serde_json::json;

  fn module() -> ModuleFile {
    serde_json::from_value(json!({
      "moduleId": "module-03-stamps-hobbies",
      "words": [
        {"id": "w1", "en": "stamp", "zh": "邮票", "audio": "/audio/tts/stamp.mp3"},
        {"id": "w2", "en": "hobby", "zh": "爱好"},
        {"id": "w3", "en": "collect", "zh": "收集"}
      ],
      "phrases": [
        {"id": "p1", "en": "collect stamps", "zh": "集邮", "audio": "/audio/tts/collect-stamps.mp3"}
      ],
      "patterns": [
        {"q": "What are you doing?", "a": "你在做什么？"},
        {"q": "No, I haven't.", "a": "不，我没有。"}
      ],
      "quests": []
    }))
    .unwrap()
  }

  #[test]
  fn builds_all_four_quests() {
    let lexicon = Lexicon::curated();
    let builder = QuestBuilder::new(&lexicon, "/audio/tts/");
    let quests = builder.build_all(&module(), &mut seeded_rng(42));
    let ids: Vec<&str> = quests.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec!["vocabulary-matching", "sentence-sorting", "en-to-zh", "zh-to-en"]);
  }

  #[test]
  fn entozh_steps_use_segmented_tokens() {
    let lexicon = Lexicon::curated();
    let builder = QuestBuilder::new(&lexicon, "/audio/tts/");
    let quests = builder.build_all(&module(), &mut seeded_rng(42));
    let en_to_zh = quests.iter().find(|q| q.id == "en-to-zh").unwrap();
    let step = Step::from_value(&en_to_zh.steps[0]).unwrap();
    match step {
      Step::Entozh { english, audio, correct_chinese, scrambled_chinese, .. } => {
        assert_eq!(english, "What are you doing?");
        assert_eq!(audio.as_deref(), Some("/audio/tts/what-are-you-doing.mp3"));
        assert_eq!(correct_chinese, vec!["你", "在", "做什么", "？"]);
        assert_ne!(scrambled_chinese, correct_chinese);
        let mut sorted_s = scrambled_chinese.clone();
        let mut sorted_c = correct_chinese.clone();
        sorted_s.sort();
        sorted_c.sort();
        assert_eq!(sorted_s, sorted_c);
      }
      other => panic!("expected entozh step, got {:?}", other),
    }
  }

  #[test]
  fn generation_is_reproducible_for_a_fixed_seed() {
    let lexicon = Lexicon::curated();
    let builder = QuestBuilder::new(&lexicon, "/audio/tts/");
    let first = builder.build_all(&module(), &mut seeded_rng(42));
    let second = builder.build_all(&module(), &mut seeded_rng(42));
    assert_eq!(serde_json::to_value(&first).unwrap(), serde_json::to_value(&second).unwrap());
  }

  #[test]
  fn generated_quests_cover_every_pattern() {
    let lexicon = Lexicon::curated();
    let builder = QuestBuilder::new(&lexicon, "/audio/tts/");
    let module = module();
    let quests = builder.build_all(&module, &mut seeded_rng(42));
    let covered = covered_pairs(&quests);
    for raw in &module.patterns {
      let pattern = normalize_pattern(raw).unwrap();
      assert!(covered.contains(&pattern_key(&pattern)), "pattern not covered: {:?}", pattern);
    }
  }

  #[test]
  fn vocabulary_matching_needs_two_pairs() {
    let lexicon = Lexicon::curated();
    let builder = QuestBuilder::new(&lexicon, "/audio/tts/");
    let entry = VocabEntry { id: "w1".into(), en: "stamp".into(), zh: "邮票".into(), audio: None };
    assert!(builder.vocabulary_matching(&[entry], &[]).is_none());
  }

  #[test]
  fn sorting_skips_short_sentences() {
    let lexicon = Lexicon::curated();
    let builder = QuestBuilder::new(&lexicon, "/audio/tts/");
    let short = VocabEntry { id: "p".into(), en: "Hello there".into(), zh: "你好".into(), audio: None };
    let quest = builder.sentence_sorting(&[short], &[], &mut seeded_rng(1));
    assert!(quest.is_none());
  }
}
