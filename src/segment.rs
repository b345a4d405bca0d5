//! Sentence segmentation for sorting/translation exercises.
//!
//! English sentences split on whitespace with punctuation left attached to
//! its word ("Wall?" stays one token, matching how the sorting exercises are
//! phrased). Chinese sentences go through a three-stage fallback: isolate
//! punctuation, trust embedded spaces, then greedy longest-match against the
//! curated lexicon with single characters as the last resort.

use crate::lexicon::Lexicon;

/// Chinese punctuation treated as standalone tokens. Each occurrence becomes
/// its own token; runs are never collapsed.
pub const ZH_PUNCTUATION: &[char] = &[
  '，', '。', '！', '？', '；', '：', '“', '”', '‘', '’', '（', '）', '【', '】', '《', '》', '、',
];

/// Source language of a sentence being segmented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lang {
  En,
  Zh,
}

pub fn tokenize(sentence: &str, lang: Lang, lexicon: &Lexicon) -> Vec<String> {
  match lang {
    Lang::En => tokenize_en(sentence),
    Lang::Zh => tokenize_zh(sentence, lexicon),
  }
}

/// Whitespace split; no further normalization.
pub fn tokenize_en(sentence: &str) -> Vec<String> {
  sentence.split_whitespace().map(str::to_string).collect()
}

/// Three-stage Chinese segmentation. Never fails: empty or whitespace-only
/// input yields an empty sequence, uncovered spans degrade to single
/// characters.
pub fn tokenize_zh(sentence: &str, lexicon: &Lexicon) -> Vec<String> {
  let mut tokens = Vec::new();
  let mut span = String::new();
  for ch in sentence.chars() {
    if ZH_PUNCTUATION.contains(&ch) {
      flush_span(&mut span, lexicon, &mut tokens);
      tokens.push(ch.to_string());
    } else {
      span.push(ch);
    }
  }
  flush_span(&mut span, lexicon, &mut tokens);
  tokens
}

/// Segment one contiguous non-punctuation span into `out`.
fn flush_span(span: &mut String, lexicon: &Lexicon, out: &mut Vec<String>) {
  let pieces: Vec<&str> = span.split_whitespace().collect();
  match pieces.as_slice() {
    [] => {}
    // Embedded spaces mean the content was already segmented upstream;
    // take the pieces as authoritative.
    [_, _, ..] => out.extend(pieces.iter().map(|p| p.to_string())),
    [single] => greedy_match(single, lexicon, out),
  }
  span.clear();
}

/// Greedy longest-match walk: consume a lexicon word where one starts here,
/// otherwise emit the single leading character and advance.
fn greedy_match(text: &str, lexicon: &Lexicon, out: &mut Vec<String>) {
  let mut rest = text;
  while !rest.is_empty() {
    if let Some((word, _)) = lexicon.longest_match(rest) {
      out.push(word.to_string());
      rest = &rest[word.len()..];
    } else {
      match rest.chars().next() {
        Some(ch) => {
          out.push(ch.to_string());
          rest = &rest[ch.len_utf8()..];
        }
        None => break,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lex() -> Lexicon {
    Lexicon::curated()
  }

  #[test]
  fn english_keeps_punctuation_attached() {
    assert_eq!(
      tokenize_en("How long is the Great Wall?"),
      vec!["How", "long", "is", "the", "Great", "Wall?"]
    );
  }

  #[test]
  fn english_empty_input() {
    assert!(tokenize_en("").is_empty());
    assert!(tokenize_en("   ").is_empty());
  }

  #[test]
  fn chinese_three_char_match_and_punctuation() {
    assert_eq!(tokenize_zh("你在做什么？", &lex()), vec!["你", "在", "做什么", "？"]);
  }

  #[test]
  fn chinese_two_char_match() {
    assert_eq!(tokenize_zh("他正在看书。", &lex()), vec!["他", "正在", "看", "书", "。"]);
  }

  #[test]
  fn chinese_uncovered_span_degrades_to_single_chars() {
    assert_eq!(tokenize_zh("我喜欢吃苹果！", &lex()), vec!["我", "喜欢", "吃", "苹", "果", "！"]);
  }

  #[test]
  fn punctuation_runs_stay_separate_tokens() {
    assert_eq!(tokenize_zh("好。。", &lex()), vec!["好", "。", "。"]);
  }

  #[test]
  fn embedded_spaces_are_authoritative() {
    assert_eq!(
      tokenize_zh("很高兴 认识 你！", &lex()),
      vec!["很高兴", "认识", "你", "！"]
    );
  }

  #[test]
  fn chinese_round_trip_for_covered_sentences() {
    let sentence = "你在做什么？";
    let tokens = tokenize_zh(sentence, &lex());
    assert_eq!(tokens.concat(), sentence);
  }

  #[test]
  fn chinese_empty_input() {
    assert!(tokenize_zh("", &lex()).is_empty());
    assert!(tokenize_zh("  ", &lex()).is_empty());
  }

  #[test]
  fn no_empty_tokens_ever() {
    for s in ["你在做什么？", "，，", "a b  c", "１２３"] {
      assert!(tokenize_zh(s, &lex()).iter().all(|t| !t.is_empty()));
    }
  }
}
