//! Curated word tables backing the greedy Chinese segmenter.
//!
//! The tables are finite and incomplete by design: they encode frequently
//! recurring classroom vocabulary, and any span they do not cover degrades to
//! single-character tokens. Segmentation quality therefore tracks how well
//! these tables cover the current curriculum.

use std::collections::{BTreeMap, HashSet};

use tracing::warn;

/// Three-character words, matched before anything shorter.
const THREE_CHAR_WORDS: &[&str] = &["做什么", "干什么", "怎么做", "为什么", "怎么样", "有多长"];

/// Common two-character words covering the current curriculum.
const TWO_CHAR_WORDS: &[&str] = &[
  "我们", "你们", "他们", "什么", "怎么", "这样", "那样", "这里", "那里", "现在",
  "正在", "已经", "可以", "应该", "需要", "想要", "喜欢", "知道", "明白", "理解",
  "学习", "工作", "生活", "回家", "吃饭", "睡觉", "起床", "出门", "进门", "上楼",
  "下楼", "开门", "关门", "开灯", "关灯", "长城", "历史", "很长", "邮票", "册里",
];

/// Word lookup table for greedy longest-match segmentation.
///
/// Entries are bucketed by character count and matched longest-first, so the
/// tie-break policy for overlapping entries lives entirely in here; swapping
/// in a real dictionary-based segmenter means replacing this type without
/// touching the punctuation handling in `segment`.
pub struct Lexicon {
  by_len: BTreeMap<usize, HashSet<String>>,
}

impl Lexicon {
  /// The built-in curated tables.
  pub fn curated() -> Self {
    let mut lex = Lexicon { by_len: BTreeMap::new() };
    lex.extend(THREE_CHAR_WORDS.iter().map(|w| w.to_string()));
    lex.extend(TWO_CHAR_WORDS.iter().map(|w| w.to_string()));
    lex
  }

  /// Add extra entries (e.g. from configuration). Entries shorter than two
  /// characters are ignored: the segmenter already falls back to single
  /// characters on its own.
  pub fn extend<I: IntoIterator<Item = String>>(&mut self, words: I) {
    for word in words {
      let len = word.chars().count();
      if len < 2 {
        warn!(target: "segment", %word, "Ignoring lexicon entry shorter than two characters");
        continue;
      }
      self.by_len.entry(len).or_default().insert(word);
    }
  }

  /// Greedy longest-match at the start of `text`: returns the matched prefix
  /// and its length in characters, trying longer entries first.
  pub fn longest_match<'t>(&self, text: &'t str) -> Option<(&'t str, usize)> {
    for (&len, words) in self.by_len.iter().rev() {
      if let Some(prefix) = prefix_chars(text, len) {
        if words.contains(prefix) {
          return Some((prefix, len));
        }
      }
    }
    None
  }

  pub fn entry_count(&self) -> usize {
    self.by_len.values().map(|s| s.len()).sum()
  }
}

/// First `n` characters of `text` as a slice, or None if `text` is shorter.
fn prefix_chars(text: &str, n: usize) -> Option<&str> {
  if n == 0 {
    return Some("");
  }
  let mut seen = 0usize;
  for (idx, _) in text.char_indices() {
    if seen == n {
      return Some(&text[..idx]);
    }
    seen += 1;
  }
  if seen == n {
    Some(text)
  } else {
    None
  }
}
