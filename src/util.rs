//! Small utility helpers used across modules.

/// Derive the audio filename for a piece of text.
///
/// This convention is depended on by quest generation, audio synthesis and
/// the audio checkers, and must stay identical everywhere: lowercase, drop
/// every character that is not a word character, whitespace or hyphen,
/// collapse whitespace/hyphen runs into single hyphens, trim hyphens,
/// append `.mp3`.
pub fn audio_filename(text: &str) -> String {
  let mut stem = String::with_capacity(text.len());
  let mut pending_hyphen = false;
  for ch in text.to_lowercase().chars() {
    if ch.is_whitespace() || ch == '-' {
      pending_hyphen = !stem.is_empty();
    } else if ch.is_alphanumeric() || ch == '_' {
      if pending_hyphen {
        stem.push('-');
        pending_hyphen = false;
      }
      stem.push(ch);
    }
    // everything else (punctuation, quotes) is dropped
  }
  format!("{}.mp3", stem)
}

/// Filename for a pattern sentence. Falls back to a positional name when the
/// derived stem is too short to be useful (e.g. the text was all punctuation).
pub fn pattern_filename(text: &str, index: usize) -> String {
  let name = audio_filename(text);
  if name.len() < 3 + ".mp3".len() {
    format!("pattern-{}.mp3", index + 1)
  } else {
    name
  }
}

/// True if unicode char belongs to CJK ranges.
/// Useful for deciding whether a sentence should go through the Chinese
/// segmenter rather than whitespace splitting.
pub fn is_cjk(ch: char) -> bool {
  (ch >= '\u{4E00}' && ch <= '\u{9FFF}')
    || (ch >= '\u{3400}' && ch <= '\u{4DBF}')
    || (ch >= '\u{20000}' && ch <= '\u{2A6DF}')
    || (ch >= '\u{2A700}' && ch <= '\u{2B73F}')
    || (ch >= '\u{2B740}' && ch <= '\u{2B81F}')
    || (ch >= '\u{2B820}' && ch <= '\u{2CEAF}')
    || (ch >= '\u{F900}' && ch <= '\u{FAFF}')
}

/// Normalize text before similarity scoring: lowercase, trim, drop anything
/// that is not a word character or whitespace.
pub fn normalize_for_match(s: &str) -> String {
  s.trim()
    .to_lowercase()
    .chars()
    .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
    .collect()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge transcripts or payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", cut, s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn filename_strips_punctuation_and_hyphenates() {
    assert_eq!(
      audio_filename("It's more than two thousand years old."),
      "its-more-than-two-thousand-years-old.mp3"
    );
    assert_eq!(audio_filename("How long is the Great Wall?"), "how-long-is-the-great-wall.mp3");
  }

  #[test]
  fn filename_collapses_runs_and_trims() {
    assert_eq!(audio_filename("  hello   world  "), "hello-world.mp3");
    assert_eq!(audio_filename("well -- known"), "well-known.mp3");
    assert_eq!(audio_filename("--!"), ".mp3");
  }

  #[test]
  fn filename_is_idempotent_per_input() {
    let text = "Have you got any stamps from China?";
    assert_eq!(audio_filename(text), audio_filename(text));
  }

  #[test]
  fn pattern_filename_falls_back_on_short_stems() {
    assert_eq!(pattern_filename("?!", 0), "pattern-1.mp3");
    assert_eq!(pattern_filename("Go now!", 4), "go-now.mp3");
  }

  #[test]
  fn normalize_drops_punctuation_only() {
    assert_eq!(normalize_for_match("Hello, world!"), "hello world");
    assert_eq!(normalize_for_match("  It's OK.  "), "its ok");
  }
}
