//! Hanzi → Hanyu Pinyin readings for segmented tokens (tone diacritics).
//!
//! Example:
//!   tokens: ["你", "在", "做什么", "？"]
//!   readings: ["nǐ", "zài", "zuò shén me", "？"]
//!
//! Used by the segmentation-repair report so a reviewer can sanity-check the
//! produced word boundaries without a dictionary at hand.

use pinyin::ToPinyin;

/// Reading of a single token. Hanzi syllables are space-separated inside the
/// token; non-Hanzi characters are copied as-is.
///
/// Conversion is per-character, so polyphonic characters may use a default
/// reading; good enough for review output.
pub fn token_reading(token: &str) -> String {
    let mut out = String::with_capacity(token.len() * 2);
    let mut last_was_hanzi = false;

    for ch in token.chars() {
        if let Some(py) = ch.to_pinyin() {
            if last_was_hanzi {
                out.push(' ');
            }
            out.push_str(py.with_tone());
            last_was_hanzi = true;
        } else {
            out.push(ch);
            last_was_hanzi = false;
        }
    }

    out
}

/// Readings for a whole token sequence, parallel to the input.
pub fn readings(tokens: &[String]) -> Vec<String> {
    tokens.iter().map(|t| token_reading(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_character_token_gets_spaced_syllables() {
        assert_eq!(token_reading("做什么"), "zuò shén me");
    }

    #[test]
    fn non_hanzi_copied_verbatim() {
        assert_eq!(token_reading("？"), "？");
        assert_eq!(token_reading("ok"), "ok");
    }

    #[test]
    fn readings_are_parallel_to_tokens() {
        let tokens: Vec<String> = ["你", "在", "做什么", "？"].iter().map(|s| s.to_string()).collect();
        assert_eq!(readings(&tokens), vec!["nǐ", "zài", "zuò shén me", "？"]);
    }
}
