//! Audio transcription (whisper CLI) and text similarity for the quality
//! checker.
//!
//! The transcriber is treated as an opaque collaborator: run the CLI with a
//! hard timeout, read the transcript it wrote, and report failures as empty
//! results for the caller to record; a single file never aborts a batch.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AsrConfig;
use crate::tts::run_with_timeout;
use crate::util::{normalize_for_match, trunc_for_log};

pub struct Transcriber {
  command: String,
  model: String,
  language: String,
  timeout: Duration,
}

impl Transcriber {
  pub fn from_config(cfg: &AsrConfig) -> Self {
    Self {
      command: cfg.whisper_command.clone(),
      model: cfg.model.clone(),
      language: cfg.language.clone(),
      timeout: Duration::from_secs(cfg.timeout_secs),
    }
  }

  /// Transcribe one audio file. The whisper CLI writes `<stem>.txt` into the
  /// output dir; we read it back and clean up.
  pub async fn transcribe(&self, audio: &Path) -> Result<String, String> {
    let out_dir = std::env::temp_dir().join(format!("quest-asr-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&out_dir).map_err(|e| format!("create {}: {}", out_dir.display(), e))?;

    let mut cmd = Command::new(&self.command);
    cmd
      .arg(audio)
      .arg("--model")
      .arg(&self.model)
      .arg("--language")
      .arg(&self.language)
      .arg("--output_format")
      .arg("txt")
      .arg("--output_dir")
      .arg(&out_dir);

    let run = run_with_timeout(cmd, self.timeout, "whisper").await;
    let transcript = match run {
      Ok(()) => {
        let stem = audio.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let txt_path = out_dir.join(format!("{}.txt", stem));
        std::fs::read_to_string(&txt_path)
          .map(|s| s.trim().to_string())
          .map_err(|e| format!("read transcript {}: {}", txt_path.display(), e))
      }
      Err(e) => Err(e),
    };

    if let Err(e) = std::fs::remove_dir_all(&out_dir) {
      warn!(target: "audio", error = %e, "Could not clean transcript temp dir");
    }

    let transcript = transcript?;
    debug!(target: "audio", file = %audio.display(), transcript = %trunc_for_log(&transcript, 80), "Transcribed");
    Ok(transcript)
  }
}

/// Similarity ratio in [0, 1] between two texts, compared after
/// normalization (lowercase, punctuation stripped). Ratio is
/// `2 * lcs / (len_a + len_b)` over characters, the same flavor of score
/// the quality tiers were calibrated against.
pub fn similarity(a: &str, b: &str) -> f64 {
  let a: Vec<char> = normalize_for_match(a).chars().collect();
  let b: Vec<char> = normalize_for_match(b).chars().collect();
  if a.is_empty() && b.is_empty() {
    return 1.0;
  }
  if a.is_empty() || b.is_empty() {
    return 0.0;
  }
  let lcs = lcs_len(&a, &b);
  (2.0 * lcs as f64) / ((a.len() + b.len()) as f64)
}

/// Longest common subsequence length, two-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
  let mut prev = vec![0usize; b.len() + 1];
  let mut curr = vec![0usize; b.len() + 1];
  for &ca in a {
    for (j, &cb) in b.iter().enumerate() {
      curr[j + 1] = if ca == cb { prev[j] + 1 } else { prev[j + 1].max(curr[j]) };
    }
    std::mem::swap(&mut prev, &mut curr);
  }
  prev[b.len()]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn identical_texts_score_one() {
    assert_eq!(similarity("How long is the Great Wall?", "How long is the Great Wall?"), 1.0);
  }

  #[test]
  fn punctuation_and_case_are_ignored() {
    assert_eq!(similarity("It's more than two thousand years old.", "its more than two thousand years old"), 1.0);
  }

  #[test]
  fn disjoint_texts_score_low() {
    assert!(similarity("stamp", "zzzz") < 0.3);
  }

  #[test]
  fn partial_overlap_scores_in_between() {
    let s = similarity("abc", "abd");
    assert!((s - 2.0 / 3.0).abs() < 1e-9);
  }

  #[test]
  fn empty_sides() {
    assert_eq!(similarity("", ""), 1.0);
    assert_eq!(similarity("word", ""), 0.0);
    assert_eq!(similarity("", "word"), 0.0);
  }
}
