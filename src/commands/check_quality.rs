//! ASR-based audio quality check: transcribe each generated file with
//! Whisper and score the transcript against the source text.

use std::path::Path;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::asr::{similarity, Transcriber};
use crate::commands::{collect_audio_items, AudioItem, CommandArgs};
use crate::config::ToolConfig;
use crate::report::Report;
use crate::store::ContentStore;
use crate::util::trunc_for_log;

const HIGH_THRESHOLD: f64 = 0.9;
const MEDIUM_THRESHOLD: f64 = 0.7;
const SEVERE_THRESHOLD: f64 = 0.5;

#[derive(Serialize)]
struct ItemResult {
  filename: String,
  kind: String,
  source: String,
  text: String,
  transcript: String,
  similarity: f64,
  quality: &'static str,
  status: &'static str,
  issues: Vec<&'static str>,
}

#[derive(Serialize)]
struct Body {
  checked: usize,
  missing: usize,
  failed: usize,
  high_quality: usize,
  medium_quality: usize,
  low_quality: usize,
  overall: &'static str,
  results: Vec<ItemResult>,
}

fn quality_tier(similarity: f64) -> &'static str {
  if similarity >= HIGH_THRESHOLD {
    "high"
  } else if similarity >= MEDIUM_THRESHOLD {
    "medium"
  } else {
    "low"
  }
}

pub async fn run(cfg: &ToolConfig, args: &CommandArgs) -> Result<(), String> {
  let store = ContentStore::new(&cfg.paths.content_dir);
  let files = store.discover(args.file_pattern().as_deref())?;
  let tts_dir = Path::new(&cfg.paths.audio_dir).join("tts");

  let mut items: Vec<AudioItem> = Vec::new();
  for path in &files {
    let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    match store.load(path) {
      Ok(module) => items.extend(collect_audio_items(&module, &name)),
      Err(e) => error!(target: "audio", %name, error = %e, "Failed to load module; skipping"),
    }
  }
  if let Some(limit) = args.limit {
    items.truncate(limit);
  }
  info!(target: "audio", total = items.len(), model = %cfg.asr.model, "Checking audio quality");

  let transcriber = Transcriber::from_config(&cfg.asr);
  let mut results: Vec<ItemResult> = Vec::new();

  for item in &items {
    let audio_path = tts_dir.join(&item.filename);
    if !audio_path.exists() {
      results.push(ItemResult {
        filename: item.filename.clone(),
        kind: item.kind.to_string(),
        source: item.source.clone(),
        text: item.text.clone(),
        transcript: String::new(),
        similarity: 0.0,
        quality: "low",
        status: "missing",
        issues: vec!["file_missing"],
      });
      continue;
    }

    let transcript = match transcriber.transcribe(&audio_path).await {
      Ok(t) => t,
      Err(e) => {
        error!(target: "audio", filename = %item.filename, error = %e, "Transcription failed");
        results.push(ItemResult {
          filename: item.filename.clone(),
          kind: item.kind.to_string(),
          source: item.source.clone(),
          text: item.text.clone(),
          transcript: String::new(),
          similarity: 0.0,
          quality: "low",
          status: "failed",
          issues: vec!["transcription_failed"],
        });
        continue;
      }
    };

    let score = similarity(&item.text, &transcript);
    let mut issues = Vec::new();
    if score < SEVERE_THRESHOLD {
      issues.push("severe_mismatch");
    } else if score < MEDIUM_THRESHOLD {
      issues.push("moderate_mismatch");
    }
    if transcript.chars().count() * 2 < item.text.chars().count() {
      issues.push("possible_truncation");
    }

    results.push(ItemResult {
      filename: item.filename.clone(),
      kind: item.kind.to_string(),
      source: item.source.clone(),
      text: item.text.clone(),
      transcript,
      similarity: (score * 1000.0).round() / 1000.0,
      quality: quality_tier(score),
      status: "checked",
      issues,
    });
  }

  let checked = results.iter().filter(|r| r.status == "checked").count();
  let missing = results.iter().filter(|r| r.status == "missing").count();
  let failed = results.iter().filter(|r| r.status == "failed").count();
  let high = results.iter().filter(|r| r.status == "checked" && r.quality == "high").count();
  let medium = results.iter().filter(|r| r.status == "checked" && r.quality == "medium").count();
  let low = results.iter().filter(|r| r.status == "checked" && r.quality == "low").count();

  let overall = if checked == 0 {
    "no_audio_checked"
  } else if high as f64 / checked as f64 >= 0.9 {
    "excellent"
  } else if high as f64 / checked as f64 >= 0.7 {
    "good"
  } else {
    "needs_attention"
  };

  // worst offenders first in the log
  let mut flagged: Vec<&ItemResult> =
    results.iter().filter(|r| r.status == "checked" && r.quality != "high").collect();
  flagged.sort_by(|a, b| a.similarity.partial_cmp(&b.similarity).unwrap_or(std::cmp::Ordering::Equal));
  for r in flagged.iter().take(20) {
    warn!(
      target: "audio",
      filename = %r.filename,
      similarity = r.similarity,
      text = %trunc_for_log(&r.text, 50),
      transcript = %trunc_for_log(&r.transcript, 50),
      "Low-quality audio"
    );
  }

  info!(
    target: "audio",
    checked, missing, failed, high, medium, low, overall,
    "Audio quality check finished"
  );

  let body = Body {
    checked,
    missing,
    failed,
    high_quality: high,
    medium_quality: medium,
    low_quality: low,
    overall,
    results,
  };
  Report::new("check-audio-quality", body).save(Path::new("."))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tiers_match_the_thresholds() {
    assert_eq!(quality_tier(0.95), "high");
    assert_eq!(quality_tier(0.9), "high");
    assert_eq!(quality_tier(0.85), "medium");
    assert_eq!(quality_tier(0.7), "medium");
    assert_eq!(quality_tier(0.69), "low");
    assert_eq!(quality_tier(0.0), "low");
  }
}
