//! Tone synthesis: the last-resort placeholder and the four feedback sounds
//! (correct / wrong / unlock / complete) used by the app UI.
//!
//! Pure sine rendering at 44.1 kHz mono 16-bit with linear fades; no
//! external process involved, so this engine cannot time out and the
//! cascade always terminates with some audio on disk.

use std::f32::consts::TAU;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

const SAMPLE_RATE: u32 = 44_100;
const AMPLITUDE: f32 = 0.4;

pub struct ToneEngine;

impl ToneEngine {
  /// 440 Hz placeholder, 600 ms with gentle fades.
  pub fn synthesize(&self, out_path: &Path) -> Result<(), String> {
    write_wav(out_path, &sine(440.0, 600, 50, 200))
  }
}

/// The four feedback sounds, as (file stem, samples).
pub fn sfx_sounds() -> Vec<(&'static str, Vec<f32>)> {
  // correct: C-major chord (C5-E5-G5)
  let correct = chord(&[523.25, 659.25, 783.99], 260, 50, 200);

  // wrong: low hum
  let wrong = sine(200.0, 600, 50, 300);

  // unlock: rising G4-B4-D5-G5
  let mut unlock = Vec::new();
  for (freq, ms) in [(392.00, 150), (493.88, 150), (587.33, 150), (783.99, 300)] {
    unlock.extend(sine(freq, ms, 20, 50));
  }

  // complete: little victory melody with breaths between the short notes
  let mut complete = Vec::new();
  for (freq, ms) in [(523.25, 200), (659.25, 200), (783.99, 200), (1046.50, 400)] {
    complete.extend(sine(freq, ms, 30, 100));
    if ms < 400 {
      complete.extend(silence(50));
    }
  }

  vec![("correct", correct), ("wrong", wrong), ("unlock", unlock), ("complete", complete)]
}

pub fn write_wav(path: &Path, samples: &[f32]) -> Result<(), String> {
  let spec = WavSpec {
    channels: 1,
    sample_rate: SAMPLE_RATE,
    bits_per_sample: 16,
    sample_format: SampleFormat::Int,
  };
  let mut writer =
    WavWriter::create(path, spec).map_err(|e| format!("create {}: {}", path.display(), e))?;
  for &s in samples {
    let clamped = s.clamp(-1.0, 1.0);
    writer
      .write_sample((clamped * i16::MAX as f32) as i16)
      .map_err(|e| format!("write sample: {}", e))?;
  }
  writer.finalize().map_err(|e| format!("finalize {}: {}", path.display(), e))
}

fn sine(freq: f32, ms: u32, fade_in_ms: u32, fade_out_ms: u32) -> Vec<f32> {
  let len = (SAMPLE_RATE as u64 * ms as u64 / 1000) as usize;
  let mut samples: Vec<f32> = (0..len)
    .map(|i| (TAU * freq * i as f32 / SAMPLE_RATE as f32).sin() * AMPLITUDE)
    .collect();
  apply_fades(&mut samples, fade_in_ms, fade_out_ms);
  samples
}

fn chord(freqs: &[f32], ms: u32, fade_in_ms: u32, fade_out_ms: u32) -> Vec<f32> {
  let len = (SAMPLE_RATE as u64 * ms as u64 / 1000) as usize;
  let mut samples: Vec<f32> = (0..len)
    .map(|i| {
      let t = i as f32 / SAMPLE_RATE as f32;
      let sum: f32 = freqs.iter().map(|f| (TAU * f * t).sin()).sum();
      sum / freqs.len().max(1) as f32 * AMPLITUDE
    })
    .collect();
  apply_fades(&mut samples, fade_in_ms, fade_out_ms);
  samples
}

fn silence(ms: u32) -> Vec<f32> {
  vec![0.0; (SAMPLE_RATE as u64 * ms as u64 / 1000) as usize]
}

fn apply_fades(samples: &mut [f32], fade_in_ms: u32, fade_out_ms: u32) {
  let len = samples.len();
  let fade_in = ((SAMPLE_RATE as u64 * fade_in_ms as u64 / 1000) as usize).min(len / 2);
  let fade_out = ((SAMPLE_RATE as u64 * fade_out_ms as u64 / 1000) as usize).min(len / 2);
  for i in 0..fade_in {
    samples[i] *= i as f32 / fade_in as f32;
  }
  for i in 0..fade_out {
    samples[len - 1 - i] *= i as f32 / fade_out as f32;
  }
}
