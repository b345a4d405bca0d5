//! Text-to-speech engine cascade.
//!
//! Engines are tried in priority order (Coqui, OS-native, cloud, tone
//! placeholder) and the first success wins. Every engine failure is
//! recoverable: it is logged and the next engine gets the item. The tone
//! placeholder sits last so a batch run never leaves an empty audio slot.
//!
//! Engines emit WAV/AIFF/MP3 intermediates; `finish_mp3` converts to MP3
//! through ffmpeg when available and otherwise keeps the raw bytes under the
//! target name rather than producing nothing.

pub mod cloud;
pub mod coqui;
pub mod system;
pub mod tone;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::TtsConfig;
use crate::util::trunc_for_log;

use cloud::CloudEngine;
use coqui::CoquiEngine;
use system::SystemEngine;
use tone::ToneEngine;

pub enum Engine {
  Coqui(CoquiEngine),
  System(SystemEngine),
  Cloud(CloudEngine),
  Tone(ToneEngine),
}

impl Engine {
  pub fn name(&self) -> &'static str {
    match self {
      Engine::Coqui(_) => "coqui",
      Engine::System(_) => "system",
      Engine::Cloud(_) => "cloud",
      Engine::Tone(_) => "tone",
    }
  }

  /// File extension of this engine's native output.
  fn intermediate_ext(&self) -> &'static str {
    match self {
      Engine::Coqui(_) => "wav",
      Engine::System(e) => e.output_ext(),
      Engine::Cloud(_) => "mp3",
      Engine::Tone(_) => "wav",
    }
  }

  async fn synthesize(&self, text: &str, out_path: &Path, timeout: Duration) -> Result<(), String> {
    match self {
      Engine::Coqui(e) => e.synthesize(text, out_path, timeout).await,
      Engine::System(e) => e.synthesize(text, out_path, timeout).await,
      Engine::Cloud(e) => e.synthesize(text, out_path).await,
      Engine::Tone(e) => e.synthesize(out_path),
    }
  }
}

pub struct TtsCascade {
  engines: Vec<Engine>,
  ffmpeg: String,
  timeout: Duration,
}

impl TtsCascade {
  /// Assemble the cascade from configuration. Coqui is skipped when its
  /// command is configured empty, the cloud engine when its API key env var
  /// is unset; the tone placeholder is always present.
  pub fn from_config(cfg: &TtsConfig) -> Self {
    let mut engines = Vec::new();
    if !cfg.coqui_command.is_empty() {
      engines.push(Engine::Coqui(CoquiEngine::new(&cfg.coqui_command, cfg.coqui_model.clone())));
    }
    engines.push(Engine::System(SystemEngine::new(cfg.say_voice.clone())));
    if let Some(cloud) = CloudEngine::from_env(cfg) {
      engines.push(Engine::Cloud(cloud));
    }
    engines.push(Engine::Tone(ToneEngine));

    info!(
      target: "audio",
      engines = %engines.iter().map(Engine::name).collect::<Vec<_>>().join(","),
      "TTS cascade assembled"
    );
    Self { engines, ffmpeg: cfg.ffmpeg_command.clone(), timeout: Duration::from_secs(cfg.timeout_secs) }
  }

  /// Synthesize `text` into `final_path` (an `.mp3`). Returns the name of
  /// the engine that produced the audio.
  pub async fn synthesize_to_mp3(&self, text: &str, final_path: &Path) -> Result<&'static str, String> {
    for engine in &self.engines {
      let tmp = temp_path(engine.intermediate_ext());
      match engine.synthesize(text, &tmp, self.timeout).await {
        Ok(()) => {
          let result = if engine.intermediate_ext() == "mp3" {
            std::fs::rename(&tmp, final_path)
              .or_else(|_| std::fs::copy(&tmp, final_path).map(|_| ()))
              .map_err(|e| format!("move {}: {}", final_path.display(), e))
          } else {
            self.finish_mp3(&tmp, final_path).await
          };
          let _ = std::fs::remove_file(&tmp);
          result?;
          return Ok(engine.name());
        }
        Err(e) => {
          let _ = std::fs::remove_file(&tmp);
          warn!(target: "audio", engine = engine.name(), error = %e, text = %trunc_for_log(text, 60), "Engine failed; falling through");
        }
      }
    }
    Err("all TTS engines failed".into())
  }

  /// Convert an intermediate WAV/AIFF into MP3 via ffmpeg (128k, matching
  /// the historical exports). When ffmpeg is unavailable or errors, the raw
  /// bytes are copied under the target name so the slot is never empty.
  pub async fn finish_mp3(&self, src: &Path, dest: &Path) -> Result<(), String> {
    let mut cmd = Command::new(&self.ffmpeg);
    cmd.arg("-y").arg("-i").arg(src).arg("-b:a").arg("128k").arg(dest);
    match run_with_timeout(cmd, self.timeout, "ffmpeg").await {
      Ok(()) => Ok(()),
      Err(e) => {
        warn!(target: "audio", error = %e, dest = %dest.display(), "ffmpeg unavailable; keeping raw engine output under .mp3 name");
        std::fs::copy(src, dest)
          .map(|_| ())
          .map_err(|e| format!("copy {} -> {}: {}", src.display(), dest.display(), e))
      }
    }
  }
}

fn temp_path(ext: &str) -> PathBuf {
  std::env::temp_dir().join(format!("quest-tts-{}.{}", Uuid::new_v4(), ext))
}

/// Run a subprocess with a hard timeout. Timeouts and non-zero exits are
/// recoverable per-item failures for the caller to log.
pub(crate) async fn run_with_timeout(mut cmd: Command, timeout: Duration, what: &str) -> Result<(), String> {
  cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::piped()).kill_on_drop(true);
  debug!(target: "audio", %what, "Spawning subprocess");
  match tokio::time::timeout(timeout, cmd.output()).await {
    Err(_) => Err(format!("{} timed out after {}s", what, timeout.as_secs())),
    Ok(Err(e)) => Err(format!("{} failed to start: {}", what, e)),
    Ok(Ok(out)) if !out.status.success() => {
      let stderr = String::from_utf8_lossy(&out.stderr);
      Err(format!("{} exited with {}: {}", what, out.status, trunc_for_log(stderr.trim(), 200)))
    }
    Ok(Ok(_)) => Ok(()),
  }
}
