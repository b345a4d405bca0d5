//! OS-native speech: `say` on macOS (AIFF output), `espeak` elsewhere (WAV).

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;

use super::run_with_timeout;

pub struct SystemEngine {
  voice: Option<String>,
}

impl SystemEngine {
  pub fn new(voice: Option<String>) -> Self {
    Self { voice }
  }

  pub fn output_ext(&self) -> &'static str {
    if cfg!(target_os = "macos") {
      "aiff"
    } else {
      "wav"
    }
  }

  pub async fn synthesize(&self, text: &str, out_path: &Path, timeout: Duration) -> Result<(), String> {
    let mut cmd;
    if cfg!(target_os = "macos") {
      cmd = Command::new("say");
      cmd.arg("-o").arg(out_path);
      if let Some(voice) = &self.voice {
        cmd.arg("-v").arg(voice);
      }
      cmd.arg(text);
    } else {
      cmd = Command::new("espeak");
      cmd.arg("-w").arg(out_path).arg(text);
    }
    run_with_timeout(cmd, timeout, "system tts").await?;
    if !out_path.exists() {
      return Err("system tts reported success but wrote no file".into());
    }
    Ok(())
  }
}
