//! Coqui TTS engine (the `tts` CLI). Highest quality in the cascade when the
//! Python package is installed; failures just hand the item to the next
//! engine.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;

use super::run_with_timeout;

pub struct CoquiEngine {
  command: String,
  model: Option<String>,
}

impl CoquiEngine {
  pub fn new(command: &str, model: Option<String>) -> Self {
    Self { command: command.to_string(), model }
  }

  pub async fn synthesize(&self, text: &str, out_path: &Path, timeout: Duration) -> Result<(), String> {
    let mut cmd = Command::new(&self.command);
    cmd.arg("--text").arg(text).arg("--out_path").arg(out_path);
    if let Some(model) = &self.model {
      cmd.arg("--model_name").arg(model);
    }
    run_with_timeout(cmd, timeout, "coqui tts").await?;
    if !out_path.exists() {
      return Err("coqui tts reported success but wrote no file".into());
    }
    Ok(())
  }
}
