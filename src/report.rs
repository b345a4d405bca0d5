//! JSON run reports for the checker commands.
//!
//! Every checker writes a machine-readable report next to where it was
//! invoked, regardless of per-item failures; summary logging happens in the
//! commands themselves.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

#[derive(Serialize)]
pub struct Report<T: Serialize> {
  pub run_id: String,
  pub timestamp: String,
  pub tool: String,
  #[serde(flatten)]
  pub body: T,
}

impl<T: Serialize> Report<T> {
  pub fn new(tool: &str, body: T) -> Self {
    Self {
      run_id: Uuid::new_v4().to_string(),
      timestamp: Utc::now().to_rfc3339(),
      tool: tool.to_string(),
      body,
    }
  }

  /// Write `<tool>-report.json` into `dir`, overwriting the previous run.
  pub fn save(&self, dir: &Path) -> Result<PathBuf, String> {
    let path = dir.join(format!("{}-report.json", self.tool));
    let text = serde_json::to_string_pretty(self).map_err(|e| format!("serialize report: {}", e))?;
    fs::write(&path, text).map_err(|e| format!("write {}: {}", path.display(), e))?;
    info!(target: "quest_tools", report = %path.display(), "Saved run report");
    Ok(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Serialize;
  use tempfile::tempdir;

  #[derive(Serialize)]
  struct Body {
    total: usize,
  }

  #[test]
  fn report_flattens_body_and_saves() {
    let dir = tempdir().unwrap();
    let report = Report::new("check-missing-audio", Body { total: 3 });
    let path = report.save(dir.path()).unwrap();
    assert!(path.file_name().unwrap().to_string_lossy().ends_with("check-missing-audio-report.json"));

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["tool"], "check-missing-audio");
    assert_eq!(raw["total"], 3);
    assert!(raw["run_id"].as_str().is_some());
  }
}
