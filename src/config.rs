//! Tool configuration loaded from TOML, with defaults matching the values
//! the maintenance scripts historically hard-coded.
//!
//! The config is built once in `main` and passed by reference into every
//! command; there is no module-level mutable state.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct ToolConfig {
  pub paths: PathsConfig,
  pub shuffle: ShuffleConfig,
  pub lexicon: LexiconConfig,
  pub tts: TtsConfig,
  pub asr: AsrConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
  /// Directory holding the per-module JSON content files.
  pub content_dir: String,
  /// Root audio directory; synthesized speech goes to `<audio_dir>/tts`,
  /// feedback sounds to `<audio_dir>/sfx`.
  pub audio_dir: String,
  /// URL prefix stored in content files for synthesized audio.
  pub audio_url_prefix: String,
}

impl Default for PathsConfig {
  fn default() -> Self {
    Self {
      content_dir: "src/content".into(),
      audio_dir: "public/audio".into(),
      audio_url_prefix: "/audio/tts/".into(),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ShuffleConfig {
  /// Fixed seed so repeated runs over the same corpus produce identical
  /// exercise sets.
  pub seed: u64,
}

impl Default for ShuffleConfig {
  fn default() -> Self {
    Self { seed: 42 }
  }
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct LexiconConfig {
  /// Extra multi-character words merged into the curated tables.
  pub extra_words: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
  /// Coqui TTS CLI entry point; the engine is skipped when empty.
  pub coqui_command: String,
  pub coqui_model: Option<String>,
  /// Voice passed to macOS `say` (system default when None).
  pub say_voice: Option<String>,
  /// Cloud synthesis endpoint; only used when the API key env var is set.
  pub cloud_base_url: String,
  /// Name of the environment variable holding the cloud API key.
  pub cloud_api_key_env: String,
  pub cloud_voice: String,
  pub language: String,
  /// MP3 finishing step; raw engine output is kept when ffmpeg is missing.
  pub ffmpeg_command: String,
  /// Per-item subprocess budget.
  pub timeout_secs: u64,
}

impl Default for TtsConfig {
  fn default() -> Self {
    Self {
      coqui_command: "tts".into(),
      coqui_model: None,
      say_voice: None,
      cloud_base_url: "https://texttospeech.googleapis.com/v1".into(),
      cloud_api_key_env: "QUEST_TTS_API_KEY".into(),
      cloud_voice: "en-US-Standard-C".into(),
      language: "en".into(),
      ffmpeg_command: "ffmpeg".into(),
      timeout_secs: 30,
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AsrConfig {
  pub whisper_command: String,
  /// Whisper model size (tiny/base/small/medium/large); base balances speed
  /// and accuracy for short classroom sentences.
  pub model: String,
  pub language: String,
  pub timeout_secs: u64,
}

impl Default for AsrConfig {
  fn default() -> Self {
    Self {
      whisper_command: "whisper".into(),
      model: "base".into(),
      language: "en".into(),
      timeout_secs: 120,
    }
  }
}

/// Load `ToolConfig` from an explicit path or the QUEST_TOOLS_CONFIG env
/// var. On any read/parse error the defaults are used; a broken config file
/// should never stop a batch run.
pub fn load_config(explicit_path: Option<&str>) -> ToolConfig {
  let path = explicit_path
    .map(str::to_string)
    .or_else(|| std::env::var("QUEST_TOOLS_CONFIG").ok());
  let Some(path) = path else {
    return ToolConfig::default();
  };
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<ToolConfig>(&s) {
      Ok(cfg) => {
        info!(target: "quest_tools", %path, "Loaded tool config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "quest_tools", %path, error = %e, "Failed to parse TOML config; using defaults");
        ToolConfig::default()
      }
    },
    Err(e) => {
      error!(target: "quest_tools", %path, error = %e, "Failed to read TOML config file; using defaults");
      ToolConfig::default()
    }
  }
}
