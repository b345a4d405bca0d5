//! Cloud synthesis over HTTP for machines with neither Coqui nor a usable
//! system voice.
//!
//! Speaks the Google-style `text:synthesize` shape: POST text + voice
//! config, receive base64 `audioContent` (MP3). The engine only joins the
//! cascade when the configured API key env var is set.
//!
//! NOTE: We never log the API key, and response payloads are sized, not
//! dumped.

use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TtsConfig;

pub struct CloudEngine {
  client: reqwest::Client,
  api_key: String,
  base_url: String,
  voice: String,
}

impl CloudEngine {
  /// Construct the engine if the configured API key env var is set;
  /// otherwise return None and let the cascade skip it.
  pub fn from_env(cfg: &TtsConfig) -> Option<Self> {
    let api_key = std::env::var(&cfg.cloud_api_key_env).ok()?;

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()
      .ok()?;

    info!(target: "audio", base_url = %cfg.cloud_base_url, voice = %cfg.cloud_voice, "Cloud TTS enabled");
    Some(Self {
      client,
      api_key,
      base_url: cfg.cloud_base_url.clone(),
      voice: cfg.cloud_voice.clone(),
    })
  }

  pub async fn synthesize(&self, text: &str, out_path: &Path) -> Result<(), String> {
    let url = format!("{}/text:synthesize", self.base_url);
    let req = SynthesizeRequest {
      input: SynthesisInput { text: text.to_string() },
      voice: VoiceSelection { language_code: language_code_of(&self.voice), name: self.voice.clone() },
      audio_config: AudioConfig { audio_encoding: "MP3".into() },
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "quest-tools/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or(body);
      return Err(format!("cloud TTS HTTP {}: {}", status, msg));
    }

    let body: SynthesizeResponse = res.json().await.map_err(|e| e.to_string())?;
    let audio = BASE64
      .decode(body.audio_content.as_bytes())
      .map_err(|e| format!("bad base64 audio payload: {}", e))?;
    debug!(target: "audio", bytes = audio.len(), "Cloud TTS payload decoded");
    std::fs::write(out_path, audio).map_err(|e| format!("write {}: {}", out_path.display(), e))
  }
}

/// "en-US-Standard-C" → "en-US".
fn language_code_of(voice: &str) -> String {
  voice.splitn(3, '-').take(2).collect::<Vec<_>>().join("-")
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct SynthesizeRequest {
  input: SynthesisInput,
  voice: VoiceSelection,
  #[serde(rename = "audioConfig")]
  audio_config: AudioConfig,
}
#[derive(Serialize)]
struct SynthesisInput {
  text: String,
}
#[derive(Serialize)]
struct VoiceSelection {
  #[serde(rename = "languageCode")]
  language_code: String,
  name: String,
}
#[derive(Serialize)]
struct AudioConfig {
  #[serde(rename = "audioEncoding")]
  audio_encoding: String,
}

#[derive(Deserialize)]
struct SynthesizeResponse {
  #[serde(rename = "audioContent")]
  audio_content: String,
}

/// Try to extract a clean error message from an API error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn language_code_is_voice_prefix() {
    assert_eq!(language_code_of("en-US-Standard-C"), "en-US");
    assert_eq!(language_code_of("en-GB-Wavenet-A"), "en-GB");
    assert_eq!(language_code_of("en"), "en");
  }

  #[test]
  fn api_error_extraction() {
    let body = r#"{"error": {"message": "API key not valid", "code": 403}}"#;
    assert_eq!(extract_api_error(body).as_deref(), Some("API key not valid"));
    assert!(extract_api_error("not json").is_none());
  }
}
