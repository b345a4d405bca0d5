//! quest-tools · Content maintenance toolbox for the Quest English-learning app
//!
//! Subcommands:
//!   generate-quests      regenerate practice quests from words/phrases/patterns
//!   generate-audio       synthesize missing TTS audio (Coqui → system → cloud → tone)
//!   check-missing-audio  referenced-vs-existing audio inventory report
//!   check-audio-quality  transcribe audio with Whisper and score similarity
//!   fix-segmentation     re-segment en-to-zh steps with the word lexicon
//!   check-coverage       verify (and --fix) pattern coverage of the quests
//!
//! Important env variables:
//!   QUEST_TOOLS_CONFIG : path to TOML config (paths, seed, lexicon, engines)
//!   QUEST_TTS_API_KEY  : enables the cloud TTS engine if present
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

mod asr;
mod commands;
mod config;
mod domain;
mod lexicon;
mod pinyin;
mod quests;
mod report;
mod segment;
mod shuffle;
mod store;
mod telemetry;
mod tts;
mod util;

use tracing::{error, info};

use crate::commands::CommandArgs;
use crate::config::load_config;

const USAGE: &str = "\
usage: quest-tools <command> [options]

commands:
  generate-quests      regenerate practice quests for matching modules
  generate-audio       synthesize missing TTS audio files
  check-missing-audio  report referenced audio files that do not exist
  check-audio-quality  transcribe audio and score it against the source text
  fix-segmentation     repair Chinese word boundaries in en-to-zh steps
  check-coverage       verify pattern coverage of the translation quests

options:
  --content-dir <dir>  content directory (default: src/content)
  --audio-dir <dir>    audio directory (default: public/audio)
  --config <file>      TOML config file (also: QUEST_TOOLS_CONFIG)
  --grade <g>          only modules of one grade, e.g. grade5
  --pattern <glob>     only modules matching a filename pattern
  --model <m>          whisper model for check-audio-quality
  --limit <n>          cap items for check-audio-quality
  --dry-run            report what would change without writing
  --fix                repair incomplete coverage (check-coverage)
  --sfx                also render feedback sounds (generate-audio)
";

#[tokio::main]
async fn main() {
  telemetry::init_tracing();

  let argv: Vec<String> = std::env::args().skip(1).collect();
  if let Err(e) = run(argv).await {
    error!(target: "quest_tools", error = %e, "Command failed");
    eprintln!("error: {}", e);
    std::process::exit(1);
  }
}

async fn run(argv: Vec<String>) -> Result<(), String> {
  let Some(command) = argv.first().cloned() else {
    print!("{}", USAGE);
    return Ok(());
  };
  if matches!(command.as_str(), "help" | "--help" | "-h") {
    print!("{}", USAGE);
    return Ok(());
  }

  let mut args = CommandArgs::default();
  let mut content_dir: Option<String> = None;
  let mut audio_dir: Option<String> = None;
  let mut config_path: Option<String> = None;
  let mut model: Option<String> = None;

  let mut i = 1;
  while i < argv.len() {
    let flag = argv[i].as_str();
    let value = |i: &mut usize| -> Result<String, String> {
      *i += 1;
      argv.get(*i).cloned().ok_or_else(|| format!("{} expects a value", flag))
    };
    match flag {
      "--content-dir" => content_dir = Some(value(&mut i)?),
      "--audio-dir" => audio_dir = Some(value(&mut i)?),
      "--config" => config_path = Some(value(&mut i)?),
      "--pattern" => args.pattern = Some(value(&mut i)?),
      "--grade" => args.grade = Some(value(&mut i)?),
      "--model" => model = Some(value(&mut i)?),
      "--limit" => {
        let raw = value(&mut i)?;
        args.limit = Some(raw.parse().map_err(|_| format!("--limit expects a number, got '{}'", raw))?);
      }
      "--dry-run" => args.dry_run = true,
      "--fix" => args.fix = true,
      "--sfx" => args.sfx = true,
      other => return Err(format!("unknown option: {} (see --help)", other)),
    }
    i += 1;
  }

  let mut cfg = load_config(config_path.as_deref());
  if let Some(dir) = content_dir {
    cfg.paths.content_dir = dir;
  }
  if let Some(dir) = audio_dir {
    cfg.paths.audio_dir = dir;
  }
  if let Some(model) = model {
    cfg.asr.model = model;
  }

  info!(
    target: "quest_tools",
    %command,
    content_dir = %cfg.paths.content_dir,
    dry_run = args.dry_run,
    "Starting"
  );

  match command.as_str() {
    "generate-quests" => commands::generate_quests::run(&cfg, &args),
    "generate-audio" => commands::generate_audio::run(&cfg, &args).await,
    "check-missing-audio" => commands::check_missing::run(&cfg, &args),
    "check-audio-quality" => commands::check_quality::run(&cfg, &args).await,
    "fix-segmentation" => commands::fix_segmentation::run(&cfg, &args),
    "check-coverage" => commands::check_coverage::run(&cfg, &args),
    other => Err(format!("unknown command: {} (see --help)", other)),
  }
}
