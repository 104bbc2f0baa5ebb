use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cuescene::analysis::TimingAnalyzer;
use cuescene::audio::{AudioDecoder, AudioInfo};
use cuescene::config::AppConfig;
use cuescene::templates::{ScriptTemplate, TemplateType};
use cuescene::{CueTable, Player, RenderEngine, SceneScript, ScriptParser};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cuescene")]
#[command(about = "Cue-synchronized scene animation player", long_about = None)]
struct Cli {
    /// Settings file (defaults to ./cuescene.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a script against a cue table and write per-frame draw commands
    Render {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Cue table (JSON or TOML)
        #[arg(long)]
        cues: Option<PathBuf>,

        /// Output directory for frames.jsonl
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the script's frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Narration track to check cue times against
        #[arg(long)]
        audio: Option<PathBuf>,
    },
    /// Parse and dry-run a script
    Validate {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Also check that every awaited cue is defined here
        #[arg(long)]
        cues: Option<PathBuf>,
    },
    /// Play a script and report where its time goes
    Report {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        #[arg(long)]
        cues: Option<PathBuf>,

        #[arg(long)]
        audio: Option<PathBuf>,

        /// Export report to file (supports .json, .md)
        #[arg(long)]
        export_report: Option<PathBuf>,
    },
    /// Print a script template
    Template {
        /// Type of template to generate
        #[arg(value_enum, value_name = "TYPE")]
        template_type: TemplateType,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring invalid config, using defaults");
            AppConfig::default()
        }),
    };

    match cli.command {
        Commands::Template { template_type } => {
            let script = ScriptTemplate::generate(template_type);
            println!("{}", serde_json::to_string_pretty(&script)?);
        }
        Commands::Validate { script, cues } => {
            let parsed = ScriptParser::parse_json(&script)?;
            println!("📋 Script Summary:");
            println!("{}", ScriptParser::summarize(&parsed, config.video.size()));

            if let Some(path) = cues {
                let table = CueTable::load(&path)?;
                let missing = ScriptParser::missing_cues(&parsed, &table);
                if !missing.is_empty() {
                    anyhow::bail!(
                        "Cue table {} is missing: {}",
                        path.display(),
                        missing.join(", ")
                    );
                }
                println!("✓ All {} cues defined", ScriptParser::cue_names(&parsed).len());
            }
            println!("✅ Validation complete");
        }
        Commands::Render {
            script,
            cues,
            output,
            fps,
            audio,
        } => {
            let parsed = ScriptParser::parse_json(&script)?;
            let table = load_cues(cues.as_deref())?;
            check_audio(&parsed, &script, audio.as_deref(), &table)?;

            let fps = fps.or(config.playback.fps).unwrap_or(parsed.metadata.fps);
            if fps == 0 {
                anyhow::bail!("FPS must be greater than 0");
            }
            let output_dir = output.unwrap_or_else(|| config.output.dir.clone());
            let (width, height) = parsed.metadata.dimensions(config.video.size());

            println!(
                "🎬 Rendering '{}' at {}x{}, {} fps",
                parsed.metadata.title, width, height, fps
            );
            let mut engine = RenderEngine::with_fps(&parsed, table, fps)
                .with_unknown_cues(config.playback.unknown_cues);
            let summary = engine.render(&output_dir)?;

            println!(
                "✨ Rendered {} frames ({:.2}s) to {}",
                summary.frames,
                summary.duration,
                output_dir.display()
            );
        }
        Commands::Report {
            script,
            cues,
            audio,
            export_report,
        } => {
            let parsed = ScriptParser::parse_json(&script)?;
            let table = load_cues(cues.as_deref())?;
            let info = check_audio(&parsed, &script, audio.as_deref(), &table)?;

            let mut player = Player::from_script(&parsed, table)
                .with_unknown_cues(config.playback.unknown_cues);
            player.run()?;

            let report = TimingAnalyzer::analyze(&parsed.metadata.title, &player, info.as_ref());
            println!("📊 Scene duration: {:.2}s", report.total_duration);
            println!(
                "   Animated: {:.2}s, waiting on cues: {:.2}s",
                report.animated, report.waiting
            );
            for finding in &report.findings {
                println!("   ⚠️ {}", finding.message);
            }

            if let Some(path) = export_report {
                let content = if path.extension().map_or(false, |ext| ext == "json") {
                    serde_json::to_string_pretty(&report)?
                } else {
                    report.to_markdown()
                };
                std::fs::write(&path, content)
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
                println!("📄 Report exported to: {}", path.display());
            }
        }
    }

    Ok(())
}

fn load_cues(path: Option<&Path>) -> Result<CueTable> {
    match path {
        Some(path) => CueTable::load(path),
        None => Ok(CueTable::new()),
    }
}

/// Probe the narration track (flag first, then the script's own reference)
/// and warn about cues that fall after it ends
fn check_audio(
    script: &SceneScript,
    script_path: &Path,
    flag: Option<&Path>,
    cues: &CueTable,
) -> Result<Option<AudioInfo>> {
    let path = match (flag, &script.metadata.audio) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(relative)) => {
            let base = script_path.parent().unwrap_or_else(|| Path::new("."));
            let candidate = base.join(relative);
            if !candidate.exists() {
                tracing::debug!(
                    path = %candidate.display(),
                    "script audio not found, skipping check"
                );
                return Ok(None);
            }
            candidate
        }
        (None, None) => return Ok(None),
    };

    let info = AudioDecoder::probe(&path)?;
    println!("🔊 Audio: {} ({:.2}s)", path.display(), info.duration);
    for (name, at) in AudioDecoder::cues_past_end(cues, &info) {
        tracing::warn!(cue = name.as_str(), at, "cue falls after the end of the audio track");
    }
    Ok(Some(info))
}
