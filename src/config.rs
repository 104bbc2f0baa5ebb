use crate::cues::UnknownCuePolicy;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub playback: PlaybackConfig,
    pub output: OutputConfig,
    pub video: VideoConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaybackConfig {
    /// Overrides the script's own fps when set
    #[serde(default)]
    pub fps: Option<u32>,
    pub unknown_cues: UnknownCuePolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

/// Canvas size for scripts that do not declare one
#[derive(Debug, Deserialize, Clone)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
}

impl VideoConfig {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig {
                fps: None,
                unknown_cues: UnknownCuePolicy::Error,
            },
            output: OutputConfig {
                dir: PathBuf::from("output"),
            },
            video: VideoConfig {
                width: 1920,
                height: 1080,
            },
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::builder(
            config::File::with_name("cuescene").required(false),
            Self::environment(),
        )
    }

    /// Load with an explicit settings file in place of `cuescene.*`
    pub fn load_from(path: &std::path::Path) -> Result<Self, config::ConfigError> {
        Self::builder(config::File::from(path).required(true), Self::environment())
    }

    /// Env var overrides (e.g. CUESCENE_PLAYBACK__FPS=60)
    fn environment() -> config::Environment {
        config::Environment::with_prefix("CUESCENE")
            .prefix_separator("_")
            .separator("__")
    }

    fn builder<S>(file: S, env: config::Environment) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let builder = config::Config::builder()
            .set_default("playback.unknown_cues", "error")?
            .set_default("output.dir", "output")?
            .set_default("video.width", 1920)?
            .set_default("video.height", 1080)?
            .add_source(file)
            .add_source(env);

        builder.build()?.try_deserialize()
    }
}
