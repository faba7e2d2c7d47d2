use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use vision::FaceParams;

use crate::Category;

/// Where frames come from.
#[derive(Clone, Debug, PartialEq)]
pub enum CaptureSource {
    /// Video4linux camera `/dev/video{index}`.
    Camera(usize),
    /// Image files matching a glob pattern, replayed as a camera feed.
    Replay {
        pattern: String,
        interval: Duration,
        looping: bool,
    },
}

/// Timestamp layout used in snapshot file names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileNaming {
    /// `HHMMSS`
    Time,
    /// `YYYYMMDD_HHMMSS`
    DateTime,
}

impl FileNaming {
    pub fn pattern(self) -> &'static str {
        match self {
            FileNaming::Time => "%H%M%S",
            FileNaming::DateTime => "%Y%m%d_%H%M%S",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("learning rate must be in (0, 1], got {0}")]
    LearningRate(f32),
    #[error("resolution must be non-zero, got {0}x{1}")]
    Resolution(u32, u32),
    #[error("{0} cooldown must be a finite, non-negative number of seconds")]
    Cooldown(&'static str),
    #[error("minimum motion area must be positive")]
    MinArea,
    #[error("face scale factor must be greater than 1, got {0}")]
    ScaleFactor(f32),
}

/// Settings for one monitoring session. Built once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub source: CaptureSource,
    pub width: u32,
    pub height: u32,
    /// Per-pixel intensity change counted as motion.
    pub threshold: u8,
    /// Smallest motion box kept, in square pixels.
    pub min_area: u64,
    /// Background learning rate.
    pub learning_rate: f32,
    pub motion_cooldown: Duration,
    pub face_cooldown: Duration,
    pub face_model: PathBuf,
    pub face_params: FaceParams,
    pub motion_dir: PathBuf,
    pub face_dir: PathBuf,
    pub activity_log: PathBuf,
    /// TrueType font for the burned-in capture time; no timestamp without one.
    pub font: Option<PathBuf>,
    pub naming: FileNaming,
    pub headless: bool,
    /// Annotated view written in interactive mode.
    pub preview: PathBuf,
    /// Pause between processing cycles. Interactive runs go flat out by default.
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: CaptureSource::Camera(0),
            width: 640,
            height: 480,
            threshold: vision::motion::DEFAULT_THRESHOLD,
            min_area: vision::motion::DEFAULT_MIN_AREA,
            learning_rate: 0.05,
            motion_cooldown: Duration::from_secs(2),
            face_cooldown: Duration::from_secs(2),
            face_model: PathBuf::from("model/seeta_fd_frontal_v1.0.bin"),
            face_params: FaceParams::default(),
            motion_dir: PathBuf::from("captured_motion"),
            face_dir: PathBuf::from("captured_faces"),
            activity_log: PathBuf::from("activity_log.txt"),
            font: None,
            naming: FileNaming::Time,
            headless: false,
            preview: PathBuf::from("preview.jpg"),
            poll_interval: Duration::ZERO,
        }
    }
}

impl Config {
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn cooldown(&self, category: Category) -> Duration {
        match category {
            Category::Motion => self.motion_cooldown,
            Category::Face => self.face_cooldown,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ConfigError::LearningRate(self.learning_rate));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Resolution(self.width, self.height));
        }
        if self.min_area == 0 {
            return Err(ConfigError::MinArea);
        }
        if !(self.face_params.scale_factor > 1.0) {
            return Err(ConfigError::ScaleFactor(self.face_params.scale_factor));
        }
        Ok(())
    }
}

/// Watch a camera for motion and faces, saving annotated snapshots.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Camera index to open (/dev/videoN)
    #[arg(long, env = "LOOKOUT_CAMERA", default_value_t = 0)]
    pub camera: usize,
    /// Replay image files matching this glob instead of opening a camera
    #[arg(long, env = "LOOKOUT_REPLAY")]
    pub replay: Option<String>,
    /// Delay between replayed frames in milliseconds
    #[arg(long, env = "LOOKOUT_REPLAY_INTERVAL_MS", default_value_t = 100)]
    pub replay_interval_ms: u64,
    /// Start the replay over when it reaches the last file
    #[arg(long, env = "LOOKOUT_REPLAY_LOOP")]
    pub replay_loop: bool,
    /// Capture width in pixels
    #[arg(long, env = "LOOKOUT_WIDTH", default_value_t = 640)]
    pub width: u32,
    /// Capture height in pixels
    #[arg(long, env = "LOOKOUT_HEIGHT", default_value_t = 480)]
    pub height: u32,
    /// Intensity change that marks a pixel as moving
    #[arg(long, env = "LOOKOUT_THRESHOLD", default_value_t = vision::motion::DEFAULT_THRESHOLD)]
    pub threshold: u8,
    /// Smallest motion region kept, in square pixels
    #[arg(long, env = "LOOKOUT_MIN_AREA", default_value_t = vision::motion::DEFAULT_MIN_AREA)]
    pub min_area: u64,
    /// Background learning rate in (0, 1]
    #[arg(long, env = "LOOKOUT_LEARNING_RATE", default_value_t = 0.05)]
    pub learning_rate: f32,
    /// Seconds between saved motion snapshots
    #[arg(long, env = "LOOKOUT_MOTION_COOLDOWN", default_value_t = 2.0)]
    pub motion_cooldown: f64,
    /// Seconds between saved face snapshots
    #[arg(long, env = "LOOKOUT_FACE_COOLDOWN", default_value_t = 2.0)]
    pub face_cooldown: f64,
    /// SeetaFace frontal face model file
    #[arg(long, env = "LOOKOUT_FACE_MODEL", default_value = "model/seeta_fd_frontal_v1.0.bin")]
    pub face_model: PathBuf,
    /// Ratio between successive face search scales
    #[arg(long, env = "LOOKOUT_SCALE_FACTOR", default_value_t = 1.3)]
    pub scale_factor: f32,
    /// Corroborating detections needed to accept a face
    #[arg(long, env = "LOOKOUT_MIN_NEIGHBORS", default_value_t = 5)]
    pub min_neighbors: u32,
    /// Smallest face searched for, in pixels
    #[arg(long, env = "LOOKOUT_MIN_FACE_SIZE", default_value_t = 40)]
    pub min_face_size: u32,
    /// Directory for motion snapshots
    #[arg(long, env = "LOOKOUT_MOTION_DIR", default_value = "captured_motion")]
    pub motion_dir: PathBuf,
    /// Directory for face snapshots
    #[arg(long, env = "LOOKOUT_FACE_DIR", default_value = "captured_faces")]
    pub face_dir: PathBuf,
    /// Append-only log of saved snapshots
    #[arg(long, env = "LOOKOUT_ACTIVITY_LOG", default_value = "activity_log.txt")]
    pub activity_log: PathBuf,
    /// TrueType font used to stamp the capture time on snapshots
    #[arg(long, env = "LOOKOUT_FONT")]
    pub font: Option<PathBuf>,
    /// Name snapshots with the date as well as the time
    #[arg(long, env = "LOOKOUT_LONG_NAMES")]
    pub long_names: bool,
    /// Run without preview or keyboard control
    #[arg(long, env = "LOOKOUT_HEADLESS")]
    pub headless: bool,
    /// Annotated preview image refreshed in interactive mode
    #[arg(long, env = "LOOKOUT_PREVIEW", default_value = "preview.jpg")]
    pub preview: PathBuf,
    /// Pause between processing cycles in milliseconds [default: 100 when headless, else 0]
    #[arg(long, env = "LOOKOUT_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,
}

/// Cycle pause used in headless mode unless overridden.
pub const HEADLESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn seconds(value: f64, what: &'static str) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::Cooldown(what))
}

impl Cli {
    /// Turn parsed flags into a validated [`Config`].
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let source = match self.replay {
            Some(pattern) => CaptureSource::Replay {
                pattern,
                interval: Duration::from_millis(self.replay_interval_ms),
                looping: self.replay_loop,
            },
            None => CaptureSource::Camera(self.camera),
        };
        let config = Config {
            source,
            width: self.width,
            height: self.height,
            threshold: self.threshold,
            min_area: self.min_area,
            learning_rate: self.learning_rate,
            motion_cooldown: seconds(self.motion_cooldown, "motion")?,
            face_cooldown: seconds(self.face_cooldown, "face")?,
            face_model: self.face_model,
            face_params: FaceParams {
                scale_factor: self.scale_factor,
                min_neighbors: self.min_neighbors,
                min_size: self.min_face_size,
            },
            motion_dir: self.motion_dir,
            face_dir: self.face_dir,
            activity_log: self.activity_log,
            font: self.font,
            naming: if self.long_names {
                FileNaming::DateTime
            } else {
                FileNaming::Time
            },
            headless: self.headless,
            preview: self.preview,
            poll_interval: match self.poll_interval_ms {
                Some(ms) => Duration::from_millis(ms),
                None if self.headless => HEADLESS_POLL_INTERVAL,
                None => Duration::ZERO,
            },
        };
        config.validate()?;
        Ok(config)
    }
}
