//! Motion-gated face capture.
//!
//! `lookout` watches a camera, keeps a running model of the static scene and
//! saves annotated snapshots when something moves or a face shows up, at most
//! once per cooldown for each kind of event.

pub mod config;
pub mod cooldown;
pub mod logging;
pub mod monitor;
pub mod persistence;
pub mod render;

pub use config::{CaptureSource, Cli, Config, ConfigError, FileNaming};
pub use cooldown::{Category, CooldownGate};
pub use logging::init_logging;
pub use monitor::{Cycle, Monitor, MonitorError, Phase, RunSummary};
pub use persistence::{PersistError, SnapshotStore};
pub use render::{NoopRenderer, PreviewRenderer, Renderer};

use sensor::{FrameSource, ReplayDevice, ThreadedSource};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;
use vision::{FaceDetector, RustfaceClassifier, Timestamp};

/// Open everything `config` names and monitor until the feed ends or `cancel` is set.
///
/// Output directories, the face model, the optional timestamp font and the
/// capture device are all set up before the first frame; any failure there is
/// returned without monitoring.
pub fn run(config: &Config, cancel: &AtomicBool) -> Result<RunSummary, MonitorError> {
    let store = SnapshotStore::from_config(config);
    store.prepare()?;
    let classifier = RustfaceClassifier::from_path(&config.face_model, config.face_params)?;
    let stamp = config.font.as_ref().map(Timestamp::from_path).transpose()?;
    let renderer: Box<dyn Renderer> = if config.headless {
        Box::new(NoopRenderer)
    } else {
        Box::new(PreviewRenderer::new(&config.preview))
    };
    let parts = Parts {
        faces: FaceDetector::new(Box::new(classifier)),
        store,
        renderer,
        stamp,
    };
    match &config.source {
        CaptureSource::Replay {
            pattern,
            interval,
            looping,
        } => {
            let device = ReplayDevice::new(pattern, config.resolution(), *interval, *looping)?;
            info!(%pattern, frames = device.len(), "replaying images");
            monitor(config, ThreadedSource::new(device), parts, cancel)
        }
        CaptureSource::Camera(index) => open_camera(config, *index, parts, cancel),
    }
}

/// Everything a monitor needs besides its frame source.
struct Parts {
    faces: FaceDetector,
    store: SnapshotStore,
    renderer: Box<dyn Renderer>,
    stamp: Option<Timestamp>,
}

fn monitor<S: FrameSource>(
    config: &Config,
    source: S,
    parts: Parts,
    cancel: &AtomicBool,
) -> Result<RunSummary, MonitorError> {
    let mut monitor = Monitor::new(config, source, parts.faces, parts.store, parts.renderer);
    if let Some(stamp) = parts.stamp {
        monitor = monitor.with_timestamp(stamp);
    }
    monitor.run(cancel)
}

#[cfg(feature = "camera")]
fn open_camera(
    config: &Config,
    index: usize,
    parts: Parts,
    cancel: &AtomicBool,
) -> Result<RunSummary, MonitorError> {
    let camera = sensor::camera::V4lCamera::open(index, config.resolution())?;
    monitor(config, ThreadedSource::new(camera), parts, cancel)
}

#[cfg(not(feature = "camera"))]
fn open_camera(
    _config: &Config,
    _index: usize,
    _parts: Parts,
    _cancel: &AtomicBool,
) -> Result<RunSummary, MonitorError> {
    Err(MonitorError::CameraUnsupported)
}

/// Set `cancel` once a line reading `q` arrives on `input`.
///
/// Returns when quit is requested or the input closes.
pub fn listen_for_quit(input: impl BufRead, cancel: &AtomicBool) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        if line.trim().eq_ignore_ascii_case("q") {
            info!("quit requested");
            cancel.store(true, Ordering::SeqCst);
            break;
        }
    }
}
