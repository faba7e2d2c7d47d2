use chrono::{DateTime, Utc};
use image::RgbImage;
use sensor::{FrameRead, FrameSource, SensorError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use vision::annotate::annotate;
use vision::frame::smooth;
use vision::{
    BackgroundModel, DetectionResult, FaceDetector, MotionDetector, Timestamp, VisionError,
};

use crate::render::Renderer;
use crate::{Category, Config, CooldownGate, PersistError, SnapshotStore};

/// Shortest pause after a cycle that found nothing new.
const IDLE_BACKOFF: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error(transparent)]
    Sensor(#[from] SensorError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("camera capture is not compiled in; rebuild with the `camera` feature or use --replay")]
    CameraUnsupported,
}

/// Where the processing loop stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No frame has reached the background model yet.
    AwaitingFirstFrame,
    /// The background is seeded; every new frame is classified.
    Steady,
}

/// What a single call to [`Monitor::cycle`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cycle {
    /// The frame seeded the background and was not classified.
    Warmup,
    /// The frame was classified.
    Processed(DetectionResult),
    /// No new frame was available.
    Idle,
    /// The source will produce no more frames.
    Exhausted,
}

/// Counters reported when monitoring ends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Distinct frames processed, warm-up included.
    pub frames: u64,
    pub motion_frames: u64,
    pub face_frames: u64,
    pub saved_motion: u64,
    pub saved_faces: u64,
    pub failed_saves: u64,
    /// Whether the loop ended because the source ran dry.
    pub exhausted: bool,
}

/// Per-frame pipeline tying acquisition, detection and persistence together.
pub struct Monitor<S: FrameSource> {
    source: S,
    background: BackgroundModel,
    motion: MotionDetector,
    faces: FaceDetector,
    gate: CooldownGate,
    store: SnapshotStore,
    renderer: Box<dyn Renderer>,
    stamp: Option<Timestamp>,
    poll_interval: Duration,
    phase: Phase,
    last_seq: Option<u64>,
    summary: RunSummary,
}

impl<S: FrameSource> Monitor<S> {
    pub fn new(
        config: &Config,
        source: S,
        faces: FaceDetector,
        store: SnapshotStore,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        Self {
            source,
            background: BackgroundModel::new(config.learning_rate),
            motion: MotionDetector::new(config.threshold, config.min_area),
            faces,
            gate: CooldownGate::new(
                config.cooldown(Category::Motion),
                config.cooldown(Category::Face),
            ),
            store,
            renderer,
            stamp: None,
            poll_interval: config.poll_interval,
            phase: Phase::AwaitingFirstFrame,
            last_seq: None,
            summary: RunSummary::default(),
        }
    }

    /// Burn the capture time into every annotated frame.
    pub fn with_timestamp(mut self, stamp: Timestamp) -> Self {
        self.stamp = Some(stamp);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Start the source, process frames until it runs dry or `cancel` is
    /// set, then stop the source.
    ///
    /// The source is stopped on every exit path, errors included.
    pub fn run(mut self, cancel: &AtomicBool) -> Result<RunSummary, MonitorError> {
        let outcome = self
            .source
            .start()
            .map_err(MonitorError::from)
            .and_then(|()| self.run_loop(cancel));
        self.source.stop();
        info!(summary = ?self.summary, "monitoring stopped");
        outcome.map(|()| self.summary)
    }

    fn run_loop(&mut self, cancel: &AtomicBool) -> Result<(), MonitorError> {
        while !cancel.load(Ordering::SeqCst) {
            let pause = match self.cycle()? {
                Cycle::Exhausted => {
                    info!("frame source exhausted");
                    self.summary.exhausted = true;
                    return Ok(());
                }
                Cycle::Idle => self.poll_interval.max(IDLE_BACKOFF),
                Cycle::Warmup | Cycle::Processed(_) => self.poll_interval,
            };
            if !pause.is_zero() {
                thread::sleep(pause);
            }
        }
        info!("monitoring cancelled");
        Ok(())
    }

    /// Run one acquire, detect, persist and render pass.
    pub fn cycle(&mut self) -> Result<Cycle, MonitorError> {
        let frame = match self.source.read() {
            FrameRead::Frame(frame) => frame,
            FrameRead::Pending => return Ok(Cycle::Idle),
            FrameRead::Exhausted => return Ok(Cycle::Exhausted),
        };
        if self.last_seq == Some(frame.seq()) {
            return Ok(Cycle::Idle);
        }
        self.last_seq = Some(frame.seq());
        self.summary.frames += 1;

        let gray = frame.gray();
        let Some(diff) = self.background.absorb(&smooth(&gray))? else {
            info!(seq = frame.seq(), "background initialized from first frame");
            self.phase = Phase::Steady;
            return Ok(Cycle::Warmup);
        };

        let (motion_detected, motion_boxes) = self.motion.detect(&diff);
        let face_boxes = if motion_detected {
            self.faces.detect(&gray)?
        } else {
            Vec::new()
        };
        let result = DetectionResult {
            motion_detected,
            motion_boxes,
            face_boxes,
        };

        let annotated = annotate(&frame, &result, self.stamp.as_ref());
        if result.motion_detected {
            self.summary.motion_frames += 1;
            self.persist(Category::Motion, &annotated, frame.captured_at());
        }
        if result.faces_detected() {
            self.summary.face_frames += 1;
            self.persist(Category::Face, &annotated, frame.captured_at());
        }
        self.renderer.render(&frame, &annotated, &result);
        Ok(Cycle::Processed(result))
    }

    fn persist(&mut self, category: Category, image: &RgbImage, at: DateTime<Utc>) {
        if !self.gate.should_save(category, at) {
            debug!(%category, "cooldown active, snapshot skipped");
            return;
        }
        match self.store.save(category, image, at) {
            Ok(path) => {
                self.gate.record(category, at);
                match category {
                    Category::Motion => self.summary.saved_motion += 1,
                    Category::Face => self.summary.saved_faces += 1,
                }
                debug!(%category, path = %path.display(), "snapshot saved");
            }
            Err(e) => {
                self.summary.failed_saves += 1;
                warn!(%category, error = %e, "snapshot not saved");
            }
        }
    }
}
