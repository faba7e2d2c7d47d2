use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};
use vision::Frame;

use crate::{CaptureDevice, FrameRead, LatestFrame, SensorError};

/// Anything the processing loop can pull frames from.
pub trait FrameSource {
    /// Begin acquisition.
    fn start(&mut self) -> Result<(), SensorError>;
    /// Newest frame without waiting for a new one.
    fn read(&mut self) -> FrameRead;
    /// End acquisition and release the device. Safe to call more than once.
    fn stop(&mut self);
}

/// How long [`ThreadedSource::read`] waits for the very first frame.
pub const DEFAULT_FIRST_FRAME_WAIT: Duration = Duration::from_millis(100);

/// Runs a [`CaptureDevice`] on a dedicated acquisition thread.
///
/// Construction only takes ownership of an opened device; the thread is
/// spawned by [`start`](FrameSource::start). The device is dropped on the
/// acquisition thread when capture ends, or here if it never started.
pub struct ThreadedSource<D: CaptureDevice> {
    device: Option<D>,
    slot: Arc<LatestFrame>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    first_frame_wait: Duration,
}

impl<D: CaptureDevice> ThreadedSource<D> {
    pub fn new(device: D) -> Self {
        Self {
            device: Some(device),
            slot: Arc::new(LatestFrame::new()),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
            first_frame_wait: DEFAULT_FIRST_FRAME_WAIT,
        }
    }

    /// Override how long a read may wait for the first frame.
    pub fn with_first_frame_wait(mut self, wait: Duration) -> Self {
        self.first_frame_wait = wait;
        self
    }

    /// Whether the acquisition thread has given up.
    pub fn is_exhausted(&self) -> bool {
        self.slot.is_exhausted()
    }
}

impl<D: CaptureDevice> FrameSource for ThreadedSource<D> {
    fn start(&mut self) -> Result<(), SensorError> {
        let device = self.device.take().ok_or(SensorError::AlreadyStarted)?;
        let slot = self.slot.clone();
        let running = self.running.clone();
        running.store(true, Ordering::SeqCst);
        let worker = thread::Builder::new()
            .name("frame-acquisition".into())
            .spawn(move || acquire(device, slot, running))
            .map_err(SensorError::Spawn)?;
        self.worker = Some(worker);
        Ok(())
    }

    fn read(&mut self) -> FrameRead {
        self.slot.read(self.first_frame_wait)
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("acquisition thread panicked");
            }
        }
        if self.device.take().is_some() {
            debug!("capture device released before start");
        }
        self.slot.exhaust();
    }
}

impl<D: CaptureDevice> Drop for ThreadedSource<D> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Marks the slot exhausted however the acquisition thread exits.
struct ExhaustOnExit(Arc<LatestFrame>);

impl Drop for ExhaustOnExit {
    fn drop(&mut self) {
        self.0.exhaust();
    }
}

fn acquire<D: CaptureDevice>(mut device: D, slot: Arc<LatestFrame>, running: Arc<AtomicBool>) {
    let _exhaust = ExhaustOnExit(slot.clone());
    let (width, height) = device.resolution();
    info!(width, height, "acquisition started");
    let mut seq = 0u64;
    while running.load(Ordering::SeqCst) {
        match device.capture() {
            Ok(Some(image)) => {
                slot.publish(Frame::new(image, Utc::now(), seq));
                seq += 1;
            }
            Ok(None) => {
                info!(frames = seq, "capture stream ended");
                break;
            }
            Err(SensorError::Timeout(wait)) => {
                debug!(?wait, "no frame yet");
            }
            Err(e) => {
                error!(error = %e, frames = seq, "capture failed");
                break;
            }
        }
    }
    drop(device);
    debug!("capture device released");
}
