use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use vision::Frame;

/// Result of polling a frame source.
#[derive(Clone, Debug)]
pub enum FrameRead {
    /// The newest frame available. May repeat between polls.
    Frame(Frame),
    /// Nothing has been captured yet.
    Pending,
    /// The device stopped producing frames; no more will arrive.
    Exhausted,
}

#[derive(Default)]
struct SlotState {
    latest: Option<Frame>,
    exhausted: bool,
}

/// Single-value cell shared by the acquisition thread and the consumer.
///
/// The writer overwrites and never waits for the reader; the reader always
/// gets the most recent write.
#[derive(Default)]
pub struct LatestFrame {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the held frame with `frame`.
    pub fn publish(&self, frame: Frame) {
        self.lock().latest = Some(frame);
        self.ready.notify_all();
    }

    /// Mark the stream finished and wake any waiting reader.
    pub fn exhaust(&self) {
        self.lock().exhausted = true;
        self.ready.notify_all();
    }

    pub fn is_exhausted(&self) -> bool {
        self.lock().exhausted
    }

    /// Return the newest frame, waiting at most `wait` for the first one.
    pub fn read(&self, wait: Duration) -> FrameRead {
        let guard = self.lock();
        let (state, _) = self
            .ready
            .wait_timeout_while(guard, wait, |s| s.latest.is_none() && !s.exhausted)
            .unwrap_or_else(PoisonError::into_inner);
        if state.exhausted {
            return FrameRead::Exhausted;
        }
        match &state.latest {
            Some(frame) => FrameRead::Frame(frame.clone()),
            None => FrameRead::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use image::RgbImage;
    use std::sync::Arc;
    use std::thread;

    fn frame(seq: u64) -> Frame {
        Frame::new(RgbImage::new(2, 2), Utc::now(), seq)
    }

    #[test]
    fn newest_write_wins() {
        let slot = LatestFrame::new();
        assert!(matches!(slot.read(Duration::ZERO), FrameRead::Pending));
        slot.publish(frame(1));
        slot.publish(frame(2));
        for _ in 0..2 {
            match slot.read(Duration::ZERO) {
                FrameRead::Frame(f) => assert_eq!(f.seq(), 2),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn exhaustion_hides_stale_frame() {
        let slot = LatestFrame::new();
        slot.publish(frame(1));
        slot.exhaust();
        assert!(matches!(slot.read(Duration::ZERO), FrameRead::Exhausted));
    }

    #[test]
    fn reader_wakes_on_first_frame() {
        let slot = Arc::new(LatestFrame::new());
        let writer = slot.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.publish(frame(7));
        });
        match slot.read(Duration::from_secs(5)) {
            FrameRead::Frame(f) => assert_eq!(f.seq(), 7),
            other => panic!("unexpected {other:?}"),
        }
        handle.join().unwrap();
    }
}
