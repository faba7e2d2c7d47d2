use glob::glob;
use image::imageops::FilterType;
use image::RgbImage;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::{CaptureDevice, SensorError};

/// Replays image files from disk as if they were webcam frames.
///
/// Files are read in path order, paced at a fixed interval and scaled to the
/// session resolution. Undecodable files are skipped.
pub struct ReplayDevice {
    paths: Vec<PathBuf>,
    index: usize,
    interval: Duration,
    looping: bool,
    resolution: (u32, u32),
    last: Option<Instant>,
}

impl ReplayDevice {
    /// Open a replay of every file matching `pattern`.
    pub fn new(
        pattern: &str,
        resolution: (u32, u32),
        interval: Duration,
        looping: bool,
    ) -> Result<Self, SensorError> {
        let mut paths: Vec<PathBuf> = glob(pattern)
            .map_err(|e| SensorError::Pattern {
                pattern: pattern.to_string(),
                message: e.msg.to_string(),
            })?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        if paths.is_empty() {
            return Err(SensorError::NoImages(pattern.to_string()));
        }
        paths.sort();
        Ok(Self {
            paths,
            index: 0,
            interval,
            looping,
            resolution,
            last: None,
        })
    }

    /// Number of files in the replay.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn pace(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }

    fn next_path(&mut self) -> Option<PathBuf> {
        if self.index >= self.paths.len() {
            if !self.looping {
                return None;
            }
            self.index = 0;
        }
        let path = self.paths[self.index].clone();
        self.index += 1;
        Some(path)
    }
}

impl CaptureDevice for ReplayDevice {
    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn capture(&mut self) -> Result<Option<RgbImage>, SensorError> {
        self.pace();
        // at most one pass over the files, so a directory of bad files still ends
        for _ in 0..self.paths.len() {
            let Some(path) = self.next_path() else {
                return Ok(None);
            };
            match image::open(&path) {
                Ok(img) => {
                    let img = img.to_rgb8();
                    let (w, h) = self.resolution;
                    if img.dimensions() == (w, h) {
                        return Ok(Some(img));
                    }
                    return Ok(Some(image::imageops::resize(&img, w, h, FilterType::Triangle)));
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable frame"),
            }
        }
        Ok(None)
    }
}
