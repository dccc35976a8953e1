#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use vidcheck_core::probe::{BackendError, DecodeBackend, VideoSource};

/// Scripted behaviour of one synthetic video, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct ScriptedVideo {
    pub open_fails: bool,
    pub frame_count: i64,
    pub bad_frames: HashSet<u64>,
    pub empty_frames: HashSet<u64>,
    pub refused_seeks: HashSet<u64>,
    pub error_at_frame: Option<u64>,
    pub frame_count_error: bool,
}

impl ScriptedVideo {
    pub fn intact(frame_count: i64) -> Self {
        Self {
            frame_count,
            ..Self::default()
        }
    }

    pub fn unopenable() -> Self {
        Self {
            open_fails: true,
            ..Self::default()
        }
    }

    pub fn with_bad_frames(mut self, frames: impl IntoIterator<Item = u64>) -> Self {
        self.bad_frames.extend(frames);
        self
    }

    pub fn with_empty_frames(mut self, frames: impl IntoIterator<Item = u64>) -> Self {
        self.empty_frames.extend(frames);
        self
    }

    pub fn with_refused_seeks(mut self, frames: impl IntoIterator<Item = u64>) -> Self {
        self.refused_seeks.extend(frames);
        self
    }

    pub fn with_error_at(mut self, frame: u64) -> Self {
        self.error_at_frame = Some(frame);
        self
    }

    pub fn with_frame_count_error(mut self) -> Self {
        self.frame_count_error = true;
        self
    }
}

#[derive(Debug, Default)]
pub struct BackendLog {
    pub opened: Vec<String>,
    pub released: Vec<String>,
    pub decoded: Vec<(String, u64)>,
}

/// In-memory decode backend. Files it has no script for fail to open.
#[derive(Default)]
pub struct ScriptedBackend {
    videos: HashMap<String, ScriptedVideo>,
    on_disk_only: bool,
    log: Arc<Mutex<BackendLog>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, name: &str, video: ScriptedVideo) -> Self {
        self.videos.insert(name.to_string(), video);
        self
    }

    /// Also fail to open paths that do not exist, like a real decoder would.
    pub fn on_disk_only(mut self) -> Self {
        self.on_disk_only = true;
        self
    }

    pub fn opened(&self) -> Vec<String> {
        self.log.lock().unwrap().opened.clone()
    }

    pub fn released(&self) -> Vec<String> {
        self.log.lock().unwrap().released.clone()
    }

    pub fn decoded_frames(&self, name: &str) -> Vec<u64> {
        self.log
            .lock()
            .unwrap()
            .decoded
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, frame)| *frame)
            .collect()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl DecodeBackend for ScriptedBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, BackendError> {
        if self.on_disk_only && !path.is_file() {
            return Err(BackendError::NoVideoStream);
        }
        let name = file_name(path);
        let video = match self.videos.get(&name) {
            Some(video) if !video.open_fails => video.clone(),
            _ => return Err(BackendError::NoVideoStream),
        };
        self.log.lock().unwrap().opened.push(name.clone());
        Ok(Box::new(ScriptedSource {
            name,
            video,
            position: 0,
            log: Arc::clone(&self.log),
        }))
    }
}

struct ScriptedSource {
    name: String,
    video: ScriptedVideo,
    position: u64,
    log: Arc<Mutex<BackendLog>>,
}

impl VideoSource for ScriptedSource {
    fn frame_count(&mut self) -> Result<i64, BackendError> {
        if self.video.frame_count_error {
            return Err(BackendError::Io(io::Error::new(
                io::ErrorKind::Other,
                "metadata read failed",
            )));
        }
        Ok(self.video.frame_count)
    }

    fn seek(&mut self, frame: u64) -> Result<bool, BackendError> {
        if self.video.refused_seeks.contains(&frame) {
            return Ok(false);
        }
        self.position = frame;
        Ok(true)
    }

    fn decode(&mut self) -> Result<Option<Vec<u8>>, BackendError> {
        let frame = self.position;
        self.log
            .lock()
            .unwrap()
            .decoded
            .push((self.name.clone(), frame));
        self.position += 1;

        if self.video.error_at_frame == Some(frame) {
            return Err(BackendError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream truncated",
            )));
        }
        if self.video.bad_frames.contains(&frame) {
            return Ok(None);
        }
        if self.video.empty_frames.contains(&frame) {
            return Ok(Some(Vec::new()));
        }
        Ok(Some(vec![0x80; 16]))
    }
}

impl Drop for ScriptedSource {
    fn drop(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.released.push(self.name.clone());
        }
    }
}

/// Create empty placeholder files; their content is irrelevant to the scripted backend.
pub fn create_videos(root: &Path, names: &[&str]) {
    fs::create_dir_all(root).unwrap();
    for name in names {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"synthetic").unwrap();
    }
}
