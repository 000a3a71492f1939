//! Asynchronous guide file loading.
//!
//! Guide files can hold hundreds of channels and days of programs, so they
//! are parsed on a background thread while the GUI keeps rendering.

use chrono::Utc;
use eframe::egui;
use guidegrid::{GuideFile, SyntheticGuide};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::io::LoadingState;

/// Result of a completed guide load.
pub enum LoadResult {
    Success {
        guide: GuideFile,
        /// None for generated guides
        path: Option<PathBuf>,
    },
    Error(String),
    /// No load finished since the last check
    None,
}

/// Runs guide file loads off the GUI thread.
pub struct AsyncLoader {
    loading_state: Arc<Mutex<LoadingState>>,
    loading_receiver: Option<Receiver<Result<GuideFile, String>>>,
    pending_load_path: Option<PathBuf>,
}

impl AsyncLoader {
    pub fn new() -> Self {
        Self {
            loading_state: Arc::new(Mutex::new(LoadingState::new())),
            loading_receiver: None,
            pending_load_path: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading_state.lock().map(|s| s.in_progress).unwrap_or(false)
    }

    /// Seconds the running load has taken so far.
    pub fn elapsed_secs(&self) -> f32 {
        self.loading_state.lock().map(|s| s.elapsed_secs()).unwrap_or(0.0)
    }

    /// Starts parsing a guide file on a background thread.
    ///
    /// Call `check_completion()` once per frame to pick up the result.
    pub fn start_file_load(&mut self, path: PathBuf, ctx: &egui::Context) {
        let (sender, receiver) = channel();
        self.loading_receiver = Some(receiver);

        if let Ok(mut state) = self.loading_state.lock() {
            state.begin();
        }
        self.pending_load_path = Some(path.clone());

        let loading_state = Arc::clone(&self.loading_state);
        let ctx_handle = ctx.clone();

        thread::spawn(move || {
            let result = GuideFile::read(&path).map_err(|e| format!("{:#}", e));
            let _ = sender.send(result);

            if let Ok(mut state) = loading_state.lock() {
                state.finish();
            }
            ctx_handle.request_repaint();
        });
    }

    /// Generates a synthetic guide around the current time.
    ///
    /// Generation is fast enough to run synchronously.
    pub fn load_synthetic_guide(&mut self) -> GuideFile {
        SyntheticGuide::new(Utc::now()).generate()
    }

    /// Returns the finished load, if any.
    pub fn check_completion(&mut self) -> LoadResult {
        let Some(receiver) = &self.loading_receiver else {
            return LoadResult::None;
        };
        let Ok(result) = receiver.try_recv() else {
            return LoadResult::None;
        };

        self.loading_receiver = None;
        match result {
            Ok(guide) => LoadResult::Success {
                guide,
                path: self.pending_load_path.take(),
            },
            Err(error_msg) => {
                self.pending_load_path = None;
                LoadResult::Error(error_msg)
            }
        }
    }
}

impl Default for AsyncLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for_result(loader: &mut AsyncLoader) -> LoadResult {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            match loader.check_completion() {
                LoadResult::None => thread::sleep(Duration::from_millis(10)),
                result => return result,
            }
        }
        LoadResult::None
    }

    #[test]
    fn test_async_loader_creation() {
        let loader = AsyncLoader::new();
        assert!(!loader.is_loading());
    }

    #[test]
    fn test_check_completion_when_idle() {
        let mut loader = AsyncLoader::new();
        assert!(matches!(loader.check_completion(), LoadResult::None));
    }

    #[test]
    fn test_synthetic_guide_loading() {
        let mut loader = AsyncLoader::new();
        let guide = loader.load_synthetic_guide();
        assert!(!guide.channels.is_empty());
        assert!(!guide.programs.is_empty());
    }

    #[test]
    fn test_file_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("guidegrid-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("guide.json");
        let guide = SyntheticGuide::with_config(Utc::now(), 5, 2, 9).generate();
        guide.write(&path).unwrap();

        let ctx = egui::Context::default();
        let mut loader = AsyncLoader::new();
        loader.start_file_load(path.clone(), &ctx);

        match wait_for_result(&mut loader) {
            LoadResult::Success { guide: loaded, path: loaded_path } => {
                assert_eq!(loaded, guide);
                assert_eq!(loaded_path, Some(path));
            }
            LoadResult::Error(e) => panic!("load failed: {}", e),
            LoadResult::None => panic!("load timed out"),
        }
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_reports_error() {
        let ctx = egui::Context::default();
        let mut loader = AsyncLoader::new();
        loader.start_file_load(PathBuf::from("/nonexistent/guide.json"), &ctx);

        match wait_for_result(&mut loader) {
            LoadResult::Error(e) => assert!(e.contains("/nonexistent/guide.json")),
            _ => panic!("expected an error"),
        }
    }
}
