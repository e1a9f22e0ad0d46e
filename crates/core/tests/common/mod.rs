//! Common test utilities for end-to-end orchestration tests.
//!
//! Provides a fixture wiring the orchestrator to fully controllable mock
//! converters, so batch behavior can be exercised without real codec
//! backends.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use morphix_core::testing::MockConverter;
use morphix_core::{
    ConsentPrompt, Converter, ConverterRegistry, InMemorySettings, Orchestrator,
    OrchestratorConfig, SettingsProvider, ThumbnailConfig,
};

/// Consent prompt that records invocations and returns a fixed answer.
pub struct RecordingPrompt {
    accept: bool,
    calls: AtomicUsize,
}

impl RecordingPrompt {
    pub fn new(accept: bool) -> Self {
        Self {
            accept,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConsentPrompt for RecordingPrompt {
    async fn confirm(&self, _title: &str, _message: &str, _accept: &str, _decline: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.accept
    }
}

/// Orchestrator fixture with an audio mock, a remote video mock and
/// controllable consent.
pub struct TestFixture {
    pub orchestrator: Orchestrator,
    pub audio: Arc<MockConverter>,
    pub video: Arc<MockConverter>,
    pub image: Arc<MockConverter>,
    pub settings: Arc<InMemorySettings>,
    pub prompt: Arc<RecordingPrompt>,
    pub temp_dir: TempDir,
}

impl TestFixture {
    /// Fixture whose consent prompt accepts.
    pub fn new() -> Self {
        Self::with_consent(true)
    }

    /// Fixture with an accepting or declining consent prompt.
    pub fn with_consent(accept: bool) -> Self {
        let temp_dir = TempDir::new().expect("temp dir");

        let audio = Arc::new(
            MockConverter::new("mock-audio")
                .with_native_formats(&["mp3", "wav", "flac", "ogg"])
                .with_work_dir(temp_dir.path().join("audio-out")),
        );
        let video = Arc::new(
            MockConverter::new("mock-video")
                .with_native_formats(&["mkv", "mp4", "webm"])
                .with_work_dir(temp_dir.path().join("video-out"))
                .remote(),
        );
        let image = Arc::new(
            MockConverter::new("mock-image")
                .with_native_formats(&["png", "jpg", "webp"])
                .with_work_dir(temp_dir.path().join("image-out")),
        );

        let registry = ConverterRegistry::new(vec![
            Arc::clone(&image) as Arc<dyn Converter>,
            Arc::clone(&audio) as Arc<dyn Converter>,
            Arc::clone(&video) as Arc<dyn Converter>,
        ]);

        let thumbnail = ThumbnailConfig {
            scratch_dir: temp_dir.path().join("thumbs"),
            audio_converter: "mock-audio".to_string(),
            video_converter: "mock-video".to_string(),
            ..Default::default()
        };
        let config = OrchestratorConfig::default()
            .with_max_conversions(2)
            .with_thumbnail_concurrency(2)
            .with_output_dir(temp_dir.path().join("downloads"));
        let config = OrchestratorConfig { thumbnail, ..config };

        let settings = Arc::new(InMemorySettings::default());
        let prompt = Arc::new(RecordingPrompt::new(accept));

        let orchestrator = Orchestrator::new(
            Arc::new(registry),
            Arc::clone(&settings) as Arc<dyn SettingsProvider>,
            Arc::clone(&prompt) as Arc<dyn ConsentPrompt>,
            config,
        );

        Self {
            orchestrator,
            audio,
            video,
            image,
            settings,
            prompt,
            temp_dir,
        }
    }

    /// Writes a file with placeholder content into the fixture's temp dir.
    pub fn write_file(&self, name: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, format!("content of {}", name)).expect("write test file");
        path
    }

    /// Writes a small PNG image into the fixture's temp dir.
    pub fn write_png(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([120, 60, 200, 255]));
        img.save_with_format(&path, image::ImageFormat::Png)
            .expect("write test png");
        path
    }
}
