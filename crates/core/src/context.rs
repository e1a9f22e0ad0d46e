//! Explicitly constructed orchestration context.
//!
//! Whatever boundary drives the engine — CLI, UI, test harness — builds
//! one context, initializes it, and tears it down when done. There are no
//! global singletons.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::converter::{
    Converter, ConverterRegistry, FfmpegConverter, MorphdConverter, RasterConverter,
};
use crate::dialog::ConsentPrompt;
use crate::orchestrator::Orchestrator;
use crate::settings::SettingsProvider;

/// The fully wired conversion engine.
pub struct ConversionContext {
    registry: Arc<ConverterRegistry>,
    orchestrator: Orchestrator,
    scratch_dirs: Vec<PathBuf>,
}

impl ConversionContext {
    /// Wires the fixed converter set, registry and orchestrator from
    /// configuration.
    ///
    /// The remote morphd backend is only registered when configured.
    pub fn new(
        config: &Config,
        settings: Arc<dyn SettingsProvider>,
        prompt: Arc<dyn ConsentPrompt>,
    ) -> Self {
        let mut converters: Vec<Arc<dyn Converter>> = vec![
            Arc::new(RasterConverter::new(config.converters.raster.clone())),
            Arc::new(FfmpegConverter::new(config.converters.ffmpeg.clone())),
        ];
        let mut scratch_dirs = vec![
            config.converters.raster.work_dir.clone(),
            config.converters.ffmpeg.work_dir.clone(),
            config.orchestrator.thumbnail.scratch_dir.clone(),
        ];

        if let Some(ref morphd) = config.converters.morphd {
            converters.push(Arc::new(MorphdConverter::new(morphd.clone())));
            scratch_dirs.push(morphd.work_dir.clone());
        }

        let registry = Arc::new(ConverterRegistry::new(converters));
        let orchestrator = Orchestrator::new(
            Arc::clone(&registry),
            settings,
            prompt,
            config.orchestrator.clone(),
        );

        Self {
            registry,
            orchestrator,
            scratch_dirs,
        }
    }

    pub fn registry(&self) -> &Arc<ConverterRegistry> {
        &self.registry
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Initializes every converter, driving their readiness state
    /// machines. Failures stay visible through converter status.
    pub async fn init(&self) {
        self.registry.init_all().await;
    }

    /// Removes scratch directories created during the session.
    pub async fn teardown(&self) {
        for dir in &self.scratch_dirs {
            match tokio::fs::remove_dir_all(dir).await {
                Ok(()) => debug!(dir = %dir.display(), "removed scratch directory"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(dir = %dir.display(), error = %e, "failed to remove scratch directory"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::MorphdConfig;
    use crate::dialog::AutoAccept;
    use crate::settings::InMemorySettings;

    fn build(config: &Config) -> ConversionContext {
        ConversionContext::new(
            config,
            Arc::new(InMemorySettings::default()),
            Arc::new(AutoAccept),
        )
    }

    #[test]
    fn test_default_context_registers_local_backends() {
        let context = build(&Config::default());
        assert!(context.registry().get("raster").is_some());
        assert!(context.registry().get("ffmpeg").is_some());
        assert!(context.registry().get("morphd").is_none());
    }

    #[test]
    fn test_morphd_registered_when_configured() {
        let mut config = Config::default();
        config.converters.morphd = Some(MorphdConfig::new("http://morphd.local:8000"));
        let context = build(&config);
        assert!(context.registry().get("morphd").is_some());
    }

    #[tokio::test]
    async fn test_teardown_removes_scratch_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.converters.raster.work_dir = dir.path().join("raster");
        config.converters.ffmpeg.work_dir = dir.path().join("ffmpeg");
        config.orchestrator.thumbnail.scratch_dir = dir.path().join("thumbs");

        tokio::fs::create_dir_all(&config.converters.raster.work_dir)
            .await
            .unwrap();

        let context = build(&config);
        context.teardown().await;
        assert!(!config.converters.raster.work_dir.exists());
    }
}
