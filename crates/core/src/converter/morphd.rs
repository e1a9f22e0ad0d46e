//! Remote morphd video converter backend.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use super::config::MorphdConfig;
use super::error::ConverterError;
use super::format::FormatInfo;
use super::traits::Converter;
use super::types::{
    ConversionOptions, ConversionOutput, SourceFile, SpeedPreset, StatusCell, WorkerStatus,
};

#[derive(Deserialize, Clone, Debug)]
struct MorphdVersionResponse {
    version: String,
}

/// Video-path converter that uploads files to a morphd service.
///
/// Files routed here leave the local machine, so the converter is marked
/// remote and participates in the external-upload consent flow.
pub struct MorphdConverter {
    client: reqwest::Client,
    config: MorphdConfig,
    formats: Vec<FormatInfo>,
    status: StatusCell,
}

impl MorphdConverter {
    /// Creates a new morphd converter with the given configuration.
    pub fn new(config: MorphdConfig) -> Self {
        let formats = vec![
            FormatInfo::native("mp4"),
            FormatInfo::native("mkv"),
            FormatInfo::native("webm"),
            FormatInfo::native("avi"),
            FormatInfo::native("mov"),
            FormatInfo::native("gif"),
        ];
        Self {
            client: reqwest::Client::new(),
            config,
            formats,
            status: StatusCell::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Converter for MorphdConverter {
    fn name(&self) -> &str {
        "morphd"
    }

    fn supported_formats(&self) -> &[FormatInfo] {
        &self.formats
    }

    fn status(&self) -> WorkerStatus {
        self.status.get()
    }

    fn is_remote(&self) -> bool {
        true
    }

    async fn init(&self) -> Result<(), ConverterError> {
        self.status.set(WorkerStatus::Downloading);

        let response = self
            .client
            .get(self.endpoint("/api/version"))
            .timeout(Duration::from_secs(10))
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                if let Ok(version) = response.json::<MorphdVersionResponse>().await {
                    tracing::info!(version = %version.version, "morphd service reachable");
                }
                if let Err(e) = tokio::fs::create_dir_all(&self.config.work_dir).await {
                    self.status.set(WorkerStatus::Error);
                    return Err(ConverterError::Io(e));
                }
                self.status.set(WorkerStatus::Ready);
                Ok(())
            }
            Ok(response) => {
                self.status.set(WorkerStatus::Error);
                Err(ConverterError::RemoteRejected {
                    status: response.status().as_u16(),
                    message: response.text().await.unwrap_or_default(),
                })
            }
            Err(e) => {
                self.status.set(WorkerStatus::Error);
                Err(ConverterError::Http(e))
            }
        }
    }

    async fn valid(&self) -> Result<bool, ConverterError> {
        Ok(self.status().is_ready())
    }

    async fn convert(
        &self,
        input: &SourceFile,
        to: &str,
        options: &ConversionOptions,
    ) -> Result<ConversionOutput, ConverterError> {
        if !self.status().is_ready() {
            return Err(ConverterError::NotReady {
                converter: self.name().to_string(),
            });
        }
        if !self.supports(to) {
            return Err(ConverterError::UnsupportedTarget {
                converter: self.name().to_string(),
                to: to.to_string(),
            });
        }

        let content = tokio::fs::read(&input.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConverterError::InputNotFound {
                    path: input.path.clone(),
                }
            } else {
                ConverterError::Io(e)
            }
        })?;

        let speed = options.speed_preset.unwrap_or(SpeedPreset::Slow);
        let file_part = reqwest::multipart::Part::bytes(content).file_name(input.file_name.clone());
        let form = reqwest::multipart::Form::new()
            .text("to", to.trim_start_matches('.').to_string())
            .text("speed", speed.as_str().to_string())
            .part("file", file_part);

        let response = self
            .client
            .post(self.endpoint("/api/convert"))
            .multipart(form)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ConverterError::RemoteRejected { status, message });
        }

        let produced = response.bytes().await?;
        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        let output_path = self
            .config
            .work_dir
            .join(format!("{}{}", Uuid::new_v4(), to));
        tokio::fs::write(&output_path, &produced).await?;

        Ok(ConversionOutput {
            path: output_path,
            size_bytes: produced.len() as u64,
            format: to.to_string(),
        })
    }
}
