//! FFmpeg-based audio converter backend.

use async_trait::async_trait;
use regex_lite::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use uuid::Uuid;

use super::config::FfmpegConfig;
use super::error::ConverterError;
use super::format::FormatInfo;
use super::traits::Converter;
use super::types::{
    ConversionOptions, ConversionOutput, ConversionProgress, SourceFile, StatusCell, WorkerStatus,
};

/// Audio-path converter driving the ffmpeg binary as a subprocess.
///
/// Audio extensions are native; common video containers are accepted as
/// input only, so their audio track can be pulled out of them.
pub struct FfmpegConverter {
    config: FfmpegConfig,
    formats: Vec<FormatInfo>,
    status: StatusCell,
}

impl FfmpegConverter {
    /// Creates a new FFmpeg converter with the given configuration.
    pub fn new(config: FfmpegConfig) -> Self {
        let formats = vec![
            FormatInfo::native("mp3"),
            FormatInfo::native("wav"),
            FormatInfo::native("flac"),
            FormatInfo::native("ogg"),
            FormatInfo::native("opus"),
            FormatInfo::native("m4a"),
            FormatInfo::native("aac"),
            FormatInfo::native("wma"),
            FormatInfo::from_only("mkv", false),
            FormatInfo::from_only("mp4", false),
            FormatInfo::from_only("webm", false),
            FormatInfo::from_only("mov", false),
            FormatInfo::from_only("avi", false),
        ];
        Self {
            config,
            formats,
            status: StatusCell::new(),
        }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(FfmpegConfig::default())
    }

    /// Maps a target extension to the ffmpeg codec that produces it.
    fn codec_for(to: &str) -> Option<&'static str> {
        match to {
            ".mp3" => Some("libmp3lame"),
            ".wav" => Some("pcm_s16le"),
            ".flac" => Some("flac"),
            ".ogg" => Some("libvorbis"),
            ".opus" => Some("libopus"),
            ".m4a" | ".aac" => Some("aac"),
            ".wma" => Some("wmav2"),
            _ => None,
        }
    }

    /// Whether the target format is lossless (bitrate does not apply).
    fn is_lossless(to: &str) -> bool {
        matches!(to, ".wav" | ".flac")
    }

    /// Builds ffmpeg arguments for one conversion.
    fn build_args(
        &self,
        input_path: &Path,
        output_path: &Path,
        codec: &str,
        to: &str,
        options: &ConversionOptions,
    ) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-vn".to_string(), // Audio track only
            "-c:a".to_string(),
            codec.to_string(),
        ];

        // Bitrate (for lossy formats)
        if !Self::is_lossless(to) {
            if let Some(bitrate) = options.audio_bitrate_kbps {
                args.extend(["-b:a".to_string(), format!("{}k", bitrate)]);
            }
        }

        // Sample rate
        if let Some(rate) = options.audio_sample_rate_hz {
            args.extend(["-ar".to_string(), rate.to_string()]);
        }

        // Log level
        args.extend(["-loglevel".to_string(), self.config.log_level.clone()]);

        // Progress output for parsing
        args.extend(["-progress".to_string(), "pipe:2".to_string()]);

        // Extra args
        args.extend(self.config.extra_args.iter().cloned());

        // Output
        args.push(output_path.to_string_lossy().to_string());

        args
    }

    /// Probes the input duration in seconds, used to compute progress
    /// percentages. Failures are tolerated; progress then stays silent.
    async fn probe_duration_secs(&self, path: &Path) -> Option<f64> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }

        let output = Command::new(&self.config.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let probe: ProbeOutput = serde_json::from_str(&stdout).ok()?;
        probe.format.duration.as_deref()?.parse::<f64>().ok()
    }

    /// Runs the conversion with optional progress reporting.
    async fn run_conversion(
        &self,
        input: &SourceFile,
        to: &str,
        options: &ConversionOptions,
        progress_tx: Option<mpsc::Sender<ConversionProgress>>,
    ) -> Result<ConversionOutput, ConverterError> {
        if !self.status().is_ready() {
            return Err(ConverterError::NotReady {
                converter: self.name().to_string(),
            });
        }
        if !input.path.exists() {
            return Err(ConverterError::InputNotFound {
                path: input.path.clone(),
            });
        }
        let codec = Self::codec_for(to).ok_or_else(|| ConverterError::UnsupportedTarget {
            converter: self.name().to_string(),
            to: to.to_string(),
        })?;

        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        let output_path = self
            .config
            .work_dir
            .join(format!("{}{}", Uuid::new_v4(), to));

        // Input duration is needed to turn out_time into a percentage.
        let duration_secs = match progress_tx {
            Some(_) => self.probe_duration_secs(&input.path).await,
            None => None,
        };

        let args = self.build_args(&input.path, &output_path, codec, to, options);

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConverterError::BinaryNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    ConverterError::Io(e)
                }
            })?;

        let stderr = match child.stderr.take() {
            Some(stderr) => stderr,
            None => {
                return Err(ConverterError::conversion_failed(
                    "ffmpeg stderr was not captured",
                    None,
                ))
            }
        };
        let mut reader = BufReader::new(stderr).lines();

        let mut current_speed = None;
        let time_regex = Regex::new(r"out_time_ms=(\d+)").ok();
        let speed_regex = Regex::new(r"speed=(\d+\.?\d*)x").ok();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut last_progress_send = Instant::now();
            let progress_interval = Duration::from_millis(500);
            let mut error_output = String::new();
            let mut current_time = 0.0;

            while let Ok(Some(line)) = reader.next_line().await {
                // Capture error output
                if line.contains("Error") || line.contains("error") {
                    error_output.push_str(&line);
                    error_output.push('\n');
                }

                // Parse progress
                if let Some(ref re) = time_regex {
                    if let Some(ms_str) = re.captures(&line).and_then(|caps| caps.get(1)) {
                        if let Ok(ms) = ms_str.as_str().parse::<f64>() {
                            current_time = ms / 1_000_000.0; // microseconds to seconds
                        }
                    }
                }

                if let Some(ref re) = speed_regex {
                    if let Some(speed_str) = re.captures(&line).and_then(|caps| caps.get(1)) {
                        current_speed = Some(format!("{}x", speed_str.as_str()));
                    }
                }

                // Send progress update
                if let (Some(tx), Some(duration)) = (progress_tx.as_ref(), duration_secs) {
                    if duration > 0.0 && last_progress_send.elapsed() >= progress_interval {
                        let progress = ConversionProgress {
                            file: input.file_name.clone(),
                            percent: (current_time / duration * 100.0).min(100.0) as f32,
                            speed: current_speed.clone(),
                        };

                        // Non-blocking send
                        let _ = tx.try_send(progress);
                        last_progress_send = Instant::now();
                    }
                }
            }

            // Wait for the process to complete
            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, error_output))
        })
        .await;

        match result {
            Ok(Ok((status, error_output))) => {
                if !status.success() {
                    return Err(ConverterError::conversion_failed(
                        format!("ffmpeg exited with code: {:?}", status.code()),
                        if error_output.is_empty() {
                            None
                        } else {
                            Some(error_output)
                        },
                    ));
                }
            }
            Ok(Err(e)) => return Err(ConverterError::Io(e)),
            Err(_) => {
                // Kill the process on timeout
                let _ = child.kill().await;
                return Err(ConverterError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        }

        // Verify the output exists and pick up its size.
        ConversionOutput::from_file(&output_path, to)
            .await
            .map_err(|_| ConverterError::conversion_failed("output file not created", None))
    }

    async fn check_binary(&self, path: &PathBuf) -> Result<(), ConverterError> {
        let result = Command::new(path).arg("-version").output().await;
        if let Err(e) = result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(ConverterError::BinaryNotFound { path: path.clone() });
            }
            return Err(ConverterError::Io(e));
        }
        Ok(())
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn supported_formats(&self) -> &[FormatInfo] {
        &self.formats
    }

    fn status(&self) -> WorkerStatus {
        self.status.get()
    }

    fn reports_progress(&self) -> bool {
        true
    }

    async fn init(&self) -> Result<(), ConverterError> {
        self.status.set(WorkerStatus::Downloading);

        if let Err(e) = self.check_binary(&self.config.ffmpeg_path).await {
            self.status.set(WorkerStatus::Error);
            return Err(e);
        }
        if let Err(e) = self.check_binary(&self.config.ffprobe_path).await {
            self.status.set(WorkerStatus::Error);
            return Err(e);
        }
        if let Err(e) = tokio::fs::create_dir_all(&self.config.work_dir).await {
            self.status.set(WorkerStatus::Error);
            return Err(ConverterError::Io(e));
        }

        self.status.set(WorkerStatus::Ready);
        Ok(())
    }

    async fn convert(
        &self,
        input: &SourceFile,
        to: &str,
        options: &ConversionOptions,
    ) -> Result<ConversionOutput, ConverterError> {
        self.run_conversion(input, to, options, None).await
    }

    async fn convert_with_progress(
        &self,
        input: &SourceFile,
        to: &str,
        options: &ConversionOptions,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionOutput, ConverterError> {
        self.run_conversion(input, to, options, Some(progress_tx))
            .await
    }
}
