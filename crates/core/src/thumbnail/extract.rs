//! Frame and cover-art extraction helpers.

#[allow(unused_imports)]
use image::GenericImageView;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use uuid::Uuid;

use super::{Thumbnail, ThumbnailError};

/// Pulls the embedded cover image out of an audio file's metadata.
///
/// Returns the path of a scratch PNG the caller must remove.
pub(super) async fn cover_art(
    ffmpeg_path: &Path,
    input: &Path,
    scratch_dir: &Path,
) -> Result<PathBuf, ThumbnailError> {
    // The attached picture is exposed as the file's only video stream.
    run_ffmpeg(
        ffmpeg_path,
        input,
        scratch_dir,
        &["-an", "-map", "0:v", "-frames:v", "1"],
    )
    .await
}

/// Decodes the first frame of a video file.
///
/// Returns the path of a scratch PNG the caller must remove.
pub(super) async fn first_frame(
    ffmpeg_path: &Path,
    input: &Path,
    scratch_dir: &Path,
) -> Result<PathBuf, ThumbnailError> {
    run_ffmpeg(
        ffmpeg_path,
        input,
        scratch_dir,
        &["-map", "0:v:0", "-frames:v", "1"],
    )
    .await
}

async fn run_ffmpeg(
    ffmpeg_path: &Path,
    input: &Path,
    scratch_dir: &Path,
    select_args: &[&str],
) -> Result<PathBuf, ThumbnailError> {
    tokio::fs::create_dir_all(scratch_dir).await?;
    let output_path = scratch_dir.join(format!("{}.png", Uuid::new_v4()));

    let output = Command::new(ffmpeg_path)
        .arg("-y")
        .arg("-i")
        .arg(input)
        .args(select_args)
        .args(["-loglevel", "error"])
        .arg(&output_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(ThumbnailError::Ffmpeg {
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output_path)
}

/// Decodes image bytes and scales them so the larger dimension caps at
/// `max_dimension`, preserving aspect ratio. Returns PNG bytes.
pub fn scale_to_thumbnail(data: &[u8], max_dimension: u32) -> Result<Thumbnail, ThumbnailError> {
    let img = image::load_from_memory(data)?;
    let scaled = img.thumbnail(max_dimension, max_dimension);

    let mut bytes = Vec::new();
    scaled.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;

    Ok(Thumbnail {
        width: scaled.width(),
        height: scaled.height(),
        data: bytes,
    })
}
