//! Lecture-video screenshots: sample frames and bind them into a PDF.
//!
//! ```text
//! scan ──▶ frames ──▶ assemble
//! (.mp4)   (ffmpeg)   (lopdf)
//! ```
//!
//! Frames live in a scratch [`FrameDir`] only for as long as one video is
//! being processed.
//!
//! A video that cannot be opened or decoded yields no frames. It is logged
//! and reported as skipped, the same as a clip too short to sample.

use crate::config::VideoConfig;
use crate::error::SiftError;
use crate::output::{BatchReport, FileOutcome, FileReport, VideoSummary};
use crate::pipeline::assemble::assemble_pdf;
use crate::pipeline::frames::{sample_frames, FrameDir};
use crate::pipeline::scan::{find_files, VIDEO_SUFFIX};
use crate::progress::ProgressCallback;
use crate::clean::outcome_for_error;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// `<dir>/<stem>.pdf` for `<dir>/<stem>.mp4`.
pub fn video_output_path(video_path: &Path) -> PathBuf {
    video_path.with_extension("pdf")
}

/// Convert one video into a PDF of screenshots next to it.
///
/// # Errors
/// [`SiftError::NoFrames`] if no frames could be sampled, including when the
/// video cannot be decoded (nothing is written); I/O errors otherwise.
pub fn video_to_pdf(video_path: &Path, config: &VideoConfig) -> Result<VideoSummary, SiftError> {
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    let scratch_parent = match &config.temp_root {
        Some(root) => root.clone(),
        None => video_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let frame_dir = FrameDir::create(&scratch_parent, &stem)?;
    let frames = sample_frames(
        video_path,
        &frame_dir,
        config.seconds_between,
        config.jpeg_quality,
    );
    if frames.is_empty() {
        return Err(SiftError::NoFrames {
            path: video_path.to_path_buf(),
        });
    }
    info!("{}: captured {} frame(s)", video_path.display(), frames.len());

    let output = video_output_path(video_path);
    let pages = assemble_pdf(&frames, &output, config.page_size)?;
    frame_dir.close()?;

    Ok(VideoSummary {
        source: video_path.to_path_buf(),
        output,
        frames: pages,
    })
}

/// Convert every `.mp4` under `root`.
///
/// # Errors
/// Only a missing or non-directory root; per-video problems are recorded in
/// the report.
pub fn convert_videos(
    root: &Path,
    config: &VideoConfig,
    progress: Option<ProgressCallback>,
) -> Result<BatchReport, SiftError> {
    let batch_start = Instant::now();
    let files = find_files(root, VIDEO_SUFFIX)?;
    info!("Found {} video(s) under {}", files.len(), root.display());

    let mut report = BatchReport::new(root);
    if let Some(cb) = &progress {
        cb.on_batch_start(files.len());
    }

    let total = files.len();
    for (idx, path) in files.iter().enumerate() {
        if let Some(cb) = &progress {
            cb.on_file_start(idx + 1, total, path);
        }
        let file_start = Instant::now();
        let outcome = match video_to_pdf(path, config) {
            Ok(summary) => FileOutcome::Converted(summary),
            Err(e) => outcome_for_error(path, e),
        };
        if let Some(cb) = &progress {
            cb.on_file_complete(idx + 1, total, path, &outcome);
        }
        report.files.push(FileReport {
            path: path.clone(),
            outcome,
            duration_ms: file_start.elapsed().as_millis() as u64,
        });
    }

    report.total_duration_ms = batch_start.elapsed().as_millis() as u64;
    info!(
        "Converted {} of {} video(s), {} skipped, {} failed, in {}ms",
        report.succeeded(),
        report.total(),
        report.skipped(),
        report.failed(),
        report.total_duration_ms
    );
    if let Some(cb) = &progress {
        cb.on_batch_complete(&report);
    }
    Ok(report)
}
