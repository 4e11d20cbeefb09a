//! Frame sampling: decode a video and keep one frame every N seconds.
//!
//! The schedule works on decoded frame counts, not timestamps: with an
//! integer frame rate `fps`, frame `c` is captured when
//! `c % (fps × seconds_between) == 0`. A 30 fps, 10 s clip sampled every 2 s
//! yields frames 0, 60, 120, 180 and 240.
//!
//! Captured frames are written as numbered JPEGs into a [`FrameDir`], a
//! scratch directory that is removed when it is dropped, on success and on
//! every error path alike.

use crate::error::SiftError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Which decoded frames to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSchedule {
    interval: u64,
}

impl FrameSchedule {
    /// Schedule for a stream of `fps` frames per second, truncated to an
    /// integer the way the frame-rate probe reports it.
    ///
    /// Returns `None` when the interval would be zero frames.
    pub fn new(fps: f64, seconds_between: u32) -> Option<Self> {
        if !fps.is_finite() || fps < 1.0 {
            return None;
        }
        let interval = (fps.trunc() as u64).checked_mul(u64::from(seconds_between))?;
        (interval > 0).then_some(Self { interval })
    }

    /// Frames between two captures.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn is_capture(&self, frame_count: u64) -> bool {
        frame_count % self.interval == 0
    }

    /// Number of frames captured from a stream of `total_frames`.
    pub fn captures_in(&self, total_frames: u64) -> u64 {
        total_frames.div_ceil(self.interval)
    }
}

/// Scratch directory for one video's frames, deleted on drop.
#[derive(Debug)]
pub struct FrameDir {
    dir: TempDir,
}

impl FrameDir {
    /// Create `<parent>/<stem>_frames.XXXXXX`.
    pub fn create(parent: &Path, stem: &str) -> Result<Self, SiftError> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("{stem}_frames."))
            .tempdir_in(parent)
            .map_err(|e| SiftError::TempDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        debug!("Created frame directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the JPEG for decoded frame `frame_count`.
    pub fn frame_path(&self, frame_count: u64) -> PathBuf {
        self.dir.path().join(format!("frame_{frame_count:08}.jpg"))
    }

    /// Remove the directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<(), SiftError> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| SiftError::OutputWriteFailed { path, source: e })
    }
}

/// Extract one frame every `seconds_between` seconds into `frames`.
///
/// Never fails: an unreadable video is logged and yields an empty list so a
/// batch can move on. Use [`try_sample_frames`] to see the error.
pub fn sample_frames(
    video_path: &Path,
    frames: &FrameDir,
    seconds_between: u32,
    jpeg_quality: u8,
) -> Vec<PathBuf> {
    match try_sample_frames(video_path, frames, seconds_between, jpeg_quality) {
        Ok(paths) => paths,
        Err(e) => {
            warn!("Failed to sample {}: {}", video_path.display(), e);
            Vec::new()
        }
    }
}

/// Like [`sample_frames`], but returns the reason a video could not be read.
pub fn try_sample_frames(
    video_path: &Path,
    frames: &FrameDir,
    seconds_between: u32,
    jpeg_quality: u8,
) -> Result<Vec<PathBuf>, SiftError> {
    #[cfg(feature = "video")]
    {
        ffmpeg::decode_frames(video_path, frames, seconds_between, jpeg_quality)
    }
    #[cfg(not(feature = "video"))]
    {
        let _ = (frames, seconds_between, jpeg_quality);
        Err(SiftError::VideoSupportDisabled {
            path: video_path.to_path_buf(),
        })
    }
}

/// Write a tightly packed RGB24 buffer as JPEG.
pub fn save_rgb_jpeg(
    rgb: Vec<u8>,
    width: u32,
    height: u32,
    quality: u8,
    path: &Path,
) -> Result<(), SiftError> {
    let frame_err = |detail: String| SiftError::FrameWriteFailed {
        path: path.to_path_buf(),
        detail,
    };

    let img = image::RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| frame_err(format!("buffer too small for {width}x{height}")))?;

    let file = std::fs::File::create(path).map_err(|e| frame_err(e.to_string()))?;
    let mut writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality);
    img.write_with_encoder(encoder)
        .map_err(|e| frame_err(e.to_string()))
}

#[cfg(feature = "video")]
mod ffmpeg {
    use super::{save_rgb_jpeg, FrameDir, FrameSchedule};
    use crate::error::SiftError;
    use ffmpeg_next as ffmpeg;
    use std::path::{Path, PathBuf};
    use std::sync::Once;
    use tracing::{debug, info};

    static INIT: Once = Once::new();

    fn init() {
        INIT.call_once(|| {
            if let Err(e) = ffmpeg::init() {
                tracing::error!("Failed to initialise FFmpeg: {}", e);
            }
            ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Error);
        });
    }

    pub(super) fn decode_frames(
        video_path: &Path,
        frames: &FrameDir,
        seconds_between: u32,
        jpeg_quality: u8,
    ) -> Result<Vec<PathBuf>, SiftError> {
        init();

        let open_err = |e: ffmpeg::Error| SiftError::VideoOpenFailed {
            path: video_path.to_path_buf(),
            detail: e.to_string(),
        };
        let mut input = ffmpeg::format::input(&video_path).map_err(open_err)?;

        let (stream_index, fps, parameters) = {
            let stream = input
                .streams()
                .best(ffmpeg::media::Type::Video)
                .ok_or_else(|| SiftError::NoVideoStream {
                    path: video_path.to_path_buf(),
                })?;
            let rate = stream.avg_frame_rate();
            let rate = if rate.denominator() == 0 || rate.numerator() == 0 {
                stream.rate()
            } else {
                rate
            };
            let fps = if rate.denominator() == 0 {
                0.0
            } else {
                f64::from(rate)
            };
            (stream.index(), fps, stream.parameters())
        };

        let schedule =
            FrameSchedule::new(fps, seconds_between).ok_or_else(|| SiftError::FrameRateUnavailable {
                path: video_path.to_path_buf(),
                fps,
            })?;
        info!(
            "Sampling {} at {:.2} fps, every {} frames",
            video_path.display(),
            fps,
            schedule.interval()
        );

        let mut decoder = ffmpeg::codec::context::Context::from_parameters(parameters)
            .map_err(open_err)?
            .decoder()
            .video()
            .map_err(open_err)?;

        let mut sink = FrameSink {
            scaler: None,
            schedule,
            frames,
            jpeg_quality,
            count: 0,
            saved: Vec::new(),
        };

        for (stream, packet) in input.packets() {
            if stream.index() != stream_index {
                continue;
            }
            // A damaged packet loses its frames; decoding carries on.
            if let Err(e) = decoder.send_packet(&packet) {
                debug!("Skipping undecodable packet in {}: {}", video_path.display(), e);
                continue;
            }
            sink.drain(&mut decoder, video_path)?;
        }
        if decoder.send_eof().is_ok() {
            sink.drain(&mut decoder, video_path)?;
        }

        debug!(
            "Decoded {} frames from {}, kept {}",
            sink.count,
            video_path.display(),
            sink.saved.len()
        );
        Ok(sink.saved)
    }

    struct FrameSink<'a> {
        scaler: Option<ffmpeg::software::scaling::Context>,
        schedule: FrameSchedule,
        frames: &'a FrameDir,
        jpeg_quality: u8,
        count: u64,
        saved: Vec<PathBuf>,
    }

    impl FrameSink<'_> {
        fn drain(
            &mut self,
            decoder: &mut ffmpeg::decoder::Video,
            video_path: &Path,
        ) -> Result<(), SiftError> {
            let mut decoded = ffmpeg::util::frame::video::Video::empty();
            while decoder.receive_frame(&mut decoded).is_ok() {
                if self.schedule.is_capture(self.count) {
                    self.save(&decoded, video_path)?;
                }
                self.count += 1;
            }
            Ok(())
        }

        fn save(
            &mut self,
            decoded: &ffmpeg::util::frame::video::Video,
            video_path: &Path,
        ) -> Result<(), SiftError> {
            let decode_err = |e: ffmpeg::Error| SiftError::FrameDecodeFailed {
                path: video_path.to_path_buf(),
                detail: e.to_string(),
            };

            if self.scaler.is_none() {
                self.scaler = Some(
                    ffmpeg::software::scaling::Context::get(
                        decoded.format(),
                        decoded.width(),
                        decoded.height(),
                        ffmpeg::format::Pixel::RGB24,
                        decoded.width(),
                        decoded.height(),
                        ffmpeg::software::scaling::flag::Flags::BILINEAR,
                    )
                    .map_err(decode_err)?,
                );
            }
            let Some(scaler) = self.scaler.as_mut() else {
                return Err(SiftError::Internal("scaler not initialised".into()));
            };

            let mut rgb = ffmpeg::util::frame::video::Video::empty();
            scaler.run(decoded, &mut rgb).map_err(decode_err)?;

            let (width, height) = (rgb.width(), rgb.height());
            let packed = pack_rows(rgb.data(0), rgb.stride(0), width as usize * 3, height as usize);

            let path = self.frames.frame_path(self.count);
            save_rgb_jpeg(packed, width, height, self.jpeg_quality, &path)?;
            debug!("Saved frame {} → {}", self.count, path.display());
            self.saved.push(path);
            Ok(())
        }
    }

    /// Drop per-row padding from a strided plane.
    fn pack_rows(data: &[u8], stride: usize, row_bytes: usize, rows: usize) -> Vec<u8> {
        if stride == row_bytes {
            return data[..row_bytes * rows].to_vec();
        }
        let mut packed = Vec::with_capacity(row_bytes * rows);
        for row in data.chunks(stride).take(rows) {
            packed.extend_from_slice(&row[..row_bytes]);
        }
        packed
    }

}
