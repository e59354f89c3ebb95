//! Frame sinks: consumers of composited frames.
//!
//! Frames reach a sink in strictly increasing index order. The ffmpeg sink
//! streams raw RGBA into an encoder process; the image-sequence sink writes
//! numbered PNG files.

use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbaImage;

use reelmark_common::error::{ReelmarkError, ReelmarkResult};
use reelmark_project_model::canvas::CanvasSize;
use reelmark_project_model::project::ExportFormat;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinkConfig {
    pub size: CanvasSize,
    pub fps: u32,
}

/// Sink contract for consuming composited frames in timeline order.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelmarkResult<()>;

    /// Push one frame. Indices are strictly increasing.
    fn push_frame(&mut self, index: u64, frame: &RgbaImage) -> ReelmarkResult<()>;

    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ReelmarkResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, RgbaImage)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(u64, RgbaImage)] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelmarkResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, index: u64, frame: &RgbaImage) -> ReelmarkResult<()> {
        self.frames.push((index, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelmarkResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Source audio muxed alongside the piped frames.
#[derive(Debug, Clone)]
pub struct AudioInput {
    pub path: PathBuf,
    pub start_secs: f64,
    pub duration_secs: f64,
}

/// Options for [`FfmpegFrameSink`].
#[derive(Debug, Clone)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    pub format: ExportFormat,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
    pub audio: Option<AudioInput>,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            out_path: out_path.into(),
            format,
            video_bitrate_kbps: 6000,
            audio_bitrate_kbps: 192,
            audio: None,
            overwrite: true,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
pub struct FfmpegFrameSink {
    opts: FfmpegSinkOpts,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<String>>,
    cfg: Option<SinkConfig>,
    last_index: Option<u64>,
}

impl FfmpegFrameSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_index: None,
        }
    }

    /// Full ffmpeg argument list for `cfg`.
    pub fn encoder_args(&self, cfg: &SinkConfig) -> Vec<String> {
        let mut args: Vec<String> = vec![
            if self.opts.overwrite { "-y" } else { "-n" }.to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            "rgba".to_string(),
            "-s".to_string(),
            format!("{}x{}", cfg.size.width, cfg.size.height),
            "-r".to_string(),
            cfg.fps.max(1).to_string(),
            "-i".to_string(),
            "pipe:0".to_string(),
        ];

        let audio = self
            .opts
            .audio
            .as_ref()
            .filter(|_| self.opts.format.supports_audio());
        if let Some(audio) = audio {
            args.extend([
                "-ss".to_string(),
                format!("{:.6}", audio.start_secs.max(0.0)),
                "-t".to_string(),
                format!("{:.6}", audio.duration_secs),
                "-i".to_string(),
                audio.path.to_string_lossy().into_owned(),
                "-map".to_string(),
                "0:v:0".to_string(),
                "-map".to_string(),
                "1:a:0?".to_string(),
            ]);
        } else {
            args.push("-an".to_string());
        }

        args.extend(codec_args_for_format(
            self.opts.format,
            self.opts.video_bitrate_kbps,
            self.opts.audio_bitrate_kbps,
        ));
        if audio.is_some() {
            args.push("-shortest".to_string());
        }
        args.push(self.opts.out_path.to_string_lossy().into_owned());
        args
    }
}

impl FrameSink for FfmpegFrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelmarkResult<()> {
        if self.opts.format == ExportFormat::PngSequence {
            return Err(ReelmarkError::unsupported(
                "png-sequence exports are written by the image sequence sink",
            ));
        }
        if self.opts.format.requires_even_dimensions() && !cfg.size.is_even() {
            return Err(ReelmarkError::encode(format!(
                "Output size {} must be even for {} (yuv420p)",
                cfg.size,
                self.opts.format.as_str()
            )));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ReelmarkError::encode(format!(
                "Output file {} already exists",
                self.opts.out_path.display()
            )));
        }

        let args = self.encoder_args(&cfg);
        tracing::debug!(args = ?args, "Spawning ffmpeg encoder");

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReelmarkError::encode(format!("Failed to start ffmpeg encoder: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelmarkError::encode("Failed to open ffmpeg stdin"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelmarkError::encode("Failed to capture ffmpeg stderr"))?;

        // ffmpeg blocks once its stderr pipe fills up.
        let stderr_drain = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        tracing::info!(
            pid = child.id(),
            output = %self.opts.out_path.display(),
            format = self.opts.format.as_str(),
            size = %cfg.size,
            fps = cfg.fps,
            "ffmpeg encoder started"
        );

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_index = None;
        Ok(())
    }

    fn push_frame(&mut self, index: u64, frame: &RgbaImage) -> ReelmarkResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelmarkError::encode("ffmpeg sink not started"))?;
        check_frame(cfg, self.last_index, index, frame)?;
        self.last_index = Some(index);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelmarkError::encode("ffmpeg sink is already finalized"));
        };
        if let Err(e) = stdin.write_all(frame.as_raw()) {
            // A closed pipe means the encoder already quit; its stderr says why.
            let stderr_output = self.abort();
            return Err(ReelmarkError::encode(format!(
                "Failed to write frame {index} to ffmpeg: {e}: {}",
                stderr_output.trim()
            )));
        }
        Ok(())
    }

    fn end(&mut self) -> ReelmarkResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelmarkError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| ReelmarkError::encode(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = self.join_stderr();

        if !status.success() {
            return Err(ReelmarkError::encode(format!(
                "ffmpeg encode failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

impl FfmpegFrameSink {
    fn join_stderr(&mut self) -> String {
        self.stderr_drain
            .take()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| "<failed to join stderr reader>".to_string())
            })
            .unwrap_or_default()
    }

    /// Stop the encoder and return what it wrote to stderr.
    fn abort(&mut self) -> String {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.cfg = None;
        self.join_stderr()
    }
}

impl Drop for FfmpegFrameSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Writes every frame as `frameNNNNN.png` into a directory.
#[derive(Debug)]
pub struct ImageSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    last_index: Option<u64>,
    written: u64,
}

impl ImageSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            last_index: None,
            written: 0,
        }
    }

    /// Path of frame `index` inside `dir`.
    pub fn frame_path(dir: &Path, index: u64) -> PathBuf {
        dir.join(format!("frame{index:05}.png"))
    }

    pub fn frames_written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for ImageSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelmarkResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let removed = remove_sequence_frames(&self.dir)?;
        if removed > 0 {
            tracing::debug!(
                dir = %self.dir.display(),
                removed,
                "Removed frames of a previous image sequence"
            );
        }
        self.cfg = Some(cfg);
        self.last_index = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, index: u64, frame: &RgbaImage) -> ReelmarkResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelmarkError::encode("image sequence sink not started"))?;
        check_frame(cfg, self.last_index, index, frame)?;
        self.last_index = Some(index);

        frame.save(Self::frame_path(&self.dir, index))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelmarkResult<()> {
        tracing::info!(
            dir = %self.dir.display(),
            frames = self.written,
            "Wrote image sequence"
        );
        self.cfg = None;
        Ok(())
    }
}

/// Delete `frameNNNNN.png` files left in `dir` by an earlier export.
fn remove_sequence_frames(dir: &Path) -> ReelmarkResult<usize> {
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let is_frame = name
            .strip_prefix("frame")
            .and_then(|rest| rest.strip_suffix(".png"))
            .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));
        if is_frame && entry.file_type()?.is_file() {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn check_frame(
    cfg: &SinkConfig,
    last_index: Option<u64>,
    index: u64,
    frame: &RgbaImage,
) -> ReelmarkResult<()> {
    if let Some(last) = last_index {
        if index <= last {
            return Err(ReelmarkError::encode(format!(
                "Out-of-order frame {index} after {last}"
            )));
        }
    }
    if frame.dimensions() != (cfg.size.width, cfg.size.height) {
        return Err(ReelmarkError::encode(format!(
            "Frame size mismatch: got {}x{}, expected {}",
            frame.width(),
            frame.height(),
            cfg.size
        )));
    }
    Ok(())
}

/// Encoder arguments for an output format.
pub fn codec_args_for_format(
    format: ExportFormat,
    video_bitrate_kbps: u32,
    audio_bitrate_kbps: u32,
) -> Vec<String> {
    let video_bitrate = format!("{}k", video_bitrate_kbps.max(500));
    let audio_bitrate = format!("{}k", audio_bitrate_kbps.max(64));

    let args: &[&str] = match format {
        ExportFormat::Mp4H264 => &[
            "-c:v",
            "libx264",
            "-preset",
            "medium",
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            video_bitrate.as_str(),
            "-c:a",
            "aac",
            "-b:a",
            audio_bitrate.as_str(),
            "-movflags",
            "+faststart",
        ],
        ExportFormat::Mp4H265 => &[
            "-c:v",
            "libx265",
            "-preset",
            "medium",
            "-tag:v",
            "hvc1",
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            video_bitrate.as_str(),
            "-c:a",
            "aac",
            "-b:a",
            audio_bitrate.as_str(),
            "-movflags",
            "+faststart",
        ],
        ExportFormat::Webm => &[
            "-c:v",
            "libvpx-vp9",
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            video_bitrate.as_str(),
            "-c:a",
            "libopus",
            "-b:a",
            audio_bitrate.as_str(),
        ],
        ExportFormat::Gif => &["-vf", "split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse"],
        ExportFormat::PngSequence => &[],
    };
    args.iter().map(|a| a.to_string()).collect()
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelmarkResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(w: u32, h: u32) -> SinkConfig {
        SinkConfig {
            size: CanvasSize::new(w, h),
            fps: 30,
        }
    }

    #[test]
    fn test_encoder_args_without_audio() {
        let sink = FfmpegFrameSink::new(FfmpegSinkOpts::new("out.mp4", ExportFormat::Mp4H264));
        let args = sink.encoder_args(&cfg(640, 360));
        assert!(args.windows(2).any(|w| w[0] == "-s" && w[1] == "640x360"));
        assert!(args.windows(2).any(|w| w[0] == "-r" && w[1] == "30"));
        assert!(args.contains(&"-an".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn test_encoder_args_map_optional_source_audio() {
        let mut opts = FfmpegSinkOpts::new("out.webm", ExportFormat::Webm);
        opts.audio = Some(AudioInput {
            path: PathBuf::from("sources/clip.mp4"),
            start_secs: 2.0,
            duration_secs: 3.0,
        });
        let args = FfmpegFrameSink::new(opts).encoder_args(&cfg(640, 360));
        assert!(args.contains(&"1:a:0?".to_string()));
        assert!(args.contains(&"-shortest".to_string()));
        assert!(!args.contains(&"-an".to_string()));
        let pipe = args.iter().position(|a| a == "pipe:0").unwrap();
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert!(ss > pipe);
    }

    #[test]
    fn test_gif_ignores_audio() {
        let mut opts = FfmpegSinkOpts::new("out.gif", ExportFormat::Gif);
        opts.audio = Some(AudioInput {
            path: PathBuf::from("clip.mp4"),
            start_secs: 0.0,
            duration_secs: 1.0,
        });
        let args = FfmpegFrameSink::new(opts).encoder_args(&cfg(101, 57));
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"1:a:0?".to_string()));
    }

    #[test]
    fn test_begin_rejects_odd_size_for_yuv420p() {
        let mut sink = FfmpegFrameSink::new(FfmpegSinkOpts::new(
            std::env::temp_dir().join("reelmark_odd.mp4"),
            ExportFormat::Mp4H264,
        ));
        let err = sink.begin(cfg(641, 360)).unwrap_err();
        assert!(matches!(err, ReelmarkError::Encode { .. }));
    }

    #[test]
    fn test_image_sequence_sink_writes_numbered_pngs() {
        let dir = std::env::temp_dir().join("reelmark_test_sequence");
        let _ = std::fs::remove_dir_all(&dir);

        let mut sink = ImageSequenceSink::new(&dir);
        sink.begin(cfg(4, 2)).unwrap();
        let frame = RgbaImage::from_pixel(4, 2, image::Rgba([9, 8, 7, 255]));
        sink.push_frame(0, &frame).unwrap();
        sink.push_frame(1, &frame).unwrap();
        assert!(sink.push_frame(1, &frame).is_err());
        sink.end().unwrap();

        assert_eq!(sink.frames_written(), 2);
        let first = image::open(ImageSequenceSink::frame_path(&dir, 0))
            .unwrap()
            .to_rgba8();
        assert_eq!(*first.get_pixel(3, 1), image::Rgba([9, 8, 7, 255]));
        assert!(dir.join("frame00001.png").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_image_sequence_sink_replaces_previous_run() {
        let dir = std::env::temp_dir().join("reelmark_test_sequence_rerun");
        let _ = std::fs::remove_dir_all(&dir);
        let frame = RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));

        let mut sink = ImageSequenceSink::new(&dir);
        sink.begin(cfg(2, 2)).unwrap();
        for index in 0..3 {
            sink.push_frame(index, &frame).unwrap();
        }
        sink.end().unwrap();
        std::fs::write(dir.join("notes.txt"), "keep").unwrap();

        let mut sink = ImageSequenceSink::new(&dir);
        sink.begin(cfg(2, 2)).unwrap();
        sink.push_frame(0, &frame).unwrap();
        sink.end().unwrap();

        assert!(dir.join("frame00000.png").exists());
        assert!(!dir.join("frame00001.png").exists());
        assert!(!dir.join("frame00002.png").exists());
        assert!(dir.join("notes.txt").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_encoder_exit_reports_ffmpeg_stderr() {
        if !crate::probe::command_exists("ffmpeg") {
            eprintln!("skipping: ffmpeg not available");
            return;
        }
        let dir = std::env::temp_dir().join("reelmark_test_encoder_exit");
        let _ = std::fs::remove_dir_all(&dir);

        let mut opts = FfmpegSinkOpts::new(dir.join("out.webm"), ExportFormat::Webm);
        opts.audio = Some(AudioInput {
            path: dir.join("missing-audio.mp4"),
            start_secs: 0.0,
            duration_secs: 1.0,
        });
        let mut sink = FfmpegFrameSink::new(opts);
        sink.begin(cfg(64, 64)).unwrap();

        // ffmpeg quits on the missing input; the error surfaces either on a
        // write into the closed pipe or when the encode is finalized.
        let frame = RgbaImage::from_pixel(64, 64, image::Rgba([0, 0, 0, 255]));
        let err = (0..500)
            .find_map(|index| sink.push_frame(index, &frame).err())
            .unwrap_or_else(|| sink.end().unwrap_err());

        assert!(matches!(err, ReelmarkError::Encode { .. }));
        assert!(err.to_string().contains("missing-audio.mp4"), "{err}");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_frame_size_mismatch_is_rejected() {
        let frame = RgbaImage::new(3, 3);
        assert!(check_frame(&cfg(4, 4), None, 0, &frame).is_err());
        let frame = RgbaImage::new(4, 4);
        assert!(check_frame(&cfg(4, 4), Some(2), 3, &frame).is_ok());
    }
}
