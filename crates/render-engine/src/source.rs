//! Decoded frame sources.
//!
//! A [`FrameSource`] yields RGBA frames of the trimmed window in timeline
//! order, already resampled to the output rate and size. The ffmpeg-backed
//! source keeps a single decoder process alive for the whole window and
//! reads fixed-size raw frames from its stdout.

use std::collections::VecDeque;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use image::RgbaImage;

use reelmark_common::error::{ReelmarkError, ReelmarkResult};
use reelmark_project_model::canvas::CanvasSize;

/// Producer of decoded frames, in timeline order.
pub trait FrameSource: Send {
    /// Next frame, or `None` once the window is exhausted.
    fn next_frame(&mut self) -> ReelmarkResult<Option<RgbaImage>>;

    /// Release the decoder. Called once after the last frame was consumed.
    fn finish(&mut self) -> ReelmarkResult<()>;
}

/// What to decode: a window of a file, resampled to a fixed rate and size.
#[derive(Debug, Clone)]
pub struct DecodeRequest {
    pub path: PathBuf,
    pub start_secs: f64,
    pub duration_secs: f64,
    pub fps: u32,
    pub size: CanvasSize,
}

/// Splits a raw RGBA byte stream into fixed-size frames.
struct RawFrameReader<R> {
    reader: R,
    size: CanvasSize,
    frame_len: usize,
    frames_read: u64,
    eof: bool,
}

impl<R: Read> RawFrameReader<R> {
    fn new(reader: R, size: CanvasSize) -> Self {
        Self {
            reader,
            size,
            frame_len: size.width as usize * size.height as usize * 4,
            frames_read: 0,
            eof: false,
        }
    }

    /// Next whole frame. A clean end of stream yields `None`; a stream that
    /// ends inside a frame is a decode error.
    fn next_frame(&mut self) -> ReelmarkResult<Option<RgbaImage>> {
        if self.eof {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.frame_len];
        let read = read_full(&mut self.reader, &mut buf)
            .map_err(|e| ReelmarkError::decode(format!("Failed reading decoded frame: {e}")))?;

        if read == 0 {
            self.eof = true;
            return Ok(None);
        }
        if read < self.frame_len {
            self.eof = true;
            return Err(ReelmarkError::decode(format!(
                "Truncated frame {} from decoder: got {read} of {} bytes",
                self.frames_read, self.frame_len
            )));
        }

        self.frames_read += 1;
        RgbaImage::from_raw(self.size.width, self.size.height, buf)
            .map(Some)
            .ok_or_else(|| ReelmarkError::decode("Decoded frame buffer has the wrong size"))
    }
}

/// Frame source backed by an `ffmpeg` child writing raw RGBA to stdout.
pub struct FfmpegFrameSource {
    child: Option<Child>,
    frames: Option<RawFrameReader<BufReader<ChildStdout>>>,
    stderr_drain: Option<std::thread::JoinHandle<String>>,
    frames_read: u64,
    eof: bool,
}

impl FfmpegFrameSource {
    /// Spawn the decoder for `request`.
    pub fn spawn(request: &DecodeRequest) -> ReelmarkResult<Self> {
        if !request.path.exists() {
            return Err(ReelmarkError::FileNotFound {
                path: request.path.clone(),
            });
        }
        if request.duration_secs <= 0.0 {
            return Err(ReelmarkError::decode("Decode window must be longer than zero"));
        }

        let args = decoder_args(request);
        tracing::debug!(args = ?args, "Spawning ffmpeg decoder");

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReelmarkError::decode(format!("Failed to start ffmpeg decoder: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelmarkError::decode("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelmarkError::decode("Failed to capture ffmpeg stderr"))?;

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
            path = %request.path.display(),
            start_secs = request.start_secs,
            duration_secs = request.duration_secs,
            size = %request.size,
            "ffmpeg decoder started"
        );

        Ok(Self {
            child: Some(child),
            frames: Some(RawFrameReader::new(BufReader::new(stdout), request.size)),
            stderr_drain: Some(stderr_drain),
            frames_read: 0,
            eof: false,
        })
    }

    /// Frames delivered so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

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
}

impl FrameSource for FfmpegFrameSource {
    fn next_frame(&mut self) -> ReelmarkResult<Option<RgbaImage>> {
        let Some(frames) = self.frames.as_mut() else {
            return Err(ReelmarkError::decode("ffmpeg decoder already finished"));
        };
        let frame = frames.next_frame();
        self.frames_read = frames.frames_read;
        self.eof = frames.eof;
        frame
    }

    fn finish(&mut self) -> ReelmarkResult<()> {
        drop(self.frames.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if !self.eof {
            // Stopped before the decoder ran dry; its exit status is not meaningful.
            let _ = child.kill();
            let _ = child.wait();
            let _ = self.join_stderr();
            return Ok(());
        }

        let status = child
            .wait()
            .map_err(|e| ReelmarkError::decode(format!("Failed to wait on ffmpeg decoder: {e}")))?;
        let stderr_output = self.join_stderr();
        if !status.success() {
            return Err(ReelmarkError::decode(format!(
                "ffmpeg decode failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        tracing::debug!(frames = self.frames_read, "ffmpeg decoder finished");
        Ok(())
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Frame source over frames already in memory, for tests and still images.
#[derive(Debug, Default)]
pub struct VecFrameSource {
    frames: VecDeque<RgbaImage>,
}

impl VecFrameSource {
    pub fn new(frames: impl IntoIterator<Item = RgbaImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// `count` copies of one solid-color frame.
    pub fn solid(size: CanvasSize, rgba: [u8; 4], count: usize) -> Self {
        let frame = RgbaImage::from_pixel(size.width, size.height, image::Rgba(rgba));
        Self::new(std::iter::repeat(frame).take(count))
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for VecFrameSource {
    fn next_frame(&mut self) -> ReelmarkResult<Option<RgbaImage>> {
        Ok(self.frames.pop_front())
    }

    fn finish(&mut self) -> ReelmarkResult<()> {
        self.frames.clear();
        Ok(())
    }
}

/// Decode a single frame at `time_secs`, optionally scaled to `size`.
pub fn extract_frame(
    path: &Path,
    time_secs: f64,
    size: Option<CanvasSize>,
) -> ReelmarkResult<RgbaImage> {
    if !path.exists() {
        return Err(ReelmarkError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-v", "error", "-ss", &format!("{:.6}", time_secs.max(0.0))])
        .arg("-i")
        .arg(path)
        .args(["-frames:v", "1"]);
    if let Some(size) = size {
        cmd.args(["-vf", &format!("scale={}:{}", size.width, size.height)]);
    }
    cmd.args(["-f", "image2pipe", "-vcodec", "png", "pipe:1"]);

    let output = cmd
        .output()
        .map_err(|e| ReelmarkError::decode(format!("Failed to run ffmpeg for frame grab: {e}")))?;
    if !output.status.success() {
        return Err(ReelmarkError::decode(format!(
            "ffmpeg frame grab failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    if output.stdout.is_empty() {
        return Err(ReelmarkError::decode(format!(
            "ffmpeg returned no frame at {time_secs:.3}s for {}",
            path.display()
        )));
    }

    Ok(image::load_from_memory(&output.stdout)?.to_rgba8())
}

fn decoder_args(request: &DecodeRequest) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format!("{:.6}", request.start_secs.max(0.0)),
        "-i".to_string(),
        request.path.to_string_lossy().into_owned(),
        "-t".to_string(),
        format!("{:.6}", request.duration_secs),
        "-an".to_string(),
        "-vf".to_string(),
        format!(
            "fps={},scale={}:{}",
            request.fps.max(1),
            request.size.width,
            request.size.height
        ),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgba".to_string(),
        "pipe:1".to_string(),
    ]
}

/// Fill `buf` from `reader`, returning the bytes read (short only at EOF).
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
