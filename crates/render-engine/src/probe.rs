//! Source video probing through `ffprobe`.

use std::path::Path;
use std::process::{Command, Stdio};

use serde::Deserialize;

use reelmark_common::error::{ReelmarkError, ReelmarkResult};
use reelmark_project_model::project::SourceVideo;

/// Metadata of a probed video file.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    pub fps: f64,
    pub has_audio: bool,
    pub codec: String,
}

impl VideoInfo {
    /// Convert into the project's source record. `path` is filled in on import.
    pub fn into_source(self) -> SourceVideo {
        SourceVideo {
            path: String::new(),
            duration_secs: self.duration_secs,
            width: self.width,
            height: self.height,
            fps: self.fps,
            has_audio: self.has_audio,
            codec: self.codec,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe a video file with `ffprobe`.
pub fn probe_video(path: &Path) -> ReelmarkResult<VideoInfo> {
    if !path.exists() {
        return Err(ReelmarkError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| ReelmarkError::decode(format!("Failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        return Err(ReelmarkError::decode(format!(
            "ffprobe failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let info = parse_probe_output(&output.stdout)?;
    tracing::debug!(
        path = %path.display(),
        width = info.width,
        height = info.height,
        duration_secs = info.duration_secs,
        fps = info.fps,
        has_audio = info.has_audio,
        "Probed source video"
    );
    Ok(info)
}

/// Parse `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_output(json: &[u8]) -> ReelmarkResult<VideoInfo> {
    let parsed: ProbeOutput = serde_json::from_slice(json)
        .map_err(|e| ReelmarkError::decode(format!("ffprobe json parse failed: {e}")))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ReelmarkError::decode("No video stream found"))?;

    let width = video
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| ReelmarkError::decode("Missing video width from ffprobe"))?;
    let height = video
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| ReelmarkError::decode("Missing video height from ffprobe"))?;

    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| ReelmarkError::decode("Could not determine video duration"))?;

    let fps = video
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rational)
        .or_else(|| video.r_frame_rate.as_deref().and_then(parse_rational))
        .unwrap_or(30.0);

    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoInfo {
        width,
        height,
        duration_secs,
        fps,
        has_audio,
        codec: video.codec_name.clone().unwrap_or_default(),
    })
}

/// Parse an ffprobe rational such as `30000/1001`. `0/0` yields `None`.
pub fn parse_rational(raw: &str) -> Option<f64> {
    let value = match raw.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => raw.trim().parse::<f64>().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Whether `binary` resolves on `PATH`.
pub fn command_exists(binary: &str) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {
                "codec_type": "video",
                "codec_name": "h264",
                "width": 1280,
                "height": 720,
                "r_frame_rate": "30/1",
                "avg_frame_rate": "30000/1001",
                "duration": "12.000000"
            },
            { "codec_type": "audio", "codec_name": "aac" }
        ],
        "format": { "duration": "12.345000" }
    }"#;

    #[test]
    fn test_parse_probe_output() {
        let info = parse_probe_output(SAMPLE.as_bytes()).unwrap();
        assert_eq!((info.width, info.height), (1280, 720));
        assert!((info.duration_secs - 12.345).abs() < 1e-9);
        assert!((info.fps - 29.97).abs() < 0.01);
        assert!(info.has_audio);
        assert_eq!(info.codec, "h264");
    }

    #[test]
    fn test_parse_probe_output_falls_back_to_stream_duration() {
        let json = r#"{"streams":[{"codec_type":"video","width":2,"height":2,"r_frame_rate":"25/1","avg_frame_rate":"0/0","duration":"3.5"}]}"#;
        let info = parse_probe_output(json.as_bytes()).unwrap();
        assert!((info.duration_secs - 3.5).abs() < 1e-9);
        assert!((info.fps - 25.0).abs() < 1e-9);
        assert!(!info.has_audio);
    }

    #[test]
    fn test_parse_probe_output_requires_video_stream() {
        let json = r#"{"streams":[{"codec_type":"audio"}],"format":{"duration":"1.0"}}"#;
        assert!(matches!(
            parse_probe_output(json.as_bytes()),
            Err(ReelmarkError::Decode { .. })
        ));
    }

    #[test]
    fn test_parse_rational() {
        assert_eq!(parse_rational("30/1"), Some(30.0));
        assert_eq!(parse_rational("0/0"), None);
        assert_eq!(parse_rational("24"), Some(24.0));
        assert_eq!(parse_rational("abc"), None);
    }

    #[test]
    fn test_probe_missing_file() {
        let err = probe_video(Path::new("/nonexistent/reelmark/clip.mp4")).unwrap_err();
        assert!(matches!(err, ReelmarkError::FileNotFound { .. }));
    }
}
