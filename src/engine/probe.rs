// Input probing using ffprobe

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use tracing::debug;

use super::core::{ACCEPTED_PIX_FMTS, EncodingPolicy, TARGET_CODEC};

/// Metadata of the first video stream. Every field is optional: a missing
/// value means ffprobe could not tell us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamProfile {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pix_fmt: Option<String>,
    pub codec_name: Option<String>,
}

impl StreamProfile {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeStreams {
    #[serde(default)]
    streams: Vec<StreamProfile>,
}

/// Source of stream metadata for the converter
pub trait StreamProbe {
    fn probe(&self, path: &Path) -> StreamProfile;
}

/// `StreamProbe` backed by the ffprobe binary
#[derive(Debug, Clone, Copy, Default)]
pub struct Ffprobe;

impl StreamProbe for Ffprobe {
    fn probe(&self, path: &Path) -> StreamProfile {
        probe_stream(path)
    }
}

/// Probe the first video stream of `path`.
///
/// Never fails: any error (ffprobe missing, bad exit status, unparseable
/// output, no video stream) yields an empty profile.
pub fn probe_stream(path: &Path) -> StreamProfile {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,pix_fmt,codec_name",
            "-of",
            "json",
        ])
        .arg(path)
        .output();

    let output = match output {
        Ok(out) if out.status.success() => out,
        Ok(out) => {
            debug!(
                path = %path.display(),
                status = %out.status,
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "ffprobe failed"
            );
            return StreamProfile::default();
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "could not run ffprobe");
            return StreamProfile::default();
        }
    };

    parse_stream_profile(&String::from_utf8_lossy(&output.stdout)).unwrap_or_else(|e| {
        debug!(path = %path.display(), error = %e, "unparseable ffprobe output");
        StreamProfile::default()
    })
}

/// Parse ffprobe `-of json` output into the first stream's profile.
/// An empty `streams` list is not an error; it yields an empty profile.
pub fn parse_stream_profile(json: &str) -> Result<StreamProfile, serde_json::Error> {
    let parsed: FfprobeStreams = serde_json::from_str(json)?;
    Ok(parsed.streams.into_iter().next().unwrap_or_default())
}

/// Whether the stream already meets the target resolution, codec and pixel
/// format, so that only a remux is needed. Missing information is never
/// compliant.
pub fn is_compliant(profile: &StreamProfile, policy: &EncodingPolicy) -> bool {
    let (Some(width), Some(height)) = (profile.width, profile.height) else {
        return false;
    };
    let (Some(codec), Some(pix_fmt)) = (&profile.codec_name, &profile.pix_fmt) else {
        return false;
    };

    width <= policy.max_width
        && height <= policy.max_height
        && codec.to_ascii_lowercase().contains(TARGET_CODEC)
        && ACCEPTED_PIX_FMTS.contains(&pix_fmt.to_ascii_lowercase().as_str())
}
