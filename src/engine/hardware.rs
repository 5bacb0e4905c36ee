//! Hardware-accelerated decode detection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Command;
use std::str::FromStr;
use tracing::{debug, info};

/// Hardware acceleration backends ffmpeg can be asked to use via `-hwaccel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccelBackend {
    VideoToolbox, // macOS
    D3d11va,      // Windows Direct3D 11
    Dxva2,        // Windows DirectX Video Acceleration
    Qsv,          // Intel Quick Sync
    Cuvid,        // NVIDIA (legacy decoder wrappers)
    Nvdec,        // NVIDIA
    Cuda,         // NVIDIA
    Amf,          // AMD
    Vaapi,        // Linux VA-API (Intel/AMD)
}

impl AccelBackend {
    pub const ALL: [AccelBackend; 9] = [
        Self::VideoToolbox,
        Self::D3d11va,
        Self::Dxva2,
        Self::Qsv,
        Self::Cuvid,
        Self::Nvdec,
        Self::Cuda,
        Self::Amf,
        Self::Vaapi,
    ];

    /// Name passed to `ffmpeg -hwaccel`
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            Self::VideoToolbox => "videotoolbox",
            Self::D3d11va => "d3d11va",
            Self::Dxva2 => "dxva2",
            Self::Qsv => "qsv",
            Self::Cuvid => "cuvid",
            Self::Nvdec => "nvdec",
            Self::Cuda => "cuda",
            Self::Amf => "amf",
            Self::Vaapi => "vaapi",
        }
    }

    pub fn from_ffmpeg_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|b| b.ffmpeg_name() == name)
    }
}

impl fmt::Display for AccelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ffmpeg_name())
    }
}

impl FromStr for AccelBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ffmpeg_name(s).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|b| b.ffmpeg_name()).collect();
            format!("unknown hwaccel '{}' (expected one of: {})", s, known.join(", "))
        })
    }
}

const WINDOWS_PREFERENCE: &[AccelBackend] = &[
    AccelBackend::D3d11va,
    AccelBackend::Dxva2,
    AccelBackend::Qsv,
    AccelBackend::Cuvid,
    AccelBackend::Nvdec,
    AccelBackend::Cuda,
    AccelBackend::Amf,
    AccelBackend::Vaapi,
];

const MACOS_PREFERENCE: &[AccelBackend] = &[
    AccelBackend::VideoToolbox,
    AccelBackend::Vaapi,
    AccelBackend::Qsv,
    AccelBackend::Cuvid,
    AccelBackend::Nvdec,
    AccelBackend::Cuda,
    AccelBackend::D3d11va,
    AccelBackend::Dxva2,
    AccelBackend::Amf,
];

const DEFAULT_PREFERENCE: &[AccelBackend] = &[
    AccelBackend::Vaapi,
    AccelBackend::Qsv,
    AccelBackend::Cuvid,
    AccelBackend::Nvdec,
    AccelBackend::Cuda,
    AccelBackend::D3d11va,
    AccelBackend::Dxva2,
    AccelBackend::Amf,
];

/// Preference order for the platform this binary was built for
pub fn platform_preference() -> &'static [AccelBackend] {
    if cfg!(target_os = "windows") {
        WINDOWS_PREFERENCE
    } else if cfg!(target_os = "macos") {
        MACOS_PREFERENCE
    } else {
        DEFAULT_PREFERENCE
    }
}

/// Parse the output of `ffmpeg -hwaccels` into lowercase method names.
///
/// The first line is a "Hardware acceleration methods:" header; every
/// following non-empty line carries one method name.
pub fn parse_hwaccels(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lower = line.to_ascii_lowercase();
            !lower.starts_with("hardware") && !lower.starts_with("available")
        })
        .filter_map(|line| line.split_whitespace().next())
        .map(|name| name.to_ascii_lowercase())
        .collect()
}

/// Pick the first backend in `preference` that appears in `available`
pub fn select_backend(available: &[String], preference: &[AccelBackend]) -> Option<AccelBackend> {
    preference
        .iter()
        .copied()
        .find(|backend| available.iter().any(|name| name == backend.ffmpeg_name()))
}

/// Ask ffmpeg which hwaccels it supports and select one for this platform.
///
/// Returns `None` on any failure; running without acceleration is always valid.
pub fn detect_hwaccel() -> Option<AccelBackend> {
    let output = match Command::new("ffmpeg")
        .args(["-hide_banner", "-hwaccels"])
        .output()
    {
        Ok(out) if out.status.success() => out,
        Ok(out) => {
            debug!(status = %out.status, "ffmpeg -hwaccels failed");
            return None;
        }
        Err(e) => {
            debug!(error = %e, "could not run ffmpeg -hwaccels");
            return None;
        }
    };

    // Older builds print the list on stderr
    let mut text = String::from_utf8_lossy(&output.stdout).to_string();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    let available = parse_hwaccels(&text);
    let selected = select_backend(&available, platform_preference());
    info!(
        available = %available.join(","),
        selected = selected.map(|b| b.ffmpeg_name()).unwrap_or("none"),
        "hwaccel detection"
    );
    selected
}
