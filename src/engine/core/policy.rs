//! Encoding policy shared by every conversion in a run.

use serde::{Deserialize, Serialize};

/// Target profile and encoder settings.
///
/// Built once at startup (defaults, then config file, then CLI flags) and
/// never mutated while a batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingPolicy {
    /// Bounding box the output video must fit in
    pub max_width: u32,
    pub max_height: u32,

    /// libx264 constant rate factor (0-51, lower = better quality)
    pub crf: u32,

    /// libx264 preset (ultrafast..veryslow)
    pub preset: String,

    /// Pass `-tune animation`
    pub tune_animation: bool,

    /// H.264 profile and level
    pub h264_profile: String,
    pub level: String,

    /// Output pixel format; 4:2:0 is what baseline decoders accept
    pub pix_fmt: String,

    pub audio_codec: String,
    /// Audio bitrate in kbps
    pub audio_bitrate: u32,
    pub audio_channels: u32,

    /// Copy subtitle streams
    pub copy_subtitles: bool,

    /// Copy container attachments (fonts etc). Some sources fail to mux with these.
    pub copy_attachments: bool,

    /// Passed to `-max_muxing_queue_size`
    pub max_muxing_queue_size: u32,
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        Self {
            max_width: 854,
            max_height: 480,
            crf: 18,
            preset: "medium".to_string(),
            tune_animation: true,
            h264_profile: "baseline".to_string(),
            level: "3.0".to_string(),
            pix_fmt: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: 160,
            audio_channels: 2,
            copy_subtitles: true,
            copy_attachments: true,
            max_muxing_queue_size: 4096,
        }
    }
}

/// Codec identifier a compliant source must report
pub const TARGET_CODEC: &str = "h264";

/// Pixel formats accepted as already compliant
pub const ACCEPTED_PIX_FMTS: &[&str] = &["yuv420p", "yuvj420p"];

/// Suffix appended to output file stems
pub const OUTPUT_SUFFIX: &str = "_480p";

/// Output container extension
pub const OUTPUT_CONTAINER: &str = "mkv";
