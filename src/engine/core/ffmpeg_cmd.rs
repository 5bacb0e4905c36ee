use std::path::Path;
use std::process::Command;

use super::policy::EncodingPolicy;
use crate::engine::hardware::AccelBackend;

/// How the video stream is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeMode {
    /// Copy the video stream verbatim, re-encode audio only
    Remux,
    /// Full encode, decoding through the given hwaccel
    Hardware(AccelBackend),
    /// Full encode without any acceleration directive
    Software,
}

impl EncodeMode {
    pub fn label(&self) -> String {
        match self {
            Self::Remux => "remux".to_string(),
            Self::Hardware(backend) => format!("encode (hwaccel {})", backend),
            Self::Software => "encode (software)".to_string(),
        }
    }
}

/// ffmpeg `scale` filter that fits the video inside the policy's bounding box,
/// keeps the aspect ratio and forces both dimensions to even values (4:2:0
/// chroma needs them).
pub fn scale_filter(policy: &EncodingPolicy) -> String {
    let (w, h) = (policy.max_width, policy.max_height);
    format!(
        "scale=trunc(iw*min({w}/iw\\,{h}/ih)/2)*2:trunc(ih*min({w}/iw\\,{h}/ih)/2)*2,setsar=1"
    )
}

/// Output size produced by [`scale_filter`] for an `iw`x`ih` input.
///
/// `scale = min(max_w/iw, max_h/ih)`, each side is `2*floor(side*scale/2)`.
/// Evaluated with integers so the bounding side lands exactly on the bound.
pub fn target_dimensions(iw: u32, ih: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if iw == 0 || ih == 0 {
        return (0, 0);
    }
    let (iw, ih, max_w, max_h) = (iw as u64, ih as u64, max_w as u64, max_h as u64);

    // max_w/iw <= max_h/ih  <=>  max_w*ih <= max_h*iw
    let (w, h) = if max_w * ih <= max_h * iw {
        (max_w / 2, (ih * max_w) / (iw * 2))
    } else {
        ((iw * max_h) / (ih * 2), max_h / 2)
    };
    ((w * 2) as u32, (h * 2) as u32)
}

fn base_cmd(input: &Path, hwaccel: Option<AccelBackend>) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-hide_banner", "-loglevel", "error", "-stats"]);

    // Must come before -i to apply to decoding
    if let Some(backend) = hwaccel {
        cmd.arg("-hwaccel").arg(backend.ffmpeg_name());
    }

    cmd.arg("-i").arg(input);
    cmd.args(["-map", "0", "-map_metadata", "0", "-map_chapters", "0"]);
    cmd
}

fn apply_audio_and_muxing(cmd: &mut Command, policy: &EncodingPolicy) {
    cmd.arg("-c:a").arg(&policy.audio_codec);
    cmd.arg("-b:a").arg(format!("{}k", policy.audio_bitrate));
    cmd.arg("-ac").arg(policy.audio_channels.to_string());

    if policy.copy_subtitles {
        cmd.args(["-c:s", "copy"]);
    }
    if policy.copy_attachments {
        cmd.args(["-c:t", "copy"]);
    }

    cmd.arg("-max_muxing_queue_size")
        .arg(policy.max_muxing_queue_size.to_string());
    cmd.args(["-threads", "0"]);
}

fn apply_output(cmd: &mut Command, output: &Path, overwrite: bool) {
    cmd.arg(if overwrite { "-y" } else { "-n" });
    cmd.arg(output);
}

/// Copy video, re-encode audio
pub fn build_remux_cmd(
    input: &Path,
    output: &Path,
    policy: &EncodingPolicy,
    overwrite: bool,
) -> Command {
    let mut cmd = base_cmd(input, None);
    cmd.args(["-c:v", "copy"]);
    apply_audio_and_muxing(&mut cmd, policy);
    apply_output(&mut cmd, output, overwrite);
    cmd
}

/// Downscale and re-encode video with libx264; `hwaccel` only changes decoding
pub fn build_encode_cmd(
    input: &Path,
    output: &Path,
    policy: &EncodingPolicy,
    hwaccel: Option<AccelBackend>,
    overwrite: bool,
) -> Command {
    let mut cmd = base_cmd(input, hwaccel);

    cmd.args(["-c:v", "libx264"]);
    cmd.arg("-profile:v").arg(&policy.h264_profile);
    cmd.arg("-level:v").arg(&policy.level);
    cmd.arg("-pix_fmt").arg(&policy.pix_fmt);
    cmd.arg("-vf").arg(scale_filter(policy));
    cmd.arg("-preset").arg(&policy.preset);
    cmd.arg("-crf").arg(policy.crf.to_string());
    if policy.tune_animation {
        cmd.args(["-tune", "animation"]);
    }

    apply_audio_and_muxing(&mut cmd, policy);
    apply_output(&mut cmd, output, overwrite);
    cmd
}

/// Build the invocation for `mode`
pub fn build_ffmpeg_cmd(
    mode: EncodeMode,
    input: &Path,
    output: &Path,
    policy: &EncodingPolicy,
    overwrite: bool,
) -> Command {
    match mode {
        EncodeMode::Remux => build_remux_cmd(input, output, policy, overwrite),
        EncodeMode::Hardware(backend) => {
            build_encode_cmd(input, output, policy, Some(backend), overwrite)
        }
        EncodeMode::Software => build_encode_cmd(input, output, policy, None, overwrite),
    }
}

/// Render a command as a copy-pasteable shell line
pub fn format_ffmpeg_cmd(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|arg| {
            let s = arg.to_string_lossy();
            match shlex::try_quote(&s) {
                Ok(quoted) => quoted.into_owned(),
                Err(_) => s.into_owned(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
