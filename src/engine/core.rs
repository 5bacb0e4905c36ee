mod batch;
mod convert;
mod error;
mod ffmpeg_cmd;
mod ffmpeg_info;
mod policy;
mod runner;
mod scan;
mod temp;
mod types;

pub use batch::{BatchEvent, run_batch};
pub use convert::{ConvertSettings, Converter, TaskPlan};
pub use error::ConvertError;
pub use ffmpeg_cmd::{
    EncodeMode, build_encode_cmd, build_ffmpeg_cmd, build_remux_cmd, format_ffmpeg_cmd,
    scale_filter, target_dimensions,
};
pub use ffmpeg_info::{ffmpeg_version, ffprobe_version};
pub use policy::{
    ACCEPTED_PIX_FMTS, EncodingPolicy, OUTPUT_CONTAINER, OUTPUT_SUFFIX, TARGET_CODEC,
};
pub use runner::{CancelFlag, CommandRunner, ProcessRunner, RunStatus};
pub use scan::{collect_tasks, is_video_file, output_dir_for, scan};
pub use temp::{TempArtifact, WorkDir};
pub use types::{ConversionOutcome, ConversionTask};
