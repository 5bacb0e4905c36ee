use clap::{Args, Parser, Subcommand};
use ffshrink::engine::AccelBackend;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ffshrink")]
#[command(about = "Batch converter to 480p baseline H.264 / AAC stereo MKV", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Directories to scan for video files (defaults to current directory)
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Output root; each input's tree is mirrored under <OUTPUT>/<input name>/
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub options: EncodeOptions,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Overrides for values from the config file
#[derive(Args, Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Replace outputs that already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Always re-encode, even sources already within the target profile
    #[arg(long)]
    pub no_skip_compliant: bool,

    /// Don't copy container attachments (fonts etc.)
    #[arg(long)]
    pub no_attachments: bool,

    /// libx264 CRF (lower = better quality)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=51))]
    pub crf: Option<u32>,

    /// libx264 preset
    #[arg(long)]
    pub preset: Option<String>,

    /// Don't pass `-tune animation`
    #[arg(long)]
    pub no_tune: bool,

    /// H.264 level
    #[arg(long)]
    pub level: Option<String>,

    /// ffmpeg -max_muxing_queue_size
    #[arg(long, value_name = "PACKETS")]
    pub mux_queue_size: Option<u32>,

    /// Never use hardware-accelerated decoding
    #[arg(long, conflicts_with = "hwaccel")]
    pub no_hwaccel: bool,

    /// Use this hwaccel instead of auto-detecting one
    #[arg(long, value_name = "NAME")]
    pub hwaccel: Option<AccelBackend>,

    /// Directory for in-progress encodes
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check if ffmpeg and ffprobe are installed
    CheckFfmpeg,

    /// List ffmpeg's hardware acceleration methods and the one that would be used
    Hwaccels,

    /// Show a file's video stream and whether it would be remuxed or encoded
    Probe {
        /// Path to the video file
        file: PathBuf,
    },

    /// Show what would be done for each file without running ffmpeg
    DryRun {
        /// Directories to scan (defaults to current directory)
        #[arg(value_name = "INPUT")]
        inputs: Vec<PathBuf>,

        /// Output root
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: EncodeOptions,
    },

    /// Show config status and location, or create default config if missing
    InitConfig,
}

pub fn parse() -> Cli {
    Cli::parse()
}
