use std::path::PathBuf;
use thiserror::Error;

/// Why a conversion task did not produce its output
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The final (unaccelerated) encode failed. `code` is `None` when ffmpeg
    /// could not be spawned or was killed by a signal.
    #[error("encoding failed with exit code {}", format_code(.code))]
    Encode { code: Option<i32> },

    /// Encoding succeeded but the result could not be moved into place
    #[error("could not move output into {}: {source}", path.display())]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The user interrupted the run
    #[error("interrupted")]
    Cancelled,
}

impl ConvertError {
    /// Exit code reported for this failure, in the style of a shell
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Encode { code } => code.unwrap_or(1),
            Self::Cancelled => 130,
            Self::Commit { .. } => 1,
        }
    }
}

fn format_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}
