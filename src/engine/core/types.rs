use std::path::PathBuf;

use super::error::ConvertError;
use super::policy::{OUTPUT_CONTAINER, OUTPUT_SUFFIX};
use super::scan::output_dir_for;

/// One source file to convert, with the roots that determine its output path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub source_root: PathBuf,
    pub source_file: PathBuf,
    pub output_root: PathBuf,
}

impl ConversionTask {
    pub fn new(source_root: PathBuf, source_file: PathBuf, output_root: PathBuf) -> Self {
        Self {
            source_root,
            source_file,
            output_root,
        }
    }

    /// Source path relative to its root (or just the file name if the file
    /// lives outside the root)
    pub fn relative_source(&self) -> PathBuf {
        match self.source_file.strip_prefix(&self.source_root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => self
                .source_file
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_default(),
        }
    }

    /// `<output_root>/<root_name>/<relative_dir>/<stem>_480p.mkv`
    ///
    /// Pure: calling it twice gives the same path and touches no files.
    pub fn output_path(&self) -> PathBuf {
        let rel = self.relative_source();
        let mut dir = output_dir_for(&self.source_root, &self.output_root);
        if let Some(parent) = rel.parent() {
            dir.push(parent);
        }

        let stem = rel
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        dir.join(format!(
            "{}.{}",
            with_suffix(stem, OUTPUT_SUFFIX),
            OUTPUT_CONTAINER
        ))
    }
}

fn with_suffix(stem: &str, suffix: &str) -> String {
    if stem.ends_with(suffix) {
        stem.to_string()
    } else {
        format!("{}{}", stem, suffix)
    }
}

/// Terminal result of one conversion task
#[derive(Debug)]
pub enum ConversionOutcome {
    /// Output already existed and overwrite is disabled
    SkippedExists,
    /// Video stream copied, audio re-encoded
    Remuxed,
    /// Full video encode
    Encoded,
    Failed(ConvertError),
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Failed(ConvertError::Cancelled))
    }

    /// Short status label for logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::SkippedExists => "exists-skip",
            Self::Remuxed => "remuxed",
            Self::Encoded => "encoded",
            Self::Failed(ConvertError::Cancelled) => "interrupted",
            Self::Failed(_) => "error",
        }
    }
}
