use super::types::ConversionTask;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Video file extensions picked up by a scan
const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "webm", "webem", "mov", "m4v", "avi", "flv", "ts", "m2ts", "mts", "mxf", "dat",
];

/// Check if a path has a video file extension
pub fn is_video_file(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        if let Some(ext_str) = ext.to_str() {
            return VIDEO_EXTENSIONS.contains(&ext_str.to_lowercase().as_str());
        }
    }
    false
}

/// Scan a directory recursively for video files, sorted by path.
///
/// Directories under any of `exclude` are not entered, so output trees nested
/// inside an input tree are never fed back in.
pub fn scan(root: &Path, exclude: &[PathBuf]) -> Vec<PathBuf> {
    // Following links once walked straight into /proc
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !exclude.iter().any(|ex| e.path().starts_with(ex)))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_video_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Directory that receives the outputs of `root`: `<output_root>/<root name>`
pub fn output_dir_for(root: &Path, output_root: &Path) -> PathBuf {
    match root.file_name() {
        Some(name) => output_root.join(name),
        None => output_root.to_path_buf(),
    }
}

/// Build one task per video file under each root, in root order.
///
/// The output directories of every root in the batch are skipped, except one
/// that contains the root being scanned (that would drop the whole root).
pub fn collect_tasks(roots: &[PathBuf], output_root: &Path) -> Vec<ConversionTask> {
    let output_dirs: Vec<PathBuf> = roots
        .iter()
        .map(|root| output_dir_for(root, output_root))
        .collect();

    roots
        .iter()
        .flat_map(|root| {
            let exclude: Vec<PathBuf> = output_dirs
                .iter()
                .filter(|dir| !root.starts_with(dir))
                .cloned()
                .collect();
            scan(root, &exclude).into_iter().map(|file| {
                ConversionTask::new(root.clone(), file, output_root.to_path_buf())
            })
        })
        .collect()
}
