use anyhow::{Context, Result};
use std::process::Command;

/// Run `<tool> -version` and return the first line of its output
fn tool_version(tool: &str) -> Result<String> {
    let output = Command::new(tool)
        .arg("-version")
        .output()
        .with_context(|| format!("Failed to execute {tool}. Is {tool} installed and in PATH?"))?;

    if !output.status.success() {
        anyhow::bail!("{} command failed with status: {}", tool, output.status);
    }

    Ok(first_line(&String::from_utf8_lossy(&output.stdout)))
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("Unknown version").to_string()
}

/// Check if ffmpeg is available and return its version
pub fn ffmpeg_version() -> Result<String> {
    tool_version("ffmpeg")
}

/// Check if ffprobe is available and return its version
pub fn ffprobe_version() -> Result<String> {
    tool_version("ffprobe")
}
