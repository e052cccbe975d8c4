//! Read a text file's contents. Binary and complex formats are refused
//! with the reason rather than dumped into the conversation.

use crate::base_dirs::{BaseDir, BaseDirs};
use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};

const EXCLUDED_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "gif", "bmp", "webp", "ico", "mp3", "wav", "flac", "aac", "ogg",
    "mp4", "mkv", "mov", "avi", "webm", "zip", "rar", "7z", "tar", "gz", "bz2", "exe", "dll",
    "bin", "dat", "iso", "apk", "docx", "xlsx", "pptx", "odt", "ods",
];

pub struct ReadFileTool {
    pub dirs: BaseDirs,
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a text file inside a chosen base directory. Binary and complex file types are refused."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name_of_file": {
                    "type": "string",
                    "description": "File name or nested path to read, e.g. 'Projects/2025/plan.md'"
                },
                "base_dir": BaseDir::schema("Base directory the file lives in (default Desktop)")
            },
            "required": ["name_of_file"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let name = arguments["name_of_file"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'name_of_file' argument".into()))?;
        let base = match BaseDir::parse(arguments["base_dir"].as_str()) {
            Ok(base) => base,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        let path = match self.dirs.resolve(base, name) {
            Ok(path) => path,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        if !path.exists() {
            return Ok(ToolOutcome::failure(format!(
                "No file found at: {}",
                path.display()
            )));
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if EXCLUDED_EXTENSIONS.contains(&extension.as_str()) {
            return Ok(ToolOutcome::failure(format!(
                "Cannot read this file type: .{extension} Reason: It's a binary or complex file (image/audio/video/archive/etc.)"
            )));
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(content) => Ok(ToolOutcome::ok(content)),
                Err(_) => Ok(ToolOutcome::failure(
                    "File contains binary data (not plain text). It may be corrupted or an unsupported format.",
                )),
            },
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => Ok(ToolOutcome::failure(
                "Permission denied! You don't have access to read this file.",
            )),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "Unexpected error while reading file: {e}"
            ))),
        }
    }
}
