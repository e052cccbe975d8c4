//! Move a file or folder between base directories. The destination must
//! already exist; this tool never creates it.

use crate::base_dirs::{BaseDir, BaseDirs};
use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};
use std::path::Path;

pub struct MoveItemTool {
    pub dirs: BaseDirs,
}

impl MoveItemTool {
    /// Move `source` into directory `dest`, recursing for directories.
    /// Plain rename first; copy + remove covers cross-device moves.
    fn move_into(source: &Path, dest_dir: &Path) -> std::io::Result<()> {
        let name = source.file_name().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "source has no file name")
        })?;
        let target = dest_dir.join(name);
        if target.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("already exists at {}", target.display()),
            ));
        }

        match std::fs::rename(source, &target) {
            Ok(()) => Ok(()),
            Err(_) if source.is_file() => {
                std::fs::copy(source, &target)?;
                std::fs::remove_file(source)
            }
            Err(_) => {
                Self::copy_dir(source, &target)?;
                std::fs::remove_dir_all(source)
            }
        }
    }

    fn copy_dir(from: &Path, to: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(to)?;
        for entry in std::fs::read_dir(from)? {
            let entry = entry?;
            let target = to.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                Self::copy_dir(&entry.path(), &target)?;
            } else {
                std::fs::copy(entry.path(), &target)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Tool for MoveItemTool {
    fn name(&self) -> &str {
        "move_file_or_folder"
    }

    fn description(&self) -> &str {
        "Move an existing file or folder into an existing destination folder, across base directories. Nested paths supported on both sides."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "current_name": {
                    "type": "string",
                    "description": "Current file/folder name or nested path, e.g. 'Old/2025/Files'"
                },
                "new_destination_path": {
                    "type": "string",
                    "description": "Destination folder or nested path. Empty string moves to the destination base directory itself."
                },
                "base_dir_of_current_name": BaseDir::schema("Base directory the item currently lives in (default Desktop)"),
                "base_dir_of_destination": BaseDir::schema("Base directory of the destination (default Desktop)")
            },
            "required": ["current_name", "new_destination_path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let current_name = arguments["current_name"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'current_name' argument".into()))?;
        let destination = arguments["new_destination_path"].as_str().unwrap_or("");

        let source_base = match BaseDir::parse(arguments["base_dir_of_current_name"].as_str()) {
            Ok(base) => base,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };
        let dest_base = match BaseDir::parse(arguments["base_dir_of_destination"].as_str()) {
            Ok(base) => base,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        let (source, dest) = match (
            self.dirs.resolve(source_base, current_name),
            self.dirs.resolve(dest_base, destination),
        ) {
            (Ok(s), Ok(d)) => (s, d),
            (Err(msg), _) | (_, Err(msg)) => return Ok(ToolOutcome::failure(msg)),
        };

        if !dest.exists() {
            return Ok(ToolOutcome::failure(format!(
                "The destination path {} doesn't exist. Try creating it first.",
                dest.display()
            )));
        }
        if !source.exists() {
            return Ok(ToolOutcome::failure(format!(
                "Error: The path does not exist: {}",
                source.display()
            )));
        }

        match Self::move_into(&source, &dest) {
            Ok(()) => Ok(ToolOutcome::ok(format!(
                "Moved successfully from: {} to: {}",
                source.display(),
                dest.display()
            ))),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "Error moving {}: {e}",
                source.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs_in(tmp: &tempfile::TempDir) -> BaseDirs {
        std::fs::create_dir_all(tmp.path().join("Desktop")).unwrap();
        std::fs::create_dir_all(tmp.path().join("Documents")).unwrap();
        BaseDirs::with_roots(tmp.path(), tmp.path().join(".trash"))
    }

    #[tokio::test]
    async fn moves_file_across_base_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        std::fs::write(tmp.path().join("Desktop/report.txt"), "q3").unwrap();

        let tool = MoveItemTool { dirs };
        let outcome = tool
            .execute(serde_json::json!({
                "current_name": "report.txt",
                "new_destination_path": "",
                "base_dir_of_current_name": "Desktop",
                "base_dir_of_destination": "Documents"
            }))
            .await
            .unwrap();

        assert!(outcome.success, "{}", outcome.output);
        assert!(!tmp.path().join("Desktop/report.txt").exists());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("Documents/report.txt")).unwrap(),
            "q3"
        );
    }

    #[tokio::test]
    async fn moves_folder_with_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        std::fs::create_dir_all(tmp.path().join("Desktop/Old/inner")).unwrap();
        std::fs::write(tmp.path().join("Desktop/Old/inner/a.txt"), "x").unwrap();
        std::fs::create_dir_all(tmp.path().join("Documents/Archive")).unwrap();

        let tool = MoveItemTool { dirs };
        let outcome = tool
            .execute(serde_json::json!({
                "current_name": "Old",
                "new_destination_path": "Archive",
                "base_dir_of_current_name": "Desktop",
                "base_dir_of_destination": "Documents"
            }))
            .await
            .unwrap();

        assert!(outcome.success, "{}", outcome.output);
        assert!(tmp.path().join("Documents/Archive/Old/inner/a.txt").exists());
    }

    #[tokio::test]
    async fn missing_destination_is_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        std::fs::write(tmp.path().join("Desktop/a.txt"), "x").unwrap();

        let tool = MoveItemTool { dirs };
        let outcome = tool
            .execute(serde_json::json!({
                "current_name": "a.txt",
                "new_destination_path": "NoSuchDir"
            }))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("doesn't exist"));
        assert!(tmp.path().join("Desktop/a.txt").exists());
    }

    #[tokio::test]
    async fn missing_source_is_explanatory() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = MoveItemTool { dirs: dirs_in(&tmp) };

        let outcome = tool
            .execute(serde_json::json!({
                "current_name": "ghost.txt",
                "new_destination_path": "",
                "base_dir_of_destination": "Documents"
            }))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("does not exist"));
    }

    #[tokio::test]
    async fn occupied_target_is_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        std::fs::write(tmp.path().join("Desktop/a.txt"), "new").unwrap();
        std::fs::write(tmp.path().join("Documents/a.txt"), "old").unwrap();

        let tool = MoveItemTool { dirs };
        let outcome = tool
            .execute(serde_json::json!({
                "current_name": "a.txt",
                "new_destination_path": "",
                "base_dir_of_destination": "Documents"
            }))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("Documents/a.txt")).unwrap(),
            "old"
        );
    }
}
