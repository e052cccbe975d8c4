//! File tools — create/write, rename, and safe-delete files under a base
//! directory. File names must carry an extension; deletion goes to trash.

use crate::base_dirs::{BaseDir, BaseDirs};
use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};

fn str_arg<'a>(arguments: &'a serde_json::Value, name: &str) -> Result<&'a str, ToolError> {
    arguments[name]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{name}' argument")))
}

fn has_extension(name: &str) -> bool {
    std::path::Path::new(name)
        .file_name()
        .is_some_and(|f| f.to_string_lossy().contains('.'))
}

pub struct CreateOrWriteFileTool {
    pub dirs: BaseDirs,
}

#[async_trait]
impl Tool for CreateOrWriteFileTool {
    fn name(&self) -> &str {
        "create_or_write_file"
    }

    fn description(&self) -> &str {
        "Create a new file or overwrite an existing one inside a chosen base directory. The file name must include an extension."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_name": {
                    "type": "string",
                    "description": "Name of the file including its extension, e.g. 'notes.txt' or 'script.py'"
                },
                "content": {
                    "type": "string",
                    "description": "Text content to write. Replaces existing content. Defaults to empty."
                },
                "where_to_create": BaseDir::schema("Base directory to create the file in (default Desktop)"),
                "inwhich_folder_to_create": {
                    "type": "string",
                    "description": "Optional subfolder within the base directory, e.g. 'Projects/2025/Notes'"
                }
            },
            "required": ["file_name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let file_name = str_arg(&arguments, "file_name")?;
        let content = arguments["content"].as_str().unwrap_or("");
        let base = match BaseDir::parse(arguments["where_to_create"].as_str()) {
            Ok(base) => base,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        if !has_extension(file_name) {
            return Ok(ToolOutcome::failure(
                "Error: File extension missing. Please include a file extension such as .txt, .py, .json etc.",
            ));
        }

        let relative = match arguments["inwhich_folder_to_create"].as_str() {
            Some(folder) if !folder.is_empty() => format!("{folder}/{file_name}"),
            _ => file_name.to_string(),
        };
        let path = match self.dirs.resolve(base, &relative) {
            Ok(path) => path,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        if let Some(parent) = path.parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            return Ok(ToolOutcome::failure(format!(
                "Error creating parent folder for {}: {e}",
                path.display()
            )));
        }

        match tokio::fs::write(&path, content).await {
            Ok(()) => Ok(ToolOutcome::ok(format!(
                "File created or updated successfully at: {}",
                path.display()
            ))),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "Error creating or writing to file at {}: {e}",
                path.display()
            ))),
        }
    }
}

pub struct RenameFileTool {
    pub dirs: BaseDirs,
}

#[async_trait]
impl Tool for RenameFileTool {
    fn name(&self) -> &str {
        "rename_file"
    }

    fn description(&self) -> &str {
        "Rename an existing file inside a chosen base directory. Both names must include extensions."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "old_name": {
                    "type": "string",
                    "description": "Current file name including extension"
                },
                "new_name": {
                    "type": "string",
                    "description": "New file name including extension"
                },
                "where_to_rename": BaseDir::schema("Base directory the file lives in (default Desktop)")
            },
            "required": ["old_name", "new_name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let old_name = str_arg(&arguments, "old_name")?;
        let new_name = str_arg(&arguments, "new_name")?;
        let base = match BaseDir::parse(arguments["where_to_rename"].as_str()) {
            Ok(base) => base,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        if !has_extension(old_name) {
            return Ok(ToolOutcome::failure(
                "Error: File extension missing in old_name. Please include a valid extension.",
            ));
        }
        if !has_extension(new_name) {
            return Ok(ToolOutcome::failure(
                "Error: File extension missing in new_name. Please include a valid extension.",
            ));
        }

        let (old_path, new_path) = match (
            self.dirs.resolve(base, old_name),
            self.dirs.resolve(base, new_name),
        ) {
            (Ok(old), Ok(new)) => (old, new),
            (Err(msg), _) | (_, Err(msg)) => return Ok(ToolOutcome::failure(msg)),
        };

        if !old_path.exists() {
            return Ok(ToolOutcome::failure(format!(
                "Error: File not found at: {}",
                old_path.display()
            )));
        }
        if new_path.exists() {
            return Ok(ToolOutcome::failure(format!(
                "Error: A file already exists at: {}",
                new_path.display()
            )));
        }

        match tokio::fs::rename(&old_path, &new_path).await {
            Ok(()) => Ok(ToolOutcome::ok(format!(
                "File renamed successfully from: {} to: {}",
                old_path.display(),
                new_path.display()
            ))),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "Error renaming file at {}: {e}",
                old_path.display()
            ))),
        }
    }
}

pub struct DeleteFileTool {
    pub dirs: BaseDirs,
}

#[async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &str {
        "delete_file"
    }

    fn description(&self) -> &str {
        "Safe-delete a file from a chosen base directory: it is moved to the trash, not permanently removed."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_name": {
                    "type": "string",
                    "description": "Name of the file to delete, including extension"
                },
                "base_dir_of": BaseDir::schema("Base directory the file lives in (default Desktop)")
            },
            "required": ["file_name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let file_name = str_arg(&arguments, "file_name")?;
        let base = match BaseDir::parse(arguments["base_dir_of"].as_str()) {
            Ok(base) => base,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        if !has_extension(file_name) {
            return Ok(ToolOutcome::failure(
                "Error: File extension missing. Please include a valid extension such as .txt or .py",
            ));
        }

        let path = match self.dirs.resolve(base, file_name) {
            Ok(path) => path,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        if !path.is_file() {
            return Ok(ToolOutcome::failure(format!(
                "Error: No file found at: {}",
                path.display()
            )));
        }

        match self.dirs.send_to_trash(&path) {
            Ok(_) => Ok(ToolOutcome::ok(format!(
                "File moved to trash: {}",
                path.display()
            ))),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "Error deleting file at {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs_in(tmp: &tempfile::TempDir) -> BaseDirs {
        std::fs::create_dir_all(tmp.path().join("Desktop")).unwrap();
        BaseDirs::with_roots(tmp.path(), tmp.path().join(".trash"))
    }

    #[tokio::test]
    async fn create_writes_content() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = CreateOrWriteFileTool { dirs: dirs_in(&tmp) };

        let outcome = tool
            .execute(serde_json::json!({
                "file_name": "notes.txt",
                "content": "groceries: milk"
            }))
            .await
            .unwrap();

        assert!(outcome.success);
        let written = std::fs::read_to_string(tmp.path().join("Desktop/notes.txt")).unwrap();
        assert_eq!(written, "groceries: milk");
    }

    #[tokio::test]
    async fn create_in_subfolder_makes_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = CreateOrWriteFileTool { dirs: dirs_in(&tmp) };

        let outcome = tool
            .execute(serde_json::json!({
                "file_name": "plan.md",
                "inwhich_folder_to_create": "Projects/2025"
            }))
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(tmp.path().join("Desktop/Projects/2025/plan.md").is_file());
    }

    #[tokio::test]
    async fn missing_extension_is_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = CreateOrWriteFileTool { dirs: dirs_in(&tmp) };

        let outcome = tool
            .execute(serde_json::json!({"file_name": "notes"}))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("extension missing"));
    }

    #[tokio::test]
    async fn overwrite_replaces_content() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        std::fs::write(tmp.path().join("Desktop/old.txt"), "before").unwrap();

        let tool = CreateOrWriteFileTool { dirs };
        tool.execute(serde_json::json!({"file_name": "old.txt", "content": "after"}))
            .await
            .unwrap();

        let written = std::fs::read_to_string(tmp.path().join("Desktop/old.txt")).unwrap();
        assert_eq!(written, "after");
    }

    #[tokio::test]
    async fn rename_requires_extensions_on_both_names() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = RenameFileTool { dirs: dirs_in(&tmp) };

        let outcome = tool
            .execute(serde_json::json!({"old_name": "a.txt", "new_name": "b"}))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("new_name"));
    }

    #[tokio::test]
    async fn delete_moves_file_to_trash() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        std::fs::write(tmp.path().join("Desktop/bye.txt"), "data").unwrap();

        let tool = DeleteFileTool { dirs };
        let outcome = tool
            .execute(serde_json::json!({"file_name": "bye.txt", "base_dir_of": "Desktop"}))
            .await
            .unwrap();

        assert!(outcome.success, "{}", outcome.output);
        assert!(!tmp.path().join("Desktop/bye.txt").exists());
        assert!(tmp.path().join(".trash/bye.txt").exists());
    }

    #[tokio::test]
    async fn delete_missing_file_is_explanatory() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = DeleteFileTool { dirs: dirs_in(&tmp) };

        let outcome = tool
            .execute(serde_json::json!({"file_name": "ghost.txt"}))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("No file found"));
    }
}
