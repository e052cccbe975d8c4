//! Folder tools — create, rename, and safe-delete folders under a base
//! directory. Deletion moves the folder into the trash directory rather
//! than unlinking it.

use crate::base_dirs::{BaseDir, BaseDirs};
use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};

fn str_arg<'a>(arguments: &'a serde_json::Value, name: &str) -> Result<&'a str, ToolError> {
    arguments[name]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{name}' argument")))
}

pub struct CreateFolderTool {
    pub dirs: BaseDirs,
}

#[async_trait]
impl Tool for CreateFolderTool {
    fn name(&self) -> &str {
        "create_folder"
    }

    fn description(&self) -> &str {
        "Create a new folder (including nested subfolders) in a chosen base directory inside the user's home."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name_of_folder": {
                    "type": "string",
                    "description": "Folder name or nested path to create, e.g. 'ProjectA/UI/Components'"
                },
                "where_to_create": BaseDir::schema("Base directory to create the folder in (default Desktop)")
            },
            "required": ["name_of_folder"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let name = str_arg(&arguments, "name_of_folder")?;
        let base = match BaseDir::parse(arguments["where_to_create"].as_str()) {
            Ok(base) => base,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        let path = match self.dirs.resolve(base, name) {
            Ok(path) => path,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        if path.exists() {
            return Ok(ToolOutcome::failure(format!(
                "A folder already exists at: {}",
                path.display()
            )));
        }

        match tokio::fs::create_dir_all(&path).await {
            Ok(()) => Ok(ToolOutcome::ok(format!(
                "Folder created successfully at: {}",
                path.display()
            ))),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "Error creating folder at {}: {e}",
                path.display()
            ))),
        }
    }
}

pub struct RenameFolderTool {
    pub dirs: BaseDirs,
}

#[async_trait]
impl Tool for RenameFolderTool {
    fn name(&self) -> &str {
        "rename_folder"
    }

    fn description(&self) -> &str {
        "Rename an existing folder inside a chosen base directory."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "old_name": {
                    "type": "string",
                    "description": "Current folder name or nested path"
                },
                "new_name": {
                    "type": "string",
                    "description": "New folder name or nested path"
                },
                "where_to_rename": BaseDir::schema("Base directory the folder lives in (default Desktop)")
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

        let (old_path, new_path) = match (
            self.dirs.resolve(base, old_name),
            self.dirs.resolve(base, new_name),
        ) {
            (Ok(old), Ok(new)) => (old, new),
            (Err(msg), _) | (_, Err(msg)) => return Ok(ToolOutcome::failure(msg)),
        };

        if !old_path.exists() {
            return Ok(ToolOutcome::failure(format!(
                "Error: Folder not found at: {}",
                old_path.display()
            )));
        }
        if new_path.exists() {
            return Ok(ToolOutcome::failure(format!(
                "Error: A folder already exists at: {}",
                new_path.display()
            )));
        }

        match tokio::fs::rename(&old_path, &new_path).await {
            Ok(()) => Ok(ToolOutcome::ok(format!(
                "Folder renamed successfully from: {} to: {}",
                old_path.display(),
                new_path.display()
            ))),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "Error renaming folder at {}: {e}",
                old_path.display()
            ))),
        }
    }
}

pub struct DeleteFolderTool {
    pub dirs: BaseDirs,
}

#[async_trait]
impl Tool for DeleteFolderTool {
    fn name(&self) -> &str {
        "delete_folder"
    }

    fn description(&self) -> &str {
        "Safe-delete a folder from a chosen base directory: it is moved to the trash, not permanently removed."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name_of_folder": {
                    "type": "string",
                    "description": "Folder name or nested path to delete"
                },
                "where_to_delete": BaseDir::schema("Base directory the folder lives in (default Desktop)")
            },
            "required": ["name_of_folder"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let name = str_arg(&arguments, "name_of_folder")?;
        let base = match BaseDir::parse(arguments["where_to_delete"].as_str()) {
            Ok(base) => base,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        let path = match self.dirs.resolve(base, name) {
            Ok(path) => path,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        if !path.is_dir() {
            return Ok(ToolOutcome::failure(format!(
                "Error: No folder found at: {}",
                path.display()
            )));
        }

        match self.dirs.send_to_trash(&path) {
            Ok(_) => Ok(ToolOutcome::ok(format!(
                "Folder moved to trash: {}",
                path.display()
            ))),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "Error deleting folder at {}: {e}",
                path.display()
            ))),
        }
    }
}
