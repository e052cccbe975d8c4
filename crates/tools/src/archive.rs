//! ZIP tools — create an archive from a file/folder and extract one.
//! A missing `.zip` suffix is appended automatically on both sides.

use crate::base_dirs::{BaseDir, BaseDirs};
use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

fn with_zip_suffix(name: &str) -> String {
    if name.to_lowercase().ends_with(".zip") {
        name.to_string()
    } else {
        format!("{name}.zip")
    }
}

pub struct CreateZipTool {
    pub dirs: BaseDirs,
}

impl CreateZipTool {
    /// Archive `source` (file or folder) into `zip_path`. Entry names are
    /// rooted at the source's own name, matching what a desktop archiver
    /// produces.
    fn build_zip(source: &Path, zip_path: &Path) -> Result<(), String> {
        let file = std::fs::File::create(zip_path).map_err(|e| e.to_string())?;
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        let root_name = source
            .file_name()
            .ok_or("source has no file name")?
            .to_string_lossy()
            .into_owned();

        if source.is_file() {
            Self::add_file(&mut writer, source, &root_name, options)?;
        } else {
            Self::add_dir(&mut writer, source, &root_name, options)?;
        }
        writer.finish().map_err(|e| e.to_string())?;
        Ok(())
    }

    fn add_file(
        writer: &mut zip::ZipWriter<std::fs::File>,
        path: &Path,
        entry_name: &str,
        options: SimpleFileOptions,
    ) -> Result<(), String> {
        writer
            .start_file(entry_name, options)
            .map_err(|e| e.to_string())?;
        let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).map_err(|e| e.to_string())?;
        writer.write_all(&buf).map_err(|e| e.to_string())?;
        Ok(())
    }

    fn add_dir(
        writer: &mut zip::ZipWriter<std::fs::File>,
        dir: &Path,
        prefix: &str,
        options: SimpleFileOptions,
    ) -> Result<(), String> {
        writer
            .add_directory(prefix, options)
            .map_err(|e| e.to_string())?;
        for entry in std::fs::read_dir(dir).map_err(|e| e.to_string())? {
            let entry = entry.map_err(|e| e.to_string())?;
            let name = format!("{prefix}/{}", entry.file_name().to_string_lossy());
            if entry.path().is_dir() {
                Self::add_dir(writer, &entry.path(), &name, options)?;
            } else {
                Self::add_file(writer, &entry.path(), &name, options)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Tool for CreateZipTool {
    fn name(&self) -> &str {
        "create_zip"
    }

    fn description(&self) -> &str {
        "Create a ZIP archive from an existing file or folder and save it into a chosen base directory."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "folder_to_zip": {
                    "type": "string",
                    "description": "File or folder name or nested path to archive, e.g. 'Work/2025/Projects'"
                },
                "zip_file_name": {
                    "type": "string",
                    "description": "Name of the zip to create. '.zip' is appended if missing."
                },
                "base_dir_of_folder": BaseDir::schema("Base directory the source lives in (default Desktop)"),
                "base_dir_of_zip": BaseDir::schema("Base directory to save the zip in (default Desktop)")
            },
            "required": ["folder_to_zip", "zip_file_name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let folder = arguments["folder_to_zip"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'folder_to_zip' argument".into()))?;
        let zip_name = arguments["zip_file_name"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'zip_file_name' argument".into()))?;

        let source_base = match BaseDir::parse(arguments["base_dir_of_folder"].as_str()) {
            Ok(base) => base,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };
        let zip_base = match BaseDir::parse(arguments["base_dir_of_zip"].as_str()) {
            Ok(base) => base,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        let zip_name = with_zip_suffix(zip_name);
        let (source, zip_path) = match (
            self.dirs.resolve(source_base, folder),
            self.dirs.resolve(zip_base, &zip_name),
        ) {
            (Ok(s), Ok(z)) => (s, z),
            (Err(msg), _) | (_, Err(msg)) => return Ok(ToolOutcome::failure(msg)),
        };

        if !source.exists() {
            return Ok(ToolOutcome::failure(format!(
                "Error: The item you want to zip does not exist: {}",
                source.display()
            )));
        }

        match Self::build_zip(&source, &zip_path) {
            Ok(()) => Ok(ToolOutcome::ok(format!(
                "Created ZIP successfully at: {}",
                zip_path.display()
            ))),
            Err(e) => Ok(ToolOutcome::failure(format!("Error creating ZIP: {e}"))),
        }
    }
}

pub struct ExtractZipTool {
    pub dirs: BaseDirs,
}

#[async_trait]
impl Tool for ExtractZipTool {
    fn name(&self) -> &str {
        "extract_zip"
    }

    fn description(&self) -> &str {
        "Extract an existing ZIP file into a chosen directory. The target directory is created if missing."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "zip_file_path": {
                    "type": "string",
                    "description": "Name or nested path of the zip file, e.g. 'MyZips/archive.zip'"
                },
                "extract_to": {
                    "type": "string",
                    "description": "Folder or nested path the contents are extracted into. Created automatically if missing."
                },
                "base_dir_of_zip": BaseDir::schema("Base directory the zip lives in (default Desktop)"),
                "base_dir_of_extract_to": BaseDir::schema("Base directory of the extraction target (default Desktop)")
            },
            "required": ["zip_file_path", "extract_to"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let zip_file = arguments["zip_file_path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'zip_file_path' argument".into()))?;
        let extract_to = arguments["extract_to"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'extract_to' argument".into()))?;

        let zip_base = match BaseDir::parse(arguments["base_dir_of_zip"].as_str()) {
            Ok(base) => base,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };
        let extract_base = match BaseDir::parse(arguments["base_dir_of_extract_to"].as_str()) {
            Ok(base) => base,
            Err(msg) => return Ok(ToolOutcome::failure(msg)),
        };

        let zip_file = with_zip_suffix(zip_file);
        let (zip_path, extract_path) = match (
            self.dirs.resolve(zip_base, &zip_file),
            self.dirs.resolve(extract_base, extract_to),
        ) {
            (Ok(z), Ok(e)) => (z, e),
            (Err(msg), _) | (_, Err(msg)) => return Ok(ToolOutcome::failure(msg)),
        };

        if !zip_path.exists() {
            return Ok(ToolOutcome::failure(format!(
                "Error: ZIP file does not exist at: {}",
                zip_path.display()
            )));
        }

        let file = match std::fs::File::open(&zip_path) {
            Ok(file) => file,
            Err(e) => {
                return Ok(ToolOutcome::failure(format!(
                    "Error opening ZIP at {}: {e}",
                    zip_path.display()
                )));
            }
        };

        let mut archive = match zip::ZipArchive::new(file) {
            Ok(archive) => archive,
            Err(_) => {
                return Ok(ToolOutcome::failure(format!(
                    "Error: The file at '{}' is not a valid ZIP archive.",
                    zip_path.display()
                )));
            }
        };

        match archive.extract(&extract_path) {
            Ok(()) => Ok(ToolOutcome::ok(format!(
                "Extracted successfully from '{}' to '{}'",
                zip_path.display(),
                extract_path.display()
            ))),
            Err(e) => Ok(ToolOutcome::failure(format!("Error extracting ZIP: {e}"))),
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
    async fn zip_roundtrip_preserves_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        std::fs::create_dir_all(tmp.path().join("Desktop/Work/sub")).unwrap();
        std::fs::write(tmp.path().join("Desktop/Work/a.txt"), "alpha").unwrap();
        std::fs::write(tmp.path().join("Desktop/Work/sub/b.txt"), "beta").unwrap();

        let create = CreateZipTool { dirs: dirs.clone() };
        let outcome = create
            .execute(serde_json::json!({
                "folder_to_zip": "Work",
                "zip_file_name": "backup",
                "base_dir_of_zip": "Documents"
            }))
            .await
            .unwrap();
        assert!(outcome.success, "{}", outcome.output);
        assert!(tmp.path().join("Documents/backup.zip").is_file());

        let extract = ExtractZipTool { dirs };
        let outcome = extract
            .execute(serde_json::json!({
                "zip_file_path": "backup",
                "extract_to": "Restored",
                "base_dir_of_zip": "Documents",
                "base_dir_of_extract_to": "Documents"
            }))
            .await
            .unwrap();
        assert!(outcome.success, "{}", outcome.output);

        let restored = tmp.path().join("Documents/Restored/Work");
        assert_eq!(std::fs::read_to_string(restored.join("a.txt")).unwrap(), "alpha");
        assert_eq!(
            std::fs::read_to_string(restored.join("sub/b.txt")).unwrap(),
            "beta"
        );
    }

    #[tokio::test]
    async fn zipping_a_single_file_works() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        std::fs::write(tmp.path().join("Desktop/solo.txt"), "one").unwrap();

        let tool = CreateZipTool { dirs };
        let outcome = tool
            .execute(serde_json::json!({
                "folder_to_zip": "solo.txt",
                "zip_file_name": "solo.zip"
            }))
            .await
            .unwrap();

        assert!(outcome.success, "{}", outcome.output);
        assert!(tmp.path().join("Desktop/solo.zip").is_file());
    }

    #[tokio::test]
    async fn missing_source_is_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = CreateZipTool { dirs: dirs_in(&tmp) };

        let outcome = tool
            .execute(serde_json::json!({
                "folder_to_zip": "Nothing",
                "zip_file_name": "x.zip"
            }))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("does not exist"));
    }

    #[tokio::test]
    async fn invalid_archive_is_explanatory() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        std::fs::write(tmp.path().join("Desktop/fake.zip"), "not a zip at all").unwrap();

        let tool = ExtractZipTool { dirs };
        let outcome = tool
            .execute(serde_json::json!({
                "zip_file_path": "fake.zip",
                "extract_to": "Out"
            }))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("not a valid ZIP archive"));
    }

    #[tokio::test]
    async fn missing_zip_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = ExtractZipTool { dirs: dirs_in(&tmp) };

        let outcome = tool
            .execute(serde_json::json!({
                "zip_file_path": "ghost",
                "extract_to": "Out"
            }))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("ghost.zip"));
    }
}
