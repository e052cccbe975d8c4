//! Base-directory resolution shared by the filesystem tools.
//!
//! Every filesystem tool addresses paths relative to a closed set of base
//! directories under the user's home. Resolution is lexical (targets may
//! not exist yet) and contained: a resolved path that escapes the home
//! directory is refused.

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// The closed set of base directories a tool may address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BaseDir {
    Desktop,
    Documents,
    Downloads,
    Pictures,
    Videos,
    Music,
    Home,
}

impl BaseDir {
    /// The subdirectory under home, empty for `Home` itself.
    pub fn subdir(&self) -> &'static str {
        match self {
            Self::Desktop => "Desktop",
            Self::Documents => "Documents",
            Self::Downloads => "Downloads",
            Self::Pictures => "Pictures",
            Self::Videos => "Videos",
            Self::Music => "Music",
            Self::Home => "",
        }
    }

    /// Parse from the model-facing string, defaulting to Desktop.
    pub fn parse(value: Option<&str>) -> Result<Self, String> {
        match value {
            None => Ok(Self::Desktop),
            Some("Desktop") => Ok(Self::Desktop),
            Some("Documents") => Ok(Self::Documents),
            Some("Downloads") => Ok(Self::Downloads),
            Some("Pictures") => Ok(Self::Pictures),
            Some("Videos") => Ok(Self::Videos),
            Some("Music") => Ok(Self::Music),
            Some("Home") => Ok(Self::Home),
            Some(other) => Err(format!(
                "Unknown base directory '{other}'. Use Desktop, Documents, Downloads, Pictures, Videos, Music, or Home."
            )),
        }
    }

    /// JSON-schema fragment for a base-directory argument.
    pub fn schema(description: &str) -> serde_json::Value {
        serde_json::json!({
            "type": "string",
            "enum": ["Desktop", "Documents", "Downloads", "Pictures", "Videos", "Music", "Home"],
            "description": description
        })
    }
}

/// The roots filesystem tools operate within.
///
/// Production tools are built from the real home directory; tests point
/// `home` and `trash` into a tempdir.
#[derive(Debug, Clone)]
pub struct BaseDirs {
    home: PathBuf,
    trash: PathBuf,
}

impl BaseDirs {
    pub fn system() -> Self {
        let home = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
        Self {
            trash: deskpilot_config::AppConfig::trash_dir(),
            home,
        }
    }

    pub fn with_roots(home: impl Into<PathBuf>, trash: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            trash: trash.into(),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Resolve `relative` under `base`, refusing escapes from home.
    ///
    /// Lexical normalization only: `..` components pop, and the final path
    /// must still sit under the home directory.
    pub fn resolve(&self, base: BaseDir, relative: &str) -> Result<PathBuf, String> {
        let mut path = self.home.clone();
        if !base.subdir().is_empty() {
            path.push(base.subdir());
        }

        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !path.pop() || !path.starts_with(&self.home) {
                        return Err(format!(
                            "Path '{relative}' escapes the home directory and was refused."
                        ));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(format!(
                        "Absolute paths are not allowed; '{relative}' must be relative to {base:?}."
                    ));
                }
            }
        }

        if !path.starts_with(&self.home) {
            return Err(format!(
                "Path '{relative}' escapes the home directory and was refused."
            ));
        }
        Ok(path)
    }

    /// Move a file or directory into the trash directory instead of
    /// unlinking it. Collisions get a timestamp suffix.
    pub fn send_to_trash(&self, path: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.trash)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "item".into());
        let mut target = self.trash.join(&name);
        if target.exists() {
            target = self
                .trash
                .join(format!("{name}.{}", chrono::Utc::now().timestamp_millis()));
        }

        match std::fs::rename(path, &target) {
            Ok(()) => Ok(target),
            // Cross-device rename: fall back to copy + remove.
            Err(_) if path.is_file() => {
                std::fs::copy(path, &target)?;
                std::fs::remove_file(path)?;
                Ok(target)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs_in(tmp: &tempfile::TempDir) -> BaseDirs {
        BaseDirs::with_roots(tmp.path(), tmp.path().join(".trash"))
    }

    #[test]
    fn resolves_under_named_base() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        let path = dirs.resolve(BaseDir::Documents, "Projects/plan.md").unwrap();
        assert_eq!(path, tmp.path().join("Documents/Projects/plan.md"));
    }

    #[test]
    fn home_base_has_no_subdir() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        let path = dirs.resolve(BaseDir::Home, "notes.txt").unwrap();
        assert_eq!(path, tmp.path().join("notes.txt"));
    }

    #[test]
    fn traversal_out_of_home_is_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        let err = dirs.resolve(BaseDir::Desktop, "../../etc/passwd").unwrap_err();
        assert!(err.contains("escapes"));
    }

    #[test]
    fn absolute_paths_are_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        assert!(dirs.resolve(BaseDir::Desktop, "/etc/passwd").is_err());
    }

    #[test]
    fn parent_components_inside_home_are_fine() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);
        let path = dirs.resolve(BaseDir::Desktop, "a/../b").unwrap();
        assert_eq!(path, tmp.path().join("Desktop/b"));
    }

    #[test]
    fn unknown_base_name_rejected() {
        assert!(BaseDir::parse(Some("SecretVault")).is_err());
        assert_eq!(BaseDir::parse(None).unwrap(), BaseDir::Desktop);
    }

    #[test]
    fn trash_keeps_collisions_apart() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(&tmp);

        let a = tmp.path().join("a.txt");
        std::fs::write(&a, "one").unwrap();
        let first = dirs.send_to_trash(&a).unwrap();

        std::fs::write(&a, "two").unwrap();
        let second = dirs.send_to_trash(&a).unwrap();

        assert!(first.exists());
        assert!(second.exists());
        assert_ne!(first, second);
    }
}
