//! Built-in tool implementations for DeskPilot.
//!
//! Tools are the assistant's hands: application windows, volume and
//! brightness, files and folders, archives, the terminal, the screen,
//! and the web. Each returns a plain human-readable string the model
//! consumes directly, on success and on failure alike.

pub mod app_window;
pub mod archive;
pub mod base_dirs;
pub mod brightness;
pub mod file_ops;
pub mod folder_ops;
pub mod move_item;
pub mod open_browser;
pub mod preferences;
pub mod read_file;
pub mod screen_text;
pub mod terminal;
pub mod volume;
pub mod web_scrape;
pub mod web_search;

use app_window::{OpenAppTool, SystemWindowBackend, WindowAction, WindowActionTool};
use base_dirs::BaseDirs;
use brightness::{SetBrightnessTool, SystemBrightnessBackend};
use deskpilot_config::AppConfig;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::ToolRegistry;
use open_browser::{OpenBrowserTool, SystemBrowserOpener};
use screen_text::{ReadScreenTextTool, SystemOcrBackend};
use std::sync::Arc;
use terminal::{SystemTerminalBackend, WriteInTerminalTool};
use volume::{SetVolumeTool, SystemVolumeBackend};

/// Build the full tool catalogue with system backends.
///
/// Duplicate names fail construction; the registry is read-only after
/// this returns.
pub fn default_registry(config: &AppConfig) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    let dirs = BaseDirs::system();
    let windows: Arc<SystemWindowBackend> = Arc::new(SystemWindowBackend);

    registry.register(Box::new(OpenAppTool::new(windows.clone())))?;
    for action in [
        WindowAction::Close,
        WindowAction::Minimize,
        WindowAction::Maximize,
        WindowAction::Restore,
        WindowAction::Activate,
    ] {
        registry.register(Box::new(WindowActionTool::new(windows.clone(), action)))?;
    }

    registry.register(Box::new(SetVolumeTool::new(Arc::new(SystemVolumeBackend))))?;
    registry.register(Box::new(SetBrightnessTool::new(Arc::new(
        SystemBrightnessBackend,
    ))))?;

    registry.register(Box::new(folder_ops::CreateFolderTool { dirs: dirs.clone() }))?;
    registry.register(Box::new(folder_ops::RenameFolderTool { dirs: dirs.clone() }))?;
    registry.register(Box::new(folder_ops::DeleteFolderTool { dirs: dirs.clone() }))?;
    registry.register(Box::new(file_ops::CreateOrWriteFileTool { dirs: dirs.clone() }))?;
    registry.register(Box::new(file_ops::RenameFileTool { dirs: dirs.clone() }))?;
    registry.register(Box::new(file_ops::DeleteFileTool { dirs: dirs.clone() }))?;
    registry.register(Box::new(move_item::MoveItemTool { dirs: dirs.clone() }))?;
    registry.register(Box::new(archive::CreateZipTool { dirs: dirs.clone() }))?;
    registry.register(Box::new(archive::ExtractZipTool { dirs: dirs.clone() }))?;
    registry.register(Box::new(read_file::ReadFileTool { dirs }))?;

    registry.register(Box::new(OpenBrowserTool::new(Arc::new(SystemBrowserOpener))))?;
    registry.register(Box::new(ReadScreenTextTool::new(Arc::new(SystemOcrBackend))))?;
    registry.register(Box::new(WriteInTerminalTool::new(Arc::new(
        SystemTerminalBackend,
    ))))?;

    registry.register(Box::new(web_search::InternetSearchTool::new(
        config.search_api_key.clone(),
    )))?;
    registry.register(Box::new(web_scrape::WebScrapeTool::new(
        config.search_api_key.clone(),
    )))?;

    registry.register(Box::new(preferences::ResetPreferencesTool))?;

    Ok(registry)
}
