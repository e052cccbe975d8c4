//! Application window tools — open, close, minimize, maximize, restore,
//! and switch. Window enumeration and manipulation sit behind
//! [`WindowBackend`]; the matching policy lives here.

use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};
use std::process::Command;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    Close,
    Minimize,
    Maximize,
    Restore,
    Activate,
}

/// The platform window layer.
pub trait WindowBackend: Send + Sync {
    /// Launch an application by name, returning the name it resolved to.
    fn launch(&self, name: &str) -> Result<String, String>;

    /// Titles of all currently open windows.
    fn window_titles(&self) -> Result<Vec<String>, String>;

    /// Apply an action to the window with exactly this title.
    fn perform(&self, title: &str, action: WindowAction) -> Result<(), String>;
}

/// Pick the open-window title that best matches a query.
///
/// Case-insensitive containment either way; ties go to the shorter title.
pub fn best_match<'a>(query: &str, titles: &'a [String]) -> Option<&'a String> {
    let query = query.to_lowercase();
    titles
        .iter()
        .filter(|title| {
            let title = title.to_lowercase();
            title.contains(&query) || query.contains(title.trim())
        })
        .min_by_key(|title| title.len())
}

/// Backend shelling out to `wmctrl` / `xdotool`.
pub struct SystemWindowBackend;

impl WindowBackend for SystemWindowBackend {
    fn launch(&self, name: &str) -> Result<String, String> {
        let program = name.trim().to_lowercase().replace(' ', "-");
        Command::new(&program)
            .spawn()
            .map(|_| name.trim().to_string())
            .map_err(|e| format!("could not launch '{program}': {e}"))
    }

    fn window_titles(&self) -> Result<Vec<String>, String> {
        let output = Command::new("wmctrl")
            .arg("-l")
            .output()
            .map_err(|e| format!("failed to run wmctrl: {e}"))?;
        // wmctrl -l: "0x04000003  0 host Title words here"
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| line.splitn(4, char::is_whitespace).nth(3))
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .collect())
    }

    fn perform(&self, title: &str, action: WindowAction) -> Result<(), String> {
        let status = match action {
            WindowAction::Close => Command::new("wmctrl").args(["-c", title]).status(),
            WindowAction::Activate => Command::new("wmctrl").args(["-a", title]).status(),
            WindowAction::Maximize => Command::new("wmctrl")
                .args(["-r", title, "-b", "add,maximized_vert,maximized_horz"])
                .status(),
            WindowAction::Restore => Command::new("wmctrl")
                .args(["-r", title, "-b", "remove,maximized_vert,maximized_horz"])
                .status(),
            WindowAction::Minimize => Command::new("xdotool")
                .args(["search", "--name", title, "windowminimize"])
                .status(),
        };
        let status = status.map_err(|e| format!("failed to run window utility: {e}"))?;
        if status.success() {
            Ok(())
        } else {
            Err("window utility exited with an error".into())
        }
    }
}

fn window_name_schema(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "window_name": {
                "type": "string",
                "description": description
            }
        },
        "required": ["window_name"]
    })
}

fn window_name_arg(arguments: &serde_json::Value) -> Result<&str, ToolError> {
    arguments["window_name"]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments("Missing 'window_name' argument".into()))
}

pub struct OpenAppTool {
    backend: Arc<dyn WindowBackend>,
}

impl OpenAppTool {
    pub fn new(backend: Arc<dyn WindowBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for OpenAppTool {
    fn name(&self) -> &str {
        "open_app"
    }

    fn description(&self) -> &str {
        "Open a desktop application by name. Any name is accepted, recognized or not."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        window_name_schema("Name of the application or executable to open")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let name = window_name_arg(&arguments)?;
        match self.backend.launch(name) {
            Ok(resolved) => Ok(ToolOutcome::ok(format!(
                "'{resolved}' has been opened successfully."
            ))),
            Err(e) => Ok(ToolOutcome::failure(format!("Failed to open '{name}': {e}"))),
        }
    }
}

/// One tool per window action, sharing the match-then-perform shape.
pub struct WindowActionTool {
    backend: Arc<dyn WindowBackend>,
    action: WindowAction,
}

impl WindowActionTool {
    pub fn new(backend: Arc<dyn WindowBackend>, action: WindowAction) -> Self {
        Self { backend, action }
    }

    fn verb(&self) -> &'static str {
        match self.action {
            WindowAction::Close => "closed",
            WindowAction::Minimize => "minimized",
            WindowAction::Maximize => "maximized",
            WindowAction::Restore => "restored",
            WindowAction::Activate => "active now",
        }
    }
}

#[async_trait]
impl Tool for WindowActionTool {
    fn name(&self) -> &str {
        match self.action {
            WindowAction::Close => "close_app",
            WindowAction::Minimize => "minimize_app",
            WindowAction::Maximize => "maximize_app",
            WindowAction::Restore => "restore_app",
            WindowAction::Activate => "switch_app",
        }
    }

    fn description(&self) -> &str {
        match self.action {
            WindowAction::Close => "Close the desktop window whose title best matches the given name.",
            WindowAction::Minimize => "Minimize the desktop window whose title best matches the given name.",
            WindowAction::Maximize => "Maximize the desktop window whose title best matches the given name.",
            WindowAction::Restore => "Restore a minimized or maximized desktop window.",
            WindowAction::Activate => "Switch to the desktop window whose title best matches the given name, like alt+tab.",
        }
    }

    fn parameters_schema(&self) -> serde_json::Value {
        window_name_schema("Full or partial title of the target window")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let query = window_name_arg(&arguments)?;

        let titles = match self.backend.window_titles() {
            Ok(titles) => titles,
            Err(e) => {
                return Ok(ToolOutcome::failure(format!(
                    "Could not list open windows: {e}"
                )));
            }
        };

        let Some(title) = best_match(query, &titles) else {
            return Ok(ToolOutcome::failure(format!(
                "No window found with a title close to '{query}'"
            )));
        };

        match self.backend.perform(title, self.action) {
            Ok(()) => Ok(ToolOutcome::ok(format!("{title} was {}", self.verb()))),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "Could not act on window '{title}': {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted window layer recording performed actions.
    struct FakeWindows {
        titles: Vec<String>,
        performed: Mutex<Vec<(String, WindowAction)>>,
    }

    impl FakeWindows {
        fn with_titles(titles: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                titles: titles.iter().map(|s| s.to_string()).collect(),
                performed: Mutex::new(Vec::new()),
            })
        }
    }

    impl WindowBackend for FakeWindows {
        fn launch(&self, name: &str) -> Result<String, String> {
            if name == "brokenapp" {
                Err("no such executable".into())
            } else {
                Ok(name.to_string())
            }
        }

        fn window_titles(&self) -> Result<Vec<String>, String> {
            Ok(self.titles.clone())
        }

        fn perform(&self, title: &str, action: WindowAction) -> Result<(), String> {
            self.performed
                .lock()
                .unwrap()
                .push((title.to_string(), action));
            Ok(())
        }
    }

    #[test]
    fn best_match_prefers_containment() {
        let titles = vec![
            "Mozilla Firefox".to_string(),
            "notes.txt - Editor".to_string(),
            "Terminal".to_string(),
        ];
        assert_eq!(best_match("firefox", &titles).unwrap(), "Mozilla Firefox");
        assert_eq!(best_match("TERMINAL", &titles).unwrap(), "Terminal");
        assert!(best_match("slack", &titles).is_none());
    }

    #[tokio::test]
    async fn close_matches_partial_title() {
        let backend = FakeWindows::with_titles(&["Mozilla Firefox", "Terminal"]);
        let tool = WindowActionTool::new(backend.clone(), WindowAction::Close);

        let outcome = tool
            .execute(serde_json::json!({"window_name": "firefox"}))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.output, "Mozilla Firefox was closed");
        assert_eq!(
            *backend.performed.lock().unwrap(),
            vec![("Mozilla Firefox".to_string(), WindowAction::Close)]
        );
    }

    #[tokio::test]
    async fn unmatched_window_is_explanatory() {
        let backend = FakeWindows::with_titles(&["Terminal"]);
        let tool = WindowActionTool::new(backend, WindowAction::Minimize);

        let outcome = tool
            .execute(serde_json::json!({"window_name": "spotify"}))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("No window found"));
    }

    #[tokio::test]
    async fn switch_activates_window() {
        let backend = FakeWindows::with_titles(&["notes.txt - Editor"]);
        let tool = WindowActionTool::new(backend.clone(), WindowAction::Activate);

        let outcome = tool
            .execute(serde_json::json!({"window_name": "notes"}))
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.output.contains("active now"));
        assert_eq!(
            backend.performed.lock().unwrap()[0].1,
            WindowAction::Activate
        );
    }

    #[tokio::test]
    async fn open_reports_launch_failure() {
        let backend = FakeWindows::with_titles(&[]);
        let tool = OpenAppTool::new(backend);

        let ok = tool
            .execute(serde_json::json!({"window_name": "calculator"}))
            .await
            .unwrap();
        assert!(ok.success);
        assert!(ok.output.contains("opened successfully"));

        let failed = tool
            .execute(serde_json::json!({"window_name": "brokenapp"}))
            .await
            .unwrap();
        assert!(!failed.success);
        assert!(failed.output.contains("Failed to open"));
    }

    #[tokio::test]
    async fn each_action_has_a_distinct_name() {
        let backend = FakeWindows::with_titles(&[]);
        let tools: Vec<WindowActionTool> = [
            WindowAction::Close,
            WindowAction::Minimize,
            WindowAction::Maximize,
            WindowAction::Restore,
            WindowAction::Activate,
        ]
        .into_iter()
        .map(|action| WindowActionTool::new(backend.clone(), action))
        .collect();
        let names: Vec<&str> = tools.iter().map(|tool| tool.name()).collect();
        assert_eq!(
            names,
            vec!["close_app", "minimize_app", "maximize_app", "restore_app", "switch_app"]
        );
    }
}
