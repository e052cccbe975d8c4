//! Open a terminal with a command pre-typed but not executed. The user
//! reviews the command and presses Enter themselves.

use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};
use std::process::Command;
use std::sync::Arc;

/// Spawn a terminal window with `command` sitting on the prompt line,
/// unexecuted.
pub trait TerminalBackend: Send + Sync {
    fn open_with_command(&self, shell: &str, command: &str) -> Result<(), String>;
}

/// Backend spawning the desktop's terminal emulator with a readline
/// prompt pre-filled with the command.
pub struct SystemTerminalBackend;

impl TerminalBackend for SystemTerminalBackend {
    fn open_with_command(&self, shell: &str, command: &str) -> Result<(), String> {
        // read -e -i pre-fills the line; eval runs it only after Enter.
        let script = format!(
            "read -e -p '$ ' -i {} line && eval \"$line\"; exec {shell}",
            shell_quote(command)
        );

        let emulator = if cfg!(target_os = "macos") {
            "Terminal"
        } else {
            "x-terminal-emulator"
        };

        let spawn = if cfg!(target_os = "macos") {
            Command::new("osascript")
                .args([
                    "-e",
                    &format!("tell application \"Terminal\" to do script \"{script}\""),
                ])
                .spawn()
        } else {
            Command::new(emulator)
                .args(["-e", "bash", "-c", &script])
                .spawn()
        };

        spawn
            .map(|_| ())
            .map_err(|e| format!("could not open {emulator}: {e}"))
    }
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

pub struct WriteInTerminalTool {
    backend: Arc<dyn TerminalBackend>,
}

impl WriteInTerminalTool {
    pub fn new(backend: Arc<dyn TerminalBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for WriteInTerminalTool {
    fn name(&self) -> &str {
        "write_in_terminal"
    }

    fn description(&self) -> &str {
        "Open a terminal with the given command typed in but NOT executed. The user presses Enter to run it."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "where_to_write": {
                    "type": "string",
                    "enum": ["terminal", "bash", "zsh"],
                    "description": "Which shell to open (default terminal)"
                },
                "what_to_write": {
                    "type": "string",
                    "description": "The exact command to pre-type in the terminal"
                }
            },
            "required": ["what_to_write"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let command = arguments["what_to_write"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'what_to_write' argument".into()))?;
        let shell = match arguments["where_to_write"].as_str().unwrap_or("terminal") {
            "zsh" => "zsh",
            _ => "bash",
        };

        if command.trim().is_empty() {
            return Ok(ToolOutcome::failure("There is no command to write."));
        }

        match self.backend.open_with_command(shell, command) {
            Ok(()) => Ok(ToolOutcome::ok(format!(
                "I opened a terminal and typed `{command}`. Press Enter there to execute it. \
                 Also explain to the user what this command does."
            ))),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "An error occurred while writing: {e}"
            ))),
        }
    }
}
