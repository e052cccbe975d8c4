//! Screen brightness tool. Levels are percentages in multiples of 10;
//! the display stack sits behind [`BrightnessBackend`].

use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};
use std::process::Command;
use std::sync::Arc;

/// Read and set the primary display's brightness, in whole percent.
pub trait BrightnessBackend: Send + Sync {
    fn current(&self) -> Result<u8, String>;
    fn set(&self, percent: u8) -> Result<(), String>;
}

/// Backend shelling out to `brightnessctl`.
pub struct SystemBrightnessBackend;

impl BrightnessBackend for SystemBrightnessBackend {
    fn current(&self) -> Result<u8, String> {
        let output = Command::new("brightnessctl")
            .args(["-m", "info"])
            .output()
            .map_err(|e| format!("failed to run brightnessctl: {e}"))?;
        let text = String::from_utf8_lossy(&output.stdout);
        // Machine format: device,class,current,percent%,max
        text.split(',')
            .find_map(|field| field.trim().strip_suffix('%').and_then(|n| n.parse().ok()))
            .ok_or_else(|| format!("could not parse brightnessctl output: {}", text.trim()))
    }

    fn set(&self, percent: u8) -> Result<(), String> {
        let status = Command::new("brightnessctl")
            .args(["set", &format!("{percent}%")])
            .status()
            .map_err(|e| format!("failed to run brightnessctl: {e}"))?;
        if status.success() {
            Ok(())
        } else {
            Err("brightnessctl exited with an error".into())
        }
    }
}

pub struct SetBrightnessTool {
    backend: Arc<dyn BrightnessBackend>,
}

impl SetBrightnessTool {
    pub fn new(backend: Arc<dyn BrightnessBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for SetBrightnessTool {
    fn name(&self) -> &str {
        "set_brightness"
    }

    fn description(&self) -> &str {
        "Set, raise, lower, or report the screen brightness as a percentage in multiples of 10 (0, 10, ..., 100)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["set_to", "increase_by", "decrease_by", "current_brt"],
                    "description": "What to do with the brightness"
                },
                "level": {
                    "type": "integer",
                    "description": "Percentage as a multiple of 10 (0, 10, 20, ..., 100)"
                }
            },
            "required": ["action", "level"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let action = arguments["action"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'action' argument".into()))?;

        if !matches!(action, "set_to" | "increase_by" | "decrease_by" | "current_brt") {
            return Ok(ToolOutcome::failure(format!(
                "Invalid action '{action}'. Use 'set_to', 'increase_by', 'decrease_by', or 'current_brt'."
            )));
        }

        let level = arguments["level"].as_i64().unwrap_or(0);
        if !(0..=100).contains(&level) || level % 10 != 0 {
            return Ok(ToolOutcome::failure(format!(
                "Enter a value between 0-100 inclusive in multiples of 10. {level}% is invalid."
            )));
        }
        let level = level as i32;

        let current = match self.backend.current() {
            Ok(current) => current as i32,
            Err(e) => {
                return Ok(ToolOutcome::failure(format!(
                    "An error occurred while controlling brightness: {e}"
                )));
            }
        };

        if action == "current_brt" {
            return Ok(ToolOutcome::ok(format!(
                "The current system brightness is {current}%."
            )));
        }

        let target = match action {
            "set_to" => level,
            "increase_by" => (current + level).min(100),
            _ => (current - level).max(0),
        };

        if let Err(e) = self.backend.set(target as u8) {
            return Ok(ToolOutcome::failure(format!(
                "An error occurred while controlling brightness: {e}"
            )));
        }

        let message = match action {
            "set_to" => format!(
                "Previous brightness was {current}%. Brightness set to {level}% successfully."
            ),
            "increase_by" => format!(
                "Previous brightness was {current}%. Brightness increased by {level}%. New brightness: {target}%."
            ),
            _ => format!(
                "Previous brightness was {current}%. Brightness decreased by {level}%. New brightness: {target}%."
            ),
        };
        Ok(ToolOutcome::ok(message))
    }
}
