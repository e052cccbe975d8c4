//! System volume tool. The audio stack sits behind [`VolumeBackend`];
//! the range and clamp semantics live here and are what gets tested.

use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};
use std::process::Command;
use std::sync::Arc;

/// Read and set the master output volume, in whole percent.
pub trait VolumeBackend: Send + Sync {
    fn current(&self) -> Result<u8, String>;
    fn set(&self, percent: u8) -> Result<(), String>;
}

/// Backend shelling out to the platform mixer (`pactl` on Linux,
/// `osascript` on macOS).
pub struct SystemVolumeBackend;

impl VolumeBackend for SystemVolumeBackend {
    #[cfg(target_os = "macos")]
    fn current(&self) -> Result<u8, String> {
        let output = Command::new("osascript")
            .args(["-e", "output volume of (get volume settings)"])
            .output()
            .map_err(|e| format!("failed to run osascript: {e}"))?;
        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse()
            .map_err(|e| format!("unexpected osascript output: {e}"))
    }

    #[cfg(target_os = "macos")]
    fn set(&self, percent: u8) -> Result<(), String> {
        let status = Command::new("osascript")
            .args(["-e", &format!("set volume output volume {percent}")])
            .status()
            .map_err(|e| format!("failed to run osascript: {e}"))?;
        if status.success() {
            Ok(())
        } else {
            Err("osascript exited with an error".into())
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn current(&self) -> Result<u8, String> {
        let output = Command::new("pactl")
            .args(["get-sink-volume", "@DEFAULT_SINK@"])
            .output()
            .map_err(|e| format!("failed to run pactl: {e}"))?;
        let text = String::from_utf8_lossy(&output.stdout);
        // "Volume: front-left: 32768 /  50% / ..." -> first "NN%"
        text.split_whitespace()
            .find_map(|token| token.strip_suffix('%').and_then(|n| n.parse().ok()))
            .ok_or_else(|| format!("could not parse pactl output: {}", text.trim()))
    }

    #[cfg(not(target_os = "macos"))]
    fn set(&self, percent: u8) -> Result<(), String> {
        let status = Command::new("pactl")
            .args(["set-sink-volume", "@DEFAULT_SINK@", &format!("{percent}%")])
            .status()
            .map_err(|e| format!("failed to run pactl: {e}"))?;
        if status.success() {
            Ok(())
        } else {
            Err("pactl exited with an error".into())
        }
    }
}

pub struct SetVolumeTool {
    backend: Arc<dyn VolumeBackend>,
}

impl SetVolumeTool {
    pub fn new(backend: Arc<dyn VolumeBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for SetVolumeTool {
    fn name(&self) -> &str {
        "set_volume"
    }

    fn description(&self) -> &str {
        "Set, raise, lower, or report the system volume as a percentage (0 = mute, 100 = full)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["set_to", "increase_by", "decrease_by", "current_vol"],
                    "description": "What to do with the volume"
                },
                "amount": {
                    "type": "integer",
                    "description": "Percentage 0-100. May be omitted when action is 'current_vol'."
                }
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let action = arguments["action"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'action' argument".into()))?;

        if action == "current_vol" {
            return Ok(match self.backend.current() {
                Ok(current) => {
                    ToolOutcome::ok(format!("The current system volume is {current}%."))
                }
                Err(e) => ToolOutcome::failure(format!(
                    "An error occurred while retrieving the current volume: {e}"
                )),
            });
        }

        let amount = match arguments["amount"].as_i64() {
            Some(amount) => amount,
            None => {
                return Ok(ToolOutcome::failure(
                    "An amount is required for this action. Provide a value between 0 and 100.",
                ));
            }
        };
        if !(0..=100).contains(&amount) {
            return Ok(ToolOutcome::failure(format!(
                "Enter a value between 0-100 inclusive. {amount}% is invalid."
            )));
        }
        let amount = amount as i32;

        let current = match self.backend.current() {
            Ok(current) => current as i32,
            Err(e) => {
                return Ok(ToolOutcome::failure(format!(
                    "An error occurred while controlling volume: {e}"
                )));
            }
        };

        let (target, message) = match action {
            "set_to" => (
                amount,
                format!("Previous volume was {current}%. Volume set to {amount}% successfully."),
            ),
            "increase_by" => {
                let target = current + amount;
                if target > 100 {
                    return Ok(ToolOutcome::failure(format!(
                        "Volume cannot be increased by {amount}%. Current: {current}%. Max allowed: 100%."
                    )));
                }
                (
                    target,
                    format!(
                        "Previous volume was {current}%. Volume increased by {amount}%. New volume: {target}%."
                    ),
                )
            }
            "decrease_by" => {
                let target = current - amount;
                if target < 0 {
                    return Ok(ToolOutcome::failure(format!(
                        "Volume cannot be decreased by {amount}%. Current: {current}%. Min allowed: 0%."
                    )));
                }
                (
                    target,
                    format!(
                        "Previous volume was {current}%. Volume decreased by {amount}%. New volume: {target}%."
                    ),
                )
            }
            other => {
                return Ok(ToolOutcome::failure(format!(
                    "Invalid action '{other}'. Use 'set_to', 'increase_by', 'decrease_by', or 'current_vol'."
                )));
            }
        };

        match self.backend.set(target as u8) {
            Ok(()) => Ok(ToolOutcome::ok(message)),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "An error occurred while controlling volume: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeVolume {
        level: Mutex<u8>,
    }

    impl VolumeBackend for FakeVolume {
        fn current(&self) -> Result<u8, String> {
            Ok(*self.level.lock().unwrap())
        }
        fn set(&self, percent: u8) -> Result<(), String> {
            *self.level.lock().unwrap() = percent;
            Ok(())
        }
    }

    fn tool_at(level: u8) -> (SetVolumeTool, Arc<FakeVolume>) {
        let backend = Arc::new(FakeVolume {
            level: Mutex::new(level),
        });
        (SetVolumeTool::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn set_to_reports_previous_and_new() {
        let (tool, backend) = tool_at(30);
        let outcome = tool
            .execute(serde_json::json!({"action": "set_to", "amount": 55}))
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.output.contains("Previous volume was 30%"));
        assert!(outcome.output.contains("set to 55%"));
        assert_eq!(backend.current().unwrap(), 55);
    }

    #[tokio::test]
    async fn increase_past_full_is_refused() {
        let (tool, backend) = tool_at(80);
        let outcome = tool
            .execute(serde_json::json!({"action": "increase_by", "amount": 30}))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("Max allowed: 100%"));
        assert_eq!(backend.current().unwrap(), 80);
    }

    #[tokio::test]
    async fn decrease_below_zero_is_refused() {
        let (tool, _) = tool_at(10);
        let outcome = tool
            .execute(serde_json::json!({"action": "decrease_by", "amount": 25}))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("Min allowed: 0%"));
    }

    #[tokio::test]
    async fn out_of_range_amount_is_explanatory() {
        let (tool, _) = tool_at(50);
        let outcome = tool
            .execute(serde_json::json!({"action": "set_to", "amount": 150}))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("150% is invalid"));
    }

    #[tokio::test]
    async fn current_vol_needs_no_amount() {
        let (tool, _) = tool_at(42);
        let outcome = tool
            .execute(serde_json::json!({"action": "current_vol"}))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.output, "The current system volume is 42%.");
    }

    #[tokio::test]
    async fn unknown_action_is_explanatory() {
        let (tool, _) = tool_at(42);
        let outcome = tool
            .execute(serde_json::json!({"action": "mute_forever", "amount": 1}))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.output.contains("Invalid action"));
    }
}
