//! Reset stored preferences: delete the config file so the next startup
//! runs onboarding again.

use async_trait::async_trait;
use deskpilot_config::AppConfig;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};

pub struct ResetPreferencesTool;

#[async_trait]
impl Tool for ResetPreferencesTool {
    fn name(&self) -> &str {
        "reset_preferences"
    }

    fn description(&self) -> &str {
        "Remove the stored user name and API keys. The next start of the application asks for them again."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        match AppConfig::reset() {
            Ok(true) => Ok(ToolOutcome::ok(
                "User preferences deleted successfully. Restart the application to set new preferences.",
            )),
            Ok(false) => Ok(ToolOutcome::ok(
                "No stored preferences were found. Restart the application to create them.",
            )),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "Could not delete preferences: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_definition() {
        let tool = ResetPreferencesTool;
        assert_eq!(tool.name(), "reset_preferences");
        assert!(tool.parameters_schema()["properties"].is_object());
    }
}
