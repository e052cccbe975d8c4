//! Read on-screen text: screenshot plus OCR, behind [`OcrBackend`].
//! Unavailability of the capture or OCR utilities is an explanatory
//! failure string, never a crash.

use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};
use std::process::Command;
use std::sync::Arc;

/// Language names the model may pass, with their OCR engine codes.
const LANGUAGES: &[(&str, &str)] = &[
    ("English", "eng"),
    ("Arabic", "ara"),
    ("Chinese (Simplified)", "chi_sim"),
    ("Chinese (Traditional)", "chi_tra"),
    ("Czech", "ces"),
    ("Danish", "dan"),
    ("Dutch", "nld"),
    ("Finnish", "fin"),
    ("French", "fra"),
    ("German", "deu"),
    ("Greek", "ell"),
    ("Hungarian", "hun"),
    ("Italian", "ita"),
    ("Japanese", "jpn"),
    ("Korean", "kor"),
    ("Polish", "pol"),
    ("Portuguese", "por"),
    ("Russian", "rus"),
    ("Spanish", "spa"),
    ("Swedish", "swe"),
    ("Turkish", "tur"),
    ("Ukrainian", "ukr"),
    ("Vietnamese", "vie"),
];

fn language_code(name: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(lang, _)| *lang == name)
        .map(|(_, code)| *code)
}

/// Capture the active screen and return its recognized text.
pub trait OcrBackend: Send + Sync {
    fn capture_and_read(&self, language_code: &str) -> Result<String, String>;
}

/// Backend shelling out to the platform screenshot utility and `tesseract`.
pub struct SystemOcrBackend;

impl OcrBackend for SystemOcrBackend {
    fn capture_and_read(&self, language_code: &str) -> Result<String, String> {
        let dir = tempfile_dir()?;
        let image = dir.join("screen.png");

        let capture = if cfg!(target_os = "macos") {
            Command::new("screencapture").arg(&image).status()
        } else {
            // Wayland first, X11 fallback.
            Command::new("grim")
                .arg(&image)
                .status()
                .or_else(|_| Command::new("import").args(["-window", "root"]).arg(&image).status())
        };
        match capture {
            Ok(status) if status.success() => {}
            Ok(_) => return Err("screenshot utility exited with an error".into()),
            Err(e) => return Err(format!("no screenshot utility available: {e}")),
        }

        let output = Command::new("tesseract")
            .arg(&image)
            .arg("stdout")
            .args(["-l", language_code])
            .output()
            .map_err(|e| format!("tesseract is not available: {e}"))?;
        let _ = std::fs::remove_file(&image);

        if !output.status.success() {
            return Err(format!(
                "OCR failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn tempfile_dir() -> Result<std::path::PathBuf, String> {
    let dir = std::env::temp_dir().join("deskpilot-ocr");
    std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    Ok(dir)
}

pub struct ReadScreenTextTool {
    backend: Arc<dyn OcrBackend>,
}

impl ReadScreenTextTool {
    pub fn new(backend: Arc<dyn OcrBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for ReadScreenTextTool {
    fn name(&self) -> &str {
        "read_screen_text"
    }

    fn description(&self) -> &str {
        "Capture a screenshot of the active screen and extract its text with OCR."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let names: Vec<&str> = LANGUAGES.iter().map(|(name, _)| *name).collect();
        serde_json::json!({
            "type": "object",
            "properties": {
                "language": {
                    "type": "string",
                    "enum": names,
                    "description": "Language of the on-screen text (default English)"
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let language = arguments["language"].as_str().unwrap_or("English");
        let Some(code) = language_code(language) else {
            return Ok(ToolOutcome::failure(format!(
                "Unsupported OCR language: '{language}'."
            )));
        };

        match self.backend.capture_and_read(code) {
            Ok(text) if text.is_empty() => {
                Ok(ToolOutcome::ok("No text was recognized on the screen."))
            }
            Ok(text) => Ok(ToolOutcome::ok(text)),
            Err(e) => Ok(ToolOutcome::failure(format!("OCR Error: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeOcr {
        result: Result<String, String>,
    }

    impl OcrBackend for FakeOcr {
        fn capture_and_read(&self, language_code: &str) -> Result<String, String> {
            self.result
                .clone()
                .map(|text| format!("[{language_code}] {text}"))
        }
    }

    #[tokio::test]
    async fn default_language_is_english() {
        let tool = ReadScreenTextTool::new(Arc::new(FakeOcr {
            result: Ok("hello world".into()),
        }));
        let outcome = tool.execute(serde_json::json!({})).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.output, "[eng] hello world");
    }

    #[tokio::test]
    async fn language_maps_to_engine_code() {
        let tool = ReadScreenTextTool::new(Arc::new(FakeOcr {
            result: Ok("bonjour".into()),
        }));
        let outcome = tool
            .execute(serde_json::json!({"language": "French"}))
            .await
            .unwrap();
        assert_eq!(outcome.output, "[fra] bonjour");
    }

    #[tokio::test]
    async fn unsupported_language_is_refused() {
        let tool = ReadScreenTextTool::new(Arc::new(FakeOcr {
            result: Ok(String::new()),
        }));
        let outcome = tool
            .execute(serde_json::json!({"language": "Klingon"}))
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.output.contains("Unsupported OCR language"));
    }

    #[tokio::test]
    async fn backend_failure_is_explanatory() {
        let tool = ReadScreenTextTool::new(Arc::new(FakeOcr {
            result: Err("tesseract is not available".into()),
        }));
        let outcome = tool.execute(serde_json::json!({})).await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.output.contains("OCR Error"));
    }
}
