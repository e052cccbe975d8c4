//! `deskpilot chat` — Interactive session or single-message mode.
//!
//! The loop serializes rounds naturally: one utterance in, one answer
//! out. `/new` resets the session in place; `exit` or Ctrl+C quits.
//! Gateway failures get distinct advice per kind, and an authentication
//! failure clears the stored key so the next start re-prompts.

use deskpilot_agent::Dispatcher;
use deskpilot_config::AppConfig;
use deskpilot_core::error::{Error, ProviderError};
use deskpilot_core::event::{DomainEvent, EventBus};
use deskpilot_core::persona::Persona;
use deskpilot_core::turn::Session;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if config.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No Gemini API key configured!");
        eprintln!();
        eprintln!("  Either run `deskpilot onboard`, or set one of:");
        eprintln!("    DESKPILOT_API_KEY");
        eprintln!("    GEMINI_API_KEY");
        eprintln!();
        eprintln!("  Get a key at: https://aistudio.google.com/apikey");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = deskpilot_providers::build_from_config(&config)?;
    let tools = Arc::new(deskpilot_tools::default_registry(&config)?);
    let tool_count = tools.len();
    let persona = Persona::new("DeskPilot", &config.user_name);
    let event_bus = Arc::new(EventBus::default());

    let dispatcher = Dispatcher::new(
        provider,
        &config.default_model,
        config.default_temperature,
        tools,
        persona,
        event_bus.clone(),
    )
    .with_max_iterations(config.max_iterations);
    let dispatcher = if config.default_max_tokens > 0 {
        dispatcher.with_max_tokens(config.default_max_tokens)
    } else {
        dispatcher
    };

    let session = Mutex::new(Session::new());

    if let Some(text) = message {
        eprint!("  Thinking...");
        let result = dispatcher.submit(&session, text).await;
        eprint!("\r              \r");
        match result {
            Ok(outcome) => println!("{}", outcome.answer),
            Err(e) => {
                report_round_error(&e, &config);
                return Err("Round failed. See above.".into());
            }
        }
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║          DeskPilot — Interactive Mode        ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:   {}", config.default_model);
    println!("  Tools:   {tool_count} available (`deskpilot tools` to list)");
    println!("  User:    {}", config.user_name);
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type '/new' for a fresh session, 'exit' or Ctrl+C to quit.");
    println!();

    let stdin = std::io::stdin();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line {
            "" => continue,
            "exit" | "quit" => break,
            "/new" => {
                let mut locked = session.lock().await;
                locked.reset();
                event_bus.publish(DomainEvent::session_reset(locked.id.to_string()));
                drop(locked);
                println!();
                println!("  Session cleared. Starting fresh.");
                println!();
                continue;
            }
            _ => {}
        }

        eprint!("  ...");
        let result = dispatcher.submit(&session, line).await;
        eprint!("\r     \r");

        match result {
            Ok(outcome) => {
                println!();
                for answer_line in outcome.answer.lines() {
                    println!("  DeskPilot > {answer_line}");
                }
                println!();
            }
            Err(e) => {
                report_round_error(&e, &config);
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

/// Print what went wrong and what to do about it. An authentication
/// failure also clears the stored key so the next start re-prompts.
fn report_round_error(error: &Error, config: &AppConfig) {
    eprintln!("  [Error] {error}");

    let Error::Provider(provider_error) = error else {
        return;
    };

    match provider_error {
        ProviderError::RateLimited { retry_after_secs } => {
            eprintln!(
                "  The model is rate limited. Wait {retry_after_secs}s and resend, or switch \
                 to a different model with DESKPILOT_MODEL."
            );
        }
        ProviderError::AuthenticationFailed(_) => {
            let mut config = config.clone();
            match config.clear_api_key() {
                Ok(()) => eprintln!(
                    "  The stored API key was invalid and has been cleared. Run \
                     `deskpilot onboard` to set a new one."
                ),
                Err(e) => eprintln!("  Could not clear the stored API key: {e}"),
            }
        }
        ProviderError::InvalidRequest(_) => {
            eprintln!(
                "  The model rejected the request. If this persists, try a different model \
                 with DESKPILOT_MODEL."
            );
        }
        ProviderError::Unavailable { .. } | ProviderError::Network(_) | ProviderError::Timeout(_) => {
            eprintln!("  The model service seems unreachable. Check your connection and resend.");
        }
        ProviderError::NotConfigured(_) => {
            eprintln!("  Run `deskpilot onboard` to configure the assistant.");
        }
    }
}
