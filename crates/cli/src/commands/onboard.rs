//! `deskpilot onboard` — First-time setup wizard.
//!
//! Captures the user's name and API keys and writes config.toml. Re-run
//! any time; existing values are kept when the prompt is left empty.

use deskpilot_config::AppConfig;
use std::io::Write;

fn prompt(label: &str, current: Option<&str>) -> Result<Option<String>, std::io::Error> {
    match current {
        Some(_) => print!("  {label} [keep current]: "),
        None => print!("  {label}: "),
    }
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let line = line.trim();
    if line.is_empty() {
        Ok(current.map(str::to_string))
    } else {
        Ok(Some(line.to_string()))
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("  DeskPilot — First-Time Setup");
    println!("  ============================");
    println!();

    let mut config = AppConfig::load().unwrap_or_default();

    if let Some(name) = prompt("Your name", Some(&config.user_name))? {
        config.user_name = name;
    }
    config.api_key = prompt("Gemini API key", config.api_key.as_deref())?;
    config.search_api_key = prompt("Tavily API key (optional)", config.search_api_key.as_deref())?;

    if config.api_key.is_none() {
        println!();
        println!("  No Gemini API key was provided. Chat will not work until one is set.");
        println!("  Get a key at: https://aistudio.google.com/apikey");
    }

    config.save()?;
    println!();
    println!("  Saved config to: {}", AppConfig::config_path().display());
    println!("  Run `deskpilot chat` to start.");
    println!();

    Ok(())
}
