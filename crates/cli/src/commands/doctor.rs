//! `deskpilot doctor` — Diagnose configuration and gateway health.

use deskpilot_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("  DeskPilot Doctor — Diagnostics");
    println!("  ==============================");
    println!();

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  [ok]   Config file valid: {}", config_path.display());
                Some(config)
            }
            Err(e) => {
                println!("  [fail] Config file invalid: {e}");
                issues += 1;
                None
            }
        }
    } else {
        // Env vars can still carry the keys.
        println!("  [warn] No config file — run `deskpilot onboard`");
        AppConfig::load().ok()
    };

    if let Some(config) = config {
        if config.has_api_key() {
            println!("  [ok]   Gemini API key configured");

            match deskpilot_providers::build_from_config(&config) {
                Ok(provider) => {
                    print!("  ...    Checking gateway reachability");
                    use std::io::Write;
                    std::io::stdout().flush()?;
                    let health = provider.health_check().await;
                    print!("\r");
                    match health {
                        Ok(true) => {
                            println!("  [ok]   Gateway reachable ({})", config.default_model);
                        }
                        Ok(false) => {
                            println!("  [fail] Gateway unreachable or key rejected");
                            issues += 1;
                        }
                        Err(e) => {
                            println!("  [fail] Gateway check failed: {e}");
                            issues += 1;
                        }
                    }
                }
                Err(e) => {
                    println!("  [fail] Could not build provider: {e}");
                    issues += 1;
                }
            }
        } else {
            println!("  [fail] No Gemini API key — run `deskpilot onboard`");
            issues += 1;
        }

        if config.has_search_api_key() {
            println!("  [ok]   Tavily search key configured");
        } else {
            println!("  [warn] No Tavily key — internet_search and web_scrape will refuse");
        }

        match deskpilot_tools::default_registry(&config) {
            Ok(registry) => println!("  [ok]   Tool catalogue: {} tools", registry.len()),
            Err(e) => {
                println!("  [fail] Tool catalogue failed to build: {e}");
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }
    println!();

    Ok(())
}
