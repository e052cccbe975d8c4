//! `deskpilot tools` — List the registered tool catalogue.

use deskpilot_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().unwrap_or_default();
    let registry = deskpilot_tools::default_registry(&config)?;

    let mut specs = registry.specs();
    specs.sort_by(|a, b| a.name.cmp(&b.name));

    println!();
    println!("  DeskPilot — {} tools", specs.len());
    println!();
    for spec in specs {
        println!("  {:<22} {}", spec.name, spec.description);
    }
    println!();

    Ok(())
}
