//! `mcpgate status`: Show the effective configuration.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let file = super::config_file(config_path);
    let backends = &config.backends;

    println!("mcpgate Status");
    println!("==============");
    println!("  Config file:  {}", file.display());
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!(
        "  Remote:       {}",
        config.remote.active_url().unwrap_or("disabled")
    );
    println!(
        "  Timeouts:     remote {}s, probe {}ms, client {}s",
        config.remote.timeout_secs,
        config.remote.probe_timeout_ms,
        config.router.client_timeout_secs
    );
    println!(
        "  Probe cache:  {}s{}",
        config.remote.probe_ttl_secs,
        config
            .remote
            .probe_interval()
            .map(|i| format!(", refresh every {}s", i.as_secs()))
            .unwrap_or_default()
    );
    println!("  Clients:");
    println!("    supabase    {}", configured(backends.supabase.is_some()));
    println!("    notion      {}", configured(backends.notion.is_some()));
    println!("    youtube     {}", configured(backends.youtube.enabled));

    if file.exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file: using defaults (run `mcpgate init` to create one)");
    }

    Ok(())
}

fn configured(yes: bool) -> &'static str {
    if yes { "configured" } else { "stub only" }
}
