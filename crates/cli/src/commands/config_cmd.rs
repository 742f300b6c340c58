//! `veloce config`: Configuration management commands.

use veloce_config::AppConfig;

const REDACTED: &str = "***";

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let warnings = warnings(&config);
            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Endpoint:  {}", config.model.api_url);
            println!("   Models:    {} / {}", config.model.text_model, config.model.vision_model);
            println!("   Storage:   {}", config.storage.backend);
            println!("   Location:  {}", config.location.provider);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Non-fatal problems: features that will be disabled at runtime.
fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if !config.has_api_key() {
        warnings.push("No API key set (set GROQ_API_KEY or VELOCE_API_KEY env var)");
    }
    if config.weather.api_key.is_none() {
        warnings.push("No weather API key; prompts will carry Unknown weather");
    }
    if config.music.api_key.is_none() {
        warnings.push("No YouTube API key; music commands are disabled");
    }
    if config.sos.enabled && !config.sos.is_configured() {
        warnings.push("SOS enabled but Twilio credentials are incomplete");
    }
    warnings
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&redacted(config))?;
    println!("{toml_str}");
    Ok(())
}

fn redacted(mut config: AppConfig) -> AppConfig {
    let mask = |secret: &mut Option<String>| {
        if secret.is_some() {
            *secret = Some(REDACTED.into());
        }
    };
    mask(&mut config.model.api_key);
    mask(&mut config.weather.api_key);
    mask(&mut config.music.api_key);
    mask(&mut config.sos.auth_token);
    config
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}
