//! `veloce doctor`: Diagnose configuration, storage and services.

use veloce_config::AppConfig;
use veloce_providers::builder::backend_name;

use super::runtime;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Veloce Doctor — System Diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    // Check config
    let config_path = AppConfig::config_path();
    if !config_path.exists() {
        println!("  ⚠️  No config file — run `veloce onboard` (using defaults)");
        issues += 1;
    }
    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 blocking issue found. Fix the config and re-run doctor.");
            return Ok(());
        }
    };

    // Check chat model
    if config.has_api_key() {
        println!(
            "  ✅ Chat model: {} via {}",
            config.model.text_model,
            backend_name(&config.model.api_url)
        );
    } else {
        println!("  ❌ No API key — set GROQ_API_KEY or add model.api_key to config.toml");
        issues += 1;
    }

    // Check storage
    match runtime::open_store(&config).await {
        Ok(store) => match store.list_vehicles().await {
            Ok(vehicles) => println!(
                "  ✅ Storage ({}): {} vehicle(s)",
                store.name(),
                vehicles.len()
            ),
            Err(e) => {
                println!("  ❌ Storage query failed: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Storage unavailable: {e}");
            issues += 1;
        }
    }

    // Optional services
    if config.weather.api_key.is_some() {
        println!("  ✅ Weather: OpenWeatherMap");
    } else {
        println!("  ⚠️  Weather disabled — set OPENWEATHERMAP_API_KEY");
        issues += 1;
    }

    println!("  ✅ Location: {}", config.location.provider);

    if config.music.api_key.is_some() {
        println!("  ✅ Music: YouTube (player `{}`)", config.music.player_command);
    } else {
        println!("  ⚠️  Music disabled — set YOUTUBE_API_KEY");
        issues += 1;
    }

    if !config.sos.enabled {
        println!("  ⚠️  SOS alerts turned off in config");
        issues += 1;
    } else if config.sos.is_configured() {
        println!("  ✅ SOS alerts: Twilio");
    } else {
        println!("  ⚠️  SOS alerts disabled — set TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, TWILIO_PHONE_NUMBER");
        issues += 1;
    }

    if config.speech.speak_replies {
        println!("  ✅ Spoken replies via `{}`", config.speech.tts_command);
    } else {
        println!("  ✅ Spoken replies off");
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
