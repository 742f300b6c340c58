//! `veloce chat`: Interactive or single-message chat mode.

use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};
use veloce_assistant::{Session, SessionError, TurnOutcome};
use veloce_config::AppConfig;
use veloce_providers::builder::backend_name;
use veloce_providers::transcription::load_wav;

use super::{runtime, status};

pub async fn run(
    vehicle: Option<i64>,
    message: Option<String>,
    image: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = runtime::load_config()?;

    // Check for API key early
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export GROQ_API_KEY=gsk_...      (recommended)");
        eprintln!("    export OPENAI_API_KEY=sk-...     (OpenAI-compatible endpoint)");
        eprintln!("    export VELOCE_API_KEY=...        (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let store = runtime::open_store(&config).await?;
    let vehicle_id = runtime::pick_vehicle(store.as_ref(), vehicle, &config).await?;
    let mut session = runtime::build_session(&config, store)?;
    session.select_vehicle(vehicle_id).await?;

    if let Some(path) = image {
        session.attach_image(runtime::load_image(&path).await?);
    }

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let outcome = session.submit_text(&msg).await;
        eprint!("\r              \r");
        if let Some(text) = outcome?.text() {
            println!("{text}");
        }
        return Ok(());
    }

    // Interactive mode
    let vehicle_name = session
        .vehicle()
        .map(|v| v.display_name())
        .unwrap_or_default();
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Veloce AI — Vehicle Assistant         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Backend:   {}", backend_name(&config.model.api_url));
    println!("  Model:     {} / {}", config.model.text_model, config.model.vision_model);
    println!("  Vehicle:   {vehicle_name}");
    println!();
    println!("  Type your message and press Enter. Commands:");
    println!("    /vehicles         list vehicles");
    println!("    /vehicle <id>     switch vehicle");
    println!("    /status           vehicle telemetry");
    println!("    /image <path>     attach an image");
    println!("    /clear-image      remove the image from the conversation");
    println!("    /voice <wav>      send a recorded voice message");
    println!("    /exit             quit");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            prompt()?;
            continue;
        }
        if matches!(input, "/exit" | "/quit" | "exit") {
            break;
        }

        if let Some(command) = input.strip_prefix('/') {
            if let Err(e) = slash_command(&mut session, command).await {
                eprintln!("  [Error] {e}");
            }
        } else {
            eprint!("  ...");
            let outcome = session.submit_text(input).await;
            eprint!("\r     \r");
            print_outcome(outcome);
        }

        prompt()?;
    }

    println!("  Goodbye!");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_outcome(outcome: Result<TurnOutcome, SessionError>) {
    match outcome {
        Ok(TurnOutcome::NoSpeech) => {
            println!("  No speech detected. Please try again.");
        }
        Ok(turn) => {
            println!();
            for line in turn.text().unwrap_or_default().lines() {
                println!("  Veloce > {line}");
            }
            println!();
        }
        Err(e) => {
            eprintln!("  [Error] {e}");
            println!();
        }
    }
}

async fn slash_command(
    session: &mut Session,
    command: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "vehicles" => {
            let current = session.vehicle().map(|v| v.id);
            for v in session.store().list_vehicles().await? {
                let marker = if Some(v.id) == current { " *" } else { "" };
                println!("  [{}] {v}{marker}", v.id);
            }
        }
        "vehicle" => {
            let id: i64 = arg
                .parse()
                .map_err(|_| format!("Usage: /vehicle <id> (got '{arg}')"))?;
            let vehicle = session.select_vehicle(id).await?;
            println!("  ✅ Now talking about the {}", vehicle.display_name());
        }
        "status" => {
            let id = session.vehicle().map(|v| v.id).ok_or("No vehicle selected")?;
            print!("{}", status::report(session.store().as_ref(), id).await?);
            let controls = session.controller();
            println!(
                "   Lights: {}  Doors: {}  Engine: {}",
                on_off(controls.lights_on()),
                if controls.doors_locked() { "LOCKED" } else { "UNLOCKED" },
                on_off(controls.engine_on()),
            );
        }
        "image" => {
            if arg.is_empty() {
                return Err("Usage: /image <path>".into());
            }
            session.attach_image(runtime::load_image(Path::new(arg)).await?);
            println!("  🖼️  Image attached to following messages");
        }
        "clear-image" => {
            session.clear_image();
            println!("  ✅ Image cleared from the conversation");
        }
        "voice" => {
            if arg.is_empty() {
                return Err("Usage: /voice <file.wav>".into());
            }
            let clip = load_wav(Path::new(arg)).map_err(|e| format!("Cannot read {arg}: {e}"))?;
            match session.transcribe(&clip).await? {
                Some(text) => {
                    println!("  🎤 You said: {text}");
                    print_outcome(session.submit_text(&text).await);
                }
                None => print_outcome(Ok(TurnOutcome::NoSpeech)),
            }
        }
        other => return Err(format!("Unknown command: /{other}").into()),
    }
    Ok(())
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}
