pub mod adapters;
pub mod admin;
pub mod audio;
pub mod cli;
pub mod config;
pub mod engine;
pub mod events;
pub mod gate;
pub mod matcher;
pub mod store;
pub mod system;

use adapters::HostMessage;
use anyhow::Context;
use audio::ProcessSink;
use cli::{Cli, Commands};
use config::{Config, Layout};
use engine::Engine;
use std::fs::OpenOptions;
use std::io::{BufRead, Read};
use std::sync::Mutex;
use store::MappingStore;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::prelude::*;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    setup_tracing(cli.verbose);

    let layout = Layout::resolve(cli.root).context("resolve openpeon root")?;

    match cli.command {
        Commands::Listen(args) => listen(&layout, cli.seed, args),
        Commands::Dispatch(args) => dispatch(&layout, cli.seed, args),
        Commands::Presets => presets(&layout),
        Commands::Preset(args) => preset(&layout, args),
        Commands::Volume(args) => volume(&layout, args),
        Commands::Config(args) => config_cmd(&layout, args),
        Commands::Meta(args) => meta(args),
        Commands::SystemInfo(args) => system_info(args),
    }
}

/// Either variable turns on the append-only debug log.
const DEBUG_ENV_VARS: &[&str] = &["OPENPEON_DEBUG", "OPENCODE_PEON_DEBUG"];

/// Logs go to stderr, since stdout carries replies to the host. With
/// `OPENPEON_DEBUG` set, debug lines are also appended to the debug log.
fn setup_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let stderr = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let debug_file = DEBUG_ENV_VARS
        .iter()
        .find_map(|name| std::env::var_os(name))
        .and_then(|_| config::debug_log_path())
        .and_then(|path| {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            OpenOptions::new().create(true).append(true).open(path).ok()
        })
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::DEBUG)
        });

    tracing_subscriber::registry()
        .with(stderr)
        .with(debug_file)
        .init();
}

fn build_engine(layout: &Layout, seed: Option<u64>) -> Engine {
    let store = MappingStore::open(layout);
    let sink = ProcessSink::detect(layout.sounds_dir());
    let engine = Engine::new(store, sink);
    match seed {
        Some(seed) => engine.with_seed(seed),
        None => engine,
    }
}

fn listen(layout: &Layout, seed: Option<u64>, args: cli::ListenArgs) -> anyhow::Result<()> {
    let mut engine = build_engine(layout, seed);
    if args.quiet_start {
        if engine.store().config().wants_random_preset() {
            engine.apply_random_preset();
        }
    } else {
        engine.boot();
    }
    tracing::debug!(root = %layout.root.display(), "listening");

    let mut stdin = std::io::stdin().lock();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = stdin
            .read_until(b'\n', &mut buf)
            .context("read host message")?;
        if read == 0 {
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(err) => {
                tracing::warn!(error = ?err, "malformed host message; skipping");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        handle_line(&mut engine, line);
    }

    Ok(())
}

fn dispatch(layout: &Layout, seed: Option<u64>, args: cli::DispatchArgs) -> anyhow::Result<()> {
    let payload = match args.payload.or_else(read_stdin_json) {
        Some(payload) => payload,
        None => {
            tracing::warn!("no payload provided; skipping");
            return Ok(());
        }
    };

    let mut engine = build_engine(layout, seed);
    if engine.store().config().wants_random_preset() {
        engine.apply_random_preset();
    }
    handle_line(&mut engine, &payload);
    Ok(())
}

fn handle_line(engine: &mut Engine, line: &str) {
    match adapters::parse_message(line) {
        Ok(Some(HostMessage::Stimulus(stimulus))) => {
            engine.handle(&stimulus);
        }
        Ok(Some(HostMessage::Command(command))) => {
            println!("{}", admin::execute(engine, &command));
        }
        Ok(None) => tracing::debug!("message not recognized; skipping"),
        Err(err) => tracing::warn!(error = ?err, "malformed host message; skipping"),
    }
}

fn presets(layout: &Layout) -> anyhow::Result<()> {
    let store = MappingStore::open(layout);
    let names = store.list_presets();
    if names.is_empty() {
        println!("No presets in {}", layout.presets_dir().display());
        return Ok(());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn preset(layout: &Layout, args: cli::PresetArgs) -> anyhow::Result<()> {
    let store = MappingStore::open(layout);
    let preset = store
        .load_preset(&args.name)
        .with_context(|| format!("load preset {}", args.name))?;

    println!("Preset: {}", args.name);
    println!("Volume: {}", preset.volume);
    for mapping in &preset.mappings {
        println!(
            "- {} ({} triggers, {} sounds)",
            mapping.name,
            mapping.triggers.len(),
            mapping.sounds.len()
        );
    }
    Ok(())
}

fn volume(layout: &Layout, args: cli::VolumeArgs) -> anyhow::Result<()> {
    let mut store = MappingStore::open(layout);
    let applied = store.set_volume(args.level).context("save volume")?;
    println!("Volume set to {applied}");
    Ok(())
}

fn config_cmd(layout: &Layout, args: cli::ConfigArgs) -> anyhow::Result<()> {
    let path = layout.config_path();

    if args.init {
        Config::init_default(&path)?;
        println!("Initialized config at {}", path.display());
        return Ok(());
    }

    if args.show {
        let config = Config::load_or_default(&path);
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if args.validate {
        let config = Config::load_from_path(&path)?;
        config.validate()?;
        println!("Config OK");
        return Ok(());
    }

    println!("{}", path.display());
    Ok(())
}

fn meta(args: cli::MetaArgs) -> anyhow::Result<()> {
    if args.json {
        let value = serde_json::json!({
            "triggerTypes": events::TRIGGER_TYPES,
            "eventValues": events::KNOWN_EVENTS,
            "toolValues": events::KNOWN_TOOLS,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Trigger types: {}", events::TRIGGER_TYPES.join(", "));
    println!("Events:");
    for name in events::KNOWN_EVENTS {
        println!("- {name}");
    }
    println!("Tools:");
    for name in events::KNOWN_TOOLS {
        println!("- {name}");
    }
    Ok(())
}

fn system_info(args: cli::SystemInfoArgs) -> anyhow::Result<()> {
    let info = system::detect();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("OS: {}", info.os);
    println!("Arch: {}", info.arch);
    println!(
        "Audio: {}",
        if info.audio_supported { "supported" } else { "unsupported" }
    );
    match info.player {
        Some(player) => println!("Player: {}", player.display()),
        None => println!("Player: not found"),
    }

    Ok(())
}

fn read_stdin_json() -> Option<String> {
    let mut input = String::new();
    let mut stdin = std::io::stdin();
    if stdin.read_to_string(&mut input).is_ok() {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    } else {
        None
    }
}
