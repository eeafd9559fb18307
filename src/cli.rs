use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "openpeon", version, about = "Rule-driven notification sounds for agent event streams")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, value_name = "DIR", help = "Directory holding openpeon.json, presets/ and sounds/")]
    pub root: Option<PathBuf>,

    #[arg(long, global = true, value_name = "N", help = "Seed for sound and preset selection")]
    pub seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Listen(ListenArgs),
    Dispatch(DispatchArgs),
    Presets,
    Preset(PresetArgs),
    Volume(VolumeArgs),
    Config(ConfigArgs),
    Meta(MetaArgs),
    SystemInfo(SystemInfoArgs),
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[arg(long, help = "Skip the startup sound")]
    pub quiet_start: bool,
}

#[derive(Args, Debug)]
pub struct DispatchArgs {
    #[arg(value_name = "JSON", help = "Host message JSON (read from stdin when omitted)")]
    pub payload: Option<String>,
}

#[derive(Args, Debug)]
pub struct PresetArgs {
    #[arg(value_name = "NAME", help = "Preset to load and summarize")]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct VolumeArgs {
    #[arg(value_name = "LEVEL", allow_negative_numbers = true, help = "Volume from 1 to 10 (clamped)")]
    pub level: i64,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[arg(long, help = "Show current config as JSON")]
    pub show: bool,

    #[arg(long, help = "Create default config file")]
    pub init: bool,

    #[arg(long, help = "Validate configuration")]
    pub validate: bool,
}

#[derive(Args, Debug)]
pub struct MetaArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SystemInfoArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}
