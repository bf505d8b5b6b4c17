//! soe - SOE frame builder
//!
//! Builds packets and messages from hex input and prints the exact wire bytes.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use soe_protocol::SoeOpCode;
use soe_session::{Config, Connection, SessionError};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "soe")]
#[command(about = "Build SOE protocol frames and print their wire bytes")]
#[command(version)]
struct Cli {
    /// YAML config file with session parameters (defaults to $SOE_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print frames as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Build a transport packet
    Packet {
        /// Opcode (name, decimal or 0x hex)
        #[arg(short, long, value_parser = parse_opcode)]
        opcode: u16,

        /// Packet body as hex, without the opcode
        #[arg(short, long, default_value = "")]
        data: String,

        /// Do not request compression
        #[arg(long)]
        no_compress: bool,

        /// Append the CRC trailer
        #[arg(long)]
        crc: bool,
    },

    /// Build an application message, fragmenting it if needed
    Message {
        /// Opcode (name, decimal or 0x hex)
        #[arg(short, long, value_parser = parse_opcode)]
        opcode: u16,

        /// Message body as hex, without the opcode
        #[arg(short, long, default_value = "")]
        data: String,
    },

    /// Build an application message and send it as reliable data
    Reliable {
        /// Opcode (name, decimal or 0x hex)
        #[arg(short, long, value_parser = parse_opcode)]
        opcode: u16,

        /// Message body as hex, without the opcode
        #[arg(short, long, default_value = "")]
        data: String,
    },

    /// Combine messages into one multi-message and send it as reliable data
    Multi {
        /// Entries as OPCODE:HEX
        #[arg(required = true)]
        entries: Vec<String>,
    },

    /// Print the effective configuration
    Config,
}

fn parse_opcode(s: &str) -> Result<u16, String> {
    SoeOpCode::parse_value(s).map_err(|e| e.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout carries only frames
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    if let Commands::Config = cli.command {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let connection = Connection::new(config.session);
    tracing::debug!(connection = %connection.id, "session ready");

    match commands::execute(&connection, cli.command) {
        Ok(report) => {
            println!("{}", report.render(cli.json)?);
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config, SessionError> {
    let config = match &cli.config {
        Some(path) => Config::load_from(Some(path.as_path()))?,
        None => Config::load()?,
    };
    Ok(config)
}

fn exit_with(e: &SessionError) -> ! {
    eprintln!("{}: {}", "Error".red(), e);
    if e.is_usage_error() {
        eprintln!(
            "{}: use `soe message` for payloads that need fragmentation",
            "Hint".yellow()
        );
    }
    std::process::exit(1);
}
