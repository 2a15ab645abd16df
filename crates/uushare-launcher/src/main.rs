//! uushare-launcher — protocol handler for `uushare:` links.
//!
//! Registered with the OS for the `uushare` scheme. Verifies the link,
//! writes the identity it carries into the client's settings and starts
//! the client.

mod commands;
mod config;
mod console;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

/// uushare-launcher — apply a uuShare deep link and start the client
#[derive(Parser)]
#[command(
    name = "uushare-launcher",
    version,
    about = "Applies a uushare: deep link to the client settings and starts the client"
)]
struct Cli {
    /// Config file path (default: uushare.toml next to the executable)
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Update the settings but do not start the client
    #[arg(long)]
    no_launch: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Deep link as delivered by the OS, e.g. `uushare:nick;email;password`
    link: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a signed deep link using the configured key
    Sign {
        #[arg(long)]
        nick: String,
        #[arg(long)]
        email: String,
        /// Plaintext password (base64-encoded into the link)
        #[arg(long)]
        password: String,
        /// Nonce (default: current Unix time)
        #[arg(long)]
        nonce: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing.
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("uushare_launcher=debug,uushare_core=debug")
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("uushare_launcher=warn,uushare_core=warn")
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("uushare-launcher: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    if cli.command.is_none() && cli.link.is_none() {
        console::failed(&uushare_core::ShareError::MissingInput);
        return Ok(0);
    }

    let launcher_dir = config::launcher_dir()?;
    let config_path = cli
        .config
        .unwrap_or_else(|| launcher_dir.join(config::CONFIG_FILE));
    let cfg = config::Config::load(&config_path)?;

    match cli.command {
        Some(Command::Sign {
            nick,
            email,
            password,
            nonce,
        }) => {
            commands::sign::run(&cfg, &nick, &email, &password, nonce.as_deref())?;
            Ok(0)
        }
        None => {
            let link = cli.link.unwrap_or_default();
            commands::open::run(&link, &cfg, &launcher_dir, cli.no_launch)
        }
    }
}
