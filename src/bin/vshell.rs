// src/bin/vshell.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::fs;
use std::sync::Arc;
use std::sync::mpsc;
use vshell::{
    cli::Cli,
    core::{config_loader, interpreter::Interpreter, paths},
    models::StorageKind,
    system::{
        host::{self, HostExit},
        memory_storage::MemoryStorage,
        session::{Session, SessionOptions},
        storage::{OsStorage, Storage},
        terminal::{self, TerminalDisplay},
    },
    t,
};

/// The main entry point of `vshell`.
/// Sets up logging, builds the session from the configuration and hands it to the host loop.
fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("\n{}: {:#}", t!("host.error.prefix").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let mut config = config_loader::load_config(cli.config.as_deref())?;
    config.apply(cli.overrides());
    config.validate()?;
    log::debug!("Effective configuration: {:?}", config);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let storage: Arc<dyn Storage> = match config.storage {
        StorageKind::Memory => Arc::new(MemoryStorage::with_default_tree()),
        StorageKind::Os => Arc::new(OsStorage::new()),
    };
    let interpreter = Interpreter::new(storage);
    let mut session = Session::start(interpreter, SessionOptions::from(&config))?;

    let (sender, receiver) = mpsc::channel();
    match &cli.script {
        Some(raw) => {
            let path = paths::expand_user_path(raw)?;
            let script = fs::read_to_string(&path)
                .with_context(|| format!("Could not read script '{}'", path.display()))?;
            terminal::feed_script(&script, &sender);
            drop(sender);
        }
        None => {
            terminal::spawn_stdin_reader(sender)?;
        }
    }

    let mut display = TerminalDisplay::stdout(!cli.no_color);
    let exit = host::run_host(
        &mut session,
        &receiver,
        &mut display,
        config.frame_interval(),
        config.visible_lines,
    )?;
    log::debug!("Session ended: {:?}", exit);
    if exit == HostExit::Stopped {
        log::info!("Session stopped by 'exit'.");
    }
    Ok(())
}
