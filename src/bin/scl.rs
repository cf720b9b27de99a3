// src/bin/scl.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use scl::{
    CancellationToken, SclError, t,
    cli::{Cli, args, dispatcher, handlers::commons::Session},
    core::{config::SclConfig, environment::Environment},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Entry point: sets up logging and Ctrl+C handling, runs the requested action
/// and turns its outcome into the process exit code.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cancellation_token: CancellationToken = Arc::new(AtomicBool::new(false));
    let handler_token = cancellation_token.clone();
    // The foreground child gets SIGINT from the terminal itself; we only note
    // it and stay alive long enough to report how the child ended.
    if let Err(e) = ctrlc::set_handler(move || handler_token.store(true, Ordering::SeqCst)) {
        log::warn!("Could not install the Ctrl+C handler: {}", e);
    }

    match run_cli(cancellation_token) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let sclerr = e.downcast_ref::<SclError>();
            if let Some(SclError::Interrupted) = sclerr {
                std::process::exit(130);
            }
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            std::process::exit(sclerr.map_or(1, SclError::exit_code));
        }
    }
}

fn run_cli(cancellation_token: CancellationToken) -> Result<i32> {
    let argv = args::expand_shebang(std::env::args().collect());
    let cli = Cli::parse_from(argv);
    log::debug!("CLI args parsed: {:?}", cli);

    if cli.args.is_empty() {
        if let Err(e) = Cli::command().print_help() {
            log::debug!("Could not print help: {}", e);
        }
        return Err(SclError::Input(t!("cli.error.no_action").to_string()).into());
    }

    let config = SclConfig::load()?;
    let session = Session::new(config, Environment::capture(), cancellation_token);
    dispatcher::dispatch(cli.args, &session)
}
