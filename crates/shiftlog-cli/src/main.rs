//! Shiftlog CLI - an encrypted operational shift journal for dispatch crews
//!
//! This is the command-line interface for Shiftlog. It resolves the operator,
//! opens the journal and hands each command to the core library.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod shell;
mod ui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use shiftlog_core::VERSION;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::*;
use crate::ui::UiContext;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        exit_with_error(&cli, &err);
    }
}

/// Log to stderr; SHIFTLOG_LOG takes EnvFilter syntax, otherwise `-v` picks the level.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("SHIFTLOG_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if let Some(Commands::Completions(args)) = &cli.command {
        return handle_completions(args.shell);
    }

    let ctx = AppContext::new(cli)?;
    match &cli.command {
        Some(Commands::Init(args)) => handle_init(&ctx, args),
        Some(Commands::Add(args)) => handle_add(&ctx, args),
        Some(Commands::Cancel(args)) => handle_cancel(&ctx, args),
        Some(Commands::Activate(args)) => handle_activate(&ctx, args),
        Some(Commands::List(args)) => handle_list(&ctx, args),
        Some(Commands::Show(args)) => handle_show(&ctx, args),
        Some(Commands::Stats(args)) => handle_stats(&ctx, args),
        Some(Commands::Report(args)) => handle_report(&ctx, args),
        Some(Commands::Category { action }) => handle_category(&ctx, action),
        Some(Commands::Equipment { action }) => handle_equipment(&ctx, action),
        Some(Commands::Location { action }) => handle_location(&ctx, action),
        Some(Commands::Login(args)) => handle_login(&ctx, args),
        Some(Commands::Logout) => handle_logout(&ctx),
        Some(Commands::Whoami) => handle_whoami(&ctx),
        Some(Commands::Check) => handle_check(&ctx),
        Some(Commands::Shell) => shell::run(&ctx),
        Some(Commands::Completions(args)) => handle_completions(args.shell),
        None => {
            println!("shiftlog {}", VERSION);
            println!("Run `shiftlog --help` for usage.");
            Ok(())
        }
    }
}

fn exit_with_error(cli: &Cli, err: &anyhow::Error) -> ! {
    let failure = errors::classify(err);
    tracing::debug!(target: "shiftlog", event = "command_failed", code = failure.code, error = ?err);
    let ui = UiContext::from_env(false, None, cli.no_color, cli.ascii);
    ui::print_error(&ui, &failure.message, failure.hint);
    std::process::exit(failure.code);
}
