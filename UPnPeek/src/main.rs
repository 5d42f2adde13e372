//! UPnPeek : control point UPnP interactif.

mod settings;
mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use settings::Settings;
use shell::{CommandOutcome, CommandRegistry, ShellContext};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::atomic::Ordering;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt, reload};

/// Interactive UPnP control point: discover devices, inspect their
/// services and invoke their actions.
#[derive(Parser, Debug)]
#[command(name = "upnpeek", version, about)]
struct Cli {
    /// Load a directory snapshot (written by 'save data') at startup
    #[arg(short = 's', long = "struct-file")]
    struct_file: Option<String>,

    /// Append every typed command to this file
    #[arg(short = 'l', long = "log-file")]
    log_file: Option<String>,

    /// Bind the passive listener to one network interface
    #[arg(short = 'i', long = "iface")]
    iface: Option<String>,

    /// Run the commands of this file instead of reading stdin
    #[arg(short = 'b', long = "batch-file")]
    batch_file: Option<String>,

    /// Do not deduplicate discovery responses
    #[arg(short = 'u', long = "no-unique")]
    no_unique: bool,

    /// Debug-level logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn banner() {
    println!("UPnPeek v{}", env!("CARGO_PKG_VERSION"));
    println!("Interactive UPnP control point. Type 'help' to get started.");
    println!();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let initial_filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let (filter_layer, reload_handle) = reload::Layer::new(initial_filter);
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(false))
        .init();

    let mut ctx = ShellContext::new(Settings {
        unique_only: !cli.no_unique,
        verbose: cli.verbose,
        iface: cli.iface.clone(),
        ..Settings::default()
    });
    ctx.set_verbosity = Box::new(move |verbose| {
        let directive = if verbose { "debug" } else { "info" };
        if reload_handle.reload(EnvFilter::new(directive)).is_err() {
            eprintln!("log filter could not be updated");
        }
    });

    // Ctrl-C : annule la commande en cours, quitte au prompt nu.
    let cancel = ctx.cancel.clone();
    let busy = ctx.busy.clone();
    ctrlc::set_handler(move || {
        if busy.load(Ordering::SeqCst) {
            cancel.cancel();
            println!();
        } else {
            println!();
            std::process::exit(0);
        }
    })
    .context("failed to install the Ctrl-C handler")?;

    banner();

    let registry = CommandRegistry::new();

    if let Some(file) = &cli.struct_file {
        match ctx.directory.load_from(Path::new(file)) {
            Ok(count) => println!("{count} host(s) restored from '{file}'"),
            Err(e) => warn!("could not load '{}': {}", file, e),
        }
    }

    if let Some(file) = &cli.log_file {
        registry.dispatch(&mut ctx, &format!("log {file}"));
    }

    match &cli.batch_file {
        Some(file) => run_batch(&registry, &mut ctx, file),
        None => run_interactive(&registry, &mut ctx),
    }
}

fn run_batch(registry: &CommandRegistry, ctx: &mut ShellContext, file: &str) -> Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("failed to read batch file '{file}'"))?;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        println!("upnpeek> {line}");
        if registry.dispatch(ctx, line) == CommandOutcome::Exit {
            break;
        }
    }
    Ok(())
}

fn run_interactive(registry: &CommandRegistry, ctx: &mut ShellContext) -> Result<()> {
    let stdin = std::io::stdin();
    loop {
        print!("upnpeek> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            println!();
            return Ok(());
        }
        if registry.dispatch(ctx, line.trim()) == CommandOutcome::Exit {
            return Ok(());
        }
    }
}
