//! Subway-Now main entry point
//!
//! This is the command-line interface for ordering saved favorites.

use anyhow::{bail, Context};
use clap::Parser;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use subway_now::config::load_config_with_hash;
use colored::Colorize;
use subway_now::output::{render_favorites, render_items, render_receipt};
use subway_now::Subway;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Subway-Now: order your subwaynow.com favorites from the terminal
///
/// Logs in with the account from the config file, lists your saved
/// favorites, shows the checkout breakdown of the one you pick and asks for
/// confirmation before completing the order.
#[derive(Parser, Debug)]
#[command(name = "subway-now")]
#[command(version)]
#[command(about = "Order your subwaynow.com favorites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Favorite number to order (as listed, starting at 1); skips the prompt
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    favorite: Option<u32>,

    /// List favorites and exit
    #[arg(long, conflicts_with = "favorite")]
    list: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet, config.logging.file.as_deref())?;
    colored::control::set_override(use_color(cli.quiet, io::stdout().is_terminal()));
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    if cli.verbose > 0 {
        println!("Start at {}\n", chrono::Local::now().to_rfc2822());
    }

    let result = run(&cli, &config).await;

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }

    if cli.verbose > 0 {
        println!("\nFinished at {}", chrono::Local::now().to_rfc2822());
    }

    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// When a log file is configured every line is also appended there.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("subway_now=info,warn"),
            1 => EnvFilter::new("subway_now=debug,info"),
            2 => EnvFilter::new("subway_now=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(io::stderr);

    let file = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}

/// Colors are only written to an interactive terminal, and never under `--quiet`
fn use_color(quiet: bool, stdout_is_terminal: bool) -> bool {
    !quiet && stdout_is_terminal
}

/// Runs the login, selection and order flow
async fn run(cli: &Cli, config: &subway_now::Config) -> anyhow::Result<()> {
    let subway = Subway::from_config(config).await?;

    if subway.favorites().is_empty() {
        println!("No favorites saved on this account.");
        return Ok(());
    }

    if !cli.quiet || cli.list || cli.favorite.is_none() {
        print!("{}", render_favorites(subway.favorites()));
    }

    if cli.list {
        return Ok(());
    }

    let number = match cli.favorite {
        Some(n) => n as usize,
        None => prompt_favorite(subway.favorites().len())?,
    };

    let session = subway.begin_order_at(number - 1).await?;
    println!();
    match session.receipt() {
        Ok(receipt) => print!("{}", render_receipt(&receipt)),
        Err(e) => {
            tracing::warn!("Showing checkout items ungrouped: {}", e);
            print!("{}", render_items(session.items()));
        }
    }
    println!();

    if !confirm("Are you sure you want to order this? [Y/n]: ")? {
        println!("Order cancelled.");
        return Ok(());
    }

    if subway.complete_order(session)? {
        println!(
            "\n{}",
            "Success! Check your email or SMS for confirmation of your order."
                .yellow()
                .bold()
        );
    }

    Ok(())
}

/// Asks for a favorite number until one in `1..=count` is entered
fn prompt_favorite(count: usize) -> anyhow::Result<usize> {
    println!("{}", "-".repeat(60));
    loop {
        let answer = read_line("Enter Favorite #: ")?;
        match answer.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(n),
            _ => println!("Please enter a number from 1 to {}.", count),
        }
    }
}

/// Only an explicit `Y` or `y` confirms
fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = read_line(question)?;
    Ok(matches!(answer.trim(), "Y" | "y"))
}

fn read_line(prompt: &str) -> anyhow::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("standard input closed");
    }
    Ok(line)
}
