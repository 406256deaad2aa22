//! `hexpilot-cli` – terminal cockpit for the hexapod robot.
//!
//! This binary is the operator's entry point.  It:
//!
//! 1. Checks for `~/.hexpilot/config.toml`; runs a **First-Run Wizard** when
//!    the file is absent.
//! 2. Spawns the command link, which connects, authenticates, and keeps
//!    reconnecting on its own.
//! 3. Drops the operator into an **interactive console** (movement, camera,
//!    lights, servo calibration, telemetry).
//! 4. Intercepts **Ctrl-C** (and `quit`) to halt both movement axes before
//!    closing the link.

mod config;
mod repl;

use colored::Colorize;
use tracing::debug;

use hexpilot_link::{CommandLink, LinkConfig};

#[tokio::main]
async fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Initialise tracing-subscriber using RUST_LOG (defaults to "info").
    // Set HEXPILOT_LOG_FORMAT=json to emit newline-delimited JSON logs
    // suitable for log aggregators.  The console's user-facing output still
    // uses println! for UX consistency.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("HEXPILOT_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            // Headless startup: HEXPILOT_* variables alone can stand in
            // for the config file; the wizard only runs when they don't.
            let cfg = config::from_env();
            if cfg.validate().is_ok() {
                println!("  Config taken from HEXPILOT_* environment variables.");
                cfg
            } else {
                run_first_run_wizard()
            }
        }
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = cfg.validate() {
        eprintln!("{}: {}", "Config error".red(), e);
        eprintln!(
            "  Edit {} or set HEXPILOT_HOST / HEXPILOT_TOKEN.",
            config::config_path().display().to_string().bold()
        );
        std::process::exit(1);
    }
    debug!(config = ?cfg, "configuration resolved");

    // ── Command link ──────────────────────────────────────────────────────
    println!("  Robot: {}\n", cfg.ws_url().bold());
    let handle = CommandLink::spawn(LinkConfig::new(cfg.ws_url(), cfg.token.clone()));

    println!("  Type {} for a list of commands.\n", "help".bold().cyan());

    // ── Interactive console ───────────────────────────────────────────────
    repl::run(cfg, handle).await;
}

// ─────────────────────────────────────────────────────────────────────────────
// First-Run Wizard
// ─────────────────────────────────────────────────────────────────────────────

fn run_first_run_wizard() -> config::Config {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║      Hexpilot First-Run Wizard       ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();
    println!("  No configuration found.  Let's set up the robot connection.\n");

    let mut cfg = config::Config::default();

    cfg.host = prompt_line("  Robot host or IP: ", "");
    let port_str = prompt_line(&format!("  Controller port [{}]: ", cfg.port), &cfg.port.to_string());
    if let Ok(p) = port_str.trim().parse::<u16>() {
        cfg.port = p;
    }
    cfg.token = prompt_line("  Access token: ", "");

    match config::save(&cfg) {
        Ok(()) => println!(
            "\n  {} Config saved to {}\n",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }

    cfg
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   __ __                _ __     __ "#.bold().cyan());
    println!("{}", r#"  / // /__ __ ___  ___ (_) /__  / /_"#.bold().cyan());
    println!("{}", r#" / _  / -_) \ / _ \/ _ \/ / _ \/ __/"#.bold().cyan());
    println!("{}", r#"/_//_/\__/_\_\ .__/\___/_/\___/\__/ "#.bold().cyan());
    println!("{}", r#"            /_/                     "#.bold().cyan());
    println!();
    println!("  {} {}",
        "Hexpilot".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Hexapod Remote Control Console");
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn prompt_line(msg: &str, default: &str) -> String {
    use std::io::{BufRead, Write};
    print!("{}", msg);
    std::io::stdout().flush().ok();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let t = line.trim().to_string();
            if t.is_empty() { default.to_string() } else { t }
        }
        Err(_) => default.to_string(),
    }
}
