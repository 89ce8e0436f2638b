//! recoverlog demo
//!
//! Runs the logging, checked-error and recovery cases once, optionally
//! serves the diagnostics endpoint, then waits for SIGINT/SIGQUIT/SIGTERM.
//! SIGHUP re-reads the config file.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use recoverlog::config::{apply_config, load_config, watcher, Config, ConfigWatcher};
use recoverlog::diagnostics::{self, DiagnosticsState};
use recoverlog::lifecycle::{callback, Shutdown, ShutdownSequencer};
use recoverlog::observability::metrics::install_recorder;
use recoverlog::{attrs, Level, LogContext, Value};

#[derive(Parser)]
#[command(name = "recoverlog-demo")]
#[command(about = "Demonstrates the recoverlog facade", long_about = None)]
struct Cli {
    /// TOML configuration file; watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve the diagnostics endpoint on this address.
    #[arg(short, long)]
    diagnostics: Option<String>,

    /// Skip the demo cases and only wait for a signal.
    #[arg(long)]
    no_demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(addr) = &cli.diagnostics {
        config.diagnostics.enabled = true;
        config.diagnostics.bind_address = addr.clone();
    }

    let ctx = recoverlog::init(&config)?.clone();
    ctx.info("recoverlog demo starting", attrs!["version" => env!("CARGO_PKG_VERSION")]);

    let shutdown = Shutdown::new();

    let diagnostics_task = if config.diagnostics.enabled {
        let metrics = if config.diagnostics.metrics {
            match install_recorder() {
                Ok(handle) => Some(handle),
                Err(e) => {
                    ctx.warn("metrics recorder not installed", attrs!["err" => Value::error(&e)]);
                    None
                }
            }
        } else {
            None
        };
        let state = DiagnosticsState::new(ctx.clone(), metrics);
        Some(diagnostics::open(
            config.diagnostics.bind_address.clone(),
            state,
            shutdown.clone(),
        ))
    } else {
        None
    };

    // Keep the watcher alive until shutdown.
    let _watcher = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, ctx.clone());
            tokio::spawn(watcher::apply_updates(ctx.clone(), updates));
            Some(watcher.run()?)
        }
        None => None,
    };

    if !cli.no_demo {
        run_demo(&ctx);
    }

    let mut sequencer = ShutdownSequencer::new(ctx.clone());
    if let Some(path) = cli.config.clone() {
        let reload_ctx = ctx.clone();
        sequencer = sequencer.on_reload(move || match load_config(&path) {
            Ok(config) => apply_config(&reload_ctx, &config),
            Err(e) => reload_ctx.error("config reload failed", attrs!["err" => Value::error(&e)]),
        });
    }

    let done_ctx = ctx.clone();
    sequencer
        .notify(vec![
            shutdown.callback(),
            callback(move || done_ctx.info("shutdown callbacks finished", attrs![])),
        ])
        .await?;

    if let Some(task) = diagnostics_task {
        let _ = task.await;
    }
    Ok(())
}

fn run_demo(ctx: &Arc<LogContext>) {
    // case 1: leveled logging and a level change
    ctx.debug("test1", attrs!["k1" => "v1", "k2" => 2]);
    ctx.info("test2", attrs![]);
    ctx.warn("test3", attrs![]);
    ctx.error("test4", attrs![]);
    ctx.print(vec!["test5".into(), "msg5".into(), "foo".into(), "bar".into()]);
    ctx.printf(format_args!("{} - {}", "test6", "msg6"));
    let level = ctx.level();
    ctx.set_level(Level::Info);
    ctx.debug("test7", attrs![]);
    ctx.set_level(level);

    // case 2 and 3: checked errors, logged once
    for show_stack in [false, true] {
        let _ = ctx.recover(show_stack, vec![], || {
            ctx.check_error(Some(unexpected_eof()), attrs!["k1" => "v1"]);
        });
    }

    // case 4 and 5: unexpected panics, logged by the boundary
    for show_stack in [false, true] {
        let _ = ctx.recover(show_stack, vec![], || -> () {
            std::panic::panic_any(unexpected_eof());
        });
    }
}

fn unexpected_eof() -> io::Error {
    io::Error::from(io::ErrorKind::UnexpectedEof)
}
