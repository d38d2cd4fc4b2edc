// src/lib.rs

pub mod cascade;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod host;
pub mod launcher;
pub mod logging;
pub mod session;
pub mod types;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cascade::LevelView;
use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::exec::{ModuleLocator, ProcessEngine, ResultRow};
use crate::fs::RealFileSystem;
use crate::host::{ChannelSink, HostAdapter, HostEvent};
use crate::session::Session;
use crate::types::LogCategory;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the host adapter and a presenter draining its events
/// - a session on the process engine
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;
    let locator = cfg.module_locator()?;

    if args.dry_run {
        print_dry_run(&cfg, &locator);
        return Ok(());
    }

    let (sink, events) = ChannelSink::new();
    let host = HostAdapter::with_sink(sink);
    let presenter = tokio::spawn(present(events));

    let backend = Box::new(ProcessEngine::new(
        &cfg.engine.program,
        cfg.engine.args.clone(),
    ));
    let session =
        Arc::new(Session::open_with_locator(&cfg, host, backend, &RealFileSystem, &locator).await?);

    let result = tokio::select! {
        r = drive(&session, &args) => r,
        () = teardown_on_ctrl_c(&session) => Err(anyhow::anyhow!("interrupted")),
    };

    if !session.pool().is_closed() {
        if let Err(err) = session.teardown().await {
            warn!(error = %err, "session teardown failed");
        }
    }
    drop(session);

    // The presenter ends once every host clone is gone; don't wait forever
    // on a straggling engine process.
    if tokio::time::timeout(Duration::from_secs(2), presenter).await.is_err() {
        debug!("presenter still running at exit");
    }

    result
}

async fn drive(session: &Session, args: &CliArgs) -> Result<()> {
    session.start().await?;

    for (level, choice) in args.choices() {
        session.select(level, choice).await?;
    }

    print_levels(&session.cascade().snapshot());
    print_targets(&session.targets());

    if args.list {
        return Ok(());
    }
    let Some(destination) = args.destination() else {
        info!("no destination given (--iso-dir or --usb); nothing to build");
        return Ok(());
    };

    let rows = session.launch(&destination, args.launch_options()).await?;
    info!(rows = rows.len(), %destination, "media build finished");
    for row in &rows {
        print_row(row);
    }
    Ok(())
}

/// Resolves once a Ctrl-C has torn the session down. Requests that arrive
/// while a command or build is running are refused and logged.
async fn teardown_on_ctrl_c(session: &Session) {
    loop {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        match session.teardown().await {
            Ok(()) => return,
            Err(err) => warn!(error = %err, "Ctrl+C ignored; the engine is busy"),
        }
    }
}

/// Render host events: engine text on stdout, errors and warnings on stderr.
async fn present(mut events: mpsc::UnboundedReceiver<HostEvent>) {
    let mut stdout = std::io::stdout();
    while let Some(event) = events.recv().await {
        match event {
            HostEvent::Log(line) => match line.category {
                LogCategory::Text if !line.terminated => {
                    print!("{}", line.text);
                    let _ = stdout.flush();
                }
                LogCategory::Text => println!("{}", line.text),
                LogCategory::Verbose => println!("VERBOSE: {}", line.text),
                LogCategory::Debug => println!("DEBUG: {}", line.text),
                LogCategory::Warning => eprintln!("WARNING: {}", line.text),
                LogCategory::Error => eprintln!("ERROR: {}", line.text),
            },
            HostEvent::Progress(p) => {
                println!(
                    "[{:>3}%] {}",
                    p.percent,
                    p.activity.as_deref().unwrap_or("working")
                );
            }
        }
    }
}

fn print_levels(levels: &[LevelView]) {
    println!("selection:");
    for view in levels {
        let chosen = view
            .chosen
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<13} {:?} chosen={chosen}", view.level, view.state);
        let values = view.option_values();
        if !values.is_empty() {
            println!("      options: {}", values.join(", "));
        }
    }
}

fn print_targets(targets: &[ResultRow]) {
    if targets.is_empty() {
        return;
    }
    println!("removable targets:");
    for row in targets {
        print_row(row);
    }
}

fn print_row(row: &ResultRow) {
    let fields = row
        .fields()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => format!("{k}={s}"),
            other => format!("{k}={other}"),
        })
        .collect::<Vec<_>>()
        .join(" ");
    println!("  - {fields}");
}

/// Dry-run output: resolved config and where the module would be looked up.
fn print_dry_run(cfg: &ConfigFile, locator: &ModuleLocator) {
    println!("isoforge dry-run");
    println!(
        "  engine.program = {} {}",
        cfg.engine.program,
        cfg.engine.args.join(" ")
    );
    println!("  engine.module_name = {}", cfg.engine.module_name);
    println!("  pool.queue_length = {}", cfg.pool.queue_length);
    println!("  cascade.layout = {:?}", cfg.cascade.layout);
    println!();

    println!("verbs:");
    for (key, verb) in cfg.verbs.entries() {
        println!("  {key} = {verb}");
    }
    println!();

    println!("module candidates ({}):", locator.candidates().len());
    for dir in locator.candidates() {
        println!("  - {}", dir.display());
    }

    debug!("dry-run complete (no execution)");
}
