//! CLI `watch` command: run the alarm poller in the foreground.
//!
//! Alarms are printed to stdout. While one is showing, type `snooze` (`s`)
//! or `dismiss` (`d`) and press enter; `quit` (`q`) or Ctrl-C stops watching.

use std::future::Future;
use std::io::BufRead;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::alarm::message::{headline, reminder_message};
use crate::alarm::{AlarmController, AlarmPresenter, Resolution};
use crate::config::DoseBellConfig;
use crate::engine::clock::SystemClock;
use crate::engine::poller_from_config;
use crate::schedule::store::JsonFileStore;
use crate::schedule::types::ScheduleEntry;

/// Prints alarms to the terminal.
struct TerminalPresenter;

impl AlarmPresenter for TerminalPresenter {
    fn present(&self, entry: &ScheduleEntry) -> Result<()> {
        println!();
        println!("*** Medication reminder ***");
        println!("{}", headline(entry));
        println!("{}", reminder_message(entry));
        if entry.audio_uri.is_some() {
            println!("(audio reminder attached)");
        }
        println!("[s]nooze / [d]ismiss");
        Ok(())
    }

    fn resolved(&self, entry: &ScheduleEntry, resolution: &Resolution) {
        match resolution {
            Resolution::Dismissed => println!("Dismissed {}.", entry.name),
            Resolution::Snoozed { until } => println!("Snoozed {} until {until}.", entry.name),
        }
    }
}

enum Command {
    Snooze,
    Dismiss,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "snooze" => Some(Command::Snooze),
        "d" | "dismiss" => Some(Command::Dismiss),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Whether the command loop keeps going after a line.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Act on one line of user input. Snooze and dismiss touch the schedule
/// file, so they run on the blocking pool.
async fn handle_line(controller: &Arc<AlarmController>, line: &str) -> Result<Flow> {
    match parse_command(line) {
        Some(Command::Snooze) => {
            let controller = Arc::clone(controller);
            match tokio::task::spawn_blocking(move || controller.snooze()).await? {
                Ok(Some(_)) => {}
                Ok(None) => println!("No alarm showing."),
                Err(e) => eprintln!("snooze failed: {e:#}"),
            }
        }
        Some(Command::Dismiss) => {
            let controller = Arc::clone(controller);
            if tokio::task::spawn_blocking(move || controller.dismiss())
                .await??
                .is_none()
            {
                println!("No alarm showing.");
            }
        }
        Some(Command::Quit) => return Ok(Flow::Quit),
        None if line.trim().is_empty() => {}
        None => println!("Unknown command {:?}. Use snooze, dismiss or quit.", line.trim()),
    }
    Ok(Flow::Continue)
}

/// Read stdin on a plain thread and forward lines over a channel.
///
/// The thread stays parked in `read` until input arrives; it is detached so
/// it never holds up process exit.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Process commands until `quit`, end of input, or `shutdown` resolves.
async fn command_loop(
    controller: Arc<AlarmController>,
    mut lines: mpsc::Receiver<String>,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { break };
                if handle_line(&controller, &line).await? == Flow::Quit {
                    break;
                }
            }
            _ = &mut shutdown => {
                tracing::info!("interrupted");
                break;
            }
        }
    }
    Ok(())
}

pub async fn watch(config: &DoseBellConfig) -> Result<()> {
    let path = config.resolved_schedule_path();
    let store = Arc::new(JsonFileStore::new(&path));
    let clock = Arc::new(SystemClock);

    let controller = Arc::new(
        AlarmController::new(store.clone(), Arc::new(TerminalPresenter), clock.clone())
            .with_snooze_minutes(config.alarm.snooze_minutes),
    );

    let handle =
        poller_from_config(&config.engine, clock).start(store, controller.clone(), controller.clone());
    tracing::info!(schedule = %path.display(), "watching schedule");
    println!("Watching {} (q to quit)", path.display());

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    let result = command_loop(controller, spawn_stdin_reader(), ctrl_c).await;

    handle.stop();
    result
}
