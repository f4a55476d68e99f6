// Pomoclock CLI - terminal host for the session timer
// Renders snapshots to stdout and maps stdin commands onto timer operations

use anyhow::{bail, Result};
use clap::Parser;
use log::warn;
use pomoclock::notify::DesktopNotifier;
use pomoclock::session::{Mode, Snapshot};
use pomoclock::settings::Settings;
use pomoclock::store::Store;
use pomoclock::{config, Render, SessionTimer};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Drift-free Pomodoro timer for the terminal
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Drift-free Pomodoro timer for the terminal",
    long_about = "Drift-free Pomodoro timer for the terminal.

The countdown is anchored to a wall-clock deadline, so it stays accurate
even when the process is suspended or the machine sleeps.

COMMANDS (typed at the prompt):
  start             Start the countdown
  pause             Pause the countdown
  reset             Reset the current session to its full duration
  skip              End the session now and advance to the next one
  mode <m>          Switch session type: pomodoro, short or long
  set <field> <v>   Change a setting: pomodoro, short, long, interval,
                    auto-start, notifications (durations in minutes)
  status            Print the current snapshot
  quit              Exit

Settings persist to settings.toml and the lifetime pomodoro count to
stats.toml under the per-user config directory. POMOCLOCK_* environment
variables override the settings file for this session (see the config
module documentation)."
)]
struct Args {
    /// Start the first session immediately
    #[arg(short, long)]
    start: bool,

    /// Begin in a specific mode: pomodoro, short or long
    #[arg(long)]
    mode: Option<String>,

    /// Discard persisted settings and restore the defaults
    #[arg(long)]
    reset_settings: bool,
}

/// Prints each snapshot on its own line; the timer only renders when the
/// displayed time actually changes, so this stays readable.
struct TerminalRender;

impl Render for TerminalRender {
    fn render(&self, snapshot: &Snapshot) {
        let run_marker = if snapshot.running { ">" } else { "=" };
        print!(
            "\r{} {}  {}  #{}  next: {}          ",
            run_marker,
            snapshot.formatted_time,
            snapshot.mode,
            snapshot.completed_pomodoros,
            snapshot.predicted_next
        );
        io::stdout().flush().ok();
    }
}

fn parse_mode(raw: &str) -> Result<Mode> {
    match raw.to_ascii_lowercase().as_str() {
        "pomodoro" | "work" => Ok(Mode::Pomodoro),
        "short" | "short-break" => Ok(Mode::ShortBreak),
        "long" | "long-break" => Ok(Mode::LongBreak),
        other => bail!("unknown mode: {} (expected pomodoro, short or long)", other),
    }
}

fn handle_set(timer: &SessionTimer, field: Option<&str>, value: Option<&str>) {
    let (field, value) = match (field, value) {
        (Some(f), Some(v)) => (f, v),
        _ => {
            println!("usage: set <pomodoro|short|long|interval|auto-start|notifications> <value>");
            return;
        }
    };

    let mut settings = timer.settings();
    let applied = match field {
        "pomodoro" | "short" | "long" | "interval" => match value.parse::<u32>() {
            Ok(parsed) => {
                match field {
                    "pomodoro" => settings.pomodoro_minutes = parsed,
                    "short" => settings.short_break_minutes = parsed,
                    "long" => settings.long_break_minutes = parsed,
                    _ => settings.long_break_interval = parsed,
                }
                true
            }
            Err(_) => {
                println!("'{}' is not a number", value);
                false
            }
        },
        "auto-start" | "notifications" => match value.parse::<bool>() {
            Ok(parsed) => {
                if field == "auto-start" {
                    settings.auto_start = parsed;
                } else {
                    settings.notifications_enabled = parsed;
                }
                true
            }
            Err(_) => {
                println!("'{}' is not true/false", value);
                false
            }
        },
        other => {
            println!("unknown setting: {}", other);
            false
        }
    };

    if applied {
        if let Err(e) = timer.apply_settings(settings) {
            println!("rejected: {:#}", e);
        }
    }
}

fn print_status(snapshot: &Snapshot) {
    println!(
        "{} {} | {} | completed: {} | next: {}",
        if snapshot.running { "running" } else { "paused" },
        snapshot.formatted_time,
        snapshot.mode,
        snapshot.completed_pomodoros,
        snapshot.predicted_next
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let store = Store::new()?;
    let mut settings = if args.reset_settings {
        Settings::default()
    } else {
        match store.load_settings() {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!("Ignoring settings file: {:#}", e);
                Settings::default()
            }
        }
    };
    config::apply_env_overrides(&mut settings);
    if args.reset_settings {
        store.save_settings(&settings)?;
    }

    let timer = SessionTimer::new(settings, Arc::new(DesktopNotifier), Arc::new(TerminalRender))?
        .with_store(store)?;

    if let Some(raw) = args.mode.as_deref() {
        timer.switch_mode(parse_mode(raw)?);
    }

    println!("pomoclock - start | pause | reset | skip | mode <m> | set <field> <v> | status | quit");
    TerminalRender.render(&timer.snapshot());
    println!();

    if args.start {
        timer.start();
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("start") => timer.start(),
            Some("pause") => timer.pause(),
            Some("reset") => timer.reset(false),
            Some("skip") => timer.skip(),
            Some("mode") => match parts.next() {
                Some(raw) => match parse_mode(raw) {
                    Ok(mode) => timer.switch_mode(mode),
                    Err(e) => println!("{}", e),
                },
                None => println!("usage: mode <pomodoro|short|long>"),
            },
            Some("set") => handle_set(&timer, parts.next(), parts.next()),
            Some("status") => print_status(&timer.snapshot()),
            Some("quit") | Some("exit") | Some("q") => break,
            Some(other) => println!("unknown command: {}", other),
            None => {}
        }
    }

    Ok(())
}
