use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use garage::{Event, Garage};
use state_store::logging::{self, LoggingMode};

/// Garage store demo
///
/// Builds the user and cars stores, mounts a panel on them, then plays the
/// given events in order, re-rendering the panel after each notification.
#[derive(Parser, Debug)]
#[command(name = "garage")]
#[command(about = "Drive the garage stores with a sequence of events")]
#[command(version)]
pub struct Args {
    /// Events to dispatch, in order (login, logout, increment, clear)
    #[arg(value_name = "EVENT")]
    pub events: Vec<String>,

    /// Logging mode (silent, development, debug); defaults to SHALLOWSTATE_LOG_MODE
    #[arg(long)]
    pub log_mode: Option<LoggingMode>,

    /// Log filter directives, e.g. "debug" or "state_store=trace"
    #[arg(long)]
    pub log_level: Option<String>,

    /// Keep going after an event fails instead of exiting
    #[arg(long)]
    pub keep_going: bool,
}

impl Args {
    /// Reject bad arguments before any store is built
    ///
    /// The log filter is checked even when logging ends up silent.
    pub fn validate(&self) -> Result<()> {
        self.parsed_events()?;
        if let Some(level) = self.log_level.as_deref() {
            logging::validate_filter(level).context("Invalid --log-level")?;
        }
        Ok(())
    }

    /// Parse the event list, failing on the first unknown name
    pub fn parsed_events(&self) -> Result<Vec<Event>> {
        self.events
            .iter()
            .map(|raw| raw.parse::<Event>().with_context(|| format!("Invalid event argument '{}'", raw)))
            .collect()
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let initialized = match args.log_mode {
        Some(mode) => logging::init_logging(mode, args.log_level.as_deref()),
        None if args.log_level.is_some() => {
            logging::init_logging(LoggingMode::Development, args.log_level.as_deref())
        }
        None => logging::init_logging_from_env(),
    };
    initialized.context("Failed to initialize logging")
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;
    init_logging(&args)?;
    let events = args.parsed_events()?;

    let garage = Garage::new();
    let panel = garage.mount_panel();
    println!("{}", panel.render());

    for event in events {
        if let Err(e) = garage.dispatch(event) {
            if !args.keep_going {
                return Err(e).with_context(|| format!("Event '{}' failed", event));
            }
            warn!("Event '{}' failed: {}", event, e);
            continue;
        }

        if panel.needs_redraw() {
            println!("{:<10} -> {}", event, panel.render());
        }
    }

    info!(
        users_version = garage.users.version(),
        cars_version = garage.cars.version(),
        "Finished"
    );
    Ok(())
}
