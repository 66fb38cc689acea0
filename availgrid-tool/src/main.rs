mod commands;
mod config;
mod error;

#[cfg(feature = "tui")]
mod tui;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use availgrid_client::AvailabilityClient;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{
    GridOverrides, grid_request, load_config, log_path, resolve_base_url, resolve_export_dir,
    title,
};
use crate::error::ToolError;

#[derive(Parser)]
#[command(name = "availgrid")]
#[command(about = "Find common free time across a roster of students", long_about = None)]
struct Cli {
    /// Base URL of the availability service
    #[arg(long, global = true)]
    url: Option<String>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[cfg(feature = "tui")]
    /// Open the interactive timetable (the default)
    Tui,

    /// Manage the roster
    Students {
        #[command(subcommand)]
        action: StudentsCommand,
    },

    /// Record a busy block for a student
    Busy {
        /// Student name as listed in the roster
        name: String,
        /// Day of the week, e.g. Mon or tuesday
        day: String,
        /// Start time, HH:MM or h:MM AM
        start: String,
        /// End time, HH:MM or h:MM AM
        end: String,
    },

    /// Print the free/busy timetable
    Grid {
        #[command(flatten)]
        params: GridArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Save the timetable as an image
    Export {
        #[command(flatten)]
        params: GridArgs,

        /// Directory to write into
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum StudentsCommand {
    /// List every student
    List,
    /// Add a student
    Add { name: String },
    /// Delete a student and their busy blocks
    Delete {
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
struct GridArgs {
    /// Days to show, e.g. Mon,Wed,Fri
    #[arg(long, value_delimiter = ',')]
    days: Option<Vec<String>>,

    /// Window start, HH:MM or h:MM AM
    #[arg(long)]
    start: Option<String>,

    /// Window end, HH:MM or h:MM AM
    #[arg(long)]
    end: Option<String>,

    /// Slot length in minutes (5, 10, 15, 20, 30 or 60)
    #[arg(long)]
    slot: Option<u16>,

    /// Only count these students as candidates (repeatable)
    #[arg(long)]
    only: Vec<String>,
}

impl GridArgs {
    fn overrides(&self) -> GridOverrides {
        GridOverrides {
            days: self.days.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            slot_minutes: self.slot,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let interactive = is_interactive(cli.command.as_ref());
    let log_file = interactive.then(log_path);
    init_tracing(cli.verbose, log_file.as_deref())?;

    let config = load_config()?;
    let base_url = resolve_base_url(cli.url, &config);
    debug!(%base_url, "using availability service");
    let client = AvailabilityClient::new(base_url);

    match cli.command {
        #[cfg(feature = "tui")]
        None | Some(Command::Tui) => {
            let request = grid_request(&config, &GridOverrides::default())?;
            let export_dir = resolve_export_dir(None, &config);
            tui::run(client, request, export_dir, title(&config)).await?;
        }
        #[cfg(not(feature = "tui"))]
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
        Some(Command::Students { action }) => match action {
            StudentsCommand::List => commands::list_students(&client).await?,
            StudentsCommand::Add { name } => commands::add_student(&client, &name).await?,
            StudentsCommand::Delete { name, yes } => {
                commands::delete_student(&client, &name, yes).await?
            }
        },
        Some(Command::Busy {
            name,
            day,
            start,
            end,
        }) => commands::add_busy(&client, &name, &day, &start, &end).await?,
        Some(Command::Grid { params, json }) => {
            let request = grid_request(&config, &params.overrides())?;
            commands::show_grid(&client, request, &params.only, json).await?;
        }
        Some(Command::Export { params, out }) => {
            let request = grid_request(&config, &params.overrides())?;
            let dir = resolve_export_dir(out, &config);
            commands::export(&client, request, &params.only, &dir, &title(&config)).await?;
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn is_interactive(command: Option<&Command>) -> bool {
    matches!(command, None | Some(Command::Tui))
}

#[cfg(not(feature = "tui"))]
fn is_interactive(_command: Option<&Command>) -> bool {
    false
}

/// Logs go to stderr, or to `log_file` while the terminal UI owns the screen.
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<(), ToolError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|e| ToolError::Logging(e.to_string()))
}
