use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster::commands::confirm::Answer;
use roster::output::Format;

#[derive(Parser)]
#[command(
    name = "roster",
    version,
    about = "Exclusive-claim roster over a fixed catalog, with scheduled resets"
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,
    /// Shorthand for --format pretty
    #[arg(long, global = true, hide = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new .roster/ directory from a catalog dataset
    Init {
        /// Catalog JSON file (tag -> {name, region, flag?, aliases?})
        #[arg(long)]
        catalog: PathBuf,
    },
    /// Claim an entry by tag or name
    Claim {
        /// Free-text input: a tag, a name, or part of a name
        text: String,
        /// Who is claiming
        #[arg(long)]
        holder: String,
    },
    /// Release an entry by tag or name
    Release {
        /// Free-text input: a tag, a name, or part of a name
        text: String,
        /// Who is releasing
        #[arg(long)]
        holder: String,
    },
    /// Answer a pending swap confirmation
    Confirm {
        /// yes applies the swap, no aborts it
        #[arg(value_enum)]
        answer: Answer,
        /// Whose confirmation to answer
        #[arg(long)]
        holder: String,
    },
    /// Reject new claims and swaps until unlocked
    Lock,
    /// Allow claims again
    Unlock,
    /// Admin: assign a tag regardless of current holder
    Force {
        /// Catalog tag
        tag: String,
        /// Holder to assign
        #[arg(long)]
        holder: String,
    },
    /// Admin: clear a tag regardless of ownership
    Unassign {
        /// Catalog tag
        tag: String,
    },
    /// Configure the recurring daily reset
    SetReset {
        /// Local time, HH:MM (24-hour)
        time: String,
        /// Supported zone code (see `roster timezones`)
        zone: String,
    },
    /// Configure a one-shot dated reset
    SetResetDate {
        /// Date, YYYY-MM-DD
        date: String,
        /// Local time, HH:MM (24-hour)
        time: String,
        /// Supported zone code (see `roster timezones`)
        zone: String,
    },
    /// List supported zone codes
    Timezones,
    /// Show the catalog with claim and schedule state
    Status,
    /// Run one scheduler evaluation
    Tick,
    /// Run the scheduler loop (startup reset + fixed-tick evaluation)
    Watch {
        /// Seconds between evaluations (default 60)
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Read the notification feed
    Events {
        /// Show only the most recent N events
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn run(cli: Cli, format: Format) -> roster::error::Result<()> {
    // Commands dispatched before .roster discovery
    match &cli.command {
        Commands::Init { catalog } => {
            let cwd = std::env::current_dir()?;
            return roster::commands::init::run(&cwd, catalog);
        }
        Commands::Timezones => return roster::commands::reset::timezones(format),
        _ => {}
    }

    let root = roster::store::files::find_root()?;

    match cli.command {
        Commands::Init { .. } | Commands::Timezones => unreachable!(),
        Commands::Claim { text, holder } => {
            roster::commands::claim::run(&root, &text, &holder, format)
        }
        Commands::Release { text, holder } => {
            roster::commands::release::run(&root, &text, &holder, format)
        }
        Commands::Confirm { answer, holder } => {
            roster::commands::confirm::run(&root, answer, &holder, format)
        }
        Commands::Lock => roster::commands::admin::lock(&root, format),
        Commands::Unlock => roster::commands::admin::unlock(&root, format),
        Commands::Force { tag, holder } => {
            roster::commands::admin::force(&root, &tag, &holder, format)
        }
        Commands::Unassign { tag } => roster::commands::admin::unassign(&root, &tag, format),
        Commands::SetReset { time, zone } => {
            roster::commands::reset::set_recurring(&root, &time, &zone, format)
        }
        Commands::SetResetDate { date, time, zone } => {
            roster::commands::reset::set_one_shot(&root, &date, &time, &zone, format)
        }
        Commands::Status => roster::commands::status::run(&root, format),
        Commands::Tick => roster::commands::watch::tick(&root, format),
        Commands::Watch { interval_secs } => {
            roster::commands::watch::run(&root, interval_secs, format)
        }
        Commands::Events { limit } => roster::commands::feed::run(&root, limit, format),
    }
}

fn main() {
    let cli = Cli::parse();
    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
