//! Command-line front end for the habit store.
//!
//! # Responsibility
//! - Open one `HabitStore` per invocation and run a single command on it.
//! - Render store state as plain text; all mutations go through the store.

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::warn;
use mellowhabits_core::db::open_db;
use mellowhabits_core::service::stats::{self, ChecklistFilter};
use mellowhabits_core::{
    AddOutcome, Habit, HabitId, HabitStore, HabitUpdate, PunchOutcome, SlotRepository,
    SqliteSlotRepository, StoreConfig, ToggleOutcome, UpdateOutcome,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about = "Track habits with punchcards", long_about = None)]
struct Cli {
    /// SQLite database holding the habit slot.
    #[arg(long, default_value = "mellowhabits.db")]
    db: PathBuf,
    /// TOML file with store settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Absolute directory for rotated log files; logging is off when unset.
    #[arg(long)]
    log_dir: Option<String>,
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all habits in display order.
    List,
    /// Show checklist habits (goal 1).
    Checklist {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    Add {
        title: String,
        #[arg(long, default_value = "Täglich")]
        time: String,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long, default_value_t = 1)]
        goal: u32,
        /// Punches already done; clamped to the goal.
        #[arg(long, default_value_t = 0)]
        done: u32,
    },
    Punch {
        id: HabitId,
    },
    Toggle {
        id: HabitId,
    },
    Edit(EditArgs),
    Delete {
        #[arg(required_unless_present = "position")]
        id: Option<HabitId>,
        /// Zero-based display positions instead of an id, e.g. `--position 0,3`.
        #[arg(long, conflicts_with = "id", num_args = 1.., value_delimiter = ',')]
        position: Vec<usize>,
    },
    /// Remove every habit and restore the sample set if configured.
    Clear,
    Stats {
        /// Trailing days in the activity strip.
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(u32).range(..=i64::from(stats::MAX_ACTIVITY_DAYS))
        )]
        days: u32,
    },
}

#[derive(Args, Debug)]
struct EditArgs {
    id: HabitId,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    time: Option<String>,
    #[arg(long)]
    icon: Option<String>,
    #[arg(long)]
    goal: Option<u32>,
    /// Set progress directly; clamped to the goal.
    #[arg(long)]
    punches: Option<u32>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FilterArg {
    All,
    Open,
    Done,
}

impl From<FilterArg> for ChecklistFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => ChecklistFilter::All,
            FilterArg::Open => ChecklistFilter::Open,
            FilterArg::Done => ChecklistFilter::Done,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .unwrap_or_else(|| mellowhabits_core::default_log_level().to_string());
        mellowhabits_core::init_logging(&level, log_dir)?;
    }

    let config = load_config(cli.config.as_deref())?;
    let conn = open_db(&cli.db)?;
    let repo = SqliteSlotRepository::try_new(&conn)?;
    let (mut store, load_error) = HabitStore::open_or_recover(repo, config);
    if let Some(err) = load_error {
        warn!("event=cli_open module=cli status=recovered error={err}");
        eprintln!("warning: stored habits could not be loaded ({err}); starting empty");
    }

    execute(&mut store, cli.command)
}

fn load_config(path: Option<&Path>) -> Result<StoreConfig, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(StoreConfig::default());
    };
    let text = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

fn execute<R: SlotRepository>(
    store: &mut HabitStore<R>,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::List => {
            for (position, habit) in store.habits().iter().enumerate() {
                println!("{position:>2}  {}", render(habit));
            }
        }
        Command::Checklist { filter } => {
            for habit in stats::checklist(store.habits(), filter.into()) {
                let mark = if habit.is_complete() { "x" } else { " " };
                println!("[{mark}] {}  ({})  {}", habit.title, habit.time, habit.id());
            }
        }
        Command::Add {
            title,
            time,
            icon,
            goal,
            done,
        } => match store.add_habit_with_punches(&title, &time, icon.as_deref(), goal, done)? {
            AddOutcome::Added(id) => println!("added {id}"),
            AddOutcome::DuplicateTitle(id) => println!("a habit with this title exists: {id}"),
        },
        Command::Punch { id } => match store.add_punch(id)? {
            PunchOutcome::Punched { current, goal } => println!("punched {current}/{goal}"),
            PunchOutcome::GoalReached => println!("card is full"),
            PunchOutcome::NotFound => println!("no habit {id}"),
        },
        Command::Toggle { id } => match store.toggle_habit(id)? {
            ToggleOutcome::On => println!("done"),
            ToggleOutcome::Off => println!("not done"),
            ToggleOutcome::NotFound => println!("no habit {id}"),
        },
        Command::Edit(args) => {
            let update = HabitUpdate {
                title: args.title,
                time: args.time,
                icon: args.icon,
                goal: args.goal,
                current_punches: args.punches,
            };
            match store.update_habit(args.id, update)? {
                UpdateOutcome::Updated => println!("updated {}", args.id),
                UpdateOutcome::DuplicateTitle(id) => {
                    println!("a habit with this title exists: {id}")
                }
                UpdateOutcome::NotFound => println!("no habit {}", args.id),
            }
        }
        Command::Delete { id, position } => {
            let removed: Vec<HabitId> = match id {
                Some(id) => store.delete_habit(id)?.then_some(id).into_iter().collect(),
                None => store.delete_habits_at(&position)?,
            };
            if removed.is_empty() {
                println!("nothing to delete");
            }
            for id in removed {
                println!("deleted {id}");
            }
        }
        Command::Clear => {
            store.clear_all_data()?;
            println!("cleared; {} habits remain", store.len());
        }
        Command::Stats { days } => print_stats(store.habits(), days),
    }
    Ok(())
}

fn print_stats(habits: &[Habit], days: u32) {
    let summary = stats::summarize(habits);
    println!("habits:      {}", summary.habits);
    println!("punches:     {}", summary.total_punches);
    println!("celebrated:  {}", summary.celebrated);
    println!("completed:   {}", summary.completed);

    for habit in stats::celebrated_habits(habits) {
        println!(
            "  * {} {}/{}",
            habit.title,
            habit.current_punches(),
            habit.total_goal()
        );
    }

    let today = Utc::now().date_naive();
    for day in stats::daily_activity(habits, today, days) {
        println!(
            "{}  {}",
            day.day.format("%a %d.%m."),
            "#".repeat(day.punches)
        );
    }
}

fn render(habit: &Habit) -> String {
    let badge = if habit.is_celebrated() { " *" } else { "" };
    format!(
        "{}  {} ({}) [{}] {}/{}{badge}",
        habit.id(),
        habit.title,
        habit.time,
        habit.icon,
        habit.current_punches(),
        habit.total_goal(),
    )
}
