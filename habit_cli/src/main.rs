use chrono::{DateTime, Duration, FixedOffset, Utc};
use clap::{Args, Parser, Subcommand};
use habit_core::storage::{HABITS_KEY, LAST_RESET_KEY, TODOS_KEY};
use habit_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "habitflow")]
#[command(about = "Personal habit and to-do tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Evaluate as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<CalendarDay>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage habits and their streaks
    #[command(subcommand)]
    Habit(HabitCommand),

    /// Manage the to-do list
    #[command(subcommand)]
    Todo(TodoCommand),
}

#[derive(Subcommand)]
enum HabitCommand {
    /// Create a habit
    Add {
        title: String,

        /// Habit id (derived from the title if omitted)
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        emoji: Option<String>,

        /// Free-form frequency label, e.g. "Daily"
        #[arg(long)]
        frequency: Option<String>,

        /// Tolerate this many missed days per streak
        #[arg(long)]
        allow_missed: Option<u32>,
    },

    /// List habits with their streaks (default)
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show one habit and its completion history
    Show { id: String },

    /// Change a habit's emoji or frequency label
    Edit {
        id: String,

        #[arg(long)]
        emoji: Option<String>,

        #[arg(long)]
        frequency: Option<String>,
    },

    /// Delete a habit and its history
    Rm { id: String },

    /// Mark a habit done (today unless --date is given)
    Done {
        id: String,

        #[command(flatten)]
        date: DateArg,
    },

    /// Remove a completion (today unless --date is given)
    Undo {
        id: String,

        #[command(flatten)]
        date: DateArg,
    },
}

#[derive(Args)]
struct DateArg {
    /// Calendar day to act on (YYYY-MM-DD)
    #[arg(long)]
    date: Option<CalendarDay>,
}

#[derive(Subcommand)]
enum TodoCommand {
    /// Add a to-do
    Add {
        title: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// List to-dos
    List,

    /// Change a to-do's title or description
    Edit {
        /// Id or unique id prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Flip a to-do between done and not done
    Toggle {
        /// Id or unique id prefix
        id: String,
    },

    /// Delete a to-do
    Rm {
        /// Id or unique id prefix
        id: String,
    },
}

/// Everything one invocation needs: where blobs live and what "now" is
struct Session {
    store: FileBlobStore,
    zone: FixedOffset,
    today: Option<CalendarDay>,
    default_policy: StreakPolicy,
}

impl Session {
    fn clock(&self) -> Box<dyn Clock> {
        match self.today {
            Some(day) => Box::new(FixedClock::at_day(day, &self.zone)),
            None => Box::new(SystemClock),
        }
    }

    fn load_tracker(&self) -> Result<HabitTracker<Box<dyn Clock>>> {
        let values: Vec<serde_json::Value> = self.store.load_or_default(HABITS_KEY)?;
        let records = HabitRecord::from_values(values);
        Ok(HabitTracker::from_records(records, self.clock(), self.zone))
    }

    fn save_tracker(&mut self, tracker: &HabitTracker<Box<dyn Clock>>) -> Result<()> {
        self.store.save_json(HABITS_KEY, &tracker.to_records())
    }

    /// Log a day rollover and remember the day we last ran on
    fn note_day(&mut self, today: CalendarDay) -> Result<()> {
        let last: Option<CalendarDay> = self.store.load_json(LAST_RESET_KEY)?;
        if last != Some(today) {
            tracing::info!("New day {} (last seen {:?})", today, last);
            self.store.save_json(LAST_RESET_KEY, &today)?;
        }
        Ok(())
    }

    /// Midday of the requested day, or now
    fn instant_for(&self, tracker: &HabitTracker<Box<dyn Clock>>, date: DateArg) -> DateTime<Utc> {
        match date.date {
            Some(day) => day.start_of_day(&self.zone) + Duration::hours(12),
            None => tracker.clock().now(),
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    habit_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    let mut session = Session {
        store: FileBlobStore::new(data_dir),
        zone: config.reference_zone()?,
        today: cli.today,
        default_policy: config.policy,
    };

    match cli.command {
        Some(Commands::Habit(cmd)) => cmd_habit(&mut session, cmd),
        Some(Commands::Todo(cmd)) => cmd_todo(&mut session, cmd),
        None => cmd_habit(&mut session, HabitCommand::List { json: false }),
    }
}

fn cmd_habit(session: &mut Session, cmd: HabitCommand) -> Result<()> {
    // Held until the command returns so concurrent invocations cannot
    // overwrite each other's changes
    let _lock = session.store.lock(HABITS_KEY)?;
    let mut tracker = session.load_tracker()?;
    session.note_day(tracker.today())?;

    match cmd {
        HabitCommand::Add {
            title,
            id,
            emoji,
            frequency,
            allow_missed,
        } => {
            let id = match id {
                Some(id) => id,
                None => derive_id(&tracker, &title),
            };
            let policy = allow_missed
                .map(StreakPolicy::tolerant)
                .unwrap_or(session.default_policy);
            let display = HabitDisplay::new(emoji, frequency);

            tracker.create_habit_with_display(id.clone(), title.clone(), policy, display)?;
            session.save_tracker(&tracker)?;

            println!("✓ Created habit {} [{}]", title, id);
        }

        HabitCommand::List { json } => {
            let statuses = tracker.statuses();
            if json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else if statuses.is_empty() {
                println!("No habits yet");
                println!("  Add one with: habitflow habit add <title>");
            } else {
                for status in &statuses {
                    print_status(status);
                }
            }
        }

        HabitCommand::Show { id } => {
            let status = tracker.status(&id)?;
            print_status(&status);
            println!("  Frequency: {}", status.frequency);
            println!("  Completions: {}", status.total_completions);
            for day in tracker.completions(&id)? {
                println!("    {}", day);
            }
        }

        HabitCommand::Edit {
            id,
            emoji,
            frequency,
        } => {
            let current = tracker
                .display(&id)
                .cloned()
                .ok_or_else(|| Error::NotFound(id.clone()))?;
            let display = HabitDisplay::new(
                emoji.or(Some(current.emoji)),
                frequency.or(Some(current.frequency)),
            );
            tracker.update_display(&id, display)?;
            session.save_tracker(&tracker)?;

            println!("✓ Updated habit {}", id);
        }

        HabitCommand::Rm { id } => {
            tracker.delete_habit(&id)?;
            session.save_tracker(&tracker)?;

            println!("✓ Deleted habit {}", id);
        }

        HabitCommand::Done { id, date } => {
            let instant = session.instant_for(&tracker, date);
            let day = tracker.day_of(instant);

            if tracker.add_completion(&id, instant)? {
                session.save_tracker(&tracker)?;
                println!("✓ Marked {} done for {}", id, day);
            } else {
                println!("Already done for {}", day);
            }
            println!("  🔥 {} day streak", tracker.current_streak(&id)?);
        }

        HabitCommand::Undo { id, date } => {
            let instant = session.instant_for(&tracker, date);
            let day = tracker.day_of(instant);

            if tracker.remove_completion(&id, instant)? {
                session.save_tracker(&tracker)?;
                println!("✓ Removed completion for {} on {}", id, day);
            } else {
                println!("No completion on {}", day);
            }
            println!("  🔥 {} day streak", tracker.current_streak(&id)?);
        }
    }

    Ok(())
}

fn cmd_todo(session: &mut Session, cmd: TodoCommand) -> Result<()> {
    let now = session.clock().now();

    match cmd {
        TodoCommand::Add { title, description } => {
            let id = session.store.update(TODOS_KEY, |todos: &mut TodoList| {
                todos.add(title.clone(), description, now)
            })?;
            println!("✓ Added todo {} [{}]", title, short_id(&id));
        }

        TodoCommand::List => {
            let todos: TodoList = session.store.load_or_default(TODOS_KEY)?;
            if todos.is_empty() {
                println!("No todos yet");
                return Ok(());
            }
            for todo in todos.iter() {
                let mark = if todo.done { "[x]" } else { "[ ]" };
                println!("{} {} [{}]", mark, todo.title, short_id(&todo.id));
                if !todo.description.is_empty() {
                    println!("      {}", todo.description);
                }
            }
            println!("{} of {} pending", todos.pending_count(), todos.len());
        }

        TodoCommand::Edit {
            id,
            title,
            description,
        } => {
            session.store.update(TODOS_KEY, |todos: &mut TodoList| {
                let id = todos.resolve(&id)?;
                todos.edit(id, title, description).map(|_| ())
            })?;
            println!("✓ Updated todo {}", id);
        }

        TodoCommand::Toggle { id } => {
            let done = session.store.update(TODOS_KEY, |todos: &mut TodoList| {
                let id = todos.resolve(&id)?;
                todos.toggle(id)
            })?;
            if done {
                println!("✓ Todo {} done", id);
            } else {
                println!("○ Todo {} reopened", id);
            }
        }

        TodoCommand::Rm { id } => {
            let removed = session.store.update(TODOS_KEY, |todos: &mut TodoList| {
                let id = todos.resolve(&id)?;
                todos.delete(id)
            })?;
            println!("✓ Deleted todo {}", removed.title);
        }
    }

    Ok(())
}

fn print_status(status: &HabitStatus) {
    let done = if status.completed_today {
        "✓ Done"
    } else {
        "○ Not done"
    };
    let broken = if status.broken && status.streak > 0 {
        "  (at risk)"
    } else {
        ""
    };
    println!("{} {} [{}]", status.emoji, status.title, status.id);
    println!("  🔥 {} day streak  {}{}", status.streak, done, broken);
}

/// Lowercase dashed slug of the title, made unique within the tracker
fn derive_id(tracker: &HabitTracker<Box<dyn Clock>>, title: &str) -> String {
    let slug = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    let base = if slug.is_empty() { "habit".to_string() } else { slug };

    let mut candidate = base.clone();
    let mut n = 2;
    while tracker.get_habit(&candidate).is_some() {
        candidate = format!("{}-{}", base, n);
        n += 1;
    }
    candidate
}

fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}
