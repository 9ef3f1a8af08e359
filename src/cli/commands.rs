use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_TIMEZONE;

const VERSION: &str = env!("SHIFTOPS_VERSION");

#[derive(Parser)]
#[command(
    name = "shiftops",
    version = VERSION,
    about = "Recurring task generation and archival for dealership shift staff",
    after_help = "\
NOTE:
  Run `shiftops init` before any other command. The business timezone chosen
  there is stored beside the database in <db>.config.json.

EXIT CODES:
  0  Success
  1  Error (validation, missing record, database, etc.)

TIME:
  --now pins the current instant for sweeps and status reads. Timestamps are
  RFC 3339, or `YYYY-MM-DD HH:MM` read in the business timezone.

SWEEPS:
  `sweep generate` creates at most one task per generator per period.
  `sweep archive` archives completed tasks (after the cool-down, on the
  configured weekday) and tasks overdue beyond task_archive_days.
  `sweep shifts` archives unfinished work whose deadline fell inside a closed
  shift, once per shift, after archive_overdue_hours_after_shift.
  All sweeps are safe to re-run."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Database file
    #[arg(long, global = true, env = "SHIFTOPS_DB", default_value = "shiftops.db")]
    pub db: PathBuf,

    /// Treat this instant as the current time
    #[arg(long, global = true)]
    pub now: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and record the business timezone
    Init {
        /// IANA timezone name, e.g. Asia/Yekaterinburg
        #[arg(long, default_value = DEFAULT_TIMEZONE)]
        timezone: String,
    },

    /// Dealership management
    #[command(subcommand)]
    Dealership(DealershipCommands),

    /// Staff management
    #[command(subcommand)]
    User(UserCommands),

    /// Recurring task templates
    #[command(subcommand)]
    Generator(GeneratorCommands),

    /// Task instances
    #[command(subcommand)]
    Task(TaskCommands),

    /// Record a user's response to a task (replaces their previous one)
    Respond {
        /// Task ID or prefix
        task: String,
        /// Responding user ID or prefix
        #[arg(long)]
        user: String,
        /// pending | acknowledged | pending_review | completed | rejected
        #[arg(long)]
        status: String,
        #[arg(long)]
        comment: Option<String>,
    },

    /// Work sessions
    #[command(subcommand)]
    Shift(ShiftCommands),

    /// Archival settings (per dealership, with global fallback)
    #[command(subcommand)]
    Setting(SettingCommands),

    /// Run the batch sweeps
    #[command(subcommand)]
    Sweep(SweepCommands),
}

#[derive(Subcommand)]
pub enum DealershipCommands {
    /// Add a dealership
    Add {
        name: String,
    },
    /// List dealerships
    List,
    /// Deactivate a dealership (its generators stop producing tasks)
    Deactivate {
        /// Dealership name, ID or prefix
        reference: String,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a user to a dealership
    Add {
        name: String,
        /// Dealership name, ID or prefix
        #[arg(long)]
        dealership: String,
    },
    /// List users
    List {
        #[arg(long)]
        dealership: Option<String>,
    },
    /// Deactivate a user (dropped from future generated tasks)
    Deactivate {
        reference: String,
    },
}

#[derive(Args)]
pub struct GeneratorArgs {
    /// Task title
    pub title: String,
    /// Owning dealership name, ID or prefix
    #[arg(long)]
    pub dealership: String,
    #[arg(long)]
    pub description: Option<String>,
    /// none | daily | weekly | monthly
    #[arg(long, default_value = "daily")]
    pub recurrence: String,
    /// Time of day the task appears (HH:MM, business time)
    #[arg(long, default_value = "09:00")]
    pub appear: String,
    /// Time of day the task is due; earlier than --appear means the next day
    #[arg(long)]
    pub deadline: Option<String>,
    /// ISO weekday for weekly generators (1 = Monday .. 7 = Sunday); repeatable
    #[arg(long = "weekday", value_delimiter = ',')]
    pub weekdays: Vec<u32>,
    /// Day of month for monthly generators; negative counts from month end (-1 = last day)
    #[arg(long = "month-day", value_delimiter = ',', allow_negative_numbers = true)]
    pub month_days: Vec<i32>,
    /// First valid date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start: Option<String>,
    /// Last valid date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    /// individual | group
    #[arg(long = "type", default_value = "individual")]
    pub task_type: String,
    /// notification | completion | completion_with_proof
    #[arg(long, default_value = "completion")]
    pub response: String,
    /// low | medium | high
    #[arg(long, default_value = "medium")]
    pub priority: String,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// User ID or prefix; repeatable
    #[arg(long = "assignee", required = true)]
    pub assignees: Vec<String>,
}

#[derive(Subcommand)]
pub enum GeneratorCommands {
    /// Add a generator
    Add(GeneratorArgs),
    /// Load generators from stdin JSON
    #[command(after_help = "\
STDIN FORMAT:
  {\"generators\":[{\"dealership\":\"North\", \"title\":\"...\", \"recurrence\":\"weekly\",
    \"appear_time\":\"10:00\", \"deadline_time\":\"18:00\", \"days_of_week\":[5],
    \"assignees\":[\"<user>\"]}]}

NOTE:
  Atomic: all-or-nothing. Every definition is validated before anything is written.")]
    Load,
    /// List generators
    List {
        #[arg(long)]
        dealership: Option<String>,
    },
    /// Show generator details and the tasks it produced
    Show {
        /// Generator ID or prefix
        reference: String,
    },
    /// Stop producing tasks
    Pause {
        reference: String,
    },
    /// Resume producing tasks
    Resume {
        reference: String,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Create a one-off task directly
    Add {
        title: String,
        #[arg(long)]
        dealership: String,
        #[arg(long)]
        description: Option<String>,
        /// Appearance instant; defaults to now
        #[arg(long)]
        appear: Option<String>,
        /// Deadline instant; tasks without one are never overdue
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long = "type", default_value = "individual")]
        task_type: String,
        #[arg(long, default_value = "completion")]
        response: String,
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "assignee", required = true)]
        assignees: Vec<String>,
    },
    /// List tasks with their current status
    List {
        #[arg(long)]
        dealership: Option<String>,
        /// Only tasks resolving to this status
        #[arg(long)]
        status: Option<String>,
        /// Include archived tasks
        #[arg(long)]
        all: bool,
    },
    /// Show task details, assignees and responses
    Show {
        /// Task ID or prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ShiftCommands {
    /// Open a shift for a user
    Open {
        #[arg(long)]
        user: String,
        /// Start instant; defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Close a shift
    Close {
        /// Shift ID or prefix
        id: String,
        /// End instant; defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// List shifts
    List {
        #[arg(long)]
        dealership: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SettingCommands {
    /// Store a value (globally unless --dealership is given)
    Set {
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[arg(long)]
        dealership: Option<String>,
    },
    /// Show the value in effect, after fallback to global and default
    Get {
        key: String,
        #[arg(long)]
        dealership: Option<String>,
    },
    /// List stored values
    List {
        #[arg(long)]
        dealership: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SweepCommands {
    /// Generate due task instances
    Generate,
    /// Completion and overdue-expiry archival
    Archive,
    /// Archive unfinished work of closed shifts
    Shifts,
    /// Generate, archive, then process shifts
    All,
}
