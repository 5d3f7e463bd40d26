use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use shiftlog_core::VERSION;

/// Shiftlog - an encrypted operational shift journal for dispatch crews
#[derive(Parser)]
#[command(name = "shiftlog")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the journal file
    #[arg(short, long, global = true, env = "SHIFTLOG_PATH")]
    pub journal: Option<String>,

    /// Operator name for this invocation (overrides the signed-in user)
    #[arg(short, long, global = true, env = "SHIFTLOG_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols and table borders
    #[arg(long, global = true)]
    pub ascii: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_input: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the journal will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Display timezone (IANA name, e.g. Europe/Moscow)
    #[arg(long)]
    pub timezone: Option<String>,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Entry category (equipment_work, relay_protection, team_permits,
    /// emergency, network_outages, other)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Short title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Full description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Priority (low, medium, high, critical)
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Event time (RFC 3339 or YYYY-MM-DD); defaults to now
    #[arg(long)]
    pub at: Option<String>,

    /// Save as a draft instead of an active entry
    #[arg(long)]
    pub draft: bool,

    /// Equipment record (name or ID)
    #[arg(long)]
    pub equipment: Option<String>,

    /// Location record (name or ID)
    #[arg(long)]
    pub location: Option<String>,

    /// Category record (code, name or ID)
    #[arg(long)]
    pub category_ref: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `cancel` command
#[derive(Args)]
pub struct CancelArgs {
    /// Entry ID (full UUID or unique prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Why the entry is cancelled
    #[arg(short, long)]
    pub reason: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for commands that take a single entry ID
#[derive(Args)]
pub struct EntryIdArgs {
    /// Entry ID (full UUID or unique prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Entry filter criteria shared by `list`, `stats` and `report`
#[derive(Args, Default, Clone)]
pub struct FilterArgs {
    /// Filter by category
    #[arg(long)]
    pub category: Option<String>,

    /// Filter by status (draft, active, cancelled)
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by priority
    #[arg(long)]
    pub priority: Option<String>,

    /// Earliest event time, inclusive (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest event time, inclusive (RFC 3339, or YYYY-MM-DD for the whole day)
    #[arg(long)]
    pub to: Option<String>,

    /// Case-insensitive text search over title and description
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter by equipment (name or ID)
    #[arg(long)]
    pub equipment: Option<String>,

    /// Filter by location (name or ID)
    #[arg(long)]
    pub location: Option<String>,

    /// Filter by category record (code, name or ID)
    #[arg(long)]
    pub category_ref: Option<String>,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Output format (table, plain, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Arguments for the `stats` command
#[derive(Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `report` command
#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Report format (text, markdown, json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,
}

/// Arguments for listing reference records
#[derive(Args)]
pub struct RefListArgs {
    /// Include deactivated records
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for commands that target one reference record
#[derive(Args)]
pub struct RefTargetArgs {
    /// Record name, code or ID
    #[arg(value_name = "RECORD")]
    pub target: String,
}

/// Arguments for editing a reference record
#[derive(Args)]
pub struct RefEditArgs {
    /// Record name, code or ID
    #[arg(value_name = "RECORD")]
    pub target: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New description
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,

    /// New sort order (categories only)
    #[arg(long)]
    pub sort_order: Option<i32>,
}

#[derive(Subcommand)]
pub enum CategoryCommand {
    /// Add a category record
    Add {
        /// Short unique code (e.g. RZA)
        #[arg(value_name = "CODE")]
        code: String,

        /// Display name
        #[arg(value_name = "NAME")]
        name: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, default_value_t = 0)]
        sort_order: i32,
    },

    /// List category records
    List(RefListArgs),

    /// Edit a category record
    Edit(RefEditArgs),

    /// Deactivate a category record
    Deactivate(RefTargetArgs),

    /// Reactivate a category record
    Activate(RefTargetArgs),
}

/// Equipment and location records share one command shape.
#[derive(Subcommand)]
pub enum NamedCommand {
    /// Add a record
    Add {
        #[arg(value_name = "NAME")]
        name: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// List records
    List(RefListArgs),

    /// Edit a record
    Edit(RefEditArgs),

    /// Deactivate a record
    Deactivate(RefTargetArgs),

    /// Reactivate a record
    Activate(RefTargetArgs),
}

/// Arguments for the `login` command
#[derive(Args)]
pub struct LoginArgs {
    /// Operator display name
    #[arg(value_name = "NAME")]
    pub name: Option<String>,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new encrypted journal
    Init(InitArgs),

    /// Add a journal entry
    Add(AddArgs),

    /// Cancel an entry with a reason
    Cancel(CancelArgs),

    /// Promote a draft to active
    Activate(EntryIdArgs),

    /// List entries, newest first
    List(ListArgs),

    /// Show a specific entry by ID
    Show(EntryIdArgs),

    /// Summary counts for the selected entries
    Stats(StatsArgs),

    /// Generate a shift report
    Report(ReportArgs),

    /// Manage category records
    Category {
        #[command(subcommand)]
        action: CategoryCommand,
    },

    /// Manage equipment records
    Equipment {
        #[command(subcommand)]
        action: NamedCommand,
    },

    /// Manage location records
    Location {
        #[command(subcommand)]
        action: NamedCommand,
    },

    /// Sign in as an operator
    Login(LoginArgs),

    /// Sign out
    Logout,

    /// Show the signed-in operator
    Whoami,

    /// Check journal integrity
    Check,

    /// Interactive menu
    Shell,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
