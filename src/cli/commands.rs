use clap::{Parser, Subcommand};

const VERSION: &str = env!("CHOREBOARD_BUILD_VERSION");

#[derive(Parser)]
#[command(
    name = "choreboard",
    version = VERSION,
    about = "Household chore scheduling: recurring assignments and single-task offers",
    after_help = "\
NOTE:
  DB path: --db, else $CHOREBOARD_DB, else ./choreboard.db
  Run `choreboard init` before any other command.

EXIT CODES:
  0  Success
  1  Error (DB, validation, not found, configuration)
  2  Conflict (offer no longer available: taken, expired, closed)

RULE TYPES:
  daily            {\"assigned_members\":[...]}        (empty = whole roster)
  repeating        {\"days_of_week\":[0-6], \"assigned_members\":[...]}  (0 = Sunday)
  weekly_rotation  {\"rotation_kind\":\"alternating\"|\"odd_even_week\", \"assigned_members\":[...]}
  single           {\"candidates\":[...], \"deadline\":\"RFC3339\"}

BEHAVIOR NOTES:
  `generate` is idempotent: a (template, date) that already has rows is left alone.
  Template edits only affect dates that have not been generated yet.
  Terminal states (`completed`/`expired`/`declined_by_all`) are immutable."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Database file
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Override the current time (RFC 3339)
    #[arg(long, global = true)]
    pub now: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database
    Init,

    /// Household management
    #[command(subcommand)]
    Household(HouseholdCommands),

    /// Household membership (the roster)
    #[command(subcommand)]
    Member(MemberCommands),

    /// Task template management
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Generate recurring assignments for the configured window
    #[command(after_help = "\
NOTE:
  Window: today ..= today + (window_days - 1); window_days from
  $CHOREBOARD_GENERATION_WINDOW_DAYS (default 7) unless --window-days is given.
  Safe to run any number of times, including concurrently.")]
    Generate {
        /// First date of the window (YYYY-MM-DD), defaults to today (UTC)
        #[arg(long)]
        today: Option<String>,
        /// Number of days to generate
        #[arg(long)]
        window_days: Option<u32>,
        /// Only this household
        #[arg(long)]
        household: Option<String>,
    },

    /// Single-task offers
    #[command(subcommand)]
    Offer(OfferCommands),

    /// Assignment queries and actions
    #[command(subcommand)]
    Assignment(AssignmentCommands),

    /// Outbound accepted/completed events
    #[command(subcommand)]
    Events(EventCommands),

    /// Run generation and the expiry sweep on a fixed interval
    Run {
        /// Stop after this many cycles
        #[arg(long)]
        iterations: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum HouseholdCommands {
    /// Create a household
    Add {
        /// Household ID
        id: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// List households
    List,
}

#[derive(Subcommand)]
pub enum MemberCommands {
    /// Add a member (or re-admit one who left)
    Add {
        household: String,
        member: String,
        /// First day on the roster (YYYY-MM-DD), defaults to today
        #[arg(long)]
        joined_on: Option<String>,
    },
    /// Remove a member from the roster
    Remove {
        household: String,
        member: String,
        /// First day off the roster (YYYY-MM-DD), defaults to today
        #[arg(long)]
        left_on: Option<String>,
    },
    /// List members, or the roster on a date with --as-of
    List {
        household: String,
        #[arg(long)]
        as_of: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// Create a template
    Add {
        household: String,
        name: String,
        /// daily | repeating | weekly_rotation | single
        #[arg(long)]
        rule_type: String,
        /// Rule config JSON
        #[arg(long, default_value = "")]
        config: String,
        #[arg(long, default_value = "1")]
        points: i64,
        /// Create as inactive
        #[arg(long)]
        inactive: bool,
    },
    /// List templates of a household
    List { household: String },
    /// Show template details
    Show { id: String },
    /// Update a template (rule type cannot change)
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        points: Option<i64>,
        /// Replacement rule config JSON
        #[arg(long)]
        config: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
}

#[derive(Subcommand)]
pub enum OfferCommands {
    /// Offer a single task to its candidates
    Publish { template: String },
    /// Accept an offer (offered → accepted)
    Accept { id: String, member: String },
    /// Decline an offer; the last decline closes it
    Decline { id: String, member: String },
    /// Expire offers whose deadline has passed
    Sweep,
}

#[derive(Subcommand)]
pub enum AssignmentCommands {
    /// List assignments
    List {
        #[arg(long)]
        household: Option<String>,
        #[arg(long)]
        template: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Show assignment details
    Show { id: String },
    /// Complete an assignment (pending|accepted → completed)
    Complete { id: String, member: String },
    /// Move a pending recurring assignment to another member
    Reassign { id: String, member: String },
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// List events in sequence order
    List {
        /// Only events with a greater sequence number
        #[arg(long, default_value = "0")]
        after: i64,
        #[arg(long, default_value = "100")]
        limit: i64,
    },
}
