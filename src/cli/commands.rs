use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tb", about = concat!("taskboard v", env!("CARGO_PKG_VERSION"), " - tasks, categories and subtasks"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Data directory (default: ./.taskboard)
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the board (the default when no command is given)
    List(ListArgs),
    /// Add a task
    Add(AddArgs),
    /// Edit a task's fields
    Edit(EditArgs),
    /// Delete a task and its subtasks
    Rm(TaskIdArg),
    /// Mark a task done, or not done
    Toggle(TaskIdArg),
    /// Show or hide a task's subtasks
    Expand(TaskIdArg),
    /// Delete every task
    Clear(ClearArgs),
    /// Set or reset the saved filters
    Filter(FilterCmd),
    /// Manage categories
    Category(CategoryCmd),
    /// Manage subtasks
    Sub(SubCmd),
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args, Default)]
pub struct ListArgs {
    /// Filter text for this listing only (overrides the saved filter)
    #[arg(long)]
    pub filter: Option<String>,
    /// Category id for this listing only (overrides the saved filter)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Priority: high, medium, low or none
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(short, long)]
    pub due: Option<String>,
    /// Category id (or unique prefix)
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID (or unique prefix)
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New priority: high, medium, low or none
    #[arg(short, long)]
    pub priority: Option<String>,
    /// New due date (YYYY-MM-DD)
    #[arg(short, long, conflicts_with = "no_due")]
    pub due: Option<String>,
    /// Remove the due date
    #[arg(long)]
    pub no_due: bool,
    /// New category id (or unique prefix)
    #[arg(short, long, conflicts_with = "no_category")]
    pub category: Option<String>,
    /// Remove the category
    #[arg(long)]
    pub no_category: bool,
}

#[derive(Args)]
pub struct TaskIdArg {
    /// Task ID (or unique prefix)
    pub id: String,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Confirm deleting every task
    #[arg(long)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct FilterCmd {
    #[command(subcommand)]
    pub action: FilterAction,
}

#[derive(Subcommand)]
pub enum FilterAction {
    /// Show only tasks whose title or category name contains TEXT
    Text(FilterTextArgs),
    /// Show only tasks in a category (omit the id to show all)
    Category(FilterCategoryArgs),
    /// Clear both filters
    Reset,
}

#[derive(Args)]
pub struct FilterTextArgs {
    /// Text to match (empty matches everything)
    pub text: String,
}

#[derive(Args)]
pub struct FilterCategoryArgs {
    /// Category id (or unique prefix)
    pub id: Option<String>,
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CategoryCmd {
    #[command(subcommand)]
    pub action: CategoryAction,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories
    List,
    /// Add a category (named "New Category" unless --name is given)
    Add(CategoryFieldArgs),
    /// Rename or redecorate a category
    Edit(CategoryEditArgs),
    /// Delete a category; its tasks become uncategorized
    Rm(CategoryIdArg),
}

#[derive(Args)]
pub struct CategoryFieldArgs {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,
    /// Emoji shown before the name
    #[arg(long)]
    pub emoji: Option<String>,
    /// Secondary symbol
    #[arg(long)]
    pub symbol: Option<String>,
}

#[derive(Args)]
pub struct CategoryEditArgs {
    /// Category id (or unique prefix)
    pub id: String,
    #[command(flatten)]
    pub fields: CategoryFieldArgs,
}

#[derive(Args)]
pub struct CategoryIdArg {
    /// Category id (or unique prefix)
    pub id: String,
}

// ---------------------------------------------------------------------------
// Subtasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SubCmd {
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Add a subtask to a task
    Add(SubAddArgs),
    /// Mark a subtask done, or not done
    Toggle(SubIdArgs),
    /// Delete a subtask
    Rm(SubIdArgs),
}

#[derive(Args)]
pub struct SubAddArgs {
    /// Parent task ID (or unique prefix)
    pub task: String,
    /// Subtask text
    pub text: String,
}

#[derive(Args)]
pub struct SubIdArgs {
    /// Parent task ID (or unique prefix)
    pub task: String,
    /// Subtask ID (or unique prefix)
    pub sub: String,
}
