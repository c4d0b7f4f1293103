use std::error::Error;
use std::path::PathBuf;

use crate::board::{Board, BoardOptions, Intent};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::io::storage::FileStore;
use crate::logging;
use crate::model::config::AppConfig;
use crate::model::task::{Priority, TaskDraft, TaskUpdate, parse_due_date};
use crate::ops::category_ops::CategoryEdit;
use crate::ops::view::{ViewFilter, ViewModel};

/// Data directory used when -C is not given
pub const DEFAULT_DATA_DIR: &str = ".taskboard";

type CmdResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let data_dir = PathBuf::from(cli.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR));
    let config = config_io::read_config(&data_dir)?;
    logging::init(&config.log.level);

    let mut session = Session::open(data_dir, &config);
    let json = cli.json;

    match cli.command.unwrap_or(Commands::List(ListArgs::default())) {
        Commands::List(args) => cmd_list(&mut session, args, json),
        Commands::Add(args) => cmd_add(&mut session, args, json),
        Commands::Edit(args) => cmd_edit(&mut session, args, json),
        Commands::Rm(args) => {
            let id = session.resolve_task(&args.id)?;
            session.apply(Intent::DeleteTask(id), json)
        }
        Commands::Toggle(args) => {
            let id = session.resolve_task(&args.id)?;
            session.apply(Intent::ToggleTask(id), json)
        }
        Commands::Expand(args) => {
            let id = session.resolve_task(&args.id)?;
            session.apply(Intent::ToggleExpanded(id), json)
        }
        Commands::Clear(args) => cmd_clear(&mut session, args, json),
        Commands::Filter(cmd) => cmd_filter(&mut session, cmd.action, json),
        Commands::Category(cmd) => cmd_category(&mut session, cmd.action, json),
        Commands::Sub(cmd) => cmd_sub(&mut session, cmd.action, json),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A board opened over the data directory, with the saved filters restored
struct Session {
    data_dir: PathBuf,
    board: Board<FileStore>,
    saved_filter: ViewFilter,
}

impl Session {
    fn open(data_dir: PathBuf, config: &AppConfig) -> Self {
        let mut board = Board::open(FileStore::new(&data_dir), BoardOptions::from(config));
        let saved_filter = read_ui_state(&data_dir).unwrap_or_default().filter;
        board.set_filter(saved_filter.clone());
        Session {
            data_dir,
            board,
            saved_filter,
        }
    }

    fn resolve_task(&self, needle: &str) -> Result<String, Box<dyn Error>> {
        let ids = self.board.tasks().iter().map(|t| t.id.as_str());
        resolve_id("task", ids, needle)
    }

    fn resolve_category(&self, needle: &str) -> Result<String, Box<dyn Error>> {
        let ids = self.board.categories().iter().map(|c| c.id.as_str());
        resolve_id("category", ids, needle)
    }

    fn resolve_subtask(&self, task_id: &str, needle: &str) -> Result<String, Box<dyn Error>> {
        let subtasks = self
            .board
            .task(task_id)
            .map(|t| t.subtasks.as_slice())
            .unwrap_or_default();
        resolve_id("subtask", subtasks.iter().map(|s| s.id.as_str()), needle)
    }

    /// Dispatch an intent and print the resulting view
    fn apply(&mut self, intent: Intent, json: bool) -> CmdResult {
        let view = self.board.dispatch(intent);
        self.save_filter();
        self.print_view(&view, json)
    }

    /// Persist the filters if they changed. Failure only warns.
    fn save_filter(&mut self) {
        let current = self.board.filter().clone();
        if current == self.saved_filter {
            return;
        }
        let state = UiState {
            filter: current.clone(),
        };
        match write_ui_state(&self.data_dir, &state) {
            Ok(()) => self.saved_filter = current,
            Err(e) => {
                tracing::warn!(error = %e, "could not save filters");
                eprintln!("warning: could not save filters: {}", e);
            }
        }
    }

    fn print_view(&mut self, view: &ViewModel, json: bool) -> CmdResult {
        let notices = self.board.take_notices();
        if json {
            println!("{}", serde_json::to_string_pretty(&view_to_json(view, &notices))?);
        } else {
            for notice in &notices {
                eprintln!("{}", format_notice(notice));
            }
            for line in format_view(view) {
                println!("{}", line);
            }
        }
        Ok(())
    }

    fn print_categories(&mut self, json: bool) -> CmdResult {
        let notices = self.board.take_notices();
        for notice in &notices {
            eprintln!("{}", format_notice(notice));
        }
        let active = self.board.filter().category.clone();
        if json {
            let out = CategoryListJson {
                categories: self.board.categories().to_vec(),
                active,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            for line in format_categories(self.board.categories(), active.as_deref()) {
                println!("{}", line);
            }
        }
        Ok(())
    }
}

/// Resolve a full id or a unique id prefix.
fn resolve_id<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
    needle: &str,
) -> Result<String, Box<dyn Error>> {
    let mut matches = Vec::new();
    for id in ids {
        if id == needle {
            return Ok(id.to_string());
        }
        if !needle.is_empty() && id.starts_with(needle) {
            matches.push(id);
        }
    }
    match matches.as_slice() {
        [only] => Ok(only.to_string()),
        [] => Err(format!("no {} matches '{}'", kind, needle).into()),
        _ => Err(format!("'{}' matches more than one {}", needle, kind).into()),
    }
}

fn parse_priority_arg(s: &str) -> Result<Priority, Box<dyn Error>> {
    Priority::parse_priority(s)
        .ok_or_else(|| format!("invalid priority '{}' (expected high, medium, low or none)", s).into())
}

fn parse_due_arg(s: &str) -> Result<Option<chrono::NaiveDate>, Box<dyn Error>> {
    if s.trim().is_empty() {
        return Ok(None);
    }
    parse_due_date(s)
        .map(Some)
        .ok_or_else(|| format!("invalid due date '{}' (expected YYYY-MM-DD)", s).into())
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_list(session: &mut Session, args: ListArgs, json: bool) -> CmdResult {
    let mut filter = session.board.filter().clone();
    if let Some(text) = args.filter {
        filter.text = text;
    }
    if let Some(category) = args.category {
        filter.category = Some(session.resolve_category(&category)?);
    }
    let view = ViewModel::build(session.board.tasks(), session.board.categories(), &filter);
    session.print_view(&view, json)
}

fn cmd_add(session: &mut Session, args: AddArgs, json: bool) -> CmdResult {
    let mut draft = TaskDraft::new(args.title);
    if let Some(p) = args.priority {
        draft.priority = parse_priority_arg(&p)?;
    }
    if let Some(d) = args.due {
        draft.due_date = parse_due_arg(&d)?;
    }
    if let Some(c) = args.category {
        draft.category = Some(session.resolve_category(&c)?);
    }
    session.apply(Intent::AddTask(draft), json)
}

fn cmd_edit(session: &mut Session, args: EditArgs, json: bool) -> CmdResult {
    let id = session.resolve_task(&args.id)?;
    let task = session
        .board
        .task(&id)
        .ok_or_else(|| format!("no task matches '{}'", args.id))?;
    let mut update = TaskUpdate::from_task(task);
    if let Some(title) = args.title {
        update.title = title;
    }
    if let Some(p) = args.priority {
        update.priority = parse_priority_arg(&p)?;
    }
    if let Some(d) = args.due {
        update.due_date = parse_due_arg(&d)?;
    }
    if args.no_due {
        update.due_date = None;
    }
    if let Some(c) = args.category {
        update.category = Some(session.resolve_category(&c)?);
    }
    if args.no_category {
        update.category = None;
    }
    session.apply(Intent::UpdateTask { id, update }, json)
}

fn cmd_clear(session: &mut Session, args: ClearArgs, json: bool) -> CmdResult {
    let count = session.board.tasks().len();
    if !args.yes && count > 0 {
        return Err(format!("refusing to delete {} task(s) without --yes", count).into());
    }
    session.apply(Intent::ClearAllTasks, json)
}

fn cmd_filter(session: &mut Session, action: FilterAction, json: bool) -> CmdResult {
    match action {
        FilterAction::Text(args) => session.apply(Intent::SetFilterText(args.text), json),
        FilterAction::Category(args) => {
            let id = args
                .id
                .map(|needle| session.resolve_category(&needle))
                .transpose()?;
            session.apply(Intent::SetCategoryFilter(id), json)
        }
        FilterAction::Reset => {
            session.board.dispatch(Intent::SetFilterText(String::new()));
            session.apply(Intent::SetCategoryFilter(None), json)
        }
    }
}

// ---------------------------------------------------------------------------
// Category commands
// ---------------------------------------------------------------------------

fn cmd_category(session: &mut Session, action: CategoryAction, json: bool) -> CmdResult {
    match action {
        CategoryAction::List => session.print_categories(json),
        CategoryAction::Add(fields) => {
            session.board.dispatch(Intent::AddCategory);
            let added = session.board.categories().last().cloned();
            if let Some(category) = added
                && (fields.name.is_some() || fields.emoji.is_some() || fields.symbol.is_some())
            {
                let edit = overlay_edit(CategoryEdit::from_category(&category), fields);
                session.board.dispatch(Intent::RenameCategory {
                    id: category.id,
                    edit,
                });
            }
            session.print_categories(json)
        }
        CategoryAction::Edit(args) => {
            let id = session.resolve_category(&args.id)?;
            let current = session
                .board
                .category(&id)
                .map(CategoryEdit::from_category)
                .unwrap_or_default();
            let edit = overlay_edit(current, args.fields);
            session.board.dispatch(Intent::RenameCategory { id, edit });
            session.print_categories(json)
        }
        CategoryAction::Rm(args) => {
            let id = session.resolve_category(&args.id)?;
            session.board.dispatch(Intent::DeleteCategory(id));
            session.save_filter();
            session.print_categories(json)
        }
    }
}

fn overlay_edit(mut edit: CategoryEdit, fields: CategoryFieldArgs) -> CategoryEdit {
    if let Some(name) = fields.name {
        edit.name = name;
    }
    if let Some(emoji) = fields.emoji {
        edit.emoji = emoji;
    }
    if let Some(symbol) = fields.symbol {
        edit.symbol = symbol;
    }
    edit
}

// ---------------------------------------------------------------------------
// Subtask commands
// ---------------------------------------------------------------------------

fn cmd_sub(session: &mut Session, action: SubAction, json: bool) -> CmdResult {
    match action {
        SubAction::Add(args) => {
            let task_id = session.resolve_task(&args.task)?;
            session.apply(
                Intent::AddSubtask {
                    task_id,
                    text: args.text,
                },
                json,
            )
        }
        SubAction::Toggle(args) => {
            let task_id = session.resolve_task(&args.task)?;
            let subtask_id = session.resolve_subtask(&task_id, &args.sub)?;
            session.apply(Intent::ToggleSubtask { task_id, subtask_id }, json)
        }
        SubAction::Rm(args) => {
            let task_id = session.resolve_task(&args.task)?;
            let subtask_id = session.resolve_subtask(&task_id, &args.sub)?;
            session.apply(Intent::DeleteSubtask { task_id, subtask_id }, json)
        }
    }
}
