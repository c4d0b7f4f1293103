//! The task board: the single owner of tasks, categories and active filters.
//!
//! Every UI intent is a method on [`Board`] (or an [`Intent`] passed to
//! [`Board::dispatch`]). A successful mutation is followed by a full
//! snapshot write; failures never leave the board unrenderable.

use serde::Serialize;

use crate::io::snapshot::{RecordKeys, load_state, write_snapshot};
use crate::io::storage::KeyValueStore;
use crate::model::category::Category;
use crate::model::config::AppConfig;
use crate::model::task::{Task, TaskDraft, TaskUpdate};
use crate::ops::category_ops::{self, CategoryEdit};
use crate::ops::view::{ViewFilter, ViewModel};
use crate::ops::{TaskError, subtask_ops, task_ops};

/// A user-facing message queued by the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "message", rename_all = "lowercase")]
pub enum Notice {
    /// An intent was rejected or had nothing to act on
    Info(String),
    /// Saved data could not be read or written
    Warning(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(m) | Notice::Warning(m) => m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardOptions {
    pub keys: RecordKeys,
    pub seed_default_categories: bool,
}

impl Default for BoardOptions {
    fn default() -> Self {
        BoardOptions {
            keys: RecordKeys::default(),
            seed_default_categories: true,
        }
    }
}

impl From<&AppConfig> for BoardOptions {
    fn from(config: &AppConfig) -> Self {
        BoardOptions {
            keys: RecordKeys::versioned(config.storage.key_version),
            seed_default_categories: config.categories.seed_defaults,
        }
    }
}

/// A UI-triggered intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddTask(TaskDraft),
    UpdateTask { id: String, update: TaskUpdate },
    DeleteTask(String),
    ToggleTask(String),
    ToggleExpanded(String),
    ClearAllTasks,
    SetFilterText(String),
    SetCategoryFilter(Option<String>),
    AddCategory,
    RenameCategory { id: String, edit: CategoryEdit },
    DeleteCategory(String),
    AddSubtask { task_id: String, text: String },
    ToggleSubtask { task_id: String, subtask_id: String },
    DeleteSubtask { task_id: String, subtask_id: String },
}

pub struct Board<S: KeyValueStore> {
    store: S,
    keys: RecordKeys,
    tasks: Vec<Task>,
    categories: Vec<Category>,
    filter: ViewFilter,
    notices: Vec<Notice>,
}

impl<S: KeyValueStore> Board<S> {
    /// Load the board from storage. Unreadable records fall back to their
    /// initial state with a warning notice queued.
    pub fn open(mut store: S, options: BoardOptions) -> Self {
        let loaded = load_state(&mut store, &options.keys, options.seed_default_categories);
        Board {
            store,
            keys: options.keys,
            tasks: loaded.tasks,
            categories: loaded.categories,
            filter: ViewFilter::default(),
            notices: loaded.warnings.into_iter().map(Notice::Warning).collect(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        task_ops::find_task(&self.tasks, task_id)
    }

    pub fn category(&self, category_id: &str) -> Option<&Category> {
        category_ops::find_category(&self.categories, category_id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Restore filters from a previous session
    pub fn set_filter(&mut self, filter: ViewFilter) {
        self.filter = filter;
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn add_task(&mut self, draft: TaskDraft) -> Result<String, TaskError> {
        let id = task_ops::add_task(&mut self.tasks, draft)?;
        tracing::debug!(task = %id, "added task");
        self.persist();
        Ok(id)
    }

    pub fn update_task(&mut self, task_id: &str, update: TaskUpdate) -> Result<(), TaskError> {
        task_ops::update_task(&mut self.tasks, task_id, update)?;
        tracing::debug!(task = %task_id, "updated task");
        self.persist();
        Ok(())
    }

    pub fn delete_task(&mut self, task_id: &str) -> Result<(), TaskError> {
        let removed = task_ops::delete_task(&mut self.tasks, task_id)?;
        tracing::debug!(task = %task_id, subtasks = removed.subtasks.len(), "deleted task");
        self.persist();
        Ok(())
    }

    pub fn toggle_task(&mut self, task_id: &str) -> Result<bool, TaskError> {
        let completed = task_ops::toggle_task(&mut self.tasks, task_id)?;
        tracing::debug!(task = %task_id, completed, "toggled task");
        self.persist();
        Ok(completed)
    }

    pub fn toggle_expanded(&mut self, task_id: &str) -> Result<bool, TaskError> {
        let expanded = task_ops::toggle_expanded(&mut self.tasks, task_id)?;
        self.persist();
        Ok(expanded)
    }

    /// Remove every task. Confirming intent is the caller's job.
    pub fn clear_all_tasks(&mut self) -> usize {
        let removed = task_ops::clear_tasks(&mut self.tasks);
        tracing::debug!(removed, "cleared all tasks");
        self.persist();
        removed
    }

    // -----------------------------------------------------------------------
    // Filters
    // -----------------------------------------------------------------------

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter.text = text.into();
    }

    pub fn set_category_filter(&mut self, category_id: Option<String>) {
        self.filter.category = category_id;
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    pub fn add_category(&mut self) -> String {
        let id = category_ops::add_category(&mut self.categories);
        tracing::debug!(category = %id, "added category");
        self.persist();
        id
    }

    pub fn rename_category(&mut self, category_id: &str, edit: CategoryEdit) -> Result<(), TaskError> {
        category_ops::edit_category(&mut self.categories, category_id, edit)?;
        tracing::debug!(category = %category_id, "edited category");
        self.persist();
        Ok(())
    }

    /// Remove a category. Tasks keep their (now dangling) reference; an
    /// active filter on this category resets to showing everything.
    pub fn delete_category(&mut self, category_id: &str) -> Result<(), TaskError> {
        category_ops::delete_category(&mut self.categories, category_id)?;
        let referenced = self
            .tasks
            .iter()
            .filter(|t| t.category.as_deref() == Some(category_id))
            .count();
        let reset = self.filter.forget_category(category_id);
        tracing::debug!(category = %category_id, referenced, filter_reset = reset, "deleted category");
        self.persist();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Subtasks
    // -----------------------------------------------------------------------

    pub fn add_subtask(&mut self, task_id: &str, text: &str) -> Result<String, TaskError> {
        let id = subtask_ops::add_subtask(&mut self.tasks, task_id, text)?;
        tracing::debug!(task = %task_id, subtask = %id, "added subtask");
        self.persist();
        Ok(id)
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<bool, TaskError> {
        let completed = subtask_ops::toggle_subtask(&mut self.tasks, task_id, subtask_id)?;
        tracing::debug!(task = %task_id, subtask = %subtask_id, completed, "toggled subtask");
        self.persist();
        Ok(completed)
    }

    pub fn delete_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<(), TaskError> {
        subtask_ops::delete_subtask(&mut self.tasks, task_id, subtask_id)?;
        tracing::debug!(task = %task_id, subtask = %subtask_id, "deleted subtask");
        self.persist();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // View and dispatch
    // -----------------------------------------------------------------------

    /// Filtered, ordered view of the current state
    pub fn view(&self) -> ViewModel {
        ViewModel::build(&self.tasks, &self.categories, &self.filter)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hand queued notices to the view layer
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Apply an intent and return the updated view. Never fails: rejected
    /// intents leave state unchanged and queue an info notice; intents on
    /// stale ids are dropped silently.
    pub fn dispatch(&mut self, intent: Intent) -> ViewModel {
        let result = match intent {
            Intent::AddTask(draft) => self.add_task(draft).map(drop),
            Intent::UpdateTask { id, update } => self.update_task(&id, update),
            Intent::DeleteTask(id) => self.delete_task(&id),
            Intent::ToggleTask(id) => self.toggle_task(&id).map(drop),
            Intent::ToggleExpanded(id) => self.toggle_expanded(&id).map(drop),
            Intent::ClearAllTasks => {
                self.clear_all_tasks();
                Ok(())
            }
            Intent::SetFilterText(text) => {
                self.set_filter_text(text);
                Ok(())
            }
            Intent::SetCategoryFilter(id) => {
                self.set_category_filter(id);
                Ok(())
            }
            Intent::AddCategory => {
                self.add_category();
                Ok(())
            }
            Intent::RenameCategory { id, edit } => self.rename_category(&id, edit),
            Intent::DeleteCategory(id) => self.delete_category(&id),
            Intent::AddSubtask { task_id, text } => self.add_subtask(&task_id, &text).map(drop),
            Intent::ToggleSubtask { task_id, subtask_id } => {
                self.toggle_subtask(&task_id, &subtask_id).map(drop)
            }
            Intent::DeleteSubtask { task_id, subtask_id } => self.delete_subtask(&task_id, &subtask_id),
        };
        if let Err(e) = result {
            self.reject(e);
        }
        self.view()
    }

    fn reject(&mut self, err: TaskError) {
        if err.is_not_found() {
            tracing::debug!(error = %err, "ignored intent for stale id");
            return;
        }
        tracing::debug!(error = %err, "rejected intent");
        self.notices.push(Notice::Info(err.to_string()));
    }

    /// Write the full snapshot. A failed write keeps the in-memory change
    /// and queues a warning.
    fn persist(&mut self) {
        if let Err(e) = write_snapshot(&mut self.store, &self.keys, &self.tasks, &self.categories) {
            tracing::warn!(error = %e, "could not save board");
            self.notices.push(Notice::Warning(format!(
                "Your change could not be saved and may not survive a reload: {}",
                e
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStore;
    use crate::model::task::Priority;
    use pretty_assertions::assert_eq;

    fn board() -> Board<MemoryStore> {
        Board::open(MemoryStore::new(), BoardOptions::default())
    }

    #[test]
    fn open_empty_store_seeds_categories_without_writing() {
        let board = board();
        assert!(board.tasks().is_empty());
        assert_eq!(board.categories().len(), 7);
        assert!(board.notices().is_empty());
        assert!(board.store().keys().is_empty());
    }

    #[test]
    fn mutation_writes_both_records() {
        let mut board = board();
        board.add_task(TaskDraft::new("Buy milk")).unwrap();
        assert_eq!(board.store().keys(), vec!["categories", "tasks"]);
    }

    #[test]
    fn rejected_add_does_not_write() {
        let mut board = board();
        assert_eq!(board.add_task(TaskDraft::new("  ")), Err(TaskError::EmptyTitle));
        assert!(board.store().keys().is_empty());
    }

    #[test]
    fn dispatch_rejection_queues_info_notice() {
        let mut board = board();
        let view = board.dispatch(Intent::AddTask(TaskDraft::new("")));
        assert!(view.rows.is_empty());
        assert_eq!(
            board.take_notices(),
            vec![Notice::Info("task title cannot be empty".into())]
        );
        assert!(board.notices().is_empty());
    }

    #[test]
    fn dispatch_stale_id_is_noop() {
        let mut board = board();
        board.add_task(TaskDraft::new("Keep")).unwrap();
        let before = board.tasks().to_vec();
        board.dispatch(Intent::ToggleTask("ghost".into()));
        board.dispatch(Intent::DeleteSubtask {
            task_id: "ghost".into(),
            subtask_id: "s".into(),
        });
        assert_eq!(board.tasks(), before.as_slice());
        assert!(board.notices().is_empty());
    }

    #[test]
    fn write_failure_keeps_change_and_warns() {
        let mut board = Board::open(MemoryStore::with_quota(10), BoardOptions::default());
        board.add_task(TaskDraft::new("Too big to save").priority(Priority::High)).unwrap();
        assert_eq!(board.tasks().len(), 1);
        let notices = board.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(matches!(notices[0], Notice::Warning(_)));
        assert!(notices[0].message().contains("may not survive a reload"));
    }

    #[test]
    fn delete_category_resets_matching_filter_only() {
        let mut board = board();
        board.set_category_filter(Some("math".into()));
        board.delete_category("english").unwrap();
        assert_eq!(board.filter().category.as_deref(), Some("math"));
        board.delete_category("math").unwrap();
        assert_eq!(board.filter().category, None);
    }

    #[test]
    fn filters_do_not_write() {
        let mut board = board();
        board.dispatch(Intent::SetFilterText("milk".into()));
        board.dispatch(Intent::SetCategoryFilter(Some("news".into())));
        assert_eq!(board.filter().text, "milk");
        assert!(board.store().keys().is_empty());
    }

    #[test]
    fn options_from_config() {
        let mut config = AppConfig::default();
        config.storage.key_version = Some(3);
        config.categories.seed_defaults = false;
        let options = BoardOptions::from(&config);
        assert_eq!(options.keys.tasks, "tasks_v3");
        assert!(!options.seed_default_categories);
    }

    #[test]
    fn notice_serializes_tagged() {
        let json = serde_json::to_string(&Notice::Warning("x".into())).unwrap();
        assert_eq!(json, r#"{"level":"warning","message":"x"}"#);
    }
}
