use std::collections::HashSet;

use uuid::Uuid;

use crate::model::task::{Task, TaskDraft, TaskUpdate};

/// Error type for task, subtask and category operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("category name cannot be empty")]
    EmptyName,
    #[error("subtask text cannot be empty")]
    EmptySubtask,
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("subtask not found: {0}")]
    SubtaskNotFound(String),
    #[error("category not found: {0}")]
    CategoryNotFound(String),
}

impl TaskError {
    /// Input was rejected before touching the store
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TaskError::EmptyTitle | TaskError::EmptyName | TaskError::EmptySubtask
        )
    }

    /// A stale id was referenced
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TaskError::TaskNotFound(_) | TaskError::SubtaskNotFound(_) | TaskError::CategoryNotFound(_)
        )
    }
}

/// Fresh identifier for a task, subtask or category
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Task CRUD
// ---------------------------------------------------------------------------

/// Append a new task. Returns the assigned id.
pub fn add_task(tasks: &mut Vec<Task>, draft: TaskDraft) -> Result<String, TaskError> {
    let title = validate_title(&draft.title)?;
    let mut id = new_id();
    while find_task(tasks, &id).is_some() {
        id = new_id();
    }
    tasks.push(Task::new(id.clone(), TaskDraft { title, ..draft }));
    Ok(id)
}

/// Replace every field of a task except its id.
pub fn update_task(tasks: &mut [Task], task_id: &str, update: TaskUpdate) -> Result<(), TaskError> {
    let title = validate_title(&update.title)?;
    let task = find_task_mut(tasks, task_id)
        .ok_or_else(|| TaskError::TaskNotFound(task_id.to_string()))?;
    task.title = title;
    task.priority = update.priority;
    task.due_date = update.due_date;
    task.category = update.category;
    if let Some(completed) = update.completed {
        task.completed = completed;
    }
    if let Some(subtasks) = update.subtasks {
        task.subtasks = subtasks;
    }
    Ok(())
}

/// Remove a task (and with it, its subtasks). Returns the removed task.
pub fn delete_task(tasks: &mut Vec<Task>, task_id: &str) -> Result<Task, TaskError> {
    let idx = tasks
        .iter()
        .position(|t| t.id == task_id)
        .ok_or_else(|| TaskError::TaskNotFound(task_id.to_string()))?;
    Ok(tasks.remove(idx))
}

/// Flip completion. Returns the new state.
pub fn toggle_task(tasks: &mut [Task], task_id: &str) -> Result<bool, TaskError> {
    let task = find_task_mut(tasks, task_id)
        .ok_or_else(|| TaskError::TaskNotFound(task_id.to_string()))?;
    task.completed = !task.completed;
    Ok(task.completed)
}

/// Flip the display-only expanded flag. Returns the new state.
pub fn toggle_expanded(tasks: &mut [Task], task_id: &str) -> Result<bool, TaskError> {
    let task = find_task_mut(tasks, task_id)
        .ok_or_else(|| TaskError::TaskNotFound(task_id.to_string()))?;
    task.expanded = !task.expanded;
    Ok(task.expanded)
}

/// Remove every task unconditionally. Returns how many were removed.
pub fn clear_tasks(tasks: &mut Vec<Task>) -> usize {
    let count = tasks.len();
    tasks.clear();
    count
}

/// Drop tasks whose id repeats an earlier one. Returns how many were dropped.
pub fn dedupe_tasks(tasks: &mut Vec<Task>) -> usize {
    let before = tasks.len();
    let mut seen = HashSet::new();
    tasks.retain(|t| seen.insert(t.id.clone()));
    before - tasks.len()
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

pub fn find_task<'a>(tasks: &'a [Task], task_id: &str) -> Option<&'a Task> {
    tasks.iter().find(|t| t.id == task_id)
}

pub fn find_task_mut<'a>(tasks: &'a mut [Task], task_id: &str) -> Option<&'a mut Task> {
    tasks.iter_mut().find(|t| t.id == task_id)
}

fn validate_title(title: &str) -> Result<String, TaskError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    Ok(title.to_string())
}
