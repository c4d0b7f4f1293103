use crate::model::task::{Subtask, Task};
use crate::ops::task_ops::{TaskError, find_task_mut, new_id};

/// Derived subtask completion for one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn of(task: &Task) -> Self {
        Progress {
            completed: task.subtasks.iter().filter(|s| s.completed).count(),
            total: task.subtasks.len(),
        }
    }

    /// Completion percentage rounded to the nearest integer; 0 with no subtasks
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100 + self.total / 2) / self.total) as u8
    }
}

/// Append a subtask to a task. Returns the new subtask id.
pub fn add_subtask(tasks: &mut [Task], task_id: &str, text: &str) -> Result<String, TaskError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TaskError::EmptySubtask);
    }
    let task = find_task_mut(tasks, task_id)
        .ok_or_else(|| TaskError::TaskNotFound(task_id.to_string()))?;
    let mut id = new_id();
    while task.subtasks.iter().any(|s| s.id == id) {
        id = new_id();
    }
    task.subtasks.push(Subtask::new(id.clone(), text.to_string()));
    Ok(id)
}

/// Flip a subtask's completion. Returns the new state.
pub fn toggle_subtask(tasks: &mut [Task], task_id: &str, subtask_id: &str) -> Result<bool, TaskError> {
    let subtask = find_subtask_mut(tasks, task_id, subtask_id)?;
    subtask.completed = !subtask.completed;
    Ok(subtask.completed)
}

/// Remove a subtask. Returns the removed subtask.
pub fn delete_subtask(tasks: &mut [Task], task_id: &str, subtask_id: &str) -> Result<Subtask, TaskError> {
    let task = find_task_mut(tasks, task_id)
        .ok_or_else(|| TaskError::TaskNotFound(task_id.to_string()))?;
    let idx = task
        .subtasks
        .iter()
        .position(|s| s.id == subtask_id)
        .ok_or_else(|| TaskError::SubtaskNotFound(subtask_id.to_string()))?;
    Ok(task.subtasks.remove(idx))
}

fn find_subtask_mut<'a>(
    tasks: &'a mut [Task],
    task_id: &str,
    subtask_id: &str,
) -> Result<&'a mut Subtask, TaskError> {
    let task = find_task_mut(tasks, task_id)
        .ok_or_else(|| TaskError::TaskNotFound(task_id.to_string()))?;
    task.subtasks
        .iter_mut()
        .find(|s| s.id == subtask_id)
        .ok_or_else(|| TaskError::SubtaskNotFound(subtask_id.to_string()))
}
