use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::category::Category;
use crate::model::task::Task;
use crate::ops::category_ops::find_category;
use crate::ops::subtask_ops::Progress;

/// Active filters: free text and category equality
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    /// Case-insensitive substring matched against title or category name
    #[serde(default)]
    pub text: String,
    /// Keep only tasks referencing this category id
    #[serde(default)]
    pub category: Option<String>,
}

impl ViewFilter {
    pub fn is_active(&self) -> bool {
        !self.text.is_empty() || self.category.is_some()
    }

    /// Reset the category filter if it points at `category_id`.
    /// Returns true if the filter changed.
    pub fn forget_category(&mut self, category_id: &str) -> bool {
        if self.category.as_deref() == Some(category_id) {
            self.category = None;
            true
        } else {
            false
        }
    }

    pub fn matches(&self, task: &Task, categories: &[Category]) -> bool {
        if let Some(wanted) = &self.category
            && task.category.as_deref() != Some(wanted.as_str())
        {
            return false;
        }
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        if task.title.to_lowercase().contains(&needle) {
            return true;
        }
        task.category
            .as_deref()
            .and_then(|id| find_category(categories, id))
            .is_some_and(|c| c.name.to_lowercase().contains(&needle))
    }
}

/// Filter then order tasks for display.
pub fn view<'a>(tasks: &'a [Task], categories: &[Category], filter: &ViewFilter) -> Vec<&'a Task> {
    let mut shown: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t, categories)).collect();
    // Stable: ties on every tier keep store order
    shown.sort_by(|a, b| compare_tasks(a, b));
    shown
}

/// Display order: incomplete first, then earliest due date (undated last),
/// then highest priority, then title.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| compare_due_dates(a.due_date, b.due_date))
        .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
        .then_with(|| compare_titles(&a.title, &b.title))
}

/// Earlier first; a missing date sorts after any present date.
fn compare_due_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Dictionary-style title order. Base letters compare first, ignoring case
/// and accents (`Éclair` sorts with `e`); then unaccented before accented;
/// then lowercase before uppercase.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    title_key(a)
        .cmp(&title_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Lowercased base letters: canonical decomposition with combining marks dropped
fn title_key(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

/// One displayed task with its category resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub task: Task,
    /// None when the task has no category or its category was deleted
    pub category: Option<Category>,
    pub progress: Progress,
}

/// Everything a view layer needs to render the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub rows: Vec<TaskRow>,
    pub filter: ViewFilter,
    /// Tasks in the store, before filtering
    pub total: usize,
}

impl ViewModel {
    pub fn build(tasks: &[Task], categories: &[Category], filter: &ViewFilter) -> Self {
        let rows = view(tasks, categories, filter)
            .into_iter()
            .map(|task| TaskRow {
                task: task.clone(),
                category: task
                    .category
                    .as_deref()
                    .and_then(|id| find_category(categories, id))
                    .cloned(),
                progress: Progress::of(task),
            })
            .collect();
        ViewModel {
            rows,
            filter: filter.clone(),
            total: tasks.len(),
        }
    }

    pub fn titles(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.task.title.as_str()).collect()
    }

    /// Message to show in place of an empty list
    pub fn empty_message(&self) -> Option<&'static str> {
        if !self.rows.is_empty() {
            None
        } else if self.filter.category.is_some() {
            Some("No tasks in this category.")
        } else if self.total == 0 {
            Some("No tasks yet.")
        } else {
            Some("No tasks match the filter.")
        }
    }
}
