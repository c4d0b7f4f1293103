use chrono::NaiveDate;
use serde::Serialize;

use crate::board::Notice;
use crate::model::category::Category;
use crate::model::task::{Priority, Subtask};
use crate::ops::subtask_ops::Progress;
use crate::ops::view::{TaskRow, ViewFilter, ViewModel};
use crate::util::unicode::fit_to_width;

/// Width of the title column in text listings
const TITLE_WIDTH: usize = 36;
/// Characters of an id shown in text listings
const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewJson {
    pub filter: ViewFilter,
    pub total: usize,
    pub tasks: Vec<TaskJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<String>,
    /// Resolved category; null when absent or deleted
    pub category: Option<Category>,
    pub completed: bool,
    pub expanded: bool,
    pub subtasks: Vec<SubtaskJson>,
    pub progress: ProgressJson,
}

#[derive(Serialize)]
pub struct SubtaskJson {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct ProgressJson {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

#[derive(Serialize)]
pub struct CategoryListJson {
    pub categories: Vec<Category>,
    pub active: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn view_to_json(view: &ViewModel, notices: &[Notice]) -> ViewJson {
    ViewJson {
        filter: view.filter.clone(),
        total: view.total,
        tasks: view.rows.iter().map(row_to_json).collect(),
        notices: notices.to_vec(),
    }
}

pub fn row_to_json(row: &TaskRow) -> TaskJson {
    let task = &row.task;
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        priority: task.priority,
        due_date: task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
        category: row.category.clone(),
        completed: task.completed,
        expanded: task.expanded,
        subtasks: task.subtasks.iter().map(subtask_to_json).collect(),
        progress: progress_to_json(row.progress),
    }
}

fn subtask_to_json(subtask: &Subtask) -> SubtaskJson {
    SubtaskJson {
        id: subtask.id.clone(),
        text: subtask.text.clone(),
        completed: subtask.completed,
    }
}

fn progress_to_json(progress: Progress) -> ProgressJson {
    ProgressJson {
        completed: progress.completed,
        total: progress.total,
        percent: progress.percent(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Abbreviated month and day, e.g. `May 1`
pub fn format_due(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

fn checkbox(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

/// One line per task, plus indented subtask lines for expanded tasks
pub fn format_view(view: &ViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(header) = format_filter(&view.filter) {
        lines.push(header);
    }
    if let Some(message) = view.empty_message() {
        lines.push(message.to_string());
        return lines;
    }
    for row in &view.rows {
        lines.push(format_row(row));
        if row.task.expanded {
            for sub in &row.task.subtasks {
                lines.push(format!(
                    "      {} {}  {}",
                    checkbox(sub.completed),
                    short_id(&sub.id),
                    sub.text
                ));
            }
        }
    }
    lines
}

fn format_filter(filter: &ViewFilter) -> Option<String> {
    if !filter.is_active() {
        return None;
    }
    let mut parts = Vec::new();
    if let Some(category) = &filter.category {
        parts.push(format!("category={}", category));
    }
    if !filter.text.is_empty() {
        parts.push(format!("text=\"{}\"", filter.text));
    }
    Some(format!("filter: {}", parts.join(" ")))
}

pub fn format_row(row: &TaskRow) -> String {
    let task = &row.task;
    let mut line = format!(
        "{} {}  {}",
        checkbox(task.completed),
        short_id(&task.id),
        fit_to_width(&task.title, TITLE_WIDTH)
    );
    let mut tags = Vec::new();
    if task.priority != Priority::None {
        tags.push(task.priority.as_str().to_uppercase());
    }
    if let Some(due) = task.due_date {
        tags.push(format!("📅 {}", format_due(due)));
    }
    if let Some(category) = &row.category {
        tags.push(category.label());
    }
    if row.progress.total > 0 {
        tags.push(format!(
            "{}/{} subtasks ({}%)",
            row.progress.completed,
            row.progress.total,
            row.progress.percent()
        ));
    }
    if !tags.is_empty() {
        line.push_str("  ");
        line.push_str(&tags.join("  "));
    }
    line.trim_end().to_string()
}

pub fn format_categories(categories: &[Category], active: Option<&str>) -> Vec<String> {
    if categories.is_empty() {
        return vec!["No categories.".to_string()];
    }
    categories
        .iter()
        .map(|c| {
            let marker = if active == Some(c.id.as_str()) { "*" } else { " " };
            let line = format!("{} {}  {}  {}", marker, short_id(&c.id), c.label(), c.symbol);
            line.trim_end().to_string()
        })
        .collect()
}

pub fn format_notice(notice: &Notice) -> String {
    match notice {
        Notice::Info(m) => format!("note: {}", m),
        Notice::Warning(m) => format!("warning: {}", m),
    }
}
