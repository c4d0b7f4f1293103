use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
    /// Older records store "no priority" as `""` or the string `"null"`
    #[default]
    #[serde(alias = "", alias = "null")]
    None,
}

impl Priority {
    /// Sort rank; higher ranks sort first
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
            Priority::None => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::None => "none",
        }
    }

    /// Parse a user-supplied priority name (case-insensitive; empty means none)
    pub fn parse_priority(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Some(Priority::High),
            "medium" | "med" | "m" => Some(Priority::Medium),
            "low" | "l" => Some(Priority::Low),
            "none" | "" => Some(Priority::None),
            _ => None,
        }
    }
}

/// A child unit of work owned by exactly one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Subtask {
    pub fn new(id: String, text: String) -> Self {
        Subtask {
            id,
            text,
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// A task record as held in the store and persisted under the `tasks` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(alias = "text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::priority")]
    pub priority: Priority,
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
    /// Category id; may dangle after the category is deleted
    #[serde(default, alias = "categoryId", deserialize_with = "lenient::category")]
    pub category: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, deserialize_with = "lenient::subtasks")]
    pub subtasks: Vec<Subtask>,
    /// Display-only: whether the subtask list is unfolded
    #[serde(default)]
    pub expanded: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a fresh, incomplete task from an already-validated draft
    pub fn new(id: String, draft: TaskDraft) -> Self {
        Task {
            id,
            title: draft.title,
            priority: draft.priority,
            due_date: draft.due_date,
            category: draft.category,
            completed: false,
            subtasks: Vec::new(),
            expanded: false,
            created_at: Utc::now(),
        }
    }
}

/// Payload for creating a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        TaskDraft {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.category = Some(category_id.into());
        self
    }
}

/// Full replacement payload for editing a task.
///
/// Every field except the id is replaced. `completed` and `subtasks` are
/// kept from the existing task when left as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub completed: Option<bool>,
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskUpdate {
    /// Start an update from a task's current field values
    pub fn from_task(task: &Task) -> Self {
        TaskUpdate {
            title: task.title.clone(),
            priority: task.priority,
            due_date: task.due_date,
            category: task.category.clone(),
            completed: None,
            subtasks: None,
        }
    }
}

impl From<TaskDraft> for TaskUpdate {
    fn from(draft: TaskDraft) -> Self {
        TaskUpdate {
            title: draft.title,
            priority: draft.priority,
            due_date: draft.due_date,
            category: draft.category,
            completed: None,
            subtasks: None,
        }
    }
}

/// Parse a due date: a plain `YYYY-MM-DD` date, or an RFC 3339 timestamp
/// whose date part is kept.
pub fn parse_due_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// `dueDate` as an ISO-8601 date string or null
pub mod due_date {
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_due_date(s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid due date: {s}"))),
        }
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};

    use super::{Priority, Subtask};

    pub fn priority<'de, D: Deserializer<'de>>(d: D) -> Result<Priority, D::Error> {
        Ok(Option::<Priority>::deserialize(d)?.unwrap_or_default())
    }

    pub fn category<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<String>::deserialize(d)?.filter(|c| !c.trim().is_empty()))
    }

    pub fn subtasks<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Subtask>, D::Error> {
        Ok(Option::<Vec<Subtask>>::deserialize(d)?.unwrap_or_default())
    }
}
