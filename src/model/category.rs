use serde::{Deserialize, Serialize};

/// Name given to a freshly added category until the user renames it
pub const NEW_CATEGORY_NAME: &str = "New Category";
pub const NEW_CATEGORY_EMOJI: &str = "📖";
pub const NEW_CATEGORY_SYMBOL: &str = "📝";

/// A named grouping label that tasks may reference by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Decorative only
    #[serde(default)]
    pub emoji: String,
    /// Decorative only
    #[serde(default)]
    pub symbol: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, emoji: &str, symbol: &str) -> Self {
        Category {
            id: id.into(),
            name: name.into(),
            emoji: emoji.to_string(),
            symbol: symbol.to_string(),
        }
    }

    /// Emoji and name, as shown in listings and filter menus
    pub fn label(&self) -> String {
        if self.emoji.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.emoji, self.name)
        }
    }
}

/// Category set seeded when storage holds no categories record
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("math", "Maths", "📐", "∑"),
        Category::new("science", "Science", "🔬", "⚗️"),
        Category::new("english", "English", "📚", "✍️"),
        Category::new("history", "History", "🏛️", "⏳"),
        Category::new("drama", "Drama", "🎭", "🎪"),
        Category::new("news", "News", "📰", "📡"),
        Category::new("hpe", "HPE", "⚽", "💪"),
    ]
}
