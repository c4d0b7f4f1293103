use std::collections::HashSet;

use crate::model::category::{Category, NEW_CATEGORY_EMOJI, NEW_CATEGORY_NAME, NEW_CATEGORY_SYMBOL};
use crate::ops::task_ops::{TaskError, new_id};

/// New display values for a category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryEdit {
    pub name: String,
    pub emoji: String,
    pub symbol: String,
}

impl CategoryEdit {
    pub fn from_category(category: &Category) -> Self {
        CategoryEdit {
            name: category.name.clone(),
            emoji: category.emoji.clone(),
            symbol: category.symbol.clone(),
        }
    }
}

/// Append a placeholder category. Returns its id.
pub fn add_category(categories: &mut Vec<Category>) -> String {
    let mut id = new_id();
    while find_category(categories, &id).is_some() {
        id = new_id();
    }
    categories.push(Category::new(
        id.clone(),
        NEW_CATEGORY_NAME,
        NEW_CATEGORY_EMOJI,
        NEW_CATEGORY_SYMBOL,
    ));
    id
}

/// Rename and redecorate a category in place.
/// An edit whose name is blank after trimming is discarded.
pub fn edit_category(categories: &mut [Category], category_id: &str, edit: CategoryEdit) -> Result<(), TaskError> {
    let name = edit.name.trim();
    if name.is_empty() {
        return Err(TaskError::EmptyName);
    }
    let category = categories
        .iter_mut()
        .find(|c| c.id == category_id)
        .ok_or_else(|| TaskError::CategoryNotFound(category_id.to_string()))?;
    category.name = name.to_string();
    category.emoji = edit.emoji.trim().to_string();
    category.symbol = edit.symbol.trim().to_string();
    Ok(())
}

/// Remove a category. Tasks referencing it are left untouched.
pub fn delete_category(categories: &mut Vec<Category>, category_id: &str) -> Result<Category, TaskError> {
    let idx = categories
        .iter()
        .position(|c| c.id == category_id)
        .ok_or_else(|| TaskError::CategoryNotFound(category_id.to_string()))?;
    Ok(categories.remove(idx))
}

/// Drop categories whose id repeats an earlier one. Returns how many were dropped.
pub fn dedupe_categories(categories: &mut Vec<Category>) -> usize {
    let before = categories.len();
    let mut seen = HashSet::new();
    categories.retain(|c| seen.insert(c.id.clone()));
    before - categories.len()
}

pub fn find_category<'a>(categories: &'a [Category], category_id: &str) -> Option<&'a Category> {
    categories.iter().find(|c| c.id == category_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::default_categories;

    #[test]
    fn test_add_category_placeholder() {
        let mut cats = default_categories();
        let id = add_category(&mut cats);
        let added = cats.last().unwrap();
        assert_eq!(added.id, id);
        assert_eq!(added.name, "New Category");
        assert_eq!(added.emoji, "📖");
        assert_eq!(added.symbol, "📝");
    }

    #[test]
    fn test_edit_category_trims() {
        let mut cats = default_categories();
        edit_category(
            &mut cats,
            "news",
            CategoryEdit {
                name: "  Current Affairs ".into(),
                emoji: " 🗞️ ".into(),
                symbol: "".into(),
            },
        )
        .unwrap();
        let news = find_category(&cats, "news").unwrap();
        assert_eq!(news.name, "Current Affairs");
        assert_eq!(news.emoji, "🗞️");
        assert_eq!(news.symbol, "");
    }

    #[test]
    fn test_edit_category_blank_name_discarded() {
        let mut cats = default_categories();
        let before = cats.clone();
        let edit = CategoryEdit {
            name: "   ".into(),
            emoji: "x".into(),
            symbol: "y".into(),
        };
        assert_eq!(edit_category(&mut cats, "news", edit), Err(TaskError::EmptyName));
        assert_eq!(cats, before);
    }

    #[test]
    fn test_edit_missing_category() {
        let mut cats = default_categories();
        let edit = CategoryEdit {
            name: "X".into(),
            ..Default::default()
        };
        assert!(edit_category(&mut cats, "ghost", edit).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_category() {
        let mut cats = default_categories();
        let removed = delete_category(&mut cats, "english").unwrap();
        assert_eq!(removed.name, "English");
        assert!(find_category(&cats, "english").is_none());
        assert!(delete_category(&mut cats, "english").is_err());
    }

    #[test]
    fn test_dedupe_categories() {
        let mut cats = default_categories();
        cats.push(Category::new("math", "Maths again", "", ""));
        cats.push(cats[1].clone());
        assert_eq!(dedupe_categories(&mut cats), 2);
        assert_eq!(cats, default_categories());
    }
}
