//! Category registry: id → name/color, seeded with five built-in categories.

use rand::Rng;
use tracing::info;

use crate::error::{Record, Result, TaskError};
use crate::models::Category;

/// Fallback category for tasks whose category is deleted or unknown.
pub const OTHERS: &str = "others";

/// Built-in categories as `(id, name, color)`. These can never be deleted.
pub const DEFAULT_CATEGORIES: [(&str, &str, &str); 5] = [
    ("home", "Home", "#4a6fa5"),
    ("personal", "Personal", "#ff9a3c"),
    ("work", "Work", "#ff5252"),
    ("study", "Study", "#33d9b2"),
    (OTHERS, "Others", "#a55eea"),
];

pub fn is_default(id: &str) -> bool {
    DEFAULT_CATEGORIES.iter().any(|(d, _, _)| *d == id)
}

/// Derives a category id from its display name: lowercase, whitespace runs
/// collapsed to a single dash.
///
/// `"Side Projects"` becomes `side-projects`.
pub fn derive_id(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Draws six independent random hex digits, e.g. `#3FA90C`.
pub fn random_color() -> String {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    let mut rng = rand::thread_rng();
    let mut color = String::with_capacity(7);
    color.push('#');
    for _ in 0..6 {
        color.push(DIGITS[rng.gen_range(0..16)] as char);
    }
    color
}

/// Returns true for `#RRGGBB` strings.
pub fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(id, name, color)| Category {
                    id: id.to_string(),
                    name: name.to_string(),
                    color: color.to_string(),
                })
                .collect(),
        }
    }
}

impl CategoryRegistry {
    /// Builds a registry from persisted records.
    ///
    /// Any built-in category missing from `categories` is re-seeded at the end
    /// so the five defaults always exist.
    pub fn from_records(categories: Vec<Category>) -> Self {
        let mut registry = Self { categories };
        for (id, name, color) in DEFAULT_CATEGORIES {
            if registry.get(id).is_none() {
                registry.categories.push(Category {
                    id: id.to_string(),
                    name: name.to_string(),
                    color: color.to_string(),
                });
            }
        }
        registry
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The id a task's category should be read as: itself when known,
    /// otherwise `others`.
    pub fn resolve<'a>(&self, id: &'a str) -> &'a str {
        if self.contains(id) { id } else { OTHERS }
    }

    /// Adds a category named `name`. The id is derived from the name and a
    /// collision with an existing id is rejected.
    pub fn add(&mut self, name: &str, color: Option<&str>) -> Result<Category> {
        let name = name.trim();
        let id = derive_id(name);
        if id.is_empty() {
            return Err(TaskError::validation("category name cannot be empty"));
        }
        if self.contains(&id) {
            return Err(TaskError::CategoryExists(id));
        }
        let color = match color.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => c.to_string(),
            None => random_color(),
        };
        let category = Category { id, name: name.to_string(), color };
        info!(id = %category.id, color = %category.color, "category added");
        self.categories.push(category.clone());
        Ok(category)
    }

    /// Renames and/or recolors. Returns false if `id` is unknown.
    pub fn update(&mut self, id: &str, name: Option<&str>, color: Option<&str>) -> Result<bool> {
        let Some(category) = self.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(false);
        };
        let name = name.map(str::trim);
        if name == Some("") {
            return Err(TaskError::validation("category name cannot be empty"));
        }
        if let Some(n) = name { category.name = n.to_string(); }
        if let Some(c) = color.map(str::trim).filter(|c| !c.is_empty()) {
            category.color = c.to_string();
        }
        Ok(true)
    }

    /// Removes a non-default category and returns it. Task reassignment is the
    /// caller's job.
    pub fn remove(&mut self, id: &str) -> Result<Category> {
        if is_default(id) {
            return Err(TaskError::ProtectedCategory(id.to_string()));
        }
        let idx = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| TaskError::not_found(Record::Category, id))?;
        Ok(self.categories.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_id_collapses_whitespace() {
        assert_eq!(derive_id("Side Projects"), "side-projects");
        assert_eq!(derive_id("  Deep   Work "), "deep-work");
        assert_eq!(derive_id("   "), "");
    }

    #[test]
    fn random_color_is_hex() {
        for _ in 0..32 {
            let c = random_color();
            assert!(is_hex_color(&c), "bad color {}", c);
        }
    }

    #[test]
    fn add_rejects_colliding_ids() {
        let mut reg = CategoryRegistry::default();
        reg.add("Side Projects", None).unwrap();
        let err = reg.add("side   projects", Some("#000000")).unwrap_err();
        assert!(matches!(err, TaskError::CategoryExists(id) if id == "side-projects"));
        assert!(matches!(reg.add("Work", None), Err(TaskError::CategoryExists(_))));
    }

    #[test]
    fn from_records_reseeds_defaults() {
        let reg = CategoryRegistry::from_records(vec![Category {
            id: "garden".into(),
            name: "Garden".into(),
            color: "#00ff00".into(),
        }]);
        assert_eq!(reg.all().len(), 6);
        assert_eq!(reg.all()[0].id, "garden");
        assert!(DEFAULT_CATEGORIES.iter().all(|(id, _, _)| reg.contains(id)));
    }

    #[test]
    fn resolve_falls_back_to_others() {
        let reg = CategoryRegistry::default();
        assert_eq!(reg.resolve("work"), "work");
        assert_eq!(reg.resolve("gone"), OTHERS);
    }

    #[test]
    fn update_unknown_is_noop() {
        let mut reg = CategoryRegistry::default();
        let before = reg.clone();
        assert!(!reg.update("nope", Some("Nope"), None).unwrap());
        assert_eq!(reg, before);
    }
}
