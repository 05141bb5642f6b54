//! Category registry
//!
//! Category names are interned once per compile pass so that per-day category
//! work indexes fixed-size arrays instead of growing a map while iterating.

use rustc_hash::FxHashMap;
use tracing::warn;

use super::ids::CategoryId;

/// Category used by rules that carry no labels
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Category that absorbs cash swept into the investment account
pub const INVESTMENT: &str = "Investment";

/// Interned category names in first-seen order.
///
/// Lookups are exact (case-sensitive); case-insensitive de-duplication happens
/// per rule when labels are normalized.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    names: Vec<String>,
    index: FxHashMap<String, CategoryId>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `name`, registering it if unseen.
    ///
    /// Once every id is taken, unseen names share the last category.
    pub fn intern(&mut self, name: &str) -> CategoryId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let Ok(next) = u16::try_from(self.names.len()) else {
            warn!(category = name, "Category limit reached, merging into the last category");
            return CategoryId(u16::MAX);
        };
        let id = CategoryId(next);
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, name: &str) -> Option<CategoryId> {
        self.index.get(name).copied()
    }

    pub fn name(&self, id: CategoryId) -> &str {
        &self.names[id.index()]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (CategoryId(i as u16), name.as_str()))
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let mut registry = CategoryRegistry::new();
        let rent = registry.intern("Rent");
        let food = registry.intern("Food");
        assert_eq!(registry.intern("Rent"), rent);
        assert_ne!(rent, food);
        assert_eq!(registry.name(food), "Food");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut registry = CategoryRegistry::new();
        registry.intern("Rent");
        assert!(registry.get("rent").is_none());
        let names: Vec<&str> = registry.iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["Rent"]);
    }

    #[test]
    fn test_ids_do_not_wrap_when_full() {
        let mut registry = CategoryRegistry::new();
        for i in 0..=u16::MAX {
            registry.intern(&format!("c{i}"));
        }
        assert_eq!(registry.len(), 65_536);
        assert_eq!(registry.intern("c0"), CategoryId(0));
        assert_eq!(registry.intern("one too many"), CategoryId(u16::MAX));
        assert_eq!(registry.len(), 65_536);
        assert_eq!(registry.name(CategoryId(u16::MAX)), "c65535");
    }
}
