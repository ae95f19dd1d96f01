//! Module Registry
//!
//! The set of module descriptors fetched once per session. Every other
//! component looks modules up here by identifier.

use std::collections::HashMap;

use crate::api::dto::ModuleDescriptor;

/// A module card in the module list panel
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleCard {
    pub id: String,
    /// `{icon} {name}`
    pub title: String,
    pub description: String,
    pub category: String,
}

/// Modules sharing one category, in server order
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBucket<'a> {
    pub category: &'a str,
    pub modules: Vec<&'a ModuleDescriptor>,
}

/// Lookup over the server's module list
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: Vec<ModuleDescriptor>,
    index: HashMap<String, usize>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the server list. A repeated identifier resolves to its
    /// last descriptor.
    pub fn from_descriptors(modules: Vec<ModuleDescriptor>) -> Self {
        let index = modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        Self { modules, index }
    }

    pub fn get(&self, id: &str) -> Option<&ModuleDescriptor> {
        self.index.get(id).map(|&i| &self.modules[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Descriptors in server order
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.iter()
    }

    /// Group modules by category. Buckets appear in order of first
    /// appearance; modules without a category land in `"general"`.
    pub fn by_category(&self) -> Vec<CategoryBucket<'_>> {
        let mut buckets: Vec<CategoryBucket<'_>> = Vec::new();
        for module in &self.modules {
            let category = module.category();
            match buckets.iter_mut().find(|b| b.category == category) {
                Some(bucket) => bucket.modules.push(module),
                None => buckets.push(CategoryBucket {
                    category,
                    modules: vec![module],
                }),
            }
        }
        buckets
    }

    /// One card per module, walking the category buckets
    pub fn cards(&self) -> Vec<ModuleCard> {
        self.by_category()
            .into_iter()
            .flat_map(|bucket| {
                bucket.modules.into_iter().map(move |m| ModuleCard {
                    id: m.id.clone(),
                    title: format!("{} {}", m.icon, m.name),
                    description: m.description.clone(),
                    category: bucket.category.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, category: Option<&str>) -> ModuleDescriptor {
        let d = ModuleDescriptor::new(id, id.to_uppercase(), "📦", "desc");
        match category {
            Some(c) => d.with_category(c),
            None => d,
        }
    }

    #[test]
    fn test_lookup() {
        let registry = ModuleRegistry::from_descriptors(vec![
            descriptor("crm", Some("ventas")),
            descriptor("proyectos", None),
        ]);

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("crm"));
        assert!(!registry.contains("informes"));
        assert_eq!(registry.get("proyectos").unwrap().name, "PROYECTOS");
    }

    #[test]
    fn test_every_module_in_exactly_one_bucket() {
        let registry = ModuleRegistry::from_descriptors(vec![
            descriptor("a", Some("ventas")),
            descriptor("b", None),
            descriptor("c", Some("ventas")),
            descriptor("d", Some("")),
            descriptor("e", Some("oficina")),
        ]);

        let buckets = registry.by_category();
        let categories: Vec<_> = buckets.iter().map(|b| b.category).collect();
        assert_eq!(categories, vec!["ventas", "general", "oficina"]);

        let ids: Vec<Vec<&str>> = buckets
            .iter()
            .map(|b| b.modules.iter().map(|m| m.id.as_str()).collect())
            .collect();
        assert_eq!(ids, vec![vec!["a", "c"], vec!["b", "d"], vec!["e"]]);

        let total: usize = buckets.iter().map(|b| b.modules.len()).sum();
        assert_eq!(total, registry.len());
    }

    #[test]
    fn test_cards() {
        let registry = ModuleRegistry::from_descriptors(vec![
            ModuleDescriptor::new("crm", "CRM", "👥", "Clientes").with_category("ventas"),
            descriptor("x", None),
        ]);

        let cards = registry.cards();
        assert_eq!(cards.len(), 2);
        assert_eq!(
            cards[0],
            ModuleCard {
                id: "crm".into(),
                title: "👥 CRM".into(),
                description: "Clientes".into(),
                category: "ventas".into(),
            }
        );
        assert_eq!(cards[1].category, "general");
    }

    #[test]
    fn test_duplicate_id_last_wins() {
        let registry = ModuleRegistry::from_descriptors(vec![
            ModuleDescriptor::new("crm", "Old", "👥", ""),
            ModuleDescriptor::new("crm", "New", "👥", ""),
        ]);
        assert_eq!(registry.get("crm").unwrap().name, "New");
        assert_eq!(registry.cards().len(), 2);
    }

    #[test]
    fn test_empty() {
        let registry = ModuleRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.by_category().is_empty());
        assert!(registry.cards().is_empty());
    }
}
