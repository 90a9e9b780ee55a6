//! In-memory template registry.

use super::{Template, builtin};
use crate::error::TemplateError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// A registry shared across threads.
///
/// The registry itself is plain data mutated through `&mut self`; hosts that
/// compose prompts from several threads wrap it in a lock.
pub type SharedRegistry = Arc<RwLock<TemplateRegistry>>;

/// Named templates, keyed by [`Template::name`].
///
/// Lives for the lifetime of the process and is never persisted. Built-in
/// templates are added by [`with_builtins`](Self::with_builtins); callers
/// may add, overwrite, or delete entries at runtime.
///
/// # Example
///
/// ```
/// use kinder_prompt::template::{Template, TemplateRegistry};
///
/// let mut registry = TemplateRegistry::new();
/// registry.register(Template::new("greet", "Hello {{name}}").with_variables(["name"]));
///
/// assert!(registry.get("greet").is_some());
/// assert!(registry.delete("greet"));
/// assert!(registry.get("greet").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the built-in catalogue.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Register (or re-register) every built-in template.
    ///
    /// Idempotent: running it again overwrites entries with identical content.
    pub fn register_builtins(&mut self) {
        for template in builtin::catalogue() {
            self.register(template);
        }
        debug!("registered {} built-in templates", self.templates.len());
    }

    /// Insert a template, overwriting any entry with the same name.
    ///
    /// Never fails. Placeholders in the body that are not declared in
    /// `variables` are logged; they will pass through rendering unresolved.
    pub fn register(&mut self, template: Template) {
        let undeclared = template.undeclared_placeholders();
        if !undeclared.is_empty() {
            warn!(
                template = %template.name,
                "template uses undeclared placeholders: {}",
                undeclared.join(", ")
            );
        }
        self.templates.insert(template.name.clone(), template);
    }

    /// Insert a template only if it is well formed.
    ///
    /// Rejects an empty name and any body placeholder missing from
    /// `variables`.
    pub fn try_register(&mut self, template: Template) -> Result<(), TemplateError> {
        if template.name.trim().is_empty() {
            return Err(TemplateError::EmptyName);
        }
        let undeclared = template.undeclared_placeholders();
        if !undeclared.is_empty() {
            return Err(TemplateError::UndeclaredPlaceholders {
                name: template.name,
                placeholders: undeclared,
            });
        }
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Snapshot of every registered template, sorted by name.
    pub fn all(&self) -> Vec<&Template> {
        let mut all: Vec<&Template> = self.templates.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Remove a template. Returns `true` if it existed.
    pub fn delete(&mut self, name: &str) -> bool {
        self.templates.remove(name).is_some()
    }

    /// Check if a template with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Wrap the registry for shared, lock-guarded access.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greet() -> Template {
        Template::new("greet", "Hello {{name}}")
            .with_variables(["name"])
            .with_description("greeting")
    }

    #[test]
    fn empty_registry() {
        let registry = TemplateRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("anything").is_none());
    }

    #[test]
    fn register_is_idempotent() {
        let mut once = TemplateRegistry::new();
        once.register(greet());

        let mut twice = TemplateRegistry::new();
        twice.register(greet());
        twice.register(greet());

        assert_eq!(once.get("greet"), twice.get("greet"));
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn register_overwrites_by_name() {
        let mut registry = TemplateRegistry::new();
        registry.register(greet());
        registry.register(Template::new("greet", "Hi"));
        assert_eq!(registry.get("greet").unwrap().body, "Hi");
    }

    #[test]
    fn register_accepts_undeclared_placeholders() {
        let mut registry = TemplateRegistry::new();
        registry.register(Template::new("loose", "{{undeclared}}"));
        assert!(registry.contains("loose"));
    }

    #[test]
    fn try_register_rejects_undeclared_placeholders() {
        let mut registry = TemplateRegistry::new();
        let err = registry
            .try_register(Template::new("loose", "{{a}} {{b}}").with_variables(["a"]))
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::UndeclaredPlaceholders {
                name: "loose".into(),
                placeholders: vec!["b".into()],
            }
        );
        assert!(!registry.contains("loose"));
    }

    #[test]
    fn try_register_rejects_empty_name() {
        let mut registry = TemplateRegistry::new();
        assert_eq!(
            registry.try_register(Template::new("  ", "body")),
            Err(TemplateError::EmptyName)
        );
    }

    #[test]
    fn try_register_accepts_well_formed() {
        let mut registry = TemplateRegistry::new();
        assert!(registry.try_register(greet()).is_ok());
        assert!(registry.contains("greet"));
    }

    #[test]
    fn delete_reports_existence() {
        let mut registry = TemplateRegistry::new();
        registry.register(greet());
        assert!(registry.delete("greet"));
        assert!(!registry.delete("greet"));
    }

    #[test]
    fn all_is_sorted_by_name() {
        let mut registry = TemplateRegistry::new();
        registry.register(Template::new("b", ""));
        registry.register(Template::new("a", ""));
        let names: Vec<&str> = registry.all().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn builtins_bootstrap_is_idempotent() {
        let mut registry = TemplateRegistry::with_builtins();
        let before = registry.len();
        let base_before = registry.get(builtin::BASE_SYSTEM).cloned();
        registry.register_builtins();
        assert_eq!(registry.len(), before);
        assert_eq!(registry.get(builtin::BASE_SYSTEM).cloned(), base_before);
    }

    #[test]
    fn shared_registry_allows_concurrent_reads() {
        let shared = TemplateRegistry::with_builtins().into_shared();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    let guard = shared.read().unwrap();
                    guard.contains(builtin::BASE_SYSTEM)
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
