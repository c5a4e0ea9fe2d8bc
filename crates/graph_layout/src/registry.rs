use crate::builtin;
use crate::config::LayoutConfig;
use crate::error::RegistryError;
use crate::{Layout, LayoutDescriptor};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Set of available layouts, resolved by id
///
/// Built once at startup and shared read-only afterwards, typically behind
/// an `Arc`.
#[derive(Debug, Default)]
pub struct LayoutRegistry {
    layouts: Vec<Layout>,
    index: HashMap<String, usize>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every builtin layout
    pub fn with_builtins(config: &LayoutConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for layout in builtin::layouts(config) {
            registry.register(layout)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, layout: impl Into<Layout>) -> Result<(), RegistryError> {
        let layout = layout.into();
        let id = layout.id().to_string();
        if self.index.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }

        let mut seen = HashSet::new();
        if let Some(parameter) = layout
            .parameters()
            .iter()
            .find(|parameter| !seen.insert(parameter.id.as_str()))
        {
            return Err(RegistryError::DuplicateParameter {
                layout: id,
                parameter: parameter.id.clone(),
            });
        }

        debug!("Registered {} layout {id}", layout.kind());
        self.index.insert(id, self.layouts.len());
        self.layouts.push(layout);
        Ok(())
    }

    pub fn resolve(&self, id: &str) -> Result<&Layout, RegistryError> {
        self.index
            .get(id)
            .map(|&i| &self.layouts[i])
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Layouts in registration order
    pub fn list(&self) -> impl Iterator<Item = &Layout> + '_ {
        self.layouts.iter()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::NumberParameter;
    use crate::{LayoutMapping, LayoutParameter, SyncLayout};
    use test_log::test;

    fn noop(id: &str) -> SyncLayout {
        SyncLayout::from_fn(id, |_, _| Ok(LayoutMapping::new()))
    }

    #[test]
    fn resolves_registered_layouts() {
        let mut registry = LayoutRegistry::new();
        registry.register(noop("a")).unwrap();
        registry.register(noop("b")).unwrap();

        assert_eq!(registry.resolve("b").unwrap().id(), "b");
        assert_eq!(
            registry.resolve("c").unwrap_err(),
            RegistryError::NotFound("c".into())
        );
        let ids: Vec<&str> = registry.list().map(|layout| layout.id()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut registry = LayoutRegistry::new();
        registry.register(noop("a")).unwrap();
        assert_eq!(
            registry.register(noop("a")),
            Err(RegistryError::DuplicateId("a".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rejects_duplicate_parameter_ids() {
        let layout = noop("a")
            .with_parameter(LayoutParameter::number("x", NumberParameter::new(0.0)))
            .with_parameter(LayoutParameter::boolean("x", false));
        let mut registry = LayoutRegistry::new();
        assert_eq!(
            registry.register(layout),
            Err(RegistryError::DuplicateParameter {
                layout: "a".into(),
                parameter: "x".into(),
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn builtins_register_cleanly() {
        let registry = LayoutRegistry::with_builtins(&LayoutConfig::default()).unwrap();
        let ids: Vec<&str> = registry.list().map(|layout| layout.id()).collect();
        assert_eq!(
            ids,
            ["random", "circular", "circlepack", "layered", "script", "force"]
        );
    }
}
