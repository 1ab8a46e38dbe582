//! Cross-reference resolution between note names and page ids.

use std::collections::HashMap;

/// Looks up page ids for note names and names for page ids.
pub trait CrossRefResolver: Send + Sync {
    /// Page id for a cross-reference target, if known.
    fn resolve(&self, target: &str) -> Option<String>;

    /// Display name for a page id, if known.
    fn name_for(&self, page_id: &str) -> Option<String>;
}

/// Resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl CrossRefResolver for NoopResolver {
    fn resolve(&self, _target: &str) -> Option<String> {
        None
    }

    fn name_for(&self, _page_id: &str) -> Option<String> {
        None
    }
}

/// In-memory name ⇄ id index. Name lookups ignore case.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    ids: HashMap<String, String>,
    names: HashMap<String, String>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a note. A later insert for the same name replaces the id.
    pub fn insert(&mut self, name: impl Into<String>, page_id: impl Into<String>) {
        let name = name.into();
        let page_id = page_id.into();
        self.ids.insert(name.to_lowercase(), page_id.clone());
        self.names.insert(page_id, name);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<N: Into<String>, I: Into<String>> FromIterator<(N, I)> for MapResolver {
    fn from_iter<T: IntoIterator<Item = (N, I)>>(iter: T) -> Self {
        let mut resolver = MapResolver::new();
        for (name, id) in iter {
            resolver.insert(name, id);
        }
        resolver
    }
}

impl CrossRefResolver for MapResolver {
    fn resolve(&self, target: &str) -> Option<String> {
        // Targets may carry a folder path or extension: `dir/Note.md`.
        let key = target.trim().to_lowercase();
        if let Some(id) = self.ids.get(&key) {
            return Some(id.clone());
        }
        let stem = key.rsplit('/').next().unwrap_or(&key);
        let stem = stem.strip_suffix(".md").unwrap_or(stem);
        self.ids.get(stem).cloned()
    }

    fn name_for(&self, page_id: &str) -> Option<String> {
        self.names.get(page_id).cloned()
    }
}
