use crate::errors::{Result, SuiteError};
use std::collections::HashMap;
use std::sync::Arc;

/// Aliases available out of the box.
pub const BUILTIN_ARTICLES: [&str; 5] = ["a", "an", "and_also", "that", "the"];

/// Lookup table from opener alias to the word(s) it prepends to a context
/// name.
///
/// Every alias behaves the same way; only the label differs. An underscore
/// in an alias becomes a space in its default label, so `and_also` opens
/// contexts named `"and also ..."`.
#[derive(Clone, Default, Debug)]
pub struct ArticleTable {
    inner: Arc<HashMap<String, String>>,
}

impl ArticleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        for alias in BUILTIN_ARTICLES {
            table.register(alias);
        }
        table
    }

    /// Register `alias` with its default label.
    pub fn register(&mut self, alias: &str) {
        self.register_label(alias, alias.replace('_', " "));
    }

    /// Register `alias` with an explicit label, replacing any previous one.
    pub fn register_label(&mut self, alias: &str, label: impl Into<String>) {
        Arc::make_mut(&mut self.inner).insert(alias.to_string(), label.into());
    }

    pub fn label(&self, alias: &str) -> Option<&str> {
        self.inner.get(alias).map(String::as_str)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.inner.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Build the context name `alias` opens for `name`.
    pub fn compose(&self, alias: &str, name: &str) -> Result<String> {
        let label = self
            .label(alias)
            .ok_or_else(|| SuiteError::UnknownArticle(alias.to_string()))?;
        Ok(format!("{label} {name}"))
    }
}
