use crate::articles::ArticleTable;
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_TEST_PREFIX: &str = "test ";
pub const DEFAULT_PENDING_MARKER: &str = "eventually";
pub const DEFAULT_PENDING_REASON: &str = "not yet implemented";

/// Naming and alias knobs for a suite.
///
/// ```
/// use context_suite::SuiteConfig;
///
/// let config = SuiteConfig::from_json(r#"{"articles": {"given": "given"}}"#).unwrap();
/// assert_eq!(config.test_prefix, "test ");
/// assert!(config.article_table().contains("given"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Literal every qualified test name starts with.
    pub test_prefix: String,
    /// Word inserted before a pending test's own name.
    pub pending_marker: String,
    /// Skip reason reported for pending tests.
    pub pending_reason: String,
    /// Extra aliases (alias -> label), merged over the built-ins.
    pub articles: BTreeMap<String, String>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            test_prefix: DEFAULT_TEST_PREFIX.to_string(),
            pending_marker: DEFAULT_PENDING_MARKER.to_string(),
            pending_reason: DEFAULT_PENDING_REASON.to_string(),
            articles: BTreeMap::new(),
        }
    }
}

impl SuiteConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Built-in aliases plus the configured ones.
    pub fn article_table(&self) -> ArticleTable {
        let mut table = ArticleTable::with_builtins();
        for (alias, label) in &self.articles {
            table.register_label(alias, label.clone());
        }
        table
    }

    /// Own name used for a pending test, e.g. `"eventually works"`.
    pub(crate) fn pending_name(&self, own: &str) -> String {
        format!("{} {own}", self.pending_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SuiteError;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_json_yields_defaults() {
        assert_eq!(SuiteConfig::from_json("{}").unwrap(), SuiteConfig::default());
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let json = r#"{"pending_marker": "someday", "articles": {"with": "with"}}"#;
        let config = SuiteConfig::from_json(json).unwrap();
        assert_eq!(config.pending_marker, "someday");
        assert_eq!(config.test_prefix, DEFAULT_TEST_PREFIX);
        assert_eq!(config.pending_name("flies"), "someday flies");
        let table = config.article_table();
        assert_eq!(table.compose("with", "wings").unwrap(), "with wings");
        assert_eq!(table.compose("a", "bird").unwrap(), "a bird");
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = SuiteConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SuiteError::Config(_)));
    }
}
