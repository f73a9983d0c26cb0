//! Per-call options for client operations.

use crate::batch::{BatchConfig, FieldList};
use crate::cli::TableMode;
use crate::config::SessionConfig;

/// Options accepted by lookups and queries.
///
/// Service parameters (`fields`, `scopes`, `size`, `skip`, `sort` and any
/// `extra` pairs) are sent on the wire; the rest steer batching and output.
///
/// ```
/// use ferro_myvariant::client::QueryOptions;
///
/// let opts = QueryOptions::new()
///     .fields("cadd.phred,dbsnp.rsid")
///     .scopes(vec!["dbsnp.rsid"])
///     .size(5);
/// let params = opts.params();
/// assert!(params.contains(&("fields".to_string(), "cadd.phred,dbsnp.rsid".to_string())));
/// assert!(params.contains(&("scopes".to_string(), "dbsnp.rsid".to_string())));
/// assert!(params.contains(&("size".to_string(), "5".to_string())));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    /// Fields to return; all fields when unset.
    pub fields: Option<FieldList>,
    /// Fields the query terms are matched against.
    pub scopes: Option<FieldList>,
    /// Maximum hits per query.
    pub size: Option<u32>,
    /// Hits to skip.
    pub skip: Option<u32>,
    /// Sort order; prefix a field with `-` for descending.
    pub sort: Option<String>,
    /// Batch size override, never raising the session's step.
    pub step: Option<usize>,
    /// Log batch progress and a duplicate/missing summary (default: true).
    pub verbose: bool,
    /// Return response bodies unparsed.
    pub raw: bool,
    /// Render results as a table in this mode.
    pub table: Option<TableMode>,
    /// Put the `query` column first in table output (default: true).
    pub index_by_query: bool,
    /// Return duplicate and missing terms along with the hits.
    pub return_all: bool,
    /// Additional service parameters, e.g. `email`.
    pub extra: Vec<(String, String)>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            fields: None,
            scopes: None,
            size: None,
            skip: None,
            sort: None,
            step: None,
            verbose: true,
            raw: false,
            table: None,
            index_by_query: true,
            return_all: false,
            extra: Vec::new(),
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(mut self, fields: impl Into<FieldList>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn scopes(mut self, scopes: impl Into<FieldList>) -> Self {
        self.scopes = Some(scopes.into());
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn table(mut self, mode: TableMode) -> Self {
        self.table = Some(mode);
        self
    }

    pub fn index_by_query(mut self, index: bool) -> Self {
        self.index_by_query = index;
        self
    }

    pub fn return_all(mut self, return_all: bool) -> Self {
        self.return_all = return_all;
        self
    }

    /// Add a service parameter sent with every request.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Service parameters in wire form. Empty field lists are omitted.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut push = |key: &str, value: String| params.push((key.to_string(), value));

        if let Some(fields) = self.fields.as_ref().filter(|f| !f.is_empty()) {
            push("fields", fields.joined());
        }
        if let Some(scopes) = self.scopes.as_ref().filter(|s| !s.is_empty()) {
            push("scopes", scopes.joined());
        }
        if let Some(size) = self.size {
            push("size", size.to_string());
        }
        if let Some(skip) = self.skip {
            push("skip", skip.to_string());
        }
        if let Some(sort) = &self.sort {
            push("sort", sort.clone());
        }
        params.extend(self.extra.iter().cloned());
        params
    }

    /// Batch settings for a call made under `session`.
    ///
    /// Table output needs parsed hits, so it wins over `raw`.
    pub fn batch_config(&self, session: &SessionConfig) -> BatchConfig {
        let step = match self.step {
            Some(step) => step.min(session.step),
            None => session.step,
        };
        BatchConfig::from_session(session)
            .step(step)
            .verbose(self.verbose)
            .raw(self.raw && self.table.is_none())
            .return_all(self.return_all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_send_nothing() {
        assert!(QueryOptions::new().params().is_empty());
    }

    #[test]
    fn test_extra_params_are_appended() {
        let opts = QueryOptions::new().param("email", "abc@example.com");
        assert_eq!(
            opts.params(),
            vec![("email".to_string(), "abc@example.com".to_string())]
        );
    }

    #[test]
    fn test_step_override_never_raises_session_step() {
        let session = SessionConfig {
            step: 100,
            ..Default::default()
        };
        assert_eq!(QueryOptions::new().step(4).batch_config(&session).step.get(), 4);
        assert_eq!(
            QueryOptions::new().step(5000).batch_config(&session).step.get(),
            100
        );
        assert_eq!(QueryOptions::new().batch_config(&session).step.get(), 100);
    }

    #[test]
    fn test_table_disables_raw() {
        let session = SessionConfig::default();
        let opts = QueryOptions::new().raw(true).table(TableMode::Normal);
        assert!(!opts.batch_config(&session).raw);
        assert!(QueryOptions::new().raw(true).batch_config(&session).raw);
    }
}
