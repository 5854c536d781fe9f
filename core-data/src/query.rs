//! Query-string composition for resource ids
//!
//! Ids double as the tail of a resource URL, so query parameters are added
//! to the id itself: `?` starts the query when the id has none yet, `&`
//! continues an existing one. Names and values are percent-encoded, so a
//! value can never add parameters or a fragment of its own.

use std::fmt;

/// A resource id with query parameters appended in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    path: String,
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    /// Start from an existing id, which may already carry a query.
    pub fn new(id: Option<&str>) -> Self {
        Self {
            path: id.unwrap_or_default().to_string(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn build(&self) -> String {
        let mut out = self.path.clone();
        let mut has_query = out.contains('?');

        for (name, value) in &self.params {
            out.push(if has_query { '&' } else { '?' });
            out.push_str(&urlencoding::encode(name));
            out.push('=');
            out.push_str(&urlencoding::encode(value));
            has_query = true;
        }

        out
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

/// Id with the session language appended as `lang=<language>`.
pub fn with_language(id: Option<&str>, language: &str) -> String {
    QueryBuilder::new(id).param("lang", language).build()
}
