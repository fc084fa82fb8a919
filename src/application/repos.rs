//! Boundary to the remote content store.

use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("content store unreachable: {0}")]
    Transport(String),
    #[error("content store responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("content store rejected query: {0}")]
    Query(String),
    #[error("content store payload did not match `{query}`: {message}")]
    Decode { query: &'static str, message: String },
}

impl StoreError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(query: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            query,
            message: err.to_string(),
        }
    }
}

/// A named, parameterised read against the store.
///
/// `revalidate` is the longest a cached result of this query may be served.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub name: &'static str,
    pub groq: &'static str,
    pub params: BTreeMap<String, Value>,
    pub revalidate: Duration,
}

impl StoreQuery {
    pub fn new(name: &'static str, groq: &'static str, revalidate: Duration) -> Self {
        Self {
            name,
            groq,
            params: BTreeMap::new(),
            revalidate,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Stable identity of this query and its parameters.
    pub fn cache_key(&self) -> String {
        let params = serde_json::to_string(&self.params).unwrap_or_default();
        format!("{}:{params}", self.name)
    }
}

/// Read-only access to the content store. Returns the raw `result` document.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch(&self, query: &StoreQuery) -> Result<Value, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_independent_of_insertion_order() {
        let a = StoreQuery::new("q", "*", Duration::from_secs(1))
            .param("b", 2)
            .param("a", "x");
        let b = StoreQuery::new("q", "*", Duration::from_secs(1))
            .param("a", "x")
            .param("b", 2);
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), r#"q:{"a":"x","b":2}"#);
    }
}
