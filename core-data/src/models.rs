//! # Model Registry
//!
//! Static catalog of the entities the app reads and writes, and how each one
//! is fetched and cached.
//!
//! A [`Model`] is immutable once built. The [`ModelRegistry`] is assembled
//! once at startup through [`ModelRegistryBuilder`], which rejects keys that
//! would make composite storage keys ambiguous, and is read-only afterwards.

use crate::error::{DataError, Result};
use crate::key_codec::DELIMITER;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Where a model's payloads are kept between loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CachePolicy {
    /// Network only
    None,
    /// Process-lifetime in-memory map
    Memory,
    /// Durable store
    Persistent,
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CachePolicy::None => "none",
            CachePolicy::Memory => "memory",
            CachePolicy::Persistent => "persistent",
        };
        f.write_str(name)
    }
}

/// Descriptor of one data entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    key: String,
    rest_uri: String,
    cache_policy: CachePolicy,
    use_language: bool,
}

impl Model {
    /// An empty `rest_uri` means the model has no remote backing.
    pub fn new(key: impl Into<String>, rest_uri: impl Into<String>, cache_policy: CachePolicy) -> Self {
        Self {
            key: key.into(),
            rest_uri: rest_uri.into(),
            cache_policy,
            use_language: false,
        }
    }

    /// Append the session language to every id this model loads.
    pub fn with_language(mut self) -> Self {
        self.use_language = true;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn rest_uri(&self) -> &str {
        &self.rest_uri
    }

    pub fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    pub fn use_language(&self) -> bool {
        self.use_language
    }

    pub fn has_remote(&self) -> bool {
        !self.rest_uri.is_empty()
    }

    /// `key` or `key/id`, the lookup key for the memory tier and snapshots.
    pub fn key_string(&self, id: Option<&str>) -> String {
        match id {
            Some(id) if !id.is_empty() => format!("{}/{}", self.key, id),
            _ => self.key.clone(),
        }
    }

    /// Remote address of a payload, or `None` without remote backing.
    ///
    /// A trailing `/` on the base is not doubled.
    pub fn url(&self, id: Option<&str>) -> Option<String> {
        if !self.has_remote() {
            return None;
        }

        match id {
            Some(id) if !id.is_empty() => Some(format!(
                "{}/{}",
                self.rest_uri.trim_end_matches('/'),
                id
            )),
            _ => Some(self.rest_uri.clone()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(DataError::InvalidModel("model key cannot be empty".to_string()));
        }

        if self.key.contains(DELIMITER) {
            return Err(DataError::InvalidModel(format!(
                "model key {:?} contains reserved delimiter {:?}",
                self.key, DELIMITER
            )));
        }

        Ok(())
    }
}

/// Names of the standard catalog entries.
pub mod names {
    pub const BOOK: &str = "Book";
    pub const LESSON: &str = "Lesson";
    pub const PASSAGE: &str = "Passage";
    pub const ANSWER: &str = "Answer";
}

const LESSON_SERVICE_URI: &str = "http://cbsf.azurewebsites.net/";
const PASSAGE_SERVICE_URI: &str = "http://turbozv.com/bsf/api/";

/// Read-only mapping from entity name to [`Model`].
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Model>,
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    /// The catalog the study app ships with.
    pub fn standard() -> Self {
        let models = [
            (
                names::BOOK,
                Model::new("BOOK", LESSON_SERVICE_URI, CachePolicy::Persistent),
            ),
            (
                names::LESSON,
                Model::new("LESSON", LESSON_SERVICE_URI, CachePolicy::Persistent),
            ),
            (
                names::PASSAGE,
                Model::new("PASSAGE", PASSAGE_SERVICE_URI, CachePolicy::Persistent),
            ),
            (names::ANSWER, Model::new("ANSWER", "", CachePolicy::Persistent)),
        ];

        Self {
            models: models
                .into_iter()
                .map(|(name, model)| (name.to_string(), model))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// Like [`get`](Self::get), but a missing name is a validation error.
    pub fn require(&self, name: &str) -> Result<&Model> {
        self.get(name)
            .ok_or_else(|| DataError::Validation(format!("unknown model {:?}", name)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ModelRegistryBuilder {
    models: HashMap<String, Model>,
}

impl ModelRegistryBuilder {
    /// Add a model under `name`.
    ///
    /// # Errors
    ///
    /// - `name` is blank or already registered
    /// - the model key is empty or contains the reserved delimiter
    /// - another registered model already uses the same key
    pub fn register(mut self, name: impl Into<String>, model: Model) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DataError::InvalidModel("model name cannot be empty".to_string()));
        }
        if self.models.contains_key(&name) {
            return Err(DataError::InvalidModel(format!(
                "model {:?} is already registered",
                name
            )));
        }

        model.validate()?;

        if let Some((other, _)) = self.models.iter().find(|(_, m)| m.key == model.key) {
            return Err(DataError::InvalidModel(format!(
                "model key {:?} is already used by {:?}",
                model.key, other
            )));
        }

        self.models.insert(name, model);
        Ok(self)
    }

    pub fn build(self) -> ModelRegistry {
        ModelRegistry {
            models: self.models,
        }
    }
}
