//! Lifecycle event topic names.
//!
//! Producers announce card changes on `"<service>:card:create"` and
//! `"<service>:card:delete"`, registered under the service's source id.

/// Service name (and bus source id) used when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "cardbus";

/// The pair of lifecycle topics owned by one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTopics {
    pub create: String,
    pub delete: String,
}

impl CardTopics {
    pub fn new(service: &str) -> Self {
        Self {
            create: format!("{service}:card:create"),
            delete: format!("{service}:card:delete"),
        }
    }

    /// Both topic names, create first.
    pub fn all(&self) -> Vec<String> {
        vec![self.create.clone(), self.delete.clone()]
    }
}

impl Default for CardTopics {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_NAME)
    }
}
