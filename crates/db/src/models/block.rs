//! Block DTOs.
//!
//! `kind` stays a plain string so that unknown kinds reach the validators
//! and come back as a field issue rather than a deserialization error.

use serde::Deserialize;

/// DTO for adding a block. `data` is merged over the kind's default payload;
/// an omitted `position` appends.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBlock {
    pub kind: String,
    pub data: Option<serde_json::Value>,
    pub position: Option<usize>,
}

impl NewBlock {
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: None,
            position: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}
