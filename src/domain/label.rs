//! Label domain types.
//!
//! The pipeline's state machine lives entirely in two user labels plus the
//! provider's UNREAD system label.

use serde::{Deserialize, Serialize};

use super::LabelId;

/// An email label as reported by the inbox provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Provider label ID.
    pub id: LabelId,
    /// Display name, which is what configuration refers to.
    pub name: String,
}

impl Label {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: LabelId(id.into()),
            name: name.into(),
        }
    }
}

/// Well-known system label IDs.
pub mod system_labels {
    use super::LabelId;

    /// Returns the unread label ID.
    pub fn unread() -> LabelId {
        LabelId::from("UNREAD")
    }
}
