use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Free-form context of an audited event, e.g. `{"query": "foo"}`.
pub type EventParams = serde_json::Map<String, serde_json::Value>;

/// One append-only audit record.
///
/// `id` is generated on create when left nil and `created_at` is always
/// assigned by the repository; neither is meant to be set by callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    pub identity_id: Option<Uuid>,
    pub username: Option<String>,
    pub event_type_id: Uuid,
    #[serde(default)]
    pub event_params: EventParams,
}

impl AuditLog {
    pub fn for_identity(identity_id: Uuid, event_type_id: Uuid, event_params: EventParams) -> Self {
        Self {
            identity_id: Some(identity_id),
            event_type_id,
            event_params,
            ..Default::default()
        }
    }

    pub fn for_username(
        username: impl Into<String>,
        event_type_id: Uuid,
        event_params: EventParams,
    ) -> Self {
        Self {
            username: Some(username.into()),
            event_type_id,
            event_params,
            ..Default::default()
        }
    }

    /// Checks the creation invariants. Runs before any I/O.
    pub fn validate(&self) -> Result<()> {
        if self.event_type_id.is_nil() {
            return Err(Error::bad_parameter("event_type_id", self.event_type_id));
        }
        let has_username = self.username.as_deref().is_some_and(|u| !u.is_empty());
        let has_identity = self.identity_id.is_some_and(|id| !id.is_nil());
        if !has_identity && !has_username {
            return Err(Error::invalid_input(
                "identity_id",
                "identity_id and username cannot be both missing at the same time",
            ));
        }
        Ok(())
    }
}
