//! Registry of the audited event types.
//!
//! The registry is built once at startup from the built-in table and shared
//! read-only afterwards (it lives in the server state behind an `Arc`).

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    UserSearch,
    ShowTenantUpdate,
    StartTenantUpdate,
    StopTenantUpdate,
    ListAuditLogs,
    UserDeactivation,
    UserDeactivationNotification,
}

impl EventType {
    pub const ALL: [EventType; 7] = [
        EventType::UserSearch,
        EventType::ShowTenantUpdate,
        EventType::StartTenantUpdate,
        EventType::StopTenantUpdate,
        EventType::ListAuditLogs,
        EventType::UserDeactivation,
        EventType::UserDeactivationNotification,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventType::UserSearch => "user_search",
            EventType::ShowTenantUpdate => "show_tenant_update",
            EventType::StartTenantUpdate => "start_tenant_update",
            EventType::StopTenantUpdate => "stop_tenant_update",
            EventType::ListAuditLogs => "list_audit_logs",
            EventType::UserDeactivation => "user_deactivation",
            EventType::UserDeactivationNotification => "user_deactivation_notification",
        }
    }
}

// Stable identifiers: these are persisted in `audit_log.event_type_id`, never change them.
const BUILTIN: [(EventType, &str); 7] = [
    (EventType::UserSearch, "7aea0277-d6fa-4df9-8224-a27fa4096ec7"),
    (EventType::ShowTenantUpdate, "a2633717-12f0-4edd-bcd9-bbdf900a8ec5"),
    (EventType::StartTenantUpdate, "2d51de09-2ab7-4e15-9e0d-030a71756c8d"),
    (EventType::StopTenantUpdate, "3dd22424-27b6-494a-a550-9611bfe41cac"),
    (EventType::ListAuditLogs, "5c7c8d3a-1d26-4f04-9a0b-6e0c5a7e5d1f"),
    (EventType::UserDeactivation, "a4a2f5e8-8e9c-4b1c-9a5e-0f3a4c1c2b6d"),
    (EventType::UserDeactivationNotification, "0d2e8b1c-7f6a-4e3d-8c9b-2a1f0e4d5c6b"),
];

#[derive(Debug, Clone)]
pub struct EventTypes {
    ids: HashMap<EventType, Uuid>,
    by_name: HashMap<&'static str, Uuid>,
    by_id: HashMap<Uuid, &'static str>,
}

impl EventTypes {
    /// Builds the registry from the built-in table.
    ///
    /// An error here means a malformed identifier was compiled in; callers are
    /// expected to abort startup.
    pub fn builtin() -> Result<Self> {
        Self::from_table(&BUILTIN)
    }

    fn from_table(table: &[(EventType, &str)]) -> Result<Self> {
        let mut ids = HashMap::with_capacity(table.len());
        let mut by_name = HashMap::with_capacity(table.len());
        let mut by_id = HashMap::with_capacity(table.len());

        for (kind, raw) in table {
            let id = Uuid::parse_str(raw).map_err(|e| {
                Error::internal(
                    "event_types",
                    format!("{} event type ID is not an UUID: {e}", kind.name()),
                )
            })?;
            if by_id.insert(id, kind.name()).is_some() || ids.insert(*kind, id).is_some() {
                return Err(Error::internal(
                    "event_types",
                    format!("duplicate event type entry for {}", kind.name()),
                ));
            }
            by_name.insert(kind.name(), id);
        }

        if let Some(missing) = EventType::ALL.iter().find(|k| !ids.contains_key(*k)) {
            return Err(Error::internal(
                "event_types",
                format!("missing event type entry for {}", missing.name()),
            ));
        }

        Ok(Self { ids, by_name, by_id })
    }

    /// Identifier of a built-in event type. Total over `EventType`.
    pub fn id(&self, kind: EventType) -> Uuid {
        self.ids.get(&kind).copied().unwrap_or_default()
    }

    pub fn resolve(&self, name: &str) -> Option<Uuid> {
        self.by_name.get(name).copied()
    }

    pub fn describe(&self, id: Uuid) -> Option<&'static str> {
        self.by_id.get(&id).copied()
    }
}
