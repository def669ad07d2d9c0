pub mod audit_log;
pub mod error;
pub mod event_types;
pub mod paging;

pub use audit_log::{AuditLog, EventParams};
pub use error::{Error, ErrorKind, Result};
pub use event_types::{EventType, EventTypes};
