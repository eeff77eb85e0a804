//! ToastMessage - Transient, auto-dismissing status message

use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::value_objects::Severity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessage {
    pub id: Uuid,
    pub text: String,
    pub severity: Severity,
    pub auto_dismiss_after: Duration,
    pub created_at: DateTime<Utc>,
}

impl ToastMessage {
    /// Create a new toast with generated ID and timestamp
    pub fn new(text: impl Into<String>, severity: Severity, auto_dismiss_after: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            severity,
            auto_dismiss_after,
            created_at: Utc::now(),
        }
    }
}
