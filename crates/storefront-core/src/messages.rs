//! # Admin Messages
//!
//! One-shot notices returned to the admin user after an action.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Severity of an admin message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

/// A notice shown above the changelist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdminMessage {
    pub level: MessageLevel,
    pub message: String,
}

impl AdminMessage {
    pub fn new(level: MessageLevel, message: impl Into<String>) -> Self {
        AdminMessage {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        AdminMessage::new(MessageLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        AdminMessage::new(MessageLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        AdminMessage::new(MessageLevel::Error, message)
    }
}

/// Result notice of the "Clear Inventory" bulk action.
///
/// ```rust
/// use storefront_core::messages::{clear_inventory_message, MessageLevel};
///
/// let msg = clear_inventory_message(3);
/// assert_eq!(msg.message, "3 products were successfully updated.");
/// assert_eq!(msg.level, MessageLevel::Success);
/// ```
pub fn clear_inventory_message(updated: u64) -> AdminMessage {
    AdminMessage::success(format!("{} products were successfully updated.", updated))
}

/// Result notice of saving list-editable columns.
pub fn changed_message(changed: u64, verbose_name: &str, verbose_name_plural: &str) -> AdminMessage {
    let (name, verb) = if changed == 1 {
        (verbose_name, "was")
    } else {
        (verbose_name_plural, "were")
    };
    AdminMessage::success(format!("{} {} {} changed successfully.", changed, name, verb))
}
