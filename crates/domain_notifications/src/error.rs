//! Notification errors

use core_kernel::{NotificationId, PortError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification not found: {0}")]
    NotFound(NotificationId),

    #[error("Notification has no recipients")]
    NoRecipients,

    #[error(transparent)]
    Port(#[from] PortError),
}

impl From<NotificationError> for PortError {
    fn from(error: NotificationError) -> Self {
        match error {
            NotificationError::Port(inner) => inner,
            NotificationError::NotFound(id) => PortError::not_found("Notification", id),
            NotificationError::NoRecipients => PortError::validation("Notification has no recipients"),
        }
    }
}
