//! Payroll Tracking Notifications
//!
//! Stores in-app notifications, resolves role-based recipients, and tracks
//! which recipients have read what. [`NotificationService`] is the
//! [`domain_claims::ReviewNotifier`] the workflow services talk to.

pub mod notification;
pub mod ports;
pub mod service;
pub mod error;

pub use notification::{DeliveryType, Notification, NotificationType, NotificationView, PAYROLL_MODULE};
pub use ports::{NotificationPort, RoleDirectory};
pub use service::{NotificationService, REFUND_REQUIRED_TITLE};
pub use error::NotificationError;
