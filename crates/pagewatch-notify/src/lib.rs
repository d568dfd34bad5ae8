//! Visitor-event notification pipeline: validate, format, dispatch.

pub mod dispatch;
pub mod error;
pub mod format;
pub mod service;

pub use dispatch::{SendReceipt, TelegramClient};
pub use error::DispatchError;
pub use format::{format_notification, format_timestamp, COUNTRY_PLACEHOLDER};
pub use service::{validate, NotificationService, MISSING_IP, MISSING_LOCATION, TEST_MESSAGE};
