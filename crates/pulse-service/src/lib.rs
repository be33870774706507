//! # pulse-service
//!
//! Application services over the domain stores: the direct-message
//! workflow (validation, persistence, monotonic status transitions,
//! conversation queries) and the notification fanout engine.

pub mod services;

pub use services::{
    MessagingService, NotificationPush, NotificationService, ReadReceipt, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, NOTIFICATION_PAGE_LIMIT,
};
