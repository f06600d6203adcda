//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: drops directory list cache entries past their maximum age

mod cleanup;

pub use cleanup::spawn_cleanup_task;
