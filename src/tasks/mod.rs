//! Background Tasks Module
//!
//! Contains background tasks that keep caches tidy while their owner runs.
//!
//! # Tasks
//! - TTL Sweep: Purges expired entries from a concurrent cache at a fixed interval

mod sweep;

pub use sweep::{spawn_configured_sweep_task, spawn_sweep_task};
