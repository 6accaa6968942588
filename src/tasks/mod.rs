//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the service is up.
//!
//! # Tasks
//! - Expired entry sweep: drops expired memory-layer entries at a fixed interval

mod cleanup;

pub use cleanup::spawn_sweep_task;
