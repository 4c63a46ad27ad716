//! Scheduling backend adapter. Implements SchedulerPort.

pub mod http_scheduler;

pub use http_scheduler::HttpScheduler;
