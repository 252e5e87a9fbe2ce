//! Background jobs executed by [`crate::services::job_scheduler_service`].
//!
//! - `portfolio_monitor_job` - re-evaluates every portfolio on an interval and
//!   emails fired sentiment alerts

pub mod portfolio_monitor_job;
