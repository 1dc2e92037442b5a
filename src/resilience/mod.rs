//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream fetch / sitemap query:
//!     → timeouts.rs (enforce deadline)
//!     → On connection failure: retries.rs (check policy, wait backoff.rs delay)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retries are opt-in and limited to failures before any response byte

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::RetryPolicy;
pub use timeouts::{with_deadline, DeadlineExceeded};
