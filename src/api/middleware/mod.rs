//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Request logger — every request, even rejected ones
//! 2. Token validator — account or worker bearer token per route group
//! 3. Role guard — doctor/government refinement where required

pub mod auth;
pub mod log;
