//! Core domain types
//!
//! These types describe one pipeline of external worker invocations. They are
//! produced by the runner and consumed by the server when building responses.

pub mod execution;
pub mod run;
pub mod stage;
