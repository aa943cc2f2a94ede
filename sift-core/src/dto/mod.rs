//! Data Transfer Objects
//!
//! Request and response bodies exchanged between the Sift server and its clients.

pub mod analysis;
