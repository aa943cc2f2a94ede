//! Sift Core
//!
//! Core types shared by the Sift review analysis services.
//!
//! This crate contains:
//! - Domain types: stage specs, execution results and pipeline runs
//! - DTOs: request and response bodies exchanged between server and client

pub mod domain;
pub mod dto;
