//! Batch harness for hdspin tracers.
//!
//! This crate provides:
//! - Config loading and validation ([`params`])
//! - Sequential batch execution with per-tracer failure isolation ([`batch`])
//! - JSONL structured logs and a SHA-256 artifact index ([`structured_log`])

#![forbid(unsafe_code)]

pub mod batch;
pub mod error;
pub mod params;
pub mod structured_log;

pub use batch::{BatchReport, BatchRunner};
pub use error::{HarnessError, HarnessResult};
