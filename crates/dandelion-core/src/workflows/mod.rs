//! # Workflows Module
//!
//! High-level pipelines assembled from the engine.
//!
//! - **Sampling** ([`sample`]) - The six-stage GSM/NEB sampling pipeline and its
//!   directory convention.
//! - **External commands** ([`command`]) - A phase that runs an external program with
//!   its effective configuration rendered as command-line arguments.

pub mod command;
pub mod sample;
