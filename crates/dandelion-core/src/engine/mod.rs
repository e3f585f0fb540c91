//! # Engine Module
//!
//! This module implements phase orchestration for Dandelion: turning a declared list of
//! phases into a deterministic, strictly sequential pipeline run.
//!
//! ## Overview
//!
//! Each phase owns a parameter schema and an entry point. The engine resolves an
//! effective configuration for every phase by laying pipeline-computed overrides over
//! the phase's own defaults, then invokes the phases one after another. Phases share
//! nothing but the filesystem locations wired into their overrides.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Relax, overlay and re-validate a phase's schema
//! - **Phases** ([`phase`]) - The schema provider / entry point contract
//! - **Registry** ([`registry`]) - Ordered phase descriptors with typed output wiring
//! - **Sequencing** ([`sequencer`]) - Linear execution with fail-fast abort
//! - **Progress Monitoring** ([`progress`]) - Phase start and finish notifications
//! - **Error Handling** ([`error`]) - Resolution, execution and environment failures

pub mod config;
pub mod error;
pub mod phase;
pub mod progress;
pub mod registry;
pub mod sequencer;
