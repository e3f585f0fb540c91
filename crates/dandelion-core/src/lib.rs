//! # Dandelion Core Library
//!
//! Phase orchestration for chemical compound space sampling near transition states:
//! structure generation, string-method search, filtering, elastic-band refinement and
//! compilation of results, each run as an independent phase over a shared output tree.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models: typed parameter values,
//!   phase parameter schemas, override sets and the output layout.
//!
//! - **[`engine`]: The Logic Core.** Resolves each phase's effective configuration by
//!   merging its declared defaults with pipeline-computed overrides, holds the ordered
//!   phase registry with typed output-to-input wiring, and sequences the phases with
//!   fail-fast semantics.
//!
//! - **[`workflows`]: The Public API.** The concrete six-stage sampling pipeline and a
//!   phase implementation that runs external programs.

pub mod core;
pub mod engine;
pub mod workflows;
