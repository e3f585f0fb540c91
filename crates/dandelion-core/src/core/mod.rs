//! # Core Module
//!
//! Stateless data model shared by the engine and the workflows.
//!
//! - **Values** ([`value`]) - Typed parameter values and their kinds
//! - **Schemas** ([`schema`]) - Ordered parameter declarations of a phase
//! - **Overrides** ([`overrides`]) - Orchestrator-supplied values for one invocation
//! - **Layout** ([`layout`]) - Output locations anchored at the pipeline root

pub mod layout;
pub mod overrides;
pub mod schema;
pub mod value;
