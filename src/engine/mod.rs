// SPDX-License-Identifier: MIT

//! Execution engine
//!
//! This module provides:
//! - `ExecutionPlan` - execution set and roots for a whole-graph or run-from-node run
//! - `WorkflowEngine` - serialized, depth-first execution over a shared graph
//! - `EngineEvent` - optional progress notifications

mod events;
mod executor;
pub mod plan;

pub use events::EngineEvent;
pub use executor::{RunSummary, WorkflowEngine, EXECUTION_FAILED};
pub use plan::{ExecutionPlan, PlanScope};
