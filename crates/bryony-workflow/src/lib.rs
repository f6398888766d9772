//! Bryony Workflow
//!
//! This crate provides the workflow task graph for Bryony: the flat task
//! records an operator composes in the editor, the derived trigger graph, and
//! the rules that keep that graph a single-rooted DAG.
//!
//! A workflow is a flat list of tasks. Each task names the task that triggers
//! it, or uses the reserved `"_run_"` trigger to mark itself as the entry
//! point. From that list this crate derives:
//! - A transient [`WorkflowGraph`] (rebuilt on every query, never persisted)
//! - A full structural [`validate`] pass returning errors and warnings as data
//! - Mutation guards ([`can_add_task`], [`can_remove_task`],
//!   [`can_change_trigger`]) that simulate a single edit before it is applied
//!
//! Graph construction never fails: malformed input (duplicate entry points,
//! dangling triggers) degrades to a partial graph so that callers can render
//! and inspect a document that the validator will still reject.

mod error;
mod graph;
mod guard;
mod types;
mod validate;

pub use error::WorkflowError;
pub use graph::{GraphNode, WorkflowGraph};
pub use guard::{can_add_task, can_change_trigger, can_remove_task};
pub use types::{ROOT_TRIGGER, ValidationReport, Workflow, WorkflowTask};
pub use validate::validate;
