// SPDX-License-Identifier: MIT

//! Workflow executor
//!
//! Walks the execution set depth-first from each root, feeding every node's
//! output to the nodes it connects to. A failed node stops its own branch
//! only; per-node state in the shared graph records the outcome.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use super::events::{EngineEvent, EventSink};
use super::plan::ExecutionPlan;
use crate::dispatcher::{StepContext, StepDispatcher};
use crate::error::EngineError;
use crate::graph::{
    GraphSnapshot, Node, NodeId, NodeType, NodeUpdate, SharedGraph, StepOutput,
};

/// Message recorded when a step panics
pub const EXECUTION_FAILED: &str = "❌ Execution failed";

/// Outcome of one run.
///
/// Node ids are listed in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub succeeded: Vec<NodeId>,
    pub failed: Vec<NodeId>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn executed(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Per-run bookkeeping
#[derive(Default)]
struct RunState {
    executed: HashSet<NodeId>,
    outputs: HashMap<NodeId, StepOutput>,
    succeeded: Vec<NodeId>,
    failed: Vec<NodeId>,
}

pub struct WorkflowEngine {
    graph: SharedGraph,
    dispatcher: StepDispatcher,
    events: EventSink,
    run_lock: Mutex<()>,
}

impl WorkflowEngine {
    pub fn new(graph: SharedGraph, dispatcher: StepDispatcher) -> Self {
        Self {
            graph,
            dispatcher,
            events: EventSink::default(),
            run_lock: Mutex::new(()),
        }
    }

    /// Send run notifications to `sender`
    pub fn with_events(mut self, sender: mpsc::Sender<EngineEvent>) -> Self {
        self.events = EventSink::new(sender);
        self
    }

    /// Reset every node, then run the whole graph.
    ///
    /// # Errors
    /// Rejected before any node is touched with `EmptyWorkflow`,
    /// `NoRootNodes`, `CyclicGraph` or `RunInProgress`.
    pub async fn run_all(&self) -> Result<RunSummary, EngineError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| EngineError::RunInProgress)?;

        let snapshot = self.graph.read().await.snapshot();
        let plan = ExecutionPlan::whole(&snapshot)?;

        {
            let mut graph = self.graph.write().await;
            for node in &snapshot.nodes {
                graph.update_node(&node.id, NodeUpdate::reset());
            }
        }

        Ok(self.execute(&snapshot, &plan).await)
    }

    /// Run `node_id` together with everything upstream of it. Nodes outside
    /// that set keep their state.
    ///
    /// # Errors
    /// `UnknownNode` if the node does not exist, otherwise as
    /// [`WorkflowEngine::run_all`].
    pub async fn run_from(&self, node_id: &str) -> Result<RunSummary, EngineError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| EngineError::RunInProgress)?;

        let snapshot = self.graph.read().await.snapshot();
        let plan = ExecutionPlan::from_node(&snapshot, node_id)?;

        Ok(self.execute(&snapshot, &plan).await)
    }

    async fn execute(&self, snapshot: &GraphSnapshot, plan: &ExecutionPlan) -> RunSummary {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        log::info!(
            "Run {} started: {} nodes from roots {:?}",
            run_id,
            plan.len(),
            plan.roots()
        );
        self.events.emit(EngineEvent::RunStarted {
            run_id,
            roots: plan.roots().to_vec(),
        });

        let mut state = RunState::default();
        // (node, input) pairs; children are pushed in reverse so they pop in
        // edge order, matching a recursive depth-first walk
        let mut stack: Vec<(NodeId, Option<StepOutput>)> =
            plan.roots().iter().rev().map(|id| (id.clone(), None)).collect();

        while let Some((node_id, input)) = stack.pop() {
            if !state.executed.insert(node_id.clone()) {
                continue;
            }
            let Some(node) = snapshot.node(&node_id) else {
                continue;
            };

            match self.run_node(run_id, node, input.as_ref(), &state.outputs).await {
                Some(output) => {
                    for child in plan.children(snapshot, &node_id).into_iter().rev() {
                        stack.push((child, Some(output.clone())));
                    }
                    state.outputs.insert(node_id.clone(), output);
                    state.succeeded.push(node_id);
                }
                None => state.failed.push(node_id),
            }
        }

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            succeeded: state.succeeded,
            failed: state.failed,
        };
        log::info!(
            "Run {} finished: {} succeeded, {} failed",
            run_id,
            summary.succeeded.len(),
            summary.failed.len()
        );
        self.events.emit(EngineEvent::RunFinished(summary.clone()));
        summary
    }

    /// Execute one node and record the outcome. Returns the output on success.
    async fn run_node(
        &self,
        run_id: Uuid,
        node: &Node,
        input: Option<&StepOutput>,
        previous: &HashMap<NodeId, StepOutput>,
    ) -> Option<StepOutput> {
        self.apply(&node.id, NodeUpdate::running()).await;
        self.events.emit(EngineEvent::NodeStarted {
            run_id,
            node_id: node.id.clone(),
            node_type: node.node_type(),
        });

        let ctx = StepContext::new(&node.id, input, previous);
        let outcome = AssertUnwindSafe(self.dispatcher.dispatch(&node.kind, ctx))
            .catch_unwind()
            .await;

        let error = match outcome {
            Ok(Ok(output)) => {
                log::info!("Node {} ({}) succeeded", node.id, node.node_type());
                self.apply(&node.id, NodeUpdate::succeeded(output.clone()))
                    .await;
                self.events.emit(EngineEvent::NodeSucceeded {
                    run_id,
                    node_id: node.id.clone(),
                    message: output.message().to_string(),
                });
                if node.node_type() == NodeType::Results {
                    self.events.emit(EngineEvent::FocusNode {
                        node_id: node.id.clone(),
                    });
                }
                return Some(output);
            }
            Ok(Err(e)) => {
                log::warn!(
                    "Node {} ({}) failed [{}]: {}",
                    node.id,
                    node.node_type(),
                    e.category(),
                    e
                );
                e.to_string()
            }
            Err(_) => {
                log::error!("Node {} ({}) panicked", node.id, node.node_type());
                EXECUTION_FAILED.to_string()
            }
        };

        self.apply(&node.id, NodeUpdate::failed(error.clone())).await;
        self.events.emit(EngineEvent::NodeFailed {
            run_id,
            node_id: node.id.clone(),
            error,
        });
        None
    }

    /// Best-effort write; a node deleted mid-run is skipped
    async fn apply(&self, node_id: &str, update: NodeUpdate) {
        if !self.graph.write().await.update_node(node_id, update) {
            log::debug!("Node {} disappeared during the run", node_id);
        }
    }
}
