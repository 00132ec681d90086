// SPDX-License-Identifier: MIT

//! Run notifications for an attached editor or CLI

use tokio::sync::mpsc;
use uuid::Uuid;

use super::executor::RunSummary;
use crate::graph::{NodeId, NodeType};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    RunStarted {
        run_id: Uuid,
        roots: Vec<NodeId>,
    },
    NodeStarted {
        run_id: Uuid,
        node_id: NodeId,
        node_type: NodeType,
    },
    NodeSucceeded {
        run_id: Uuid,
        node_id: NodeId,
        message: String,
    },
    NodeFailed {
        run_id: Uuid,
        node_id: NodeId,
        error: String,
    },
    /// A Results node finished; its output should be brought into view
    FocusNode { node_id: NodeId },
    RunFinished(RunSummary),
}

/// Fire-and-forget sender. A missing, full or closed listener never affects
/// the run.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    sender: Option<mpsc::Sender<EngineEvent>>,
}

impl EventSink {
    pub(crate) fn new(sender: mpsc::Sender<EngineEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub(crate) fn emit(&self, event: EngineEvent) {
        if let Some(sender) = &self.sender {
            if let Err(e) = sender.try_send(event) {
                log::debug!("Dropped engine event: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_without_listener_is_noop() {
        EventSink::default().emit(EngineEvent::FocusNode {
            node_id: "n".into(),
        });
    }

    #[tokio::test]
    async fn test_full_or_closed_channel_is_ignored() {
        let (tx, mut rx) = mpsc::channel(1);
        let sink = EventSink::new(tx);
        sink.emit(EngineEvent::FocusNode { node_id: "a".into() });
        sink.emit(EngineEvent::FocusNode { node_id: "b".into() });

        assert_eq!(
            rx.recv().await,
            Some(EngineEvent::FocusNode { node_id: "a".into() })
        );
        drop(rx);
        sink.emit(EngineEvent::FocusNode { node_id: "c".into() });
    }
}
