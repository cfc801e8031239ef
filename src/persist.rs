// Outbound persistence.
//
// The engine calls `save` after every committed mutation with the whole
// document. Saving is fire-and-forget: a sink reports its own failures and
// nothing flows back into the engine. Debouncing belongs to the sink.

use crate::dto::WhiteboardResponse;

pub trait SaveSink {
    fn save(&mut self, doc: &WhiteboardResponse);
}

/// Default sink: logs a summary at debug level.
#[derive(Debug, Default)]
pub struct LogSink;

impl SaveSink for LogSink {
    fn save(&mut self, doc: &WhiteboardResponse) {
        let nodes: usize = doc.graphs.iter().map(|g| g.nodes.len()).sum();
        let edges: usize = doc.graphs.iter().map(|g| g.edges.len()).sum();
        log::debug!(
            "save whiteboard {:?}: {} graphs, {} nodes, {} edges",
            doc.whiteboard_id,
            doc.graphs.len(),
            nodes,
            edges
        );
    }
}

/// Keeps every saved document. Used by tests and by hosts that pull instead of push.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub saved: std::rc::Rc<std::cell::RefCell<Vec<WhiteboardResponse>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.saved.borrow().len()
    }

    pub fn last(&self) -> Option<WhiteboardResponse> {
        self.saved.borrow().last().cloned()
    }
}

impl SaveSink for MemorySink {
    fn save(&mut self, doc: &WhiteboardResponse) {
        self.saved.borrow_mut().push(doc.clone());
    }
}
