//! # Inference Graph
//!
//! An arena of hypothesis nodes. The graph owns every [`Node`]; edges are
//! [`NodeId`] handles, which also carry the owning graph's identity so a
//! handle from one graph is rejected by another.

use core::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::{NmtError, NmtResult, WordId, types::NmtHashSet};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

/// Handle to a node of one [`InferenceGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    graph: u64,
    index: usize,
}

impl NodeId {
    /// The node's position in creation order.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// What a hypothesis emitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// The emitted word.
    pub word_id: WordId,

    /// This step's log-probability, including any word penalty.
    pub word_log_prob: f64,

    /// The path log-probability up to and including this word.
    pub accumulated_log_prob: f64,

    /// Attention over source positions at this step.
    pub attention_probs: Vec<f64>,
}

impl Label {
    /// Create a label with no attention.
    pub fn new(
        word_id: WordId,
        word_log_prob: f64,
        accumulated_log_prob: f64,
    ) -> Self {
        Self {
            word_id,
            word_log_prob,
            accumulated_log_prob,
            attention_probs: Vec::new(),
        }
    }

    /// Sets the attention probabilities.
    pub fn with_attention(
        self,
        attention_probs: Vec<f64>,
    ) -> Self {
        Self {
            attention_probs,
            ..self
        }
    }
}

/// One hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    label: Label,
    prev: Vec<NodeId>,
    next: Vec<NodeId>,
}

impl Node {
    /// This node's handle.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The label fixed at creation.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Predecessors, in connection order.
    pub fn prev(&self) -> &[NodeId] {
        &self.prev
    }

    /// Successors, in connection order.
    pub fn next(&self) -> &[NodeId] {
        &self.next
    }
}

/// The lattice of every hypothesis a decode explored.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceGraph {
    graph: u64,
    nodes: Vec<Node>,
}

impl Default for InferenceGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            graph: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
        }
    }

    /// The number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is the graph empty?
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Does `id` belong to this graph?
    pub fn contains(
        &self,
        id: NodeId,
    ) -> bool {
        id.graph == self.graph && id.index < self.nodes.len()
    }

    /// Look up a node.
    pub fn node(
        &self,
        id: NodeId,
    ) -> Option<&Node> {
        if self.contains(id) {
            Some(&self.nodes[id.index])
        } else {
            None
        }
    }

    fn checked(
        &self,
        id: NodeId,
    ) -> NmtResult<&Node> {
        self.node(id)
            .ok_or_else(|| NmtError::invariant(format!("{id:?} is not a node of this graph")))
    }

    /// Add an unconnected node.
    pub fn add_node(
        &mut self,
        label: Label,
    ) -> NodeId {
        let id = NodeId {
            graph: self.graph,
            index: self.nodes.len(),
        };
        self.nodes.push(Node {
            id,
            label,
            prev: Vec::new(),
            next: Vec::new(),
        });
        id
    }

    /// Add the edge ``prev -> next``; an existing edge is left alone.
    ///
    /// ## Errors
    /// [`NmtError::InvariantViolation`] if either node is foreign.
    pub fn connect(
        &mut self,
        prev: NodeId,
        next: NodeId,
    ) -> NmtResult<()> {
        self.checked(prev)?;
        self.checked(next)?;

        let forward = &mut self.nodes[prev.index].next;
        if forward.contains(&next) {
            return Ok(());
        }
        forward.push(next);
        self.nodes[next.index].prev.push(prev);
        Ok(())
    }

    /// All nodes matching `predicate`, in creation order.
    pub fn find_nodes<F>(
        &self,
        mut predicate: F,
    ) -> Vec<NodeId>
    where
        F: FnMut(&Node) -> bool,
    {
        self.nodes
            .iter()
            .filter(|node| predicate(node))
            .map(Node::id)
            .collect()
    }

    /// The best path from the unique `bos_id` root to an `eos_id` leaf.
    ///
    /// The leaf with the highest accumulated log-probability wins (the
    /// earliest on ties). The walk back to the root follows unique
    /// predecessors.
    ///
    /// ## Errors
    /// [`NmtError::InvariantViolation`] if:
    /// * there is not exactly one root (`bos_id`, no predecessors),
    /// * there is no leaf (`eos_id`, no successors),
    /// * a node on the path has zero or several predecessors,
    /// * the walk revisits a node.
    pub fn find_one_best_path(
        &self,
        bos_id: WordId,
        eos_id: WordId,
    ) -> NmtResult<Vec<NodeId>> {
        let roots =
            self.find_nodes(|node| node.label.word_id == bos_id && node.prev.is_empty());
        let [root] = roots[..] else {
            return Err(NmtError::invariant(format!(
                "expected one BOS root, found {}",
                roots.len()
            )));
        };

        let mut best: Option<&Node> = None;
        for node in &self.nodes {
            if node.label.word_id != eos_id || !node.next.is_empty() {
                continue;
            }
            if best.is_none_or(|b| node.label.accumulated_log_prob > b.label.accumulated_log_prob)
            {
                best = Some(node);
            }
        }
        let Some(leaf) = best else {
            return Err(NmtError::invariant("no EOS leaf in the inference graph"));
        };

        let mut visited: NmtHashSet<NodeId> = Default::default();
        let mut path = vec![leaf.id];
        visited.insert(leaf.id);
        let mut current = leaf;
        while current.id != root {
            let [prev] = current.prev[..] else {
                return Err(NmtError::invariant(format!(
                    "node {} has {} predecessors on the one-best path",
                    current.id.index,
                    current.prev.len()
                )));
            };
            if !visited.insert(prev) {
                return Err(NmtError::invariant(format!(
                    "cycle through node {} in the inference graph",
                    prev.index
                )));
            }
            path.push(prev);
            current = &self.nodes[prev.index];
        }

        path.reverse();
        Ok(path)
    }

    /// The words of the one-best path, without the leading BOS and the
    /// trailing EOS.
    ///
    /// Markers elsewhere on the path are kept.
    ///
    /// ## Errors
    /// See [`InferenceGraph::find_one_best_path`].
    pub fn find_one_best_words(
        &self,
        bos_id: WordId,
        eos_id: WordId,
    ) -> NmtResult<Vec<WordId>> {
        let path = self.find_one_best_path(bos_id, eos_id)?;
        let mut words = self.path_words(&path);
        if words.last() == Some(&eos_id) {
            words.pop();
        }
        if words.first() == Some(&bos_id) {
            words.remove(0);
        }
        Ok(words)
    }

    /// The labels along a path.
    pub fn path_labels(
        &self,
        path: &[NodeId],
    ) -> Vec<&Label> {
        path.iter()
            .filter_map(|&id| self.node(id))
            .map(Node::label)
            .collect()
    }

    /// The word IDs along a path.
    pub fn path_words(
        &self,
        path: &[NodeId],
    ) -> Vec<WordId> {
        self.path_labels(path)
            .into_iter()
            .map(|label| label.word_id)
            .collect()
    }
}
