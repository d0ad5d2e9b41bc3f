//! # Huffman Code
//!
//! The standard two-smallest merge over per-word weights. Ties pop in
//! creation order (leaves by ID, then internal nodes by build order), and
//! the first popped child of each merge takes bit `0`.

use core::cmp::Reverse;

use dary_heap::OctonaryHeap;

use crate::{
    NmtError,
    NmtResult,
    WordId,
    codes::{BinaryCode, binary_code::is_set},
    vocab::Vocabulary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Child {
    Leaf(WordId),
    Node(usize),
}

/// Variable-length prefix code from word weights.
///
/// A code's length is its leaf depth; [`BinaryCode::num_bits`] is the
/// deepest leaf, and bit `d` of a probability vector steers the walk at
/// depth `d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanCode {
    nodes: Vec<[Child; 2]>,
    codes: Vec<Vec<bool>>,
}

impl HuffmanCode {
    /// Build a code from per-ID weights.
    ///
    /// ## Errors
    /// [`NmtError::Config`] if there are fewer than two weights.
    pub fn from_weights(weights: &[u64]) -> NmtResult<Self> {
        let n = weights.len();
        if n < 2 {
            return Err(NmtError::config(format!(
                "Huffman code needs >= 2 words, got {n}"
            )));
        }

        // Min-heap on (weight, creation order).
        let mut heap: OctonaryHeap<Reverse<(u64, usize)>> = weights
            .iter()
            .enumerate()
            .map(|(id, &w)| Reverse((w, id)))
            .collect();

        let child = |seq: usize| {
            if seq < n {
                Child::Leaf(seq as WordId)
            } else {
                Child::Node(seq - n)
            }
        };

        let mut nodes: Vec<[Child; 2]> = Vec::with_capacity(n - 1);
        while heap.len() > 1 {
            let (Some(Reverse((w0, s0))), Some(Reverse((w1, s1)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            nodes.push([child(s0), child(s1)]);
            heap.push(Reverse((w0 + w1, n + nodes.len() - 1)));
        }

        let mut codes = vec![Vec::new(); n];
        let mut stack = vec![(nodes.len() - 1, Vec::new())];
        while let Some((node, prefix)) = stack.pop() {
            for (bit, &c) in nodes[node].iter().enumerate() {
                let mut code: Vec<bool> = prefix.clone();
                code.push(bit == 1);
                match c {
                    Child::Leaf(id) => codes[id as usize] = code,
                    Child::Node(next) => stack.push((next, code)),
                }
            }
        }

        Ok(Self { nodes, codes })
    }

    /// Build a code weighted by a vocabulary's frequencies.
    pub fn from_vocabulary(vocab: &dyn Vocabulary) -> NmtResult<Self> {
        let weights: Vec<u64> = (0..vocab.size() as WordId)
            .map(|id| vocab.get_frequency(id))
            .collect();
        Self::from_weights(&weights)
    }

    fn root(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Walk from the root, taking `choose(depth)` at each node.
    fn walk(
        &self,
        mut choose: impl FnMut(usize) -> Option<bool>,
    ) -> Option<(WordId, usize)> {
        let mut node = self.root();
        let mut depth = 0;
        loop {
            let bit = choose(depth)?;
            depth += 1;
            match self.nodes[node][bit as usize] {
                Child::Leaf(id) => return Some((id, depth)),
                Child::Node(next) => node = next,
            }
        }
    }
}

impl BinaryCode for HuffmanCode {
    fn num_bits(&self) -> usize {
        self.codes.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn encode(
        &self,
        id: WordId,
    ) -> Option<Vec<bool>> {
        self.codes.get(id as usize).cloned()
    }

    /// Decode a complete code; a prefix or an over-long pattern is `None`.
    fn decode_bits(
        &self,
        bits: &[bool],
    ) -> Option<WordId> {
        let (id, depth) = self.walk(|d| bits.get(d).copied())?;
        (depth == bits.len()).then_some(id)
    }

    /// Follow hard decisions from the root; bits past the leaf are ignored.
    fn decode_probs(
        &self,
        probs: &[f64],
    ) -> Option<WordId> {
        self.walk(|d| probs.get(d).map(|&p| is_set(p)))
            .map(|(id, _)| id)
    }
}
