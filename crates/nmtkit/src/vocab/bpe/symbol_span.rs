//! # Symbol Span
//!
//! The working segmentation of a single word during BPE training and encoding.
//!
//! A span starts as the word's letters followed by `</w>`, and shrinks as
//! merges fuse adjacent symbols. Since `</w>` is only ever the last symbol,
//! it can fuse only with the letter before it.

use crate::{WordId, types::Pair};

/// A mutable span of symbol IDs (one word).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolSpan {
    symbols: Vec<WordId>,
}

impl<S: AsRef<[WordId]>> From<S> for SymbolSpan {
    fn from(symbols: S) -> Self {
        Self {
            symbols: symbols.as_ref().to_vec(),
        }
    }
}

impl SymbolSpan {
    /// View the symbols as a slice.
    pub fn symbols(&self) -> &[WordId] {
        &self.symbols
    }

    /// Release the symbols.
    pub fn into_symbols(self) -> Vec<WordId> {
        self.symbols
    }

    /// Get the length of the span.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Is this span empty?
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Get an iterator over adjacent [`Pair`] windows of this span.
    pub fn pairs(&self) -> impl Iterator<Item = Pair<WordId>> + '_ {
        self.symbols.windows(2).map(|w| (w[0], w[1]))
    }

    /// Fuse every occurrence of `pair` into `fused`, scanning left to right.
    ///
    /// In a run such as `a a a`, the leftmost `a a` is fused first and the
    /// trailing `a` is left alone.
    ///
    /// Returns the number of sites fused.
    pub fn merge(
        &mut self,
        pair: Pair<WordId>,
        fused: WordId,
    ) -> usize {
        let target = [pair.0, pair.1];
        let mut sites = 0;
        let mut read = 0;
        let mut write = 0;
        while read < self.symbols.len() {
            if self.symbols[read..].starts_with(&target) {
                self.symbols[write] = fused;
                read += 2;
                sites += 1;
            } else {
                self.symbols[write] = self.symbols[read];
                read += 1;
            }
            write += 1;
        }
        self.symbols.truncate(write);
        sites
    }

    /// Like [`SymbolSpan::merge`], and report how the word's pair windows
    /// changed.
    ///
    /// ## Arguments
    /// * `pair` - the pair to fuse.
    /// * `fused` - the symbol that replaces each occurrence.
    /// * `on_change` - called once per pair whose window count changed, in
    ///   pair order, with the signed change.
    pub fn merge_tallied<F>(
        &mut self,
        pair: Pair<WordId>,
        fused: WordId,
        on_change: &mut F,
    ) where
        F: FnMut(Pair<WordId>, i64),
    {
        let mut before: Vec<Pair<WordId>> = self.pairs().collect();
        if self.merge(pair, fused) == 0 {
            return;
        }
        let mut after: Vec<Pair<WordId>> = self.pairs().collect();
        before.sort_unstable();
        after.sort_unstable();

        let (mut i, mut j) = (0, 0);
        loop {
            let next = match (before.get(i), after.get(j)) {
                (Some(&old), Some(&new)) => old.min(new),
                (Some(&old), None) => old,
                (None, Some(&new)) => new,
                (None, None) => break,
            };
            let old = before[i..].iter().take_while(|&&p| p == next).count();
            let new = after[j..].iter().take_while(|&&p| p == next).count();
            i += old;
            j += new;
            if old != new {
                on_change(next, new as i64 - old as i64);
            }
        }
    }
}
