//! # Merge Table
//!
//! The learned merges, in rank order, and the greedy merge application
//! that replays them on a new word.

use serde::{Deserialize, Serialize};

use crate::{
    NmtError,
    NmtResult,
    WordId,
    types::{NmtHashMap, Pair, hash_map_with_capacity},
    vocab::bpe::SymbolSpan,
};

/// One learned merge: ``(left, right) -> result``.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merge {
    /// The left symbol.
    pub left: WordId,

    /// The right symbol.
    pub right: WordId,

    /// The merged symbol.
    pub result: WordId,
}

/// Serialized form of a [`MergeTable`]: the merges in rank order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
struct MergeList(Vec<Merge>);

/// Ranked BPE merges.
///
/// A merge's rank is its position in training order; lower ranks win.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "MergeList", into = "MergeList")]
pub struct MergeTable {
    merges: Vec<Merge>,
    index: NmtHashMap<Pair<WordId>, (usize, WordId)>,
}

impl PartialEq for MergeTable {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.merges == other.merges
    }
}

impl TryFrom<MergeList> for MergeTable {
    type Error = NmtError;

    fn try_from(list: MergeList) -> NmtResult<Self> {
        let mut table = Self::with_capacity(list.0.len());
        for Merge {
            left,
            right,
            result,
        } in list.0
        {
            if !table.push((left, right), result) {
                return Err(NmtError::config(format!(
                    "merge ({left}, {right}) is listed more than once"
                )));
            }
        }
        Ok(table)
    }
}

impl From<MergeTable> for MergeList {
    fn from(table: MergeTable) -> Self {
        MergeList(table.merges)
    }
}

impl MergeTable {
    /// Create an empty table with room for `capacity` merges.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            merges: Vec::with_capacity(capacity),
            index: hash_map_with_capacity(capacity),
        }
    }

    /// The number of merges.
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    /// Append a merge at the next rank.
    ///
    /// ## Returns
    /// `false` (and no change) if `pair` already has a rank.
    pub fn push(
        &mut self,
        pair: Pair<WordId>,
        result: WordId,
    ) -> bool {
        if self.index.contains_key(&pair) {
            return false;
        }
        self.index.insert(pair, (self.merges.len(), result));
        self.merges.push(Merge {
            left: pair.0,
            right: pair.1,
            result,
        });
        true
    }

    /// Look up the ``(rank, result)`` of a pair.
    pub fn rank(
        &self,
        pair: Pair<WordId>,
    ) -> Option<(usize, WordId)> {
        self.index.get(&pair).copied()
    }

    /// The merges in rank order.
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Check that every merge names symbols below `num_symbols`.
    ///
    /// ## Errors
    /// [`NmtError::Config`] naming the first out-of-range merge.
    pub fn check_symbols(
        &self,
        num_symbols: usize,
    ) -> NmtResult<()> {
        for (rank, merge) in self.merges.iter().enumerate() {
            if [merge.left, merge.right, merge.result]
                .iter()
                .any(|&id| id as usize >= num_symbols)
            {
                return Err(NmtError::config(format!(
                    "merge {rank} {merge:?} is outside a vocabulary of {num_symbols} symbols"
                )));
            }
        }
        Ok(())
    }

    /// Greedily apply the learned merges to `span`.
    ///
    /// Each round finds the adjacent pair with the lowest rank and merges all
    /// of its non-overlapping occurrences; rounds repeat until no adjacent
    /// pair has a rank. This replays training-time merge order exactly.
    pub fn apply(
        &self,
        span: &mut SymbolSpan,
    ) {
        loop {
            let best = span
                .pairs()
                .filter_map(|pair| self.rank(pair).map(|(rank, result)| (rank, pair, result)))
                .min_by_key(|&(rank, _, _)| rank);

            let Some((_, pair, result)) = best else {
                return;
            };
            span.merge(pair, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_rank() {
        let mut table = MergeTable::with_capacity(4);
        assert!(table.push((1, 2), 10));
        assert!(table.push((10, 3), 11));
        assert!(!table.push((1, 2), 12));

        assert_eq!(table.len(), 2);
        assert_eq!(table.rank((1, 2)), Some((0, 10)));
        assert_eq!(table.rank((10, 3)), Some((1, 11)));
        assert_eq!(table.rank((2, 1)), None);
    }

    #[test]
    fn test_apply_uses_rank_order() {
        let mut table = MergeTable::default();
        table.push((2, 3), 10); // rank 0
        table.push((1, 2), 11); // rank 1
        table.push((11, 3), 12); // rank 2, never reachable below
        table.push((1, 10), 13); // rank 3

        // [1 2 3]: (2,3) outranks (1,2) -> [1 10] -> [13]
        let mut span: SymbolSpan = [1, 2, 3].into();
        table.apply(&mut span);
        assert_eq!(span.symbols(), &[13]);

        // [1 2 1 2]: only (1,2) -> [11 11]
        let mut span: SymbolSpan = [1, 2, 1, 2].into();
        table.apply(&mut span);
        assert_eq!(span.symbols(), &[11, 11]);

        let mut span: SymbolSpan = [4, 5].into();
        table.apply(&mut span);
        assert_eq!(span.symbols(), &[4, 5]);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut table = MergeTable::default();
        table.push((1, 2), 10);
        table.push((10, 3), 11);

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"[{"left":1,"right":2,"result":10},{"left":10,"right":3,"result":11}]"#
        );
        let loaded: MergeTable = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.rank((10, 3)), Some((1, 11)));
    }

    #[test]
    fn test_load_rejects_repeated_pair() {
        let json = r#"[{"left":1,"right":2,"result":10},{"left":1,"right":2,"result":11}]"#;
        let err = serde_json::from_str::<MergeTable>(json).unwrap_err();
        assert!(err.to_string().contains("more than once"), "{err}");
    }

    #[test]
    fn test_check_symbols() {
        let mut table = MergeTable::default();
        table.push((1, 2), 10);
        assert!(table.check_symbols(11).is_ok());
        assert!(matches!(table.check_symbols(10), Err(NmtError::Config(_))));

        table.push((99, 2), 5);
        assert!(table.check_symbols(11).is_err());
    }
}
