//! # Frequency-Rank Code

use crate::{
    NmtError,
    NmtResult,
    WordId,
    codes::{BinaryCode, binary_code::is_set},
    vocab::Vocabulary,
};

/// Fixed-width binary code of each word's frequency rank.
///
/// The most frequent word has rank `0`; ties rank by ID. Codes are
/// ``ceil(log2(size))`` bits, most significant first. Patterns at or past
/// `size` name no word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyRankCode {
    num_bits: usize,
    rank_of: Vec<usize>,
    id_of: Vec<WordId>,
}

impl FrequencyRankCode {
    /// Build a code from per-ID weights.
    ///
    /// ## Errors
    /// [`NmtError::Config`] if there are fewer than two weights.
    pub fn from_weights(weights: &[u64]) -> NmtResult<Self> {
        let n = weights.len();
        if n < 2 {
            return Err(NmtError::config(format!(
                "frequency-rank code needs >= 2 words, got {n}"
            )));
        }

        let mut id_of: Vec<WordId> = (0..n as WordId).collect();
        id_of.sort_by_key(|&id| (core::cmp::Reverse(weights[id as usize]), id));

        let mut rank_of = vec![0; n];
        for (rank, &id) in id_of.iter().enumerate() {
            rank_of[id as usize] = rank;
        }

        let num_bits = (usize::BITS - (n - 1).leading_zeros()) as usize;
        Ok(Self {
            num_bits,
            rank_of,
            id_of,
        })
    }

    /// Build a code ranked by a vocabulary's frequencies.
    pub fn from_vocabulary(vocab: &dyn Vocabulary) -> NmtResult<Self> {
        let weights: Vec<u64> = (0..vocab.size() as WordId)
            .map(|id| vocab.get_frequency(id))
            .collect();
        Self::from_weights(&weights)
    }

    /// The frequency rank of `id`.
    pub fn rank(
        &self,
        id: WordId,
    ) -> Option<usize> {
        self.rank_of.get(id as usize).copied()
    }

    fn id_at_rank(
        &self,
        bits: impl Iterator<Item = bool>,
    ) -> Option<WordId> {
        let rank = bits.fold(0usize, |acc, b| (acc << 1) | b as usize);
        self.id_of.get(rank).copied()
    }
}

impl BinaryCode for FrequencyRankCode {
    fn num_bits(&self) -> usize {
        self.num_bits
    }

    fn encode(
        &self,
        id: WordId,
    ) -> Option<Vec<bool>> {
        let rank = self.rank(id)?;
        Some(
            (0..self.num_bits)
                .rev()
                .map(|shift| (rank >> shift) & 1 == 1)
                .collect(),
        )
    }

    fn decode_bits(
        &self,
        bits: &[bool],
    ) -> Option<WordId> {
        if bits.len() != self.num_bits {
            return None;
        }
        self.id_at_rank(bits.iter().copied())
    }

    /// Hard-decide the first `num_bits` probabilities.
    fn decode_probs(
        &self,
        probs: &[f64],
    ) -> Option<WordId> {
        let probs = probs.get(..self.num_bits)?;
        self.id_at_rank(probs.iter().map(|&p| is_set(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::INVALID_CODE;

    #[test]
    fn test_widths() {
        let width = |n: usize| FrequencyRankCode::from_weights(&vec![1; n]).unwrap().num_bits();
        assert_eq!(width(2), 1);
        assert_eq!(width(3), 2);
        assert_eq!(width(4), 2);
        assert_eq!(width(5), 3);
        assert_eq!(width(8), 3);
        assert_eq!(width(9), 4);
    }

    #[test]
    fn test_ranks() {
        let code = FrequencyRankCode::from_weights(&[0, 5, 5, 9, 1]).unwrap();
        assert_eq!(code.rank(3), Some(0));
        assert_eq!(code.rank(1), Some(1));
        assert_eq!(code.rank(2), Some(2));
        assert_eq!(code.rank(4), Some(3));
        assert_eq!(code.rank(0), Some(4));

        assert_eq!(code.encode(3).unwrap(), vec![false, false, false]);
        assert_eq!(code.encode(0).unwrap(), vec![true, false, false]);
        assert_eq!(code.encode(4).unwrap(), vec![false, true, true]);
        assert_eq!(code.encode(5), None);
    }

    #[test]
    fn test_decode() {
        let code = FrequencyRankCode::from_weights(&[0, 5, 5, 9, 1]).unwrap();
        for id in 0..5 {
            assert_eq!(code.decode_bits(&code.encode(id).unwrap()), Some(id));
        }

        // Rank 5 is past the vocabulary.
        assert_eq!(code.decode_bits(&[true, false, true]), None);
        assert_eq!(code.decode_bits(&[true]), None);
        assert_eq!(code.decode_probs(&[0.2, 0.7, 0.5, 0.99]), Some(4));
        assert_eq!(code.decode_probs(&[0.2, 0.7]), None);

        assert_eq!(
            code.decode_probs_batch(&[vec![0.1, 0.1, 0.1], vec![0.9, 0.9, 0.9]]),
            vec![3, INVALID_CODE]
        );
    }
}
