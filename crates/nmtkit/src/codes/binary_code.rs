//! # Binary Code Trait

use crate::WordId;

/// Flat sentinel for a pattern that names no word.
///
/// [`BinaryCode`] decoders return `None` instead; this is the value
/// [`BinaryCode::decode_probs_batch`] writes in its place.
pub const INVALID_CODE: WordId = WordId::MAX;

/// Maps word IDs to bit patterns and back.
///
/// Probabilities are per-bit probabilities of a `1`; a bit decodes as set
/// when its probability is at least `0.5`.
pub trait BinaryCode: Send + Sync {
    /// The number of bits a predictor must produce.
    fn num_bits(&self) -> usize;

    /// The bit pattern of `id`, or `None` if the code has no such ID.
    fn encode(
        &self,
        id: WordId,
    ) -> Option<Vec<bool>>;

    /// Decode an exact bit pattern.
    fn decode_bits(
        &self,
        bits: &[bool],
    ) -> Option<WordId>;

    /// Decode per-bit probabilities to the best-matching ID.
    fn decode_probs(
        &self,
        probs: &[f64],
    ) -> Option<WordId>;

    /// Decode many probability rows, writing [`INVALID_CODE`] for misses.
    fn decode_probs_batch(
        &self,
        rows: &[Vec<f64>],
    ) -> Vec<WordId> {
        rows.iter()
            .map(|probs| self.decode_probs(probs).unwrap_or(INVALID_CODE))
            .collect()
    }
}

/// Hard-decide one probability.
#[inline(always)]
pub(crate) fn is_set(p: f64) -> bool {
    p >= 0.5
}
