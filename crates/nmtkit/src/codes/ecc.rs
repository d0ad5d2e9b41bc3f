//! # Error-Correcting Code Trait

use crate::{NmtError, NmtResult, codes::binary_code::is_set};

/// A redundant bit transform with soft decoding.
pub trait ErrorCorrectingCode: Send + Sync {
    /// The encoded length of an `n`-bit message.
    fn encoded_len(
        &self,
        n: usize,
    ) -> usize;

    /// Encode a message.
    fn encode(
        &self,
        bits: &[bool],
    ) -> Vec<bool>;

    /// Recover the most likely message from per-bit probabilities of a `1`.
    ///
    /// ## Errors
    /// [`NmtError::Config`] if `probs.len()` is not a valid encoded length.
    fn decode(
        &self,
        probs: &[f64],
    ) -> NmtResult<Vec<bool>>;
}

/// The no-op code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityEcc;

impl ErrorCorrectingCode for IdentityEcc {
    fn encoded_len(
        &self,
        n: usize,
    ) -> usize {
        n
    }

    fn encode(
        &self,
        bits: &[bool],
    ) -> Vec<bool> {
        bits.to_vec()
    }

    fn decode(
        &self,
        probs: &[f64],
    ) -> NmtResult<Vec<bool>> {
        if let Some(p) = probs.iter().find(|p| p.is_nan()) {
            return Err(NmtError::config(format!("invalid bit probability: {p}")));
        }
        Ok(probs.iter().map(|&p| is_set(p)).collect())
    }
}
