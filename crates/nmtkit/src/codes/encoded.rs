//! # Error-Corrected Binary Code

use crate::{
    WordId,
    codes::{BinaryCode, ErrorCorrectingCode},
};

/// A [`BinaryCode`] whose patterns pass through an [`ErrorCorrectingCode`].
///
/// Inner patterns are zero-padded to the inner code's `num_bits` before
/// encoding, so every word encodes to the same width.
#[derive(Debug, Clone)]
pub struct EncodedBinaryCode<C, E> {
    code: C,
    ecc: E,
}

impl<C, E> EncodedBinaryCode<C, E>
where
    C: BinaryCode,
    E: ErrorCorrectingCode,
{
    /// Compose a code with an error-correcting transform.
    pub fn new(
        code: C,
        ecc: E,
    ) -> Self {
        Self { code, ecc }
    }

    /// The inner code.
    pub fn code(&self) -> &C {
        &self.code
    }

    /// The error-correcting transform.
    pub fn ecc(&self) -> &E {
        &self.ecc
    }
}

impl<C, E> BinaryCode for EncodedBinaryCode<C, E>
where
    C: BinaryCode,
    E: ErrorCorrectingCode,
{
    fn num_bits(&self) -> usize {
        self.ecc.encoded_len(self.code.num_bits())
    }

    fn encode(
        &self,
        id: WordId,
    ) -> Option<Vec<bool>> {
        let mut bits = self.code.encode(id)?;
        bits.resize(self.code.num_bits(), false);
        Some(self.ecc.encode(&bits))
    }

    fn decode_bits(
        &self,
        bits: &[bool],
    ) -> Option<WordId> {
        let probs: Vec<f64> = bits.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect();
        self.decode_probs(&probs)
    }

    /// Error-correct, then walk the inner code with hard decisions.
    fn decode_probs(
        &self,
        probs: &[f64],
    ) -> Option<WordId> {
        let bits = self.ecc.decode(probs).ok()?;
        let hard: Vec<f64> = bits.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect();
        self.code.decode_probs(&hard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{ConvolutionalEcc, FrequencyRankCode, HuffmanCode, IdentityEcc};

    const WEIGHTS: &[u64] = &[0, 40, 40, 25, 17, 12, 9, 6, 3, 1];

    #[test]
    fn test_identity_is_transparent() {
        let inner = FrequencyRankCode::from_weights(WEIGHTS).unwrap();
        let code = EncodedBinaryCode::new(inner.clone(), IdentityEcc);
        assert_eq!(code.num_bits(), inner.num_bits());
        for id in 0..WEIGHTS.len() as WordId {
            assert_eq!(code.encode(id), inner.encode(id));
            assert_eq!(code.decode_bits(&code.encode(id).unwrap()), Some(id));
        }
    }

    #[test]
    fn test_huffman_with_convolutional() {
        let inner = HuffmanCode::from_weights(WEIGHTS).unwrap();
        let code = EncodedBinaryCode::new(inner, ConvolutionalEcc::new(3).unwrap());
        assert_eq!(code.num_bits(), 2 * (code.code().num_bits() + 3));

        for id in 0..WEIGHTS.len() as WordId {
            let encoded = code.encode(id).unwrap();
            assert_eq!(encoded.len(), code.num_bits());

            let mut probs: Vec<f64> = encoded.iter().map(|&b| if b { 0.8 } else { 0.2 }).collect();
            assert_eq!(code.decode_probs(&probs), Some(id));

            probs[3] = 1.0 - probs[3];
            assert_eq!(code.decode_probs(&probs), Some(id), "one flip: {id}");
        }
    }

    #[test]
    fn test_bad_width() {
        let code = EncodedBinaryCode::new(
            FrequencyRankCode::from_weights(WEIGHTS).unwrap(),
            ConvolutionalEcc::new(2).unwrap(),
        );
        assert_eq!(code.decode_probs(&[0.5; 3]), None);
        assert_eq!(code.encode(99), None);
    }
}
