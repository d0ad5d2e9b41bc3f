//! # Binary Codes
//!
//! Word-to-bit-pattern codes for codec-style predictors.
//!
//! * [`HuffmanCode`] - variable-length prefix code from word frequencies.
//! * [`FrequencyRankCode`] - fixed-width binary frequency rank.
//! * [`ConvolutionalEcc`] / [`IdentityEcc`] - optional redundancy with
//!   soft decoding, composed through [`EncodedBinaryCode`].
pub mod binary_code;
pub mod convolutional;
pub mod ecc;
pub mod encoded;
pub mod frequency_rank;
pub mod huffman;

#[doc(inline)]
pub use binary_code::{BinaryCode, INVALID_CODE};
#[doc(inline)]
pub use convolutional::ConvolutionalEcc;
#[doc(inline)]
pub use ecc::{ErrorCorrectingCode, IdentityEcc};
#[doc(inline)]
pub use encoded::EncodedBinaryCode;
#[doc(inline)]
pub use frequency_rank::FrequencyRankCode;
#[doc(inline)]
pub use huffman::HuffmanCode;
