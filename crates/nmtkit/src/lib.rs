//! # `nmtkit` Neural Machine Translation Toolkit
//!
//! The model-independent half of an NMT system: vocabulary codecs,
//! corpus batching, and beam-search inference over an external network.
//!
//! See:
//! * [`vocab`] to build word, character, and BPE vocabularies.
//! * [`codes`] for binary word codes and error-correcting codes.
//! * [`corpus`] to load corpora and pack them into batches.
//! * [`inference`] to beam-search or force-decode through a model.
//! * [`evaluation`] for held-out loss and corpus BLEU.
//! * [`formatter`] to render decoding results.
//!
//! ## Decoding
//!
//! The network is reached only through [`inference::DecoderOracle`] and
//! [`inference::Predictor`]; [`inference::TableModel`] implements both
//! over a lookup table.
//!
//! ```rust
//! use nmtkit::{
//!     inference::{BeamSearchOptions, TableModel},
//!     vocab::reserved::{BOS_ID, EOS_ID},
//! };
//!
//! let model = TableModel::new(&[(EOS_ID, 0.9), (3, 0.1)])
//!     .with_entry(&[], &[(3, 0.7), (4, 0.3)]);
//!
//! let decoder = BeamSearchOptions::default().with_beam_width(2).init()?;
//! let graph = decoder.decode(&model, &model, &[5, 6])?;
//! let path = graph.find_one_best_path(BOS_ID, EOS_ID)?;
//! assert_eq!(graph.path_words(&path), vec![BOS_ID, 3, EOS_ID]);
//! # Ok::<(), nmtkit::NmtError>(())
//! ```
//!
//! ## Crate Features
#![doc = document_features::document_features!()]
#![warn(missing_docs, unused)]

pub mod array;
pub mod codes;
pub mod corpus;
pub mod errors;
pub mod evaluation;
pub mod formatter;
pub mod inference;
pub mod random;
pub mod types;
pub mod vocab;

#[doc(inline)]
pub use errors::{NmtError, NmtResult};
#[doc(inline)]
pub use random::Random;
#[doc(inline)]
pub use types::WordId;
