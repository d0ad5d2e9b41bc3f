//! # Inference
//!
//! Beam search over an external scoring model.
//!
//! * [`DecoderOracle`] and [`Predictor`] are the model's contract.
//! * [`BeamSearchDecoder`] explores hypotheses and records them all in an
//!   [`InferenceGraph`], from which callers extract the one-best path.
//! * [`TableModel`] is a deterministic lookup model implementing both roles.
pub mod beam_search;
pub mod graph;
pub mod oracle;
pub mod table_model;

#[doc(inline)]
pub use beam_search::{BeamSearchDecoder, BeamSearchOptions};
#[doc(inline)]
pub use graph::{InferenceGraph, Label, Node, NodeId};
#[doc(inline)]
pub use oracle::{DecoderOracle, Prediction, Predictor, StepOutput};
#[doc(inline)]
pub use table_model::{TableModel, TableState};
