//! # Evaluation
//!
//! Read-only corpus scores: [`LossEvaluator`] and [`BleuEvaluator`].
pub mod bleu;
pub mod evaluator;
pub mod loss;

#[doc(inline)]
pub use bleu::{BleuEvaluator, BleuOptions, BleuStatistics, MAX_NGRAM};
#[doc(inline)]
pub use evaluator::Evaluator;
#[doc(inline)]
pub use loss::{BatchLoss, ForceDecodingLoss, LossEvaluator, LossModel};
