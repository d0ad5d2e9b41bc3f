//! # Evaluator Trait

use crate::NmtResult;

/// A read-only corpus-level score of a model.
pub trait Evaluator<M: ?Sized> {
    /// A short name for logs.
    fn name(&self) -> &str;

    /// Score `model` over the held-out data.
    fn evaluate(
        &self,
        model: &M,
    ) -> NmtResult<f64>;
}
