//! # Corpus
//!
//! Sentences, parallel samples, batching, and sampling.
pub mod batch;
pub mod reader;
pub mod sampler;
pub mod sentence;

#[doc(inline)]
pub use batch::{Batch, BatchConverter, IdMatrix, Sample};
#[doc(inline)]
pub use reader::{CorpusOptions, ParallelCorpus};
#[doc(inline)]
pub use sampler::{RandomSampler, Sampler, SequentialSampler};
#[doc(inline)]
pub use sentence::{Features, Sentence, Token};
