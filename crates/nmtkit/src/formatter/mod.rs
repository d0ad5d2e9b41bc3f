//! # Output Formatters
//!
//! A [`Formatter`] renders decoding results to a stream:
//! [`Formatter::initialize`] once, [`Formatter::write`] per input line,
//! then [`Formatter::finalize`].
pub mod html;
pub mod text;

use std::io::Write;

#[doc(inline)]
pub use html::HtmlFormatter;
#[doc(inline)]
pub use text::TextFormatter;

use crate::{NmtResult, inference::InferenceGraph, vocab::Vocabulary};

/// One decoded input line.
#[derive(Clone, Copy)]
pub struct FormatRecord<'a> {
    /// The source text.
    pub source_line: &'a str,

    /// The reference translation, when known.
    pub reference_line: Option<&'a str>,

    /// Every hypothesis explored for this line.
    pub graph: &'a InferenceGraph,

    /// The source encoder.
    pub source_vocab: &'a dyn Vocabulary,

    /// The target decoder.
    pub target_vocab: &'a dyn Vocabulary,
}

/// Renders [`FormatRecord`]s.
pub trait Formatter {
    /// Write any preamble.
    fn initialize(
        &mut self,
        out: &mut dyn Write,
    ) -> NmtResult<()>;

    /// Write one record.
    fn write(
        &mut self,
        record: &FormatRecord<'_>,
        out: &mut dyn Write,
    ) -> NmtResult<()>;

    /// Write any trailer.
    fn finalize(
        &mut self,
        out: &mut dyn Write,
    ) -> NmtResult<()>;
}
