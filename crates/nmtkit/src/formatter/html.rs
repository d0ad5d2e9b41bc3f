//! # HTML Formatter
//!
//! One section per record: the source, the reference, the one-best
//! translation, and a table of the one-best path with per-word and
//! accumulated log-probabilities.

use std::io::Write;

use crate::{
    NmtResult,
    WordId,
    formatter::{FormatRecord, Formatter},
    vocab::reserved::{BOS_ID, EOS_ID},
};

/// Escape text for HTML element content and attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Writes a standalone HTML report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlFormatter {
    bos_id: WordId,
    eos_id: WordId,
    num_records: usize,
}

impl Default for HtmlFormatter {
    fn default() -> Self {
        Self::new(BOS_ID, EOS_ID)
    }
}

impl HtmlFormatter {
    /// Create a formatter for the given target markers.
    pub fn new(
        bos_id: WordId,
        eos_id: WordId,
    ) -> Self {
        Self {
            bos_id,
            eos_id,
            num_records: 0,
        }
    }
}

impl Formatter for HtmlFormatter {
    fn initialize(
        &mut self,
        out: &mut dyn Write,
    ) -> NmtResult<()> {
        self.num_records = 0;
        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html>")?;
        writeln!(out, "<head><meta charset=\"utf-8\"><title>nmtkit</title></head>")?;
        writeln!(out, "<body>")?;
        Ok(())
    }

    fn write(
        &mut self,
        record: &FormatRecord<'_>,
        out: &mut dyn Write,
    ) -> NmtResult<()> {
        let graph = record.graph;
        let path = graph.find_one_best_path(self.bos_id, self.eos_id)?;
        let words = graph.find_one_best_words(self.bos_id, self.eos_id)?;
        let target = record.target_vocab;

        writeln!(out, "<div class=\"sentence\" id=\"s{}\">", self.num_records)?;
        writeln!(
            out,
            "<p class=\"source\">{}</p>",
            escape_html(record.source_line)
        )?;
        if let Some(reference) = record.reference_line {
            writeln!(out, "<p class=\"reference\">{}</p>", escape_html(reference))?;
        }
        writeln!(
            out,
            "<p class=\"hypothesis\">{}</p>",
            escape_html(&target.convert_to_sentence(&words))
        )?;

        writeln!(out, "<table>")?;
        writeln!(
            out,
            "<tr><th>word</th><th>log-prob</th><th>accumulated</th></tr>"
        )?;
        for label in graph.path_labels(&path) {
            writeln!(
                out,
                "<tr><td>{}</td><td>{:.4}</td><td>{:.4}</td></tr>",
                escape_html(target.get_word(label.word_id)),
                label.word_log_prob,
                label.accumulated_log_prob
            )?;
        }
        writeln!(out, "</table>")?;
        writeln!(out, "</div>")?;

        self.num_records += 1;
        Ok(())
    }

    fn finalize(
        &mut self,
        out: &mut dyn Write,
    ) -> NmtResult<()> {
        writeln!(out, "</body>")?;
        writeln!(out, "</html>")?;
        out.flush()?;
        Ok(())
    }
}
