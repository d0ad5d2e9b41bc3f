use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
};

use nmtkit::{NmtError, evaluation::BleuStatistics};

use crate::{
    input_output::{InputArgs, OutputArgs},
    logging::LogArgs,
};

/// Args for the bleu command.
///
/// Hypotheses come from `--input`; lines are compared as whitespace tokens.
#[derive(clap::Args, Debug)]
pub struct BleuArgs {
    /// Reference file, line-aligned with the hypotheses.
    #[arg(long)]
    reference: String,

    #[clap(flatten)]
    logging: LogArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl BleuArgs {
    /// Run the bleu command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(2)?;

        let hypotheses = self.input.open_reader()?;
        let references = BufReader::new(File::open(&self.reference)?);
        let stats = accumulate(hypotheses, references)?;

        let mut writer = self.output.open_writer()?;
        writeln!(
            writer,
            "BLEU = {:.4} (BP = {:.4}, hyp_len = {}, ref_len = {})",
            stats.score(),
            stats.brevity_penalty(),
            stats.hypothesis_len,
            stats.reference_len,
        )?;
        writer.flush()?;

        Ok(())
    }
}

/// Accumulate statistics over line-aligned hypothesis and reference streams.
fn accumulate<H, R>(
    hypotheses: H,
    references: R,
) -> Result<BleuStatistics, NmtError>
where
    H: BufRead,
    R: BufRead,
{
    let mut stats = BleuStatistics::default();
    let mut hypotheses = hypotheses.lines();
    let mut references = references.lines();
    let mut num_lines = 0;

    loop {
        match (hypotheses.next(), references.next()) {
            (None, None) => break,
            (Some(hyp), Some(reference)) => {
                let (hyp, reference) = (hyp?, reference?);
                let hyp: Vec<&str> = hyp.split_whitespace().collect();
                let reference: Vec<&str> = reference.split_whitespace().collect();
                stats.add(&hyp, &reference);
                num_lines += 1;
            }
            _ => {
                return Err(NmtError::config(format!(
                    "hypothesis and reference line counts differ after line {num_lines}"
                )));
            }
        }
    }
    log::info!("Scored {num_lines} lines");

    Ok(stats)
}
