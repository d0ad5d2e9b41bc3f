mod bleu;
mod build_vocab;
mod decode_ids;
mod encode;

/// Subcommands for nmtkit.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Build a word, character, or BPE vocabulary from text.
    BuildVocab(build_vocab::BuildVocabArgs),

    /// Encode text lines to ID lines.
    Encode(encode::EncodeArgs),

    /// Decode ID lines back to text.
    DecodeIds(decode_ids::DecodeIdsArgs),

    /// Score hypothesis lines against references with corpus BLEU.
    Bleu(bleu::BleuArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::BuildVocab(cmd) => cmd.run(),
            Commands::Encode(cmd) => cmd.run(),
            Commands::DecodeIds(cmd) => cmd.run(),
            Commands::Bleu(cmd) => cmd.run(),
        }
    }
}
