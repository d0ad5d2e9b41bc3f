use nmtkit::vocab::{AnyVocabulary, io::load_vocabulary_path};

/// Vocabulary file selector arg group.
#[derive(clap::Args, Debug)]
pub struct VocabSelectorArgs {
    /// Vocabulary file, as written by `build-vocab`.
    #[arg(long)]
    vocab: String,
}

impl VocabSelectorArgs {
    /// Load the vocabulary.
    pub fn load_vocab(&self) -> Result<AnyVocabulary, Box<dyn std::error::Error>> {
        log::info!("Loading vocabulary: {}", self.vocab);
        let vocab = load_vocabulary_path(&self.vocab)?;
        log::info!("Loaded {} vocabulary", vocab.kind());
        Ok(vocab)
    }
}
