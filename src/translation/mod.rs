//! Text preparation around the translation API call.
//!
//! A message goes through: direction detection, chunking, placeholder
//! protection, (translation), restoration, and joining.

pub mod chunk;
pub mod language;
pub mod protect;

pub use chunk::{split_by_newline, ChunkLimits};
pub use language::{detect_target, TargetLanguage};
pub use protect::ProtectedText;

use anyhow::{bail, Result};

/// Separator placed between translated chunks.
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// A message that is ready to be sent to the translator.
#[derive(Debug, Clone)]
pub struct PreparedMessage {
    pub target: TargetLanguage,
    chunks: Vec<ProtectedText>,
}

impl PreparedMessage {
    /// Prepare `text` for translation, or `None` if it needs none.
    pub fn new(text: &str, limits: ChunkLimits) -> Option<Self> {
        let target = detect_target(text)?;
        let chunks = split_by_newline(text, limits)
            .into_iter()
            .map(|chunk| ProtectedText::new(chunk, target))
            .collect();

        Some(Self { target, chunks })
    }

    /// Protected chunk texts, in order, as the translator's `contents`.
    pub fn contents(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.text.clone()).collect()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Restore each translated chunk and join them into one reply.
    pub fn finish(&self, translated: &[String]) -> Result<String> {
        if translated.len() != self.chunks.len() {
            bail!(
                "Translated chunk count mismatch: sent {}, got {}",
                self.chunks.len(),
                translated.len()
            );
        }

        let restored: Vec<String> = self
            .chunks
            .iter()
            .zip(translated)
            .map(|(chunk, text)| chunk.restore(text))
            .collect();

        Ok(restored.join(CHUNK_SEPARATOR))
    }
}
