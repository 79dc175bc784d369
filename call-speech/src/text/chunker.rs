//! Text chunking for TTS playback.

use super::splitter::split_sentences;

/// Default maximum chunk size in characters, the text limit of the TTS service.
pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 400;

/// Pack text into chunks of whole sentences.
///
/// # Arguments
/// * `text` - The text to chunk
/// * `max_chunk_length` - Chunk size in characters that triggers a flush (default: 400)
///
/// # Returns
/// Chunks in reading order. Every chunk but the last has its trailing
/// whitespace stripped. A sentence is never cut, so a sentence longer than
/// `max_chunk_length` becomes a chunk of its own.
pub fn chunk_text(text: &str, max_chunk_length: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current_chunk = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(text, true) {
        let sentence_len = sentence.chars().count();

        // Flush before appending when the sentence would reach the limit
        if current_len + sentence_len >= max_chunk_length && !current_chunk.is_empty() {
            chunks.push(current_chunk.trim_end().to_string());
            current_chunk.clear();
            current_len = 0;
        }

        current_chunk.push_str(sentence);
        current_len += sentence_len;
    }

    // Don't forget the last chunk
    if !current_chunk.is_empty() {
        chunks.push(current_chunk);
    }

    chunks
}
