//! Text processing for TTS playback: sentence splitting and chunking.

pub mod chunker;
pub mod splitter;

pub use chunker::{DEFAULT_MAX_CHUNK_LENGTH, chunk_text};
pub use splitter::{Sentences, split_sentences};
