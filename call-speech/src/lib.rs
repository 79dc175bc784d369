//! call-speech - speak into live phone calls
//!
//! Splits text into sentence chunks the TTS engine accepts, wraps each chunk
//! in SSML with the call's voice, and plays it through a call automation
//! client. Also starts speech and menu-choice recognition after a prompt.

pub mod call;
pub mod config;
pub mod playback;
pub mod ssml;
pub mod text;

pub use call::{CallLanguage, CallRecord, Message, Persona, PlayContext, Style};
pub use config::SpeechConfig;
pub use playback::{Outcome, Playback, classify};
pub use ssml::{SsmlDocument, SynthesisRequest, TextEscaping};
