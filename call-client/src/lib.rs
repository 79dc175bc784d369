//! Call automation client for the call-speech workspace
//!
//! Provides a single interface to drive one live call connection:
//! - Play a hosted audio file or an SSML document
//! - Start speech, DTMF or menu-choice recognition
//!
//! Implementations: Azure Communication Services (REST) and a scriptable mock.

pub mod config;
pub mod connection;
pub mod error;
pub mod providers;

pub use config::ClientConfig;
pub use connection::{
    CallConnection, DtmfTone, PlaySource, RecognitionChoice, RecognizeInputType,
    RecognizeRequest,
};
pub use error::{CallError, Result};
pub use providers::{AcsConnection, MockConnection, RecordedCall, get_connection};
