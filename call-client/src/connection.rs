use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;

/// Audio played into a call: a hosted file or an SSML document synthesized by the service
#[derive(Debug, Clone, PartialEq)]
pub enum PlaySource {
    File { url: String },
    Ssml { ssml_text: String },
}

impl PlaySource {
    pub fn file(url: impl Into<String>) -> Self {
        Self::File { url: url.into() }
    }

    pub fn ssml(ssml_text: impl Into<String>) -> Self {
        Self::Ssml {
            ssml_text: ssml_text.into(),
        }
    }
}

/// What kind of caller input a recognition waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecognizeInputType {
    Speech,
    Dtmf,
    Choices,
    SpeechOrDtmf,
}

/// Telephone keypad tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DtmfTone {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Pound,
    Asterisk,
}

/// One option of a spoken/keypad menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionChoice {
    pub label: String,
    pub phrases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<DtmfTone>,
}

impl RecognitionChoice {
    pub fn new(label: impl Into<String>, phrases: Vec<String>) -> Self {
        Self {
            label: label.into(),
            phrases,
            tone: None,
        }
    }

    pub fn with_tone(mut self, tone: DtmfTone) -> Self {
        self.tone = Some(tone);
        self
    }
}

/// Request to start recognizing caller input, optionally after a prompt
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizeRequest {
    pub input_type: RecognizeInputType,
    /// Phone number of the participant to listen to (E.164)
    pub target_participant: String,
    /// BCP-47 language used for speech recognition
    pub speech_language: String,
    pub play_prompt: Option<PlaySource>,
    pub end_silence_timeout: Duration,
    /// Whether caller input stops the prompt
    pub interrupt_prompt: bool,
    pub choices: Vec<RecognitionChoice>,
}

impl RecognizeRequest {
    pub fn new(
        input_type: RecognizeInputType,
        target_participant: impl Into<String>,
        speech_language: impl Into<String>,
    ) -> Self {
        Self {
            input_type,
            target_participant: target_participant.into(),
            speech_language: speech_language.into(),
            play_prompt: None,
            end_silence_timeout: Duration::from_secs(2),
            interrupt_prompt: false,
            choices: Vec::new(),
        }
    }

    pub fn with_prompt(mut self, prompt: PlaySource) -> Self {
        self.play_prompt = Some(prompt);
        self
    }

    pub fn with_end_silence_timeout(mut self, timeout: Duration) -> Self {
        self.end_silence_timeout = timeout;
        self
    }

    pub fn with_interrupt_prompt(mut self, interrupt: bool) -> Self {
        self.interrupt_prompt = interrupt;
        self
    }

    pub fn with_choices(mut self, choices: Vec<RecognitionChoice>) -> Self {
        self.choices = choices;
        self
    }
}

/// Trait for clients bound to one live call connection
#[async_trait]
pub trait CallConnection: Send + Sync {
    /// Play audio to every participant of the call
    async fn play_media(&self, source: PlaySource, operation_context: Option<&str>)
    -> Result<()>;

    /// Start recognizing input from a participant
    async fn start_recognizing(&self, request: RecognizeRequest) -> Result<()>;

    /// Identifier of the call connection this client drives
    fn call_connection_id(&self) -> &str;
}
