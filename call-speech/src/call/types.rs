//! Call record and transcript types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expressive speaking style applied by the TTS voice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    None,
    Cheerful,
    Sad,
}

impl Style {
    /// Value used in the `style` attribute of `mstts:express-as`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Cheerful => "cheerful",
            Self::Sad => "sad",
        }
    }

    /// Parse a style from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "cheerful" => Some(Self::Cheerful),
            "sad" => Some(Self::Sad),
            _ => None,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who produced a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Human,
    Assistant,
    Tool,
}

/// One transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub persona: Persona,
    pub style: Style,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(content: String, persona: Persona, style: Style) -> Self {
        Self {
            content,
            persona,
            style,
            created_at: Utc::now(),
        }
    }
}

/// Language and voice used on a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLanguage {
    /// BCP-47 code, e.g. "fr-FR"
    pub short_code: String,
    /// Neural voice name, e.g. "fr-FR-DeniseNeural"
    pub voice: String,
}

impl Default for CallLanguage {
    fn default() -> Self {
        Self {
            short_code: "en-US".to_string(),
            voice: "en-US-JennyNeural".to_string(),
        }
    }
}

/// Operation context attached to a playback, echoed back by the service events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayContext {
    ConnectAgent,
    Goodbye,
    TransferFailed,
}

impl PlayContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectAgent => "connect_agent",
            Self::Goodbye => "goodbye",
            Self::TransferFailed => "transfer_failed",
        }
    }
}

/// The caller-owned record of a live call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    /// Call connection the playback is sent to
    pub call_connection_id: String,
    /// Caller phone number (E.164), the recognition target
    pub phone_number: String,
    pub lang: CallLanguage,
    /// Conversation transcript, oldest first
    pub messages: Vec<Message>,
}

impl CallRecord {
    /// Create a new call record with an empty transcript.
    pub fn new(call_connection_id: String, phone_number: String, lang: CallLanguage) -> Self {
        Self {
            call_connection_id,
            phone_number,
            lang,
            messages: Vec::new(),
        }
    }

    /// Store text spoken by the assistant.
    ///
    /// Consecutive assistant text is merged into the last message; the style
    /// of the merged message is kept.
    pub fn store_assistant_text(&mut self, text: &str, style: Style) {
        match self.messages.last_mut() {
            Some(last) if last.persona == Persona::Assistant => {
                last.content.push(' ');
                last.content.push_str(text);
            }
            _ => self
                .messages
                .push(Message::new(text.to_string(), Persona::Assistant, style)),
        }
    }
}
