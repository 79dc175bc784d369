//! Azure Communication Services provider
//!
//! Direct HTTP implementation of the call automation `:play` and `:recognize`
//! operations for a single call connection.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::connection::{
    CallConnection, PlaySource, RecognitionChoice, RecognizeInputType, RecognizeRequest,
};
use crate::error::{CallError, Result};

/// Message fragment the service uses when the call ended before the request landed
pub const CALL_TERMINATED_MESSAGE: &str = "call already terminated";

/// Provider for one call connection of an Azure Communication Services resource
pub struct AcsConnection {
    endpoint: String,
    api_version: String,
    access_token: String,
    call_connection_id: String,
    client: Client,
}

impl AcsConnection {
    /// Create a new connection client
    pub fn new(
        endpoint: &str,
        api_version: &str,
        access_token: String,
        call_connection_id: &str,
    ) -> Result<Self> {
        if call_connection_id.is_empty() {
            return Err(CallError::ConfigError(
                "call connection id must not be empty".to_string(),
            ));
        }

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
            access_token,
            call_connection_id: call_connection_id.to_string(),
            client: Client::new(),
        })
    }

    fn action_url(&self, action: &str) -> String {
        format!(
            "{}/calling/callConnections/{}:{}?api-version={}",
            self.endpoint, self.call_connection_id, action, self.api_version
        )
    }

    async fn post<T: Serialize>(&self, action: &str, body: &T) -> Result<()> {
        let url = self.action_url(action);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(body)
            .send()
            .await
            .map_err(|e| CallError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(map_error(status, &error_text, &self.call_connection_id))
    }
}

// Call automation request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayBody {
    play_sources: Vec<PlaySourceBody>,
    play_to: Vec<ParticipantBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaySourceBody {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<FileSourceBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ssml: Option<SsmlSourceBody>,
}

#[derive(Debug, Serialize)]
struct FileSourceBody {
    uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SsmlSourceBody {
    ssml_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantBody {
    kind: &'static str,
    phone_number: PhoneNumberBody,
}

#[derive(Debug, Serialize)]
struct PhoneNumberBody {
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeBody {
    recognize_input_type: RecognizeInputType,
    #[serde(skip_serializing_if = "Option::is_none")]
    play_prompt: Option<PlaySourceBody>,
    recognize_options: RecognizeOptionsBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeOptionsBody {
    interrupt_prompt: bool,
    target_participant: ParticipantBody,
    speech_language: String,
    speech_options: SpeechOptionsBody,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    choices: Vec<RecognitionChoice>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechOptionsBody {
    end_silence_timeout_in_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl From<PlaySource> for PlaySourceBody {
    fn from(source: PlaySource) -> Self {
        match source {
            PlaySource::File { url } => Self {
                kind: "file",
                file: Some(FileSourceBody { uri: url }),
                ssml: None,
            },
            PlaySource::Ssml { ssml_text } => Self {
                kind: "ssml",
                file: None,
                ssml: Some(SsmlSourceBody { ssml_text }),
            },
        }
    }
}

impl ParticipantBody {
    fn phone_number(value: String) -> Self {
        Self {
            kind: "phoneNumber",
            phone_number: PhoneNumberBody { value },
        }
    }
}

impl From<RecognizeRequest> for RecognizeBody {
    fn from(request: RecognizeRequest) -> Self {
        Self {
            recognize_input_type: request.input_type,
            play_prompt: request.play_prompt.map(PlaySourceBody::from),
            recognize_options: RecognizeOptionsBody {
                interrupt_prompt: request.interrupt_prompt,
                target_participant: ParticipantBody::phone_number(request.target_participant),
                speech_language: request.speech_language,
                speech_options: SpeechOptionsBody {
                    end_silence_timeout_in_ms: request.end_silence_timeout.as_millis() as u64,
                },
                choices: request.choices,
            },
        }
    }
}

/// Translate a failed response into the error taxonomy callers match on
fn map_error(status: StatusCode, body: &str, call_connection_id: &str) -> CallError {
    let (code, message) = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(response) => (response.error.code, response.error.message),
        Err(_) => (None, body.to_string()),
    };

    if status == StatusCode::NOT_FOUND {
        return CallError::NotFound(call_connection_id.to_string());
    }

    if message.to_lowercase().contains(CALL_TERMINATED_MESSAGE) {
        return CallError::CallTerminated { message };
    }

    CallError::Http {
        status: status.as_u16(),
        code,
        message,
    }
}

#[async_trait]
impl CallConnection for AcsConnection {
    async fn play_media(
        &self,
        source: PlaySource,
        operation_context: Option<&str>,
    ) -> Result<()> {
        let body = PlayBody {
            play_sources: vec![source.into()],
            play_to: Vec::new(),
            operation_context: operation_context.map(str::to_string),
        };
        self.post("play", &body).await
    }

    async fn start_recognizing(&self, request: RecognizeRequest) -> Result<()> {
        let body = RecognizeBody::from(request);
        self.post("recognize", &body).await
    }

    fn call_connection_id(&self) -> &str {
        &self.call_connection_id
    }
}
