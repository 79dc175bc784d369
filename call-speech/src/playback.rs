//! Speech playback and recognition on a live call.
//!
//! Every operation is a sequence of awaited requests on one call connection.
//! A caller hanging up mid-operation is not an error: the remaining requests
//! are skipped and the operation returns `Ok(())`. Any other failure is
//! returned unchanged.

use call_client::{
    CallConnection, CallError, PlaySource, RecognitionChoice, RecognizeInputType,
    RecognizeRequest, Result,
};
use call_client::providers::CALL_TERMINATED_MESSAGE;
use log::{debug, info};

use crate::call::{CallRecord, PlayContext, Style};
use crate::config::SpeechConfig;
use crate::ssml::{SynthesisRequest, TextEscaping};
use crate::text::chunk_text;

/// How a failed call request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The call leg no longer exists
    BenignHangup,
    /// The service reports the call as already terminated
    AlreadyTerminated,
    /// Anything else; returned to the caller
    Unexpected,
}

/// Classify a call request failure.
///
/// Structured variants are checked first; an HTTP failure whose message names
/// a terminated call is matched as a fallback for clients without error codes.
pub fn classify(err: &CallError) -> Outcome {
    match err {
        CallError::NotFound(_) => Outcome::BenignHangup,
        CallError::CallTerminated { .. } => Outcome::AlreadyTerminated,
        CallError::Http { message, .. }
            if message.to_lowercase().contains(CALL_TERMINATED_MESSAGE) =>
        {
            Outcome::AlreadyTerminated
        }
        _ => Outcome::Unexpected,
    }
}

/// Turn a hang-up into success, pass everything else through.
fn suppress_hangup(result: Result<()>, action: &str) -> Result<()> {
    let Err(err) = result else {
        return Ok(());
    };

    match classify(&err) {
        Outcome::BenignHangup => {
            debug!("Call hung up before {}", action);
            Ok(())
        }
        Outcome::AlreadyTerminated => {
            debug!("Call already terminated before {}", action);
            Ok(())
        }
        Outcome::Unexpected => Err(err),
    }
}

/// Plays speech and starts recognition on one call connection.
pub struct Playback<'a> {
    connection: &'a dyn CallConnection,
    config: &'a SpeechConfig,
}

impl<'a> Playback<'a> {
    pub fn new(connection: &'a dyn CallConnection, config: &'a SpeechConfig) -> Self {
        Self { connection, config }
    }

    /// Build the SSML request for one chunk, with the call's voice.
    fn synthesis(&self, call: &CallRecord, text: &str, style: Style) -> SynthesisRequest {
        let escaping = if self.config.tts.escape_text {
            TextEscaping::Escape
        } else {
            TextEscaping::Raw
        };

        SynthesisRequest::new(
            text,
            style,
            call.lang.short_code.as_str(),
            call.lang.voice.as_str(),
            self.config.lexicon_base_url(),
        )
        .with_style_degree(self.config.tts.style_degree)
        .with_prosody_rate(self.config.tts.prosody_rate)
        .with_escaping(escaping)
    }

    /// Play text to the call.
    ///
    /// If `store` is set, the text is added to the call transcript first. Text
    /// longer than the TTS limit is split into sentence chunks played in order.
    pub async fn play_text(
        &self,
        call: &mut CallRecord,
        text: &str,
        style: Style,
        context: Option<PlayContext>,
        store: bool,
    ) -> Result<()> {
        if store {
            call.store_assistant_text(text, style);
        }

        let chunks = chunk_text(text, self.config.tts.max_chunk_length);
        for chunk in &chunks {
            info!("Playing text: {} ({})", chunk, style);
            let document = self.synthesis(call, chunk, style).build();
            let result = self
                .connection
                .play_media(
                    PlaySource::ssml(document.ssml),
                    context.map(|c| c.as_str()),
                )
                .await;

            if result.is_err() {
                return suppress_hangup(result, "playing");
            }
        }

        Ok(())
    }

    /// Play a hosted audio file to the call.
    pub async fn play_media(&self, sound_url: &str, context: Option<PlayContext>) -> Result<()> {
        debug!("Playing media: {}", sound_url);
        let result = self
            .connection
            .play_media(PlaySource::file(sound_url), context.map(|c| c.as_str()))
            .await;
        suppress_hangup(result, "playing")
    }

    /// Play text if any, then the ready tone, and listen to the caller's answer.
    pub async fn play_and_recognize(
        &self,
        call: &mut CallRecord,
        style: Style,
        text: Option<&str>,
        store: bool,
    ) -> Result<()> {
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            self.play_text(call, text, style, None, store).await?;
        }

        debug!("Recognizing speech");
        let request = RecognizeRequest::new(
            RecognizeInputType::Speech,
            call.phone_number.as_str(),
            call.lang.short_code.as_str(),
        )
        .with_prompt(PlaySource::file(self.config.ready_sound_url()))
        .with_end_silence_timeout(self.config.recognition.end_silence_timeout());

        let result = self.connection.start_recognizing(request).await;
        suppress_hangup(result, "recognizing")
    }

    /// Play a menu prompt and wait for one of `choices`, spoken or dialed.
    ///
    /// The prompt is a single SSML document and can be interrupted by the caller.
    pub async fn play_menu_and_recognize_choice(
        &self,
        call: &CallRecord,
        text: &str,
        choices: Vec<RecognitionChoice>,
    ) -> Result<()> {
        info!("Playing text before menu: {}", text);
        let document = self.synthesis(call, text, Style::None).build();

        debug!("Recognizing menu choice");
        let request = RecognizeRequest::new(
            RecognizeInputType::Choices,
            call.phone_number.as_str(),
            call.lang.short_code.as_str(),
        )
        .with_prompt(PlaySource::ssml(document.ssml))
        .with_end_silence_timeout(self.config.recognition.choice_silence_timeout())
        .with_interrupt_prompt(true)
        .with_choices(choices);

        let result = self.connection.start_recognizing(request).await;
        suppress_hangup(result, "recognizing")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::{CallLanguage, Persona};
    use call_client::{DtmfTone, MockConnection, RecordedCall};
    use std::time::Duration;

    fn call() -> CallRecord {
        CallRecord::new(
            "call-1".to_string(),
            "+33612345678".to_string(),
            CallLanguage {
                short_code: "fr-FR".to_string(),
                voice: "fr-FR-DeniseNeural".to_string(),
            },
        )
    }

    fn config() -> SpeechConfig {
        let mut config = SpeechConfig::default();
        config.resources.public_url = "https://voice.example.com".to_string();
        config
    }

    fn long_text() -> String {
        // Five 100-char sentences: two chunks at the default limit
        format!("{}. ", "x".repeat(98)).repeat(5)
    }

    fn ssml_of(call: &RecordedCall) -> &str {
        match call {
            RecordedCall::Play {
                source: PlaySource::Ssml { ssml_text },
                ..
            } => ssml_text,
            other => panic!("expected an SSML play, got {other:?}"),
        }
    }

    fn not_found() -> CallError {
        CallError::NotFound("call-1".to_string())
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&not_found()), Outcome::BenignHangup);
        assert_eq!(
            classify(&CallError::CallTerminated {
                message: "gone".to_string()
            }),
            Outcome::AlreadyTerminated
        );
        assert_eq!(
            classify(&CallError::Http {
                status: 400,
                code: None,
                message: "Action failed: Call Already Terminated".to_string(),
            }),
            Outcome::AlreadyTerminated
        );
        assert_eq!(
            classify(&CallError::Http {
                status: 500,
                code: None,
                message: "Internal error".to_string(),
            }),
            Outcome::Unexpected
        );
        assert_eq!(
            classify(&CallError::Request("timeout".to_string())),
            Outcome::Unexpected
        );
    }

    #[tokio::test]
    async fn test_play_text_single_chunk() {
        let connection = MockConnection::always_succeeds();
        let config = config();
        let mut call = call();

        Playback::new(&connection, &config)
            .play_text(
                &mut call,
                "Bonjour. Comment allez-vous?",
                Style::Cheerful,
                Some(PlayContext::Goodbye),
                true,
            )
            .await
            .unwrap();

        let calls = connection.calls();
        assert_eq!(calls.len(), 1);
        let ssml = ssml_of(&calls[0]);
        assert!(ssml.contains("Bonjour. Comment allez-vous?"));
        assert!(ssml.contains(r#"xml:lang="fr-FR""#));
        assert!(ssml.contains(r#"<voice name="fr-FR-DeniseNeural""#));
        assert!(ssml.contains(r#"style="cheerful""#));
        assert!(ssml.contains("https://voice.example.com/lexicon.xml"));
        match &calls[0] {
            RecordedCall::Play {
                operation_context, ..
            } => assert_eq!(operation_context.as_deref(), Some("goodbye")),
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_play_text_plays_chunks_in_order() {
        let connection = MockConnection::always_succeeds();
        let config = config();
        let mut call = call();

        Playback::new(&connection, &config)
            .play_text(&mut call, &long_text(), Style::None, None, false)
            .await
            .unwrap();

        let calls = connection.calls();
        assert_eq!(calls.len(), 2);
        let first = format!("{}.</prosody>", "x".repeat(98));
        assert!(ssml_of(&calls[0]).contains(&format!(">{}", "x".repeat(98))));
        assert!(ssml_of(&calls[0]).contains(&first));
        assert!(call.messages.is_empty());
    }

    #[tokio::test]
    async fn test_play_text_empty_plays_nothing() {
        let connection = MockConnection::always_succeeds();
        let config = config();
        let mut call = call();

        Playback::new(&connection, &config)
            .play_text(&mut call, "", Style::None, None, false)
            .await
            .unwrap();
        assert_eq!(connection.call_count(), 0);
    }

    #[tokio::test]
    async fn test_play_text_stores_transcript() {
        let connection = MockConnection::always_succeeds();
        let config = config();
        let mut call = call();
        let playback = Playback::new(&connection, &config);

        playback
            .play_text(&mut call, "Hello.", Style::None, None, true)
            .await
            .unwrap();
        playback
            .play_text(&mut call, "Anything else?", Style::None, None, true)
            .await
            .unwrap();

        assert_eq!(call.messages.len(), 1);
        assert_eq!(call.messages[0].persona, Persona::Assistant);
        assert_eq!(call.messages[0].content, "Hello. Anything else?");
    }

    #[tokio::test]
    async fn test_play_text_hangup_stops_playback() {
        let connection = MockConnection::always_fails(not_found());
        let config = config();
        let mut call = call();

        let result = Playback::new(&connection, &config)
            .play_text(&mut call, &long_text(), Style::None, None, true)
            .await;

        assert!(result.is_ok());
        assert_eq!(connection.call_count(), 1);
        // The transcript is written before playing
        assert_eq!(call.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_play_text_hangup_mid_playback() {
        let connection = MockConnection::fails_from(1, not_found());
        let config = config();
        let mut call = call();

        let text = format!("{}. ", "x".repeat(98)).repeat(12);
        let result = Playback::new(&connection, &config)
            .play_text(&mut call, &text, Style::None, None, false)
            .await;

        assert!(result.is_ok());
        assert_eq!(connection.call_count(), 2);
    }

    #[tokio::test]
    async fn test_play_text_already_terminated() {
        let connection = MockConnection::always_fails(CallError::Http {
            status: 400,
            code: None,
            message: "Call already terminated".to_string(),
        });
        let config = config();
        let mut call = call();

        let result = Playback::new(&connection, &config)
            .play_text(&mut call, "Hello.", Style::None, None, false)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_play_text_propagates_unexpected_error() {
        let connection = MockConnection::always_fails(CallError::Http {
            status: 503,
            code: Some("ServiceUnavailable".to_string()),
            message: "try later".to_string(),
        });
        let config = config();
        let mut call = call();

        let result = Playback::new(&connection, &config)
            .play_text(&mut call, &long_text(), Style::None, None, false)
            .await;

        match result {
            Err(CallError::Http {
                status,
                code,
                message,
            }) => {
                assert_eq!(status, 503);
                assert_eq!(code.as_deref(), Some("ServiceUnavailable"));
                assert_eq!(message, "try later");
            }
            other => panic!("expected the original error, got {other:?}"),
        }
        assert_eq!(connection.call_count(), 1);
    }

    #[tokio::test]
    async fn test_play_text_escapes_markup() {
        let connection = MockConnection::always_succeeds();
        let config = config();
        let mut call = call();

        Playback::new(&connection, &config)
            .play_text(&mut call, "Fish & chips <now>!", Style::None, None, false)
            .await
            .unwrap();

        let calls = connection.calls();
        assert!(ssml_of(&calls[0]).contains("Fish &amp; chips &lt;now&gt;!"));
    }

    #[tokio::test]
    async fn test_play_media() {
        let connection = MockConnection::always_succeeds();
        let config = config();

        Playback::new(&connection, &config)
            .play_media("https://voice.example.com/hold.wav", Some(PlayContext::ConnectAgent))
            .await
            .unwrap();

        assert_eq!(
            connection.calls(),
            vec![RecordedCall::Play {
                source: PlaySource::file("https://voice.example.com/hold.wav"),
                operation_context: Some("connect_agent".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_play_media_hangup() {
        let connection = MockConnection::always_fails(not_found());
        let config = config();

        let result = Playback::new(&connection, &config)
            .play_media("https://voice.example.com/hold.wav", None)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_play_and_recognize() {
        let connection = MockConnection::always_succeeds();
        let config = config();
        let mut call = call();

        Playback::new(&connection, &config)
            .play_and_recognize(&mut call, Style::None, Some("What is your name?"), true)
            .await
            .unwrap();

        let calls = connection.calls();
        assert_eq!(calls.len(), 2);
        assert!(ssml_of(&calls[0]).contains("What is your name?"));
        match &calls[1] {
            RecordedCall::Recognize(request) => {
                assert_eq!(request.input_type, RecognizeInputType::Speech);
                assert_eq!(request.end_silence_timeout, Duration::from_secs(3));
                assert_eq!(request.target_participant, "+33612345678");
                assert_eq!(request.speech_language, "fr-FR");
                assert_eq!(
                    request.play_prompt,
                    Some(PlaySource::file("https://voice.example.com/ready.wav"))
                );
                assert!(!request.interrupt_prompt);
            }
            other => panic!("expected a recognition, got {other:?}"),
        }
        assert_eq!(call.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_play_and_recognize_without_text() {
        let connection = MockConnection::always_succeeds();
        let config = config();
        let mut call = call();

        Playback::new(&connection, &config)
            .play_and_recognize(&mut call, Style::None, None, true)
            .await
            .unwrap();

        let calls = connection.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], RecordedCall::Recognize(_)));
        assert!(call.messages.is_empty());
    }

    #[tokio::test]
    async fn test_play_and_recognize_hangup() {
        let connection = MockConnection::always_fails(not_found());
        let config = config();
        let mut call = call();

        let result = Playback::new(&connection, &config)
            .play_and_recognize(&mut call, Style::None, Some("Hello?"), false)
            .await;

        assert!(result.is_ok());
        // Recognition is still attempted after a suppressed playback failure
        assert_eq!(connection.call_count(), 2);
    }

    #[tokio::test]
    async fn test_play_and_recognize_propagates_unexpected_error() {
        let connection = MockConnection::fails_from(
            1,
            CallError::Http {
                status: 500,
                code: None,
                message: "boom".to_string(),
            },
        );
        let config = config();
        let mut call = call();

        let result = Playback::new(&connection, &config)
            .play_and_recognize(&mut call, Style::None, Some("Hello?"), false)
            .await;
        assert!(matches!(result, Err(CallError::Http { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_play_menu_and_recognize_choice() {
        let connection = MockConnection::always_succeeds();
        let config = config();
        let call = call();
        let choices = vec![
            RecognitionChoice::new("claim", vec!["claim".to_string()]).with_tone(DtmfTone::One),
            RecognitionChoice::new("agent", vec!["agent".to_string()]).with_tone(DtmfTone::Two),
        ];

        Playback::new(&connection, &config)
            .play_menu_and_recognize_choice(
                &call,
                "Press 1 for a claim, 2 for an agent.",
                choices.clone(),
            )
            .await
            .unwrap();

        let calls = connection.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            RecordedCall::Recognize(request) => {
                assert_eq!(request.input_type, RecognizeInputType::Choices);
                assert_eq!(request.end_silence_timeout, Duration::from_secs(20));
                assert!(request.interrupt_prompt);
                assert_eq!(request.choices, choices);
                match &request.play_prompt {
                    Some(PlaySource::Ssml { ssml_text }) => {
                        assert!(ssml_text.contains("Press 1 for a claim"));
                        assert!(ssml_text.contains(r#"style="none""#));
                    }
                    other => panic!("expected an SSML prompt, got {other:?}"),
                }
            }
            other => panic!("expected a recognition, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_play_menu_suppresses_both_hangup_kinds() {
        let config = config();
        let call = call();

        for error in [
            not_found(),
            CallError::CallTerminated {
                message: "Call already terminated".to_string(),
            },
        ] {
            let connection = MockConnection::always_fails(error);
            let result = Playback::new(&connection, &config)
                .play_menu_and_recognize_choice(&call, "Choose.", Vec::new())
                .await;
            assert!(result.is_ok());
        }
    }
}
