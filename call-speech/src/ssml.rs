//! SSML generation for the call automation TTS engine.

use log::warn;

use crate::call::Style;

/// Text limit of the TTS engine, in characters.
pub const MAX_SSML_TEXT_LENGTH: usize = 400;

/// Default style intensity for `mstts:express-as` (0-1 scale).
pub const DEFAULT_STYLE_DEGREE: f32 = 0.5;

/// Default prosody rate; slightly slower than normal for callers who need time.
pub const DEFAULT_PROSODY_RATE: f32 = 0.95;

/// How the spoken text is inserted into the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEscaping {
    /// Escape `&`, `<` and `>` so the text can never open a tag.
    #[default]
    Escape,
    /// Insert the text verbatim. Text containing markup characters produces
    /// an invalid or altered document; only use it for pre-built SSML snippets.
    Raw,
}

/// Everything needed to synthesize one chunk of text.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    text: String,
    style: Style,
    language_code: String,
    voice_name: String,
    lexicon_url: String,
    style_degree: f32,
    prosody_rate: f32,
    escaping: TextEscaping,
}

/// A built SSML document.
#[derive(Debug, Clone, PartialEq)]
pub struct SsmlDocument {
    pub ssml: String,
    /// Whether the text was cut to [`MAX_SSML_TEXT_LENGTH`]
    pub truncated: bool,
}

impl SynthesisRequest {
    /// Create a request with the default style degree, prosody rate and escaping.
    ///
    /// `lexicon_url` is the public base URL hosting `lexicon.xml`.
    pub fn new(
        text: impl Into<String>,
        style: Style,
        language_code: impl Into<String>,
        voice_name: impl Into<String>,
        lexicon_url: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            style,
            language_code: language_code.into(),
            voice_name: voice_name.into(),
            lexicon_url: lexicon_url.into(),
            style_degree: DEFAULT_STYLE_DEGREE,
            prosody_rate: DEFAULT_PROSODY_RATE,
            escaping: TextEscaping::default(),
        }
    }

    /// Set the style intensity.
    pub fn with_style_degree(mut self, degree: f32) -> Self {
        self.style_degree = degree.clamp(0.01, 2.0);
        self
    }

    /// Set the prosody rate.
    pub fn with_prosody_rate(mut self, rate: f32) -> Self {
        self.prosody_rate = rate.clamp(0.5, 2.0);
        self
    }

    /// Set how the text is inserted.
    pub fn with_escaping(mut self, escaping: TextEscaping) -> Self {
        self.escaping = escaping;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> Style {
        self.style
    }

    /// Render the SSML document.
    ///
    /// Text over [`MAX_SSML_TEXT_LENGTH`] characters is truncated and a warning
    /// is logged; the returned document reports it through `truncated`.
    pub fn build(&self) -> SsmlDocument {
        let (text, truncated) = truncate_chars(&self.text, MAX_SSML_TEXT_LENGTH);
        if truncated {
            warn!(
                "Text is too long to be processed by TTS ({} characters), truncating to {} characters",
                self.text.chars().count(),
                MAX_SSML_TEXT_LENGTH
            );
        }

        let text = match self.escaping {
            TextEscaping::Escape => escape_text(text),
            TextEscaping::Raw => text.to_string(),
        };

        let ssml = format!(
            r#"
<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xmlns:mstts="https://www.w3.org/2001/mstts" xml:lang="{lang}">
    <voice name="{voice}" effect="eq_telecomhp8k">
        <lexicon uri="{lexicon}/lexicon.xml" />
        <mstts:express-as style="{style}" styledegree="{degree}">
            <prosody rate="{rate}">{text}</prosody>
        </mstts:express-as>
    </voice>
</speak>
"#,
            lang = escape_attribute(&self.language_code),
            voice = escape_attribute(&self.voice_name),
            lexicon = escape_attribute(self.lexicon_url.trim_end_matches('/')),
            style = self.style.as_str(),
            degree = self.style_degree,
            rate = self.prosody_rate,
        );

        SsmlDocument {
            ssml: ssml.trim().to_string(),
            truncated,
        }
    }
}

/// Cut text to at most `max` characters, on a character boundary.
fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((end, _)) => (&text[..end], true),
        None => (text, false),
    }
}

/// Escape element content.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape a double-quoted attribute value.
fn escape_attribute(value: &str) -> String {
    escape_text(value)
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
