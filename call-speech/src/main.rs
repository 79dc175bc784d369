//! call-speech - Preview TTS chunks and SSML, and play text on live calls

use anyhow::{Context, Result};
use call_client::get_connection;
use call_speech::text::{chunk_text, split_sentences};
use call_speech::{
    CallLanguage, CallRecord, Playback, SpeechConfig, Style, SynthesisRequest, TextEscaping,
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::{debug, info};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "call-speech")]
#[command(about = "Play chunked SSML speech into live phone calls", long_about = None)]
#[command(version)]
struct Args {
    /// Enable debug output
    #[arg(short, long, default_value_t = false, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Text given inline or read from a file
#[derive(ClapArgs, Debug)]
struct TextInput {
    /// Text to process
    text: Option<String>,

    /// Read the text from a file instead
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,
}

/// Voice settings for SSML generation
#[derive(ClapArgs, Debug)]
struct VoiceArgs {
    /// Speaking style (none, cheerful, sad)
    #[arg(long, default_value = "none")]
    style: String,

    /// Language code (e.g. "fr-FR")
    #[arg(long)]
    lang: Option<String>,

    /// Neural voice name (e.g. "fr-FR-DeniseNeural")
    #[arg(long)]
    voice: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the sentences of a text, one per line
    Split {
        #[command(flatten)]
        input: TextInput,

        /// Keep text after the last punctuation mark
        #[arg(long)]
        include_last: bool,
    },
    /// Print the chunks sent to TTS, one per line
    Chunks {
        #[command(flatten)]
        input: TextInput,

        /// Chunk size in characters that triggers a new chunk (default from config)
        #[arg(long)]
        max: Option<usize>,
    },
    /// Print the SSML document for a text
    Ssml {
        #[command(flatten)]
        input: TextInput,

        #[command(flatten)]
        voice: VoiceArgs,

        /// Insert the text without escaping markup characters
        #[arg(long)]
        raw: bool,
    },
    /// Play text on a live call
    Play {
        #[command(flatten)]
        input: TextInput,

        #[command(flatten)]
        voice: VoiceArgs,

        /// Call connection id
        #[arg(long)]
        call: String,

        /// Caller phone number (E.164), listened to with --recognize
        #[arg(long)]
        phone: String,

        /// Listen to the caller's answer after playing
        #[arg(long)]
        recognize: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Commands::Split {
            input,
            include_last,
        } => {
            let text = read_input(&input)?;
            for sentence in split_sentences(&text, include_last) {
                println!("{:?}", sentence);
            }
        }
        Commands::Chunks { input, max } => {
            let config = SpeechConfig::load().context("Failed to load configuration")?;
            let text = read_input(&input)?;
            let max = max.unwrap_or(config.tts.max_chunk_length);
            for chunk in chunk_text(&text, max) {
                println!("[{}] {:?}", chunk.chars().count(), chunk);
            }
        }
        Commands::Ssml { input, voice, raw } => {
            let config = SpeechConfig::load().context("Failed to load configuration")?;
            let text = read_input(&input)?;
            let lang = call_language(&voice);
            let escaping = if raw || !config.tts.escape_text {
                TextEscaping::Raw
            } else {
                TextEscaping::Escape
            };

            let document = SynthesisRequest::new(
                text,
                parse_style(&voice.style)?,
                lang.short_code,
                lang.voice,
                config.lexicon_base_url(),
            )
            .with_style_degree(config.tts.style_degree)
            .with_prosody_rate(config.tts.prosody_rate)
            .with_escaping(escaping)
            .build();

            println!("{}", document.ssml);
        }
        Commands::Play {
            input,
            voice,
            call,
            phone,
            recognize,
        } => {
            let config = SpeechConfig::load().context("Failed to load configuration")?;
            let text = read_input(&input)?;
            let style = parse_style(&voice.style)?;

            let connection = get_connection(&config.client, &call)
                .context("Failed to create call connection client")?;
            let playback = Playback::new(connection.as_ref(), &config);
            let mut record = CallRecord::new(call, phone, call_language(&voice));

            if recognize {
                playback
                    .play_and_recognize(&mut record, style, Some(&text), true)
                    .await?;
            } else {
                playback
                    .play_text(&mut record, &text, style, None, true)
                    .await?;
            }

            info!("Done ({} transcript message(s))", record.messages.len());
            debug!("Transcript: {}", serde_json::to_string_pretty(&record.messages)?);
        }
        Commands::Config { action } => handle_config_command(&action)?,
    }

    Ok(())
}

fn read_input(input: &TextInput) -> Result<String> {
    match (&input.text, &input.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        (None, None) => anyhow::bail!("Text or --file is required. Run 'call-speech --help' for usage."),
    }
}

fn parse_style(value: &str) -> Result<Style> {
    Style::from_str(value)
        .ok_or_else(|| anyhow::anyhow!("Unknown style: {} (expected none, cheerful or sad)", value))
}

fn call_language(voice: &VoiceArgs) -> CallLanguage {
    let mut lang = CallLanguage::default();
    if let Some(code) = &voice.lang {
        lang.short_code = code.clone();
    }
    if let Some(name) = &voice.voice {
        lang.voice = name.clone();
    }
    lang
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = SpeechConfig::load()?;
            let path = SpeechConfig::config_path()?;
            println!("# {}", path.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", SpeechConfig::config_path()?.display());
        }
        ConfigAction::Init => {
            let path = SpeechConfig::config_path()?;
            if path.exists() {
                anyhow::bail!("Configuration already exists: {}", path.display());
            }
            SpeechConfig::default().save()?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
