use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use speech_center::audio::{self, AudioFormat};
use speech_center::protocol::SampleRate;
use speech_center::session::DEFAULT_LANGUAGE;
use speech_center::{
    ClientConfig, GrpcChannel, RecognitionOptions, StreamSession, SynthesisOptions,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "speech-center",
    version,
    about = "Streaming speech recognition and synthesis client"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "log-level", default_value = "info", global = true)]
    log_level: log::LevelFilter,

    /// Path to the bearer token file
    #[arg(short = 't', long = "token-file", global = true)]
    token_file: Option<PathBuf>,

    /// Service URL, as host[:port] or with an http(s):// scheme
    #[arg(short = 'u', long = "url", global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recognize speech from an audio file using a grammar or a topic
    Recognize(RecognizeArgs),
    /// Synthesize speech from text into an audio file
    Synthesize(SynthesizeArgs),
}

#[derive(Args, Debug)]
struct RecognizeArgs {
    /// Audio file to send: raw 16-bit mono PCM, or a WAV file
    #[arg(short = 'a', long)]
    audio: PathBuf,

    /// Path to the grammar to use
    #[arg(short = 'g', long, conflicts_with = "topic", required_unless_present = "topic")]
    grammar: Option<PathBuf>,

    /// Topic model to use (generic, banking, telco)
    #[arg(short = 'T', long)]
    topic: Option<String>,

    #[arg(short = 'L', long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Sample rate of raw PCM input; WAV input uses its own header
    #[arg(long = "sample-rate", default_value_t = 8000)]
    sample_rate: u32,
}

#[derive(Args, Debug)]
struct SynthesizeArgs {
    /// Text to synthesize
    #[arg(short = 's', long)]
    text: String,

    /// Voice to synthesize with
    #[arg(short = 'v', long)]
    voice: String,

    /// 8khz or 16khz
    #[arg(long = "sampling-rate", default_value = "16khz")]
    sampling_rate: SampleRate,

    /// wav or raw
    #[arg(long, default_value = "wav")]
    format: AudioFormat,

    /// Output file for the synthesized audio
    #[arg(short = 'o', long)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .init();
    log::info!(
        "🚀 Starting {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config =
        ClientConfig::load(cli.url, cli.token_file).context("Failed to load configuration")?;
    let channel = GrpcChannel::connect(&config)
        .await
        .with_context(|| format!("Failed to connect to {}", config.url))?;
    let session = StreamSession::new(Arc::new(channel));

    match cli.command {
        Command::Recognize(args) => recognize(&session, args).await,
        Command::Synthesize(args) => synthesize(&session, args).await,
    }
}

async fn recognize(session: &StreamSession, args: RecognizeArgs) -> anyhow::Result<()> {
    let contents = tokio::fs::read(&args.audio)
        .await
        .with_context(|| format!("Failed to read audio file {}", args.audio.display()))?;

    let (pcm, sample_rate) = if audio::is_wav(&contents) {
        let decoded = audio::decode_wav(&contents)
            .with_context(|| format!("Failed to decode {}", args.audio.display()))?;
        log::info!("🎵 WAV input at {} Hz", decoded.sample_rate);
        let rate = decoded.sample_rate;
        (decoded.into_pcm(), rate)
    } else {
        (contents, args.sample_rate)
    };

    let grammar = match &args.grammar {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read grammar file {}", path.display()))?,
        ),
        None => None,
    };

    let options = RecognitionOptions {
        grammar,
        topic: args.topic,
        language: args.language,
        sample_rate_hz: sample_rate,
    };

    let transcript = session
        .run_recognition(&pcm, options)
        .await
        .context("Recognition failed")?;

    log::info!("Result: {}", transcript);
    println!("{}", transcript);
    Ok(())
}

async fn synthesize(session: &StreamSession, args: SynthesizeArgs) -> anyhow::Result<()> {
    let options =
        SynthesisOptions::new(args.text, args.voice, args.sampling_rate).format(args.format);

    let encoded = session
        .run_synthesis(options)
        .await
        .context("Synthesis failed")?;

    tokio::fs::write(&args.output, &encoded)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    log::info!(
        "✅ Saved {} bytes of audio to {}",
        encoded.len(),
        args.output.display()
    );
    Ok(())
}
