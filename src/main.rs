mod audio;
mod error;
mod parser;
mod processor;
mod render;
mod serialiser;
mod srt;
mod tags;

use crate::audio::AudioSource;
use crate::error::SubcastError;
use crate::parser::Parser;
use crate::processor::ProcessOpts;
use crate::render::RenderOpts;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser as ClapParser};
use env_logger::{Builder, Env};
use log::{debug, info};

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("{}", diagnostic(&err));
            std::process::exit(1);
        }
    }
}

/// The whole error chain on a single line.
fn diagnostic(err: &anyhow::Error) -> String {
    format!("error: {:#}", err)
}

#[derive(ClapParser)]
#[command(
    about = "Turn an MP3 and its SRT subtitles into a self-contained HTML transcript page"
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "The MP3 file to play on the page.")]
    audio: PathBuf,
    #[arg(long, value_name = "FILE", help = "The SRT file holding the transcript.")]
    subtitles: PathBuf,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to write to. Defaults to the audio file name with an .html extension, next to the audio file."
    )]
    output: Option<PathBuf>,
    #[arg(
        long = "no-embed-mp3",
        help = "Link to the MP3 file instead of embedding it in the page."
    )]
    no_embed_mp3: bool,
    #[arg(long, help = "Keep <i>, <font> and {\\an8} style markup in the subtitle text.")]
    keep_markup: bool,
    #[arg(long, help = "Do not move the highlight along with playback.")]
    no_follow: bool,
    #[arg(long, value_name = "CODE", default_value = "en", help = "Language code for the page.")]
    lang: String,
    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = parse_seconds,
        help = "Open the page positioned at this playback offset."
    )]
    start_at: Option<u64>,
    #[arg(short, long, action = ArgAction::Count, help = "Log more; repeat for debug output.")]
    verbose: u8,
}

fn parse_seconds(value: &str) -> std::result::Result<u64, String> {
    match value.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok((secs * 1000.0).round() as u64),
        _ => Err(format!("'{}' is not a non-negative number of seconds", value)),
    }
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    Builder::from_env(Env::default().filter_or("RUST_LOG", level))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .target(env_logger::Target::Stderr)
        .init();
}

fn check_input(kind: &'static str, path: &Path) -> Result<(), SubcastError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SubcastError::InputNotFound {
            kind,
            path: path.to_path_buf(),
        })
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    check_input("Audio", &cli.audio)?;
    check_input("Subtitle", &cli.subtitles)?;

    let data = std::fs::read_to_string(&cli.subtitles)
        .context(format!("Failed to read subtitle file: '{}'", cli.subtitles.display()))?;

    let mut parser = Parser::new();

    let subs = parser
        .parse(&data)
        .context(format!("Failed to parse SRT file: '{}'", cli.subtitles.display()))?;
    if subs.is_empty() {
        return Err(anyhow!("You appear to have supplied an empty file."));
    }
    debug!("Parsed {} segments", subs.len());

    let opts = ProcessOpts {
        strip_markup: !cli.keep_markup,
    };
    let subs = processor::process(subs, &opts)?;

    let meta = tags::read_tags(&cli.audio)
        .context(format!("Failed to read audio file: '{}'", cli.audio.display()))?;
    info!("Title: {}", meta.title);

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| serialiser::output_path(&cli.audio));

    let audio = if cli.no_embed_mp3 {
        AudioSource::link(serialiser::link_target(&cli.audio, &output))
    } else {
        let bytes = std::fs::read(&cli.audio)
            .context(format!("Failed to read audio file: '{}'", cli.audio.display()))?;
        info!("Embedding {} bytes of audio", bytes.len());
        AudioSource::embed(&bytes, audio::DEFAULT_MIME)
    };

    let opts = RenderOpts {
        lang: cli.lang,
        follow_playback: !cli.no_follow,
        start_at_ms: cli.start_at,
    };
    let html = render::render(&meta, &subs, &audio, &opts);

    serialiser::serialise(&html, &output)?;
    println!("HTML file successfully written to {}", output.display());

    Ok(())
}
