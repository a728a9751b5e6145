// src/main.rs
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use air_writer::canvas::{Canvas, RasterCanvas};
use air_writer::config::AirWriterConfig;
use air_writer::data::SessionExporter;
use air_writer::session::DrawingSession;
use air_writer::source::{FrameSource, Recording};

/// Air Writer - draw in the air with a thumb-index pinch
#[derive(Parser, Debug)]
#[command(name = "air_writer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded landmark session and render it
    Replay {
        /// Recording file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Session name (timestamped if not provided)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Render a synthetic hand session
    Demo {
        /// Number of frames to generate (~30 per second)
        #[arg(short, long, default_value = "300")]
        frames: u64,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save the generated landmarks as a recording
        #[arg(long)]
        save_recording: bool,
    },

    /// Print the default configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => AirWriterConfig::load(path)?,
        None => AirWriterConfig::default(),
    };

    match cli.command {
        Commands::Replay { input, output, session } => {
            let recording = Recording::load(&input)?;
            if let Some(canvas) = &recording.canvas {
                config.canvas = canvas.clone();
            }
            let output = output.unwrap_or_else(default_output_dir);
            run(config, FrameSource::from_recording(recording), &output, session)
        }
        Commands::Demo { frames, output, save_recording } => {
            let output = output.unwrap_or_else(default_output_dir);
            let exporter_name = format!("demo_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
            if save_recording {
                let path = output.join(&exporter_name).join("recording.json");
                std::fs::create_dir_all(output.join(&exporter_name))?;
                let mut recording = Recording::capture(FrameSource::synthetic(frames));
                recording.canvas = Some(config.canvas.clone());
                recording.save(&path)?;
                info!(path = %path.display(), "recording saved");
            }
            run(config, FrameSource::synthetic(frames), &output, Some(exporter_name))
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn default_output_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|p| p.join("AirWriter")))
        .unwrap_or_else(|| PathBuf::from("./output"))
}

fn run(config: AirWriterConfig, source: FrameSource, output: &Path, session_name: Option<String>) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let mut canvas = RasterCanvas::new(config.canvas.width, config.canvas.height, &config.brush)?;
    let mut session = DrawingSession::new(config);
    let mut exporter = SessionExporter::new(output, session_name);

    for frame in source.drop_invalid_hands() {
        let result = session.process_frame(frame.hand.as_ref(), frame.timestamp_ms);
        canvas.execute(&result.commands);
        exporter.add_frame(&result, frame.timestamp_ms);
    }

    let dir = exporter.session_dir();
    std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    canvas.save_png(dir.join("drawing.png"))?;
    canvas.save_preview_png(dir.join("preview.png"))?;
    exporter.export_csv()?;
    exporter.generate_report(session.stats())?;

    let stats = session.stats();
    info!(
        frames = stats.frames,
        strokes = stats.strokes,
        segments = stats.segments,
        output = %dir.display(),
        "session rendered"
    );
    Ok(())
}
