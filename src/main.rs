mod audio;
mod backend;
mod midi;
mod state;
mod ui;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use emotion_canvas::collab::{AudioSink, BackendNotifier, NoBackend, NoRecorder, Recorder};
use emotion_canvas::config::{CanvasConfig, JsonConfigSource, MoodLibrary};
use emotion_canvas::region::{AnchorLayout, RegionStrategy};
use emotion_canvas::session::{Collaborators, SessionController};
use tracing::{info, warn, Level};

use crate::audio::{SynthSink, TapRecorder};
use crate::backend::UdpNotifier;
use crate::midi::MidiSink;
use crate::state::SynthState;
use crate::ui::{CanvasApp, RegionIndicator};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Regions {
    /// Larger offset from the centre decides: up, down, left, right.
    Axis,
    Quadrant,
    Diagonal,
    /// Nearest mood anchor around the centre.
    Anchor,
}

impl From<Regions> for RegionStrategy {
    fn from(regions: Regions) -> Self {
        match regions {
            Regions::Axis => RegionStrategy::AxisDominance,
            Regions::Quadrant => RegionStrategy::Quadrant,
            Regions::Diagonal => RegionStrategy::Diagonal,
            Regions::Anchor => RegionStrategy::AnchorDistance(AnchorLayout::default()),
        }
    }
}

/// Move the pointer across the canvas to compose.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value_t = 22)]
    grid_width: u32,

    #[arg(long, default_value_t = 12)]
    grid_height: u32,

    /// How the canvas is split into mood regions.
    #[arg(long, value_enum, default_value_t = Regions::Axis)]
    regions: Regions,

    /// JSON file with mood and scale tables.
    #[arg(long)]
    moods: Option<PathBuf>,

    /// Address that receives cell events as JSON datagrams.
    #[arg(long)]
    backend: Option<SocketAddr>,

    /// Send notes to this MIDI output (substring of the port name) instead of the built-in synth.
    /// Recording is turned off, since there is no rendered audio to capture.
    #[arg(long)]
    midi_port: Option<String>,

    /// Compose without recording.
    #[arg(long)]
    no_record: bool,

    /// Seed for note humanization.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "info")]
    log_level: Level,
}

impl Args {
    /// Whether the session should record. MIDI output leaves nothing to tap.
    fn record(&self) -> bool {
        !self.no_record && self.midi_port.is_none()
    }
}

fn load_library(path: Option<&PathBuf>) -> MoodLibrary {
    let Some(path) = path else {
        return MoodLibrary::builtin();
    };
    match JsonConfigSource::open(path) {
        Ok(source) => MoodLibrary::load(&source),
        Err(e) => {
            warn!("Could not read {}: {}; using built-in moods", path.display(), e);
            MoodLibrary::builtin()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().with_max_level(args.log_level).init();

    if args.midi_port.is_some() && !args.no_record {
        warn!("Recording is not available with MIDI output; composing without it");
    }

    let runtime = tokio::runtime::Runtime::new()?;

    let (audio, recorder): (Box<dyn AudioSink>, Box<dyn Recorder>) = match &args.midi_port {
        Some(port) => {
            let sink = MidiSink::connect(port, runtime.handle().clone())?;
            (Box::new(sink), Box::new(NoRecorder))
        }
        None => {
            let synth = SynthState::new();
            runtime.spawn(audio::run_audio_engine(synth.clone()));
            (
                Box::new(SynthSink::new(synth.clone())),
                Box::new(TapRecorder::new(synth)),
            )
        }
    };

    let backend: Box<dyn BackendNotifier> = match args.backend {
        Some(addr) => match UdpNotifier::connect(addr, runtime.handle().clone()) {
            Ok(notifier) => Box::new(notifier),
            Err(e) => {
                warn!("Backend unavailable ({}); cells will not be reported", e);
                Box::new(NoBackend)
            }
        },
        None => Box::new(NoBackend),
    };

    let config = CanvasConfig {
        grid_width: args.grid_width.max(1),
        grid_height: args.grid_height.max(1),
        regions: args.regions.into(),
        record: args.record(),
        seed: args.seed,
        ..CanvasConfig::default()
    };
    info!(
        "Canvas {}x{}, regions {:?}, recording {}",
        config.grid_width,
        config.grid_height,
        args.regions,
        if config.record { "on" } else { "off" }
    );

    let indicator = RegionIndicator::default();
    let session = SessionController::new(
        config,
        load_library(args.moods.as_ref()),
        Collaborators {
            audio,
            recorder,
            backend,
            indicator: Box::new(indicator.clone()),
        },
    );

    ui::run_ui(CanvasApp::new(session, indicator)).map_err(|e| anyhow!("UI failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midi_output_turns_recording_off() {
        let args = Args::try_parse_from(["emotion-canvas", "--midi-port", "IAC"]).unwrap();
        assert!(!args.record());

        let args = Args::try_parse_from(["emotion-canvas"]).unwrap();
        assert!(args.record());

        let args = Args::try_parse_from(["emotion-canvas", "--no-record"]).unwrap();
        assert!(!args.record());
    }
}
