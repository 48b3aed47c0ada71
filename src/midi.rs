use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use emotion_canvas::collab::{AudioSink, NoteEvent};
use midir::{MidiOutput, MidiOutputConnection};
use tokio::runtime::Handle;
use tracing::{debug, error, info};

const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;

/// Sends notes to an external MIDI device instead of the built-in synth.
pub struct MidiSink {
    connection: Arc<Mutex<MidiOutputConnection>>,
    runtime: Handle,
}

impl MidiSink {
    /// Connects to the first output port whose name contains `port_name`.
    pub fn connect(port_name: &str, runtime: Handle) -> anyhow::Result<Self> {
        let midi_output = MidiOutput::new("Emotion Canvas").context("failed to create MIDI output")?;

        // List available MIDI ports
        let out_ports = midi_output.ports();
        if out_ports.is_empty() {
            anyhow::bail!("no MIDI output devices found");
        }

        info!("Available MIDI output ports:");
        for (i, port) in out_ports.iter().enumerate() {
            info!("Port {}: {}", i, midi_output.port_name(port).unwrap_or_else(|_| "Unknown".to_string()));
        }

        let out_port = out_ports
            .iter()
            .find(|port| {
                midi_output
                    .port_name(port)
                    .map(|name| name.contains(port_name))
                    .unwrap_or(false)
            })
            .with_context(|| format!("MIDI output '{port_name}' not found"))?;
        info!("Using MIDI output: {}", midi_output.port_name(out_port).unwrap_or_else(|_| "Unknown".to_string()));

        let connection = midi_output
            .connect(out_port, "emotion-canvas")
            .map_err(|e| anyhow::anyhow!("failed to connect to MIDI output: {e}"))?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            runtime,
        })
    }
}

fn send(connection: &Mutex<MidiOutputConnection>, message: [u8; 3]) {
    let Ok(mut connection) = connection.lock() else {
        error!("MIDI connection poisoned");
        return;
    };
    if let Err(e) = connection.send(&message) {
        error!("Failed to send MIDI message {:?}: {}", message, e);
    }
}

impl AudioSink for MidiSink {
    fn resume(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn play_note(&mut self, note: &NoteEvent) {
        let connection = self.connection.clone();
        let NoteEvent {
            pitch,
            velocity,
            duration,
            offset,
        } = *note;

        self.runtime.spawn(async move {
            if offset > 0.0 {
                tokio::time::sleep(Duration::from_secs_f64(offset)).await;
            }
            send(&connection, [NOTE_ON, pitch, velocity]);
            debug!("Note On: note={}, velocity={}", pitch, velocity);

            tokio::time::sleep(Duration::from_secs_f64(duration)).await;
            send(&connection, [NOTE_OFF, pitch, 0]);
            debug!("Note Off: note={}", pitch);
        });
    }
}
