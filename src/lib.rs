//! Core of the emotion canvas: pointer motion over a grid becomes mood changes,
//! highlight effects and note events, gated by a composing/recording session.
//!
//! The crate never draws or makes sound itself. Hosts implement the traits in
//! [`collab`] and feed pointer samples into a [`session::SessionController`].

pub mod collab;
pub mod config;
pub mod coords;
pub mod effects;
pub mod error;
pub mod expression;
pub mod harmony;
pub mod mood;
pub mod pitch;
pub mod quantize;
pub mod region;
pub mod session;

pub use collab::{AudioSink, BackendNotifier, CellEvent, MoodIndicator, NoteEvent, Recorder, RecordingArtifact};
pub use config::{CanvasConfig, MoodConfig, MoodLibrary, Scale};
pub use coords::{GridCell, Viewport};
pub use error::{ConfigError, SessionError};
pub use mood::Mood;
pub use region::RegionStrategy;
pub use session::{Collaborators, MoveOutcome, Phase, SessionController};
