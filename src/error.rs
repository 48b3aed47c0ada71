use std::fmt;

/// Failures while obtaining or validating mood and scale tables.
///
/// None of these halt the application: [`crate::config::MoodLibrary::load`]
/// falls back to the built-in table when the source fails.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    UnknownScale(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "mood config unavailable: {e}"),
            ConfigError::Parse(e) => write!(f, "mood config is malformed: {e}"),
            ConfigError::UnknownScale(name) => write!(f, "scale '{name}' not found"),
            ConfigError::Invalid(reason) => write!(f, "invalid mood config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Reasons a session transition was refused. Every variant leaves the
/// controller in a consistent phase; the host shows the message to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Recording was requested but the recorder could not be acquired.
    RecorderUnavailable(String),
    /// The audio context did not confirm it is running.
    AudioUnavailable(String),
    /// `start()` called while already composing or recording.
    AlreadyActive,
    /// `clear()` called mid-recording.
    ClearWhileRecording,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::RecorderUnavailable(reason) => {
                write!(f, "Recording unavailable, cannot start exploring ({reason})")
            }
            SessionError::AudioUnavailable(reason) => {
                write!(f, "Audio output unavailable, cannot start exploring ({reason})")
            }
            SessionError::AlreadyActive => f.write_str("A session is already running"),
            SessionError::ClearWhileRecording => {
                f.write_str("Stop the recording before clearing the canvas")
            }
        }
    }
}

impl std::error::Error for SessionError {}
