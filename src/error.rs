/// Errors returned by the control surface of the engine.
///
/// Nothing in here is ever produced on the audio thread: control calls are
/// validated before they are handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthError {
    /// Note number outside the MIDI range 0-127
    InvalidNote { note: u8 },
    /// Note-off for a note that is not sounding
    NoActiveVoice { note: u8 },
    /// Settings rejected; the previous settings stay in effect
    InvalidSettings { field: &'static str, reason: String },
    /// Control queue to the audio thread is full
    QueueFull,
    /// The engine has been disposed
    Disposed,
    /// The output device could not be opened or started
    Device(String),
}

pub type Result<T> = std::result::Result<T, SynthError>;

impl SynthError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SynthError::InvalidSettings {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for SynthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynthError::InvalidNote { note } => {
                write!(f, "Invalid note {}: expected a MIDI note in 0..=127", note)
            }
            SynthError::NoActiveVoice { note } => {
                write!(f, "No active voice for note {}", note)
            }
            SynthError::InvalidSettings { field, reason } => {
                write!(f, "Invalid settings: `{}` {}", field, reason)
            }
            SynthError::QueueFull => write!(f, "Control queue to the audio thread is full"),
            SynthError::Disposed => write!(f, "Engine has been disposed"),
            SynthError::Device(msg) => write!(f, "Audio device error: {}", msg),
        }
    }
}

impl std::error::Error for SynthError {}
