use crate::synth::settings::Settings;

/// Control events handed from the control thread to the audio thread.
///
/// Every variant is `Copy`; pushing one through the ring never allocates and
/// the audio thread never frees anything it receives.
#[derive(Debug, Copy, Clone)]
pub enum SynthMessage {
    NoteOn { note: u8 },
    NoteOff { note: u8 },
    UpdateSettings(Settings),
    SetMasterVolume(f32),
    AllNotesOff,
}
