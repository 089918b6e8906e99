// Purpose: Voice management, polyphony, master bus
// This layer sits above the DSP primitives and owns note lifecycle

pub mod master;
pub mod message;
pub mod poly;
pub mod settings;
pub mod voice;
