// Conversion engine - independent of the CLI

pub mod core;
pub mod hardware;
pub mod probe;

pub use core::*;
pub use hardware::{AccelBackend, detect_hwaccel};
pub use probe::{Ffprobe, StreamProbe, StreamProfile, is_compliant, probe_stream};
