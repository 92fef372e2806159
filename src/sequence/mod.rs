//! Frame sequences: manifests and the batch encoder.

mod manifest;
mod pipeline;

pub use manifest::{FrameEntry, ManifestError, SequenceConfig};
pub use pipeline::{
    PairReport, SequenceError, SequenceReport, encode_sequence, output_name, play_sequence,
};
