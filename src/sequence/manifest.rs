//! Animation sequence manifests.
//!
//! A manifest lists the frames of an animation in order. Each frame carries
//! the direction used to draw the transition from it to the next frame.
//! Manifests are JSON, or the plain-text setup format of alternating path
//! and direction lines:
//!
//! ```text
//! frames/open.bmp
//! up
//! frames/half.bmp
//! down
//! frames/closed.bmp
//! left
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::{Direction, EncodingKind};

fn default_loop_back() -> bool {
    true
}

/// One frame of a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameEntry {
    /// BMP file, relative paths resolve against the manifest's directory.
    pub path: PathBuf,
    /// Direction for the transition out of this frame.
    pub direction: Direction,
}

/// Top-level sequence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Frames in playback order.
    pub frames: Vec<FrameEntry>,
    /// Payload encoding for every pair.
    #[serde(default)]
    pub encoding: EncodingKind,
    /// Also encode the last frame back to the first, closing the loop.
    #[serde(default = "default_loop_back")]
    pub loop_back: bool,
    /// Decode frames and encode pairs on the rayon thread pool.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            frames: vec![
                FrameEntry {
                    path: PathBuf::from("frames/open.bmp"),
                    direction: Direction::Up,
                },
                FrameEntry {
                    path: PathBuf::from("frames/half.bmp"),
                    direction: Direction::Down,
                },
                FrameEntry {
                    path: PathBuf::from("frames/closed.bmp"),
                    direction: Direction::Down,
                },
            ],
            encoding: EncodingKind::RunLength,
            loop_back: true,
            parallel: false,
        }
    }
}

impl SequenceConfig {
    /// Parse the plain-text setup format.
    ///
    /// Blank lines are ignored. Directions must be lowercase words.
    pub fn from_setup_text(text: &str) -> Result<Self, ManifestError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let mut frames = Vec::new();
        while let Some((_, path)) = lines.next() {
            let Some((line, word)) = lines.next() else {
                return Err(ManifestError::MissingDirection(PathBuf::from(path)));
            };
            let direction = word
                .parse::<Direction>()
                .map_err(|_| ManifestError::InvalidDirection {
                    line,
                    value: word.to_string(),
                })?;
            frames.push(FrameEntry {
                path: PathBuf::from(path),
                direction,
            });
        }

        Ok(Self {
            frames,
            encoding: EncodingKind::default(),
            loop_back: true,
            parallel: false,
        })
    }

    /// Load a manifest file: `.json` as JSON, anything else as setup text.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path)?;
        let config = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&text)?
        } else {
            Self::from_setup_text(&text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Number of ARF streams this configuration produces.
    pub fn pair_count(&self) -> usize {
        match self.frames.len() {
            0 | 1 => 0,
            n if self.loop_back => n,
            n => n - 1,
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.frames.len() < 2 {
            return Err(ManifestError::TooFewFrames(self.frames.len()));
        }
        for frame in &self.frames {
            // Case sensitive, matching the setup tooling
            if frame.path.extension().is_none_or(|e| e != "bmp") {
                return Err(ManifestError::NotBmp(frame.path.clone()));
            }
        }
        Ok(())
    }
}

/// Manifest loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("At least two frames are needed for an animation, found {0}")]
    TooFewFrames(usize),
    #[error("Frame {0:?} does not have a .bmp extension")]
    NotBmp(PathBuf),
    #[error("Frame {0:?} has no direction line")]
    MissingDirection(PathBuf),
    #[error("Line {line}: invalid direction '{value}'")]
    InvalidDirection { line: usize, value: String },
    #[error("Manifest parse failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Manifest read failed: {0}")]
    Io(#[from] std::io::Error),
}
