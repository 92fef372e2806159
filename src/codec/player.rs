//! Sequential playback of a chain of ARF streams.

use super::reader::ArfReader;
use crate::error::Result;
use crate::raster::RasterFrame;

/// Replays streams one after another on top of a base frame.
///
/// Each stream is the delta from the previously yielded frame, so the
/// iterator yields every frame of the animation after the first.
///
/// Usage:
/// ```ignore
/// let playback = Playback::new(first_frame, streams.iter());
/// for frame in playback {
///     panel.draw(&frame?);
/// }
/// ```
pub struct Playback<I> {
    frame: RasterFrame,
    streams: I,
    played: usize,
}

impl<I> Playback<I> {
    pub fn new<B>(base: RasterFrame, streams: I) -> Self
    where
        I: Iterator<Item = B>,
        B: AsRef<[u8]>,
    {
        Self {
            frame: base,
            streams,
            played: 0,
        }
    }

    /// The frame as of the last replayed stream.
    pub fn current(&self) -> &RasterFrame {
        &self.frame
    }

    /// Number of streams replayed so far.
    pub fn played(&self) -> usize {
        self.played
    }
}

impl<I, B> Iterator for Playback<I>
where
    I: Iterator<Item = B>,
    B: AsRef<[u8]>,
{
    type Item = Result<RasterFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        let stream = self.streams.next()?;
        let result = ArfReader::open(stream.as_ref())
            .and_then(|reader| reader.replay(&mut self.frame))
            .map(|_| self.frame.clone());
        self.played += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.streams.size_hint()
    }
}
